//! Binary entry point for the `provision-wait` CLI.

use std::io::{self, Write};
use std::process;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use provision_wait::{
    ClientSession, ConfigError, ProviderConfig, SessionError, WaitError, WaitTuning,
    wait_for_hardware_deleted, wait_for_hardware_provision, wait_for_no_active_transactions,
    wait_for_storage_available,
};

mod cli;

use cli::{Cli, HardwareCommand, IdCommand, WaitArgs};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("wait failed: {0}")]
    Wait(#[from] WaitError),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(summary) => {
            writeln!(io::stdout(), "{summary}").ok();
            0
        }
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<String, CliError> {
    let config = ProviderConfig::load_without_cli_args()?;
    let session = ClientSession::new(config)?;
    let api = session.softlayer()?;

    match cli {
        Cli::Hardware(HardwareCommand {
            hostname,
            domain,
            gateway,
            wait,
        }) => {
            let defaults = if gateway {
                WaitTuning::NETWORK_GATEWAY_PROVISION
            } else {
                WaitTuning::BARE_METAL_PROVISION
            };
            let hardware =
                wait_for_hardware_provision(api, &hostname, &domain, tuning(defaults, wait))
                    .await?;
            Ok(format!(
                "hardware {} ({hostname}.{domain}) provisioned",
                hardware.id
            ))
        }
        Cli::Transactions(IdCommand { id, wait }) => {
            wait_for_no_active_transactions(api, id, tuning(WaitTuning::ACTIVE_TRANSACTIONS, wait))
                .await?;
            Ok(format!("hardware {id} has no active transactions"))
        }
        Cli::Storage(IdCommand { id, wait }) => {
            wait_for_storage_available(api, id, tuning(WaitTuning::STORAGE_AVAILABLE, wait))
                .await?;
            Ok(format!("storage {id} available"))
        }
        Cli::Deleted(IdCommand { id, wait }) => {
            wait_for_hardware_deleted(api, id, tuning(WaitTuning::HARDWARE_DELETE, wait)).await?;
            Ok(format!("hardware {id} deleted"))
        }
    }
}

fn tuning(defaults: WaitTuning, args: WaitArgs) -> WaitTuning {
    let mut tuning = defaults;
    if let Some(secs) = args.timeout_secs {
        tuning = tuning.with_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = args.delay_secs {
        tuning = tuning.with_delay(Duration::from_secs(secs));
    }
    if let Some(secs) = args.poll_interval_secs {
        tuning = tuning.with_poll_interval(Duration::from_secs(secs));
    }
    tuning
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuning_keeps_defaults_without_overrides() {
        let tuning = tuning(WaitTuning::STORAGE_AVAILABLE, WaitArgs::default());
        assert_eq!(tuning, WaitTuning::STORAGE_AVAILABLE);
    }

    #[test]
    fn tuning_applies_every_override() {
        let args = WaitArgs {
            timeout_secs: Some(30),
            delay_secs: Some(0),
            poll_interval_secs: Some(5),
        };
        let tuning = tuning(WaitTuning::BARE_METAL_PROVISION, args);
        assert_eq!(tuning.timeout, Duration::from_secs(30));
        assert_eq!(tuning.delay, Duration::ZERO);
        assert_eq!(tuning.poll_interval, Some(Duration::from_secs(5)));
        assert_eq!(
            tuning.min_timeout,
            WaitTuning::BARE_METAL_PROVISION.min_timeout
        );
    }

    #[test]
    fn command_tree_for_man_pages_is_consistent() {
        use clap::CommandFactory;

        let command = Cli::command();
        command.clone().debug_assert();
        let names: Vec<&str> = command.get_subcommands().map(clap::Command::get_name).collect();
        assert_eq!(names, ["hardware", "transactions", "storage", "deleted"]);
    }

    #[test]
    fn parses_storage_subcommand() {
        let cli = Cli::try_parse_from([
            "provision-wait",
            "storage",
            "--id",
            "42",
            "--timeout-secs",
            "90",
        ])
        .expect("valid arguments");
        assert!(matches!(
            cli,
            Cli::Storage(IdCommand {
                id: 42,
                wait: WaitArgs {
                    timeout_secs: Some(90),
                    ..
                },
            })
        ));
    }

    #[test]
    fn hardware_requires_hostname_and_domain() {
        let err = Cli::try_parse_from(["provision-wait", "hardware", "--hostname", "node"])
            .expect_err("domain is required");
        assert!(err.to_string().contains("--domain"), "got: {err}");
    }

    #[test]
    fn write_error_writes_cli_error() {
        let mut buf = Vec::new();
        let err = CliError::Config(ConfigError::MissingField(String::from(
            "missing classic infrastructure API key",
        )));
        write_error(&mut buf, &err);
        let rendered = String::from_utf8(buf).expect("utf8");
        assert!(
            rendered.starts_with("configuration error: missing configuration field"),
            "rendered: {rendered}"
        );
    }
}
