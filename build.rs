//! Build script that renders man pages for `provision-wait`.
//!
//! One page covers the top-level command and each waiter subcommand gets its
//! own `provision-wait-<name>.1`, all written to the build output directory.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

fn render(man: &Man, out_dir: &Path, file_name: &str) -> std::io::Result<()> {
    let mut page = Vec::new();
    man.render(&mut page)?;
    fs::write(out_dir.join(file_name), page)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "cargo:rerun-if-changed=build.rs")?;
    writeln!(stdout, "cargo:rerun-if-changed=src/cli/mod.rs")?;

    let out_dir =
        PathBuf::from(env::var_os("OUT_DIR").ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "OUT_DIR was not set")
        })?);

    let command = cli::Cli::command();
    let app = command.get_name().to_owned();
    for sub in command.get_subcommands() {
        let name = format!("{app}-{}", sub.get_name());
        let man = Man::new(sub.clone()).title(name.to_uppercase());
        render(&man, &out_dir, &format!("{name}.1"))?;
    }
    render(&Man::new(command), &out_dir, &format!("{app}.1"))?;

    Ok(())
}
