//! BDD step definitions for the waiters.

use std::future::Future;
use std::time::Duration;

use provision_wait::test_support::{api_error, hardware, storage};
use provision_wait::{
    WaitError, wait_for_hardware_deleted, wait_for_hardware_provision, wait_for_storage_available,
};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Builder;

use super::test_helpers::{WaitContext, WaitOutcome};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("storage \"{id}\" fails with status \"{status}\"")]
fn storage_fails(wait_context: WaitContext, id: u64, status: u16) -> Result<WaitContext, StepError> {
    let message = if status == 404 {
        format!("Unable to find object with id of '{id}'.")
    } else {
        String::from("internal error")
    };
    wait_context.api.push_storage(Err(api_error(status, &message)));
    Ok(wait_context)
}

#[given("storage \"{id}\" reports \"{count}\" active transactions")]
fn storage_busy(wait_context: WaitContext, id: u64, count: u32) -> Result<WaitContext, StepError> {
    wait_context
        .api
        .push_storage(Ok(storage(id, count, "PROVISION_IN_PROGRESS")));
    Ok(wait_context)
}

#[given("storage \"{id}\" reports provisioning completed")]
fn storage_completed(wait_context: WaitContext, id: u64) -> Result<WaitContext, StepError> {
    wait_context
        .api
        .push_storage(Ok(storage(id, 0, "PROVISION_COMPLETED")));
    Ok(wait_context)
}

#[given("the hardware search stays empty")]
fn search_empty(wait_context: WaitContext) -> Result<WaitContext, StepError> {
    wait_context.api.push_search(Ok(Vec::new()));
    Ok(wait_context)
}

#[given("hardware \"{id}\" is found without a provision date")]
fn search_finds_pending(wait_context: WaitContext, id: u64) -> Result<WaitContext, StepError> {
    wait_context.api.push_search(Ok(vec![hardware(id, false, 1)]));
    Ok(wait_context)
}

#[given("hardware \"{id}\" is found with a provision date")]
fn search_finds_provisioned(wait_context: WaitContext, id: u64) -> Result<WaitContext, StepError> {
    wait_context.api.push_search(Ok(vec![hardware(id, true, 0)]));
    Ok(wait_context)
}

#[given("hardware \"{id}\" is still present")]
fn hardware_present(wait_context: WaitContext, id: u64) -> Result<WaitContext, StepError> {
    wait_context.api.push_hardware(Ok(hardware(id, true, 1)));
    Ok(wait_context)
}

#[given("hardware \"{id}\" fails with status \"{status}\"")]
fn hardware_fails(wait_context: WaitContext, id: u64, status: u16) -> Result<WaitContext, StepError> {
    let message = if status == 404 {
        format!("Unable to find object with id of '{id}'.")
    } else {
        String::from("boom")
    };
    wait_context
        .api
        .push_hardware(Err(api_error(status, &message)));
    Ok(wait_context)
}

#[given("a timeout of \"{secs}\" seconds")]
fn timeout_of(mut wait_context: WaitContext, secs: u64) -> Result<WaitContext, StepError> {
    wait_context.tuning = wait_context.tuning.with_timeout(Duration::from_secs(secs));
    Ok(wait_context)
}

fn run_wait<F, T>(mut wait_context: WaitContext, wait: F) -> WaitContext
where
    F: Future<Output = Result<T, WaitError>>,
{
    let runtime = Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap_or_else(|err| panic!("runtime should build: {err}"));
    wait_context.outcome = Some(match runtime.block_on(wait) {
        Ok(_) => WaitOutcome::Success,
        Err(err) => WaitOutcome::Failure {
            timed_out: err.is_timeout(),
            message: err.to_string(),
        },
    });
    wait_context
}

#[when("I wait for storage \"{id}\"")]
fn wait_storage(wait_context: WaitContext, id: u64) -> Result<WaitContext, StepError> {
    let api = wait_context.api.clone();
    let tuning = wait_context.tuning;
    Ok(run_wait(wait_context, async move {
        wait_for_storage_available(&api, id, tuning).await
    }))
}

#[when("I wait for hardware \"{hostname}\" in domain \"{domain}\"")]
fn wait_hardware(wait_context: WaitContext, hostname: String, domain: String) -> Result<WaitContext, StepError> {
    let api = wait_context.api.clone();
    let tuning = wait_context.tuning;
    Ok(run_wait(wait_context, async move {
        wait_for_hardware_provision(&api, &hostname, &domain, tuning).await
    }))
}

#[when("I wait for hardware \"{id}\" to be deleted")]
fn wait_deleted(wait_context: WaitContext, id: u64) -> Result<WaitContext, StepError> {
    let api = wait_context.api.clone();
    let tuning = wait_context.tuning;
    Ok(run_wait(wait_context, async move {
        wait_for_hardware_deleted(&api, id, tuning).await
    }))
}

fn outcome(wait_context: &WaitContext) -> Result<&WaitOutcome, StepError> {
    wait_context
        .outcome
        .as_ref()
        .ok_or_else(|| StepError::Assertion(String::from("missing outcome")))
}

#[then("the wait succeeds after {reads:u32} reads")]
fn succeeds_after(wait_context: &WaitContext, reads: u32) -> Result<(), StepError> {
    match outcome(wait_context)? {
        WaitOutcome::Success => made_reads(wait_context, reads),
        other => Err(StepError::Assertion(format!(
            "expected success, got {other:?}"
        ))),
    }
}

#[then("the wait made {reads:u32} reads")]
fn made_reads(wait_context: &WaitContext, reads: u32) -> Result<(), StepError> {
    let actual = wait_context.api.call_count();
    if u32::try_from(actual).is_ok_and(|count| count == reads) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {reads} reads, got {actual}"
        )))
    }
}

#[then("the wait fails with \"{text}\"")]
fn fails_with(wait_context: &WaitContext, text: String) -> Result<(), StepError> {
    match outcome(wait_context)? {
        WaitOutcome::Failure { message, .. } if message.contains(&text) => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected failure mentioning {text:?}, got {other:?}"
        ))),
    }
}

#[then("the wait times out")]
fn times_out(wait_context: &WaitContext) -> Result<(), StepError> {
    match outcome(wait_context)? {
        WaitOutcome::Failure {
            timed_out: true, ..
        } => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected timeout, got {other:?}"
        ))),
    }
}
