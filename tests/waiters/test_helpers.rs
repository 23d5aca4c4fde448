//! Shared fixtures for waiter BDD scenarios.

use std::time::Duration;

use provision_wait::WaitTuning;
use provision_wait::test_support::ScriptedClassicApi;
use rstest::fixture;

#[derive(Clone, Debug)]
pub enum WaitOutcome {
    Success,
    Failure { message: String, timed_out: bool },
}

#[derive(Clone, Debug)]
pub struct WaitContext {
    pub api: ScriptedClassicApi,
    pub tuning: WaitTuning,
    pub outcome: Option<WaitOutcome>,
}

#[fixture]
pub fn wait_context() -> WaitContext {
    WaitContext {
        api: ScriptedClassicApi::new(),
        tuning: WaitTuning::new(
            Duration::ZERO,
            Duration::from_secs(1),
            Duration::from_secs(60),
        ),
        outcome: None,
    }
}
