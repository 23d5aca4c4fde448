//! BDD scenarios for the waiters.

use rstest_bdd_macros::scenario;

use super::test_helpers::{WaitContext, wait_context};

#[scenario(
    path = "tests/features/waiters.feature",
    name = "Storage becomes available after a transient failure"
)]
fn scenario_storage_available(wait_context: WaitContext) {
    let _ = wait_context;
}

#[scenario(
    path = "tests/features/waiters.feature",
    name = "Missing storage stops the wait"
)]
fn scenario_missing_storage(wait_context: WaitContext) {
    let _ = wait_context;
}

#[scenario(
    path = "tests/features/waiters.feature",
    name = "Hardware search that stays empty times out"
)]
fn scenario_hardware_search_times_out(wait_context: WaitContext) {
    let _ = wait_context;
}

#[scenario(
    path = "tests/features/waiters.feature",
    name = "Ordered hardware receives a provision date"
)]
fn scenario_hardware_provisioned(wait_context: WaitContext) {
    let _ = wait_context;
}

#[scenario(
    path = "tests/features/waiters.feature",
    name = "Deleted hardware stops answering"
)]
fn scenario_hardware_deleted(wait_context: WaitContext) {
    let _ = wait_context;
}

#[scenario(
    path = "tests/features/waiters.feature",
    name = "Deletion wait fails on server errors"
)]
fn scenario_delete_fails_on_server_error(wait_context: WaitContext) {
    let _ = wait_context;
}
