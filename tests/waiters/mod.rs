//! BDD coverage for the waiters.

mod bdd_steps;
mod scenarios;
mod test_helpers;
