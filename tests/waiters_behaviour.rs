//! Behavioural scenarios for the classic infrastructure waiters.

mod waiters;
