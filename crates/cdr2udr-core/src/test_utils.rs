//! Shared test utilities for unit tests
//!
//! Integration tests (in tests/) cannot reach this module because it is
//! compiled only under #[cfg(test)]; they have their own builders in
//! tests/common/mod.rs.

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::{CallRecord, CallType, Msisdn};

pub const CALLER: &str = "79001112233";
pub const RECEIVER: &str = "79101112233";

/// Record from [`CALLER`] to [`RECEIVER`] lasting `seconds`
pub fn record_at(start: DateTime<Utc>, seconds: i64) -> CallRecord {
    call(CALLER, RECEIVER, start, seconds)
}

/// Record between two arbitrary parties lasting `seconds`
pub fn call(caller: &str, receiver: &str, start: DateTime<Utc>, seconds: i64) -> CallRecord {
    CallRecord::new(
        CallType::Outgoing,
        Msisdn::new(caller),
        Msisdn::new(receiver),
        start,
        start + TimeDelta::seconds(seconds),
    )
    .unwrap()
}
