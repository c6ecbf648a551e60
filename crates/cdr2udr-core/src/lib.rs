//! Core types, traits, and stores for cdr2udr
//!
//! This crate provides the shared call-record schema, the error taxonomy,
//! the storage collaborators used by both the generator and the aggregator,
//! and the month/time-range filters applied during aggregation.

pub mod error;
pub mod filters;
pub mod store;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{CdrError, Result};
pub use store::{
    InMemoryRecordStore, InMemorySubscriberDirectory, RecordStore, SubscriberDirectory,
};
pub use types::{
    CallRecord, CallRole, CallType, Msisdn, ReportMonth, Subscriber, UsageSummary, format_hms,
};
