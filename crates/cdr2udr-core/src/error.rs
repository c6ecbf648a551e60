//! Error types for cdr2udr
//!
//! This module defines the error types used throughout the cdr2udr crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! The four domain failures of the engines are kept as distinct variants so
//! callers can tell them apart:
//!
//! - [`CdrError::InsufficientSubscribers`]: the generator cannot pick two
//!   distinct parties for a call
//! - [`CdrError::SubscriberNotFound`]: the store has no index entry for a
//!   subscriber in one of the call roles
//! - [`CdrError::NoDataForPeriod`]: the subscriber is known but was silent
//!   during the requested month
//! - [`CdrError::EmptyBatch`]: every subscriber of a batch report failed
//!
//! # Example
//!
//! ```
//! use cdr2udr_core::error::{CdrError, Result};
//! use cdr2udr_core::types::ReportMonth;
//!
//! fn example_function() -> Result<ReportMonth> {
//!     // Out-of-range months never reach the aggregator
//!     ReportMonth::new(13)
//! }
//!
//! assert!(matches!(example_function(), Err(CdrError::InvalidMonth(13))));
//! ```

use thiserror::Error;

use crate::types::{CallRole, Msisdn, ReportMonth};

/// Main error type for cdr2udr operations
#[derive(Error, Debug)]
pub enum CdrError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generation needs at least two subscribers so caller and receiver differ
    #[error("Subscriber pool has {found} member(s), at least 2 are required")]
    InsufficientSubscribers {
        /// Number of subscribers available
        found: usize,
    },

    /// No records are indexed for the subscriber in the given role
    #[error("No {role} calls found for subscriber {msisdn}")]
    SubscriberNotFound {
        /// Subscriber that was looked up
        msisdn: Msisdn,
        /// Role that had no index entry
        role: CallRole,
    },

    /// The subscriber has records, but none in the requested month
    #[error("No calls for subscriber {msisdn} in month {month}")]
    NoDataForPeriod {
        /// Subscriber that was summarized
        msisdn: Msisdn,
        /// Requested month
        month: ReportMonth,
    },

    /// Every subscriber of a batch report failed
    #[error("No usage records for {period}")]
    EmptyBatch {
        /// Human-readable period description
        period: String,
    },

    /// Subscriber is not registered in the directory
    #[error("Subscriber {0} does not exist")]
    UnknownSubscriber(Msisdn),

    /// No records fall inside the requested time range
    #[error("No call records found for subscriber {0} in this period")]
    NoRecordsInRange(Msisdn),

    /// Month number outside 1..=12
    #[error("Invalid month number {0}, must be between 1 and 12")]
    InvalidMonth(u32),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Invalid call record
    #[error("Invalid call record: {0}")]
    InvalidRecord(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Storage backend failure
    #[error("Store error: {0}")]
    Store(String),
}

/// Convenience type alias for Results in cdr2udr
///
/// # Example
///
/// ```
/// use cdr2udr_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, CdrError>;
