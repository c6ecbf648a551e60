//! cdr2udr - Synthesize call detail records and report subscriber usage
//!
//! This library provides functionality to:
//! - Generate a year of randomized call history for a subscriber pool
//! - Aggregate call durations into usage detail reports per month or year
//! - Write call detail record reports as CSV files
//! - Render reports in table and JSON formats
//!
//! # Examples
//!
//! ```
//! use cdr2udr::{
//!     aggregation::UsageAggregator,
//!     generator::{CallRecordGenerator, GeneratorConfig, StdRandom, seed_history},
//!     store::{InMemoryRecordStore, InMemorySubscriberDirectory},
//!     timezone::TimezoneConfig,
//!     types::Msisdn,
//! };
//! use chrono::Utc;
//! use std::sync::Arc;
//!
//! # fn main() -> cdr2udr::Result<()> {
//! let records = Arc::new(InMemoryRecordStore::new());
//! let subscribers = Arc::new(InMemorySubscriberDirectory::new());
//! let pool = vec![Msisdn::new("79001112233"), Msisdn::new("79101112233")];
//!
//! let mut generator = CallRecordGenerator::new(GeneratorConfig::default(), StdRandom::seeded(1));
//! seed_history(subscribers.as_ref(), records.as_ref(), &pool, &mut generator, Utc::now())?;
//!
//! let aggregator = UsageAggregator::new(records, subscribers, TimezoneConfig::utc());
//! let year = aggregator.summarize_all(None)?;
//! assert_eq!(year.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod cdr_report;
pub mod cli;
pub mod output;

pub use cdr2udr_core::{error, filters, store, timezone, types};
pub use cdr2udr_generator as generator;

// Re-export commonly used types
pub use error::{CdrError, Result};
pub use types::{CallRecord, CallType, Msisdn, ReportMonth, UsageSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
