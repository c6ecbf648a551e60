//! Filtering module for call records
//!
//! Two filters are applied to a subscriber's records before their durations
//! are summed or exported:
//!
//! - [`MonthFilter`] keeps records whose start falls in a calendar month of
//!   any year, or everything when no month is set
//! - [`TimeRangeFilter`] keeps records starting strictly between two instants
//!
//! # Examples
//!
//! ```
//! use cdr2udr_core::filters::MonthFilter;
//! use cdr2udr_core::timezone::TimezoneConfig;
//! use cdr2udr_core::types::ReportMonth;
//!
//! // Only calls started in March
//! let filter = MonthFilter::new(TimezoneConfig::utc())
//!     .with_month(ReportMonth::new(3).unwrap());
//! assert!(filter.month().is_some());
//! ```

use chrono::{DateTime, TimeDelta, Utc};

use crate::timezone::TimezoneConfig;
use crate::types::{CallRecord, ReportMonth};

/// Month filter for usage aggregation
#[derive(Debug, Clone)]
pub struct MonthFilter {
    month: Option<ReportMonth>,
    timezone: TimezoneConfig,
}

impl MonthFilter {
    /// Create a filter that accepts every record
    pub fn new(timezone: TimezoneConfig) -> Self {
        Self {
            month: None,
            timezone,
        }
    }

    /// Restrict to a calendar month
    pub fn with_month(mut self, month: ReportMonth) -> Self {
        self.month = Some(month);
        self
    }

    /// Set or clear the month restriction
    pub fn with_optional_month(mut self, month: Option<ReportMonth>) -> Self {
        self.month = month;
        self
    }

    /// The month restriction, if any
    pub fn month(&self) -> Option<ReportMonth> {
        self.month
    }

    /// Check if a record's start passes the filter
    pub fn matches(&self, record: &CallRecord) -> bool {
        match self.month {
            Some(month) => self.timezone.month_of(&record.start_time()) == month.get(),
            None => true,
        }
    }

    /// Sum the durations of the matching records
    pub fn total_duration<'a>(&self, records: impl IntoIterator<Item = &'a CallRecord>) -> TimeDelta {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .fold(TimeDelta::zero(), |acc, record| acc + record.duration())
    }
}

/// Open time range filter for record export
///
/// Both bounds are exclusive: a record starting exactly at `since` or
/// `until` is left out.
#[derive(Debug, Clone, Copy)]
pub struct TimeRangeFilter {
    /// Lower bound (exclusive)
    pub since: DateTime<Utc>,
    /// Upper bound (exclusive)
    pub until: DateTime<Utc>,
}

impl TimeRangeFilter {
    /// Create a new range filter
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self { since, until }
    }

    /// Check if a record starts inside the range
    pub fn matches(&self, record: &CallRecord) -> bool {
        let start = record.start_time();
        start > self.since && start < self.until
    }
}
