//! Aggregation module for usage detail reports
//!
//! This module turns a subscriber's call records into a [`UsageSummary`]:
//! the time spent placing calls and the time spent receiving them, either
//! over the whole stored history or for one calendar month.
//!
//! Both role lookups must find an index entry for the subscriber; an absent
//! entry is reported as [`CdrError::SubscriberNotFound`]. A month that sums
//! to zero on both sides is reported as [`CdrError::NoDataForPeriod`], while
//! a year summary is always returned, even when both totals are zero.
//!
//! # Examples
//!
//! ```
//! use cdr2udr::aggregation::UsageAggregator;
//! use cdr2udr::store::{InMemoryRecordStore, InMemorySubscriberDirectory, RecordStore};
//! use cdr2udr::timezone::TimezoneConfig;
//! use cdr2udr::types::{CallRecord, CallType, Msisdn, ReportMonth};
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use std::sync::Arc;
//!
//! # fn main() -> cdr2udr::Result<()> {
//! let records = Arc::new(InMemoryRecordStore::new());
//! let subscribers = Arc::new(InMemorySubscriberDirectory::with_numbers(["79001112233", "79101112233"])?);
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
//! for (caller, receiver) in [("79001112233", "79101112233"), ("79101112233", "79001112233")] {
//!     records.save(CallRecord::new(
//!         CallType::Outgoing,
//!         Msisdn::new(caller),
//!         Msisdn::new(receiver),
//!         start,
//!         start + TimeDelta::minutes(30),
//!     )?)?;
//! }
//!
//! let aggregator = UsageAggregator::new(records, subscribers, TimezoneConfig::utc());
//! let january = aggregator.summarize(&Msisdn::new("79001112233"), Some(ReportMonth::new(1)?))?;
//! assert_eq!(january.initiator_total, TimeDelta::minutes(30));
//!
//! let everyone = aggregator.summarize_all(None)?;
//! assert_eq!(everyone.len(), 2);
//! # Ok(())
//! # }
//! ```

use cdr2udr_core::error::{CdrError, Result};
use cdr2udr_core::filters::MonthFilter;
use cdr2udr_core::store::{RecordStore, SubscriberDirectory};
use cdr2udr_core::timezone::TimezoneConfig;
use cdr2udr_core::types::{CallRecord, CallRole, Msisdn, ReportMonth, UsageSummary};
use chrono::TimeDelta;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Grand totals across a set of summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Sum of initiator totals
    pub initiator_total: TimeDelta,
    /// Sum of receiver totals
    pub receiver_total: TimeDelta,
}

impl Default for Totals {
    fn default() -> Self {
        Self {
            initiator_total: TimeDelta::zero(),
            receiver_total: TimeDelta::zero(),
        }
    }
}

impl Totals {
    /// Sum the totals of every summary
    pub fn from_summaries(summaries: &[UsageSummary]) -> Self {
        summaries.iter().fold(Self::default(), |acc, summary| Self {
            initiator_total: acc.initiator_total + summary.initiator_total,
            receiver_total: acc.receiver_total + summary.receiver_total,
        })
    }
}

/// Human-readable name of a reporting period
pub fn describe_period(month: Option<ReportMonth>) -> String {
    match month {
        Some(month) => format!("month {month}"),
        None => "the whole year".to_string(),
    }
}

/// Usage detail report engine
pub struct UsageAggregator {
    records: Arc<dyn RecordStore>,
    subscribers: Arc<dyn SubscriberDirectory>,
    timezone_config: TimezoneConfig,
}

impl UsageAggregator {
    /// Create a new aggregator over the given collaborators
    pub fn new(
        records: Arc<dyn RecordStore>,
        subscribers: Arc<dyn SubscriberDirectory>,
        timezone_config: TimezoneConfig,
    ) -> Self {
        Self {
            records,
            subscribers,
            timezone_config,
        }
    }

    /// Get the timezone configuration
    pub fn timezone_config(&self) -> &TimezoneConfig {
        &self.timezone_config
    }

    /// Summarize one subscriber, optionally restricted to a month
    pub fn summarize(&self, msisdn: &Msisdn, month: Option<ReportMonth>) -> Result<UsageSummary> {
        let initiated = self.records_for(msisdn, CallRole::Initiator)?;
        let received = self.records_for(msisdn, CallRole::Receiver)?;

        let filter = MonthFilter::new(self.timezone_config.clone()).with_optional_month(month);
        let summary = UsageSummary::new(
            msisdn.clone(),
            filter.total_duration(&initiated),
            filter.total_duration(&received),
        );

        if let Some(month) = month {
            if summary.is_silent() {
                return Err(CdrError::NoDataForPeriod {
                    msisdn: msisdn.clone(),
                    month,
                });
            }
        }

        debug!(
            "Summarized {} for {}: {} initiated, {} received",
            msisdn,
            describe_period(month),
            initiated.len(),
            received.len()
        );

        Ok(summary)
    }

    /// Summarize every known subscriber, skipping those that fail
    ///
    /// Results follow the directory's registration order. Fails only when
    /// no subscriber produced a summary.
    pub fn summarize_all(&self, month: Option<ReportMonth>) -> Result<Vec<UsageSummary>> {
        let subscribers = self.subscribers.list_all()?;
        let mut summaries = Vec::with_capacity(subscribers.len());

        for msisdn in &subscribers {
            match self.summarize(msisdn, month) {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!("Skipping subscriber {}: {}", msisdn, e),
            }
        }

        if summaries.is_empty() {
            return Err(CdrError::EmptyBatch {
                period: describe_period(month),
            });
        }

        info!(
            "Summarized {} of {} subscribers for {}",
            summaries.len(),
            subscribers.len(),
            describe_period(month)
        );

        Ok(summaries)
    }

    fn records_for(&self, msisdn: &Msisdn, role: CallRole) -> Result<Vec<CallRecord>> {
        self.records
            .find_by_role(msisdn, role)?
            .ok_or_else(|| CdrError::SubscriberNotFound {
                msisdn: msisdn.clone(),
                role,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdr2udr_core::store::{InMemoryRecordStore, InMemorySubscriberDirectory};
    use cdr2udr_core::types::CallType;
    use chrono::{DateTime, TimeZone, Utc};

    const S1: &str = "79001112233";
    const S2: &str = "79101112233";
    const OTHER: &str = "79201112233";

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, 10, 0, 0).unwrap()
    }

    fn call(caller: &str, receiver: &str, start: DateTime<Utc>, seconds: i64) -> CallRecord {
        CallRecord::new(
            CallType::Outgoing,
            Msisdn::new(caller),
            Msisdn::new(receiver),
            start,
            start + TimeDelta::seconds(seconds),
        )
        .unwrap()
    }

    /// S1 calls for two hours in January and is called for one hour in February
    fn scenario(directory: &[&str]) -> UsageAggregator {
        let records = Arc::new(InMemoryRecordStore::new());
        records.save(call(S1, OTHER, at(1, 15), 7200)).unwrap();
        records.save(call(OTHER, S1, at(2, 3), 3600)).unwrap();

        let subscribers =
            Arc::new(InMemorySubscriberDirectory::with_numbers(directory.iter().copied()).unwrap());
        UsageAggregator::new(records, subscribers, TimezoneConfig::utc())
    }

    fn month(n: u32) -> Option<ReportMonth> {
        Some(ReportMonth::new(n).unwrap())
    }

    #[test]
    fn test_month_summary() {
        let aggregator = scenario(&[S1]);
        let s1 = Msisdn::new(S1);

        let january = aggregator.summarize(&s1, month(1)).unwrap();
        assert_eq!(january.initiator_total, TimeDelta::hours(2));
        assert_eq!(january.receiver_total, TimeDelta::zero());

        let february = aggregator.summarize(&s1, month(2)).unwrap();
        assert_eq!(february.initiator_total, TimeDelta::zero());
        assert_eq!(february.receiver_total, TimeDelta::hours(1));
    }

    #[test]
    fn test_silent_month_is_no_data() {
        let aggregator = scenario(&[S1]);

        let result = aggregator.summarize(&Msisdn::new(S1), month(3));
        assert!(matches!(
            result,
            Err(CdrError::NoDataForPeriod { month, .. }) if month.get() == 3
        ));
    }

    #[test]
    fn test_year_summary_never_no_data() {
        let aggregator = scenario(&[S1]);

        let year = aggregator.summarize(&Msisdn::new(S1), None).unwrap();
        assert_eq!(year.initiator_total, TimeDelta::hours(2));
        assert_eq!(year.receiver_total, TimeDelta::hours(1));
    }

    #[test]
    fn test_missing_role_is_not_found() {
        let aggregator = scenario(&[S1, S2]);

        let unknown = aggregator.summarize(&Msisdn::new(S2), None);
        assert!(matches!(
            unknown,
            Err(CdrError::SubscriberNotFound {
                role: CallRole::Initiator,
                ..
            })
        ));

        // Only ever called, never called anyone back
        let records = Arc::new(InMemoryRecordStore::new());
        records.save(call(S1, S2, at(1, 1), 60)).unwrap();
        let aggregator = UsageAggregator::new(
            records,
            Arc::new(InMemorySubscriberDirectory::new()),
            TimezoneConfig::utc(),
        );
        assert!(matches!(
            aggregator.summarize(&Msisdn::new(S2), None),
            Err(CdrError::SubscriberNotFound {
                role: CallRole::Initiator,
                ..
            })
        ));
        assert!(matches!(
            aggregator.summarize(&Msisdn::new(S1), None),
            Err(CdrError::SubscriberNotFound {
                role: CallRole::Receiver,
                ..
            })
        ));
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let aggregator = scenario(&[S1]);
        let s1 = Msisdn::new(S1);

        assert_eq!(
            aggregator.summarize(&s1, month(1)).unwrap(),
            aggregator.summarize(&s1, month(1)).unwrap()
        );
    }

    #[test]
    fn test_summarize_all_skips_failures() {
        let aggregator = scenario(&[S1, S2]);

        let summaries = aggregator.summarize_all(month(1)).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].subscriber_id.as_str(), S1);
    }

    #[test]
    fn test_summarize_all_empty_batch() {
        let aggregator = scenario(&[S1, S2]);

        let result = aggregator.summarize_all(month(7));
        assert!(matches!(result, Err(CdrError::EmptyBatch { ref period }) if period == "month 7"));
    }

    #[test]
    fn test_totals() {
        let summaries = vec![
            UsageSummary::new(Msisdn::new(S1), TimeDelta::hours(1), TimeDelta::minutes(5)),
            UsageSummary::new(Msisdn::new(S2), TimeDelta::minutes(30), TimeDelta::zero()),
        ];
        let totals = Totals::from_summaries(&summaries);

        assert_eq!(totals.initiator_total, TimeDelta::minutes(90));
        assert_eq!(totals.receiver_total, TimeDelta::minutes(5));
        assert_eq!(Totals::from_summaries(&[]), Totals::default());
    }
}
