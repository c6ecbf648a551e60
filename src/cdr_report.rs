//! Call detail record reports
//!
//! Collects the calls a subscriber placed inside a time range and writes
//! them as a CSV file under the reports directory. Each report gets a fresh
//! id, and the file is named `<msisdn>_<id>.csv`.

use cdr2udr_core::error::{CdrError, Result};
use cdr2udr_core::filters::TimeRangeFilter;
use cdr2udr_core::store::{RecordStore, SubscriberDirectory};
use cdr2udr_core::timezone::TimezoneConfig;
use cdr2udr_core::types::{CallRecord, CallRole, Msisdn};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::output::call_records_to_csv;

/// A report written to disk
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CdrReport {
    pub report_id: Uuid,
    pub path: PathBuf,
    pub record_count: usize,
}

/// Writer of per-subscriber CDR reports
pub struct CdrReporter {
    records: Arc<dyn RecordStore>,
    subscribers: Arc<dyn SubscriberDirectory>,
    reports_dir: PathBuf,
    timezone_config: TimezoneConfig,
}

impl CdrReporter {
    pub fn new(
        records: Arc<dyn RecordStore>,
        subscribers: Arc<dyn SubscriberDirectory>,
        reports_dir: impl Into<PathBuf>,
        timezone_config: TimezoneConfig,
    ) -> Self {
        Self {
            records,
            subscribers,
            reports_dir: reports_dir.into(),
            timezone_config,
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Calls placed by `msisdn` that started strictly between `since` and `until`
    pub fn collect(
        &self,
        msisdn: &Msisdn,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CallRecord>> {
        if since >= until {
            return Err(CdrError::InvalidArgument(format!(
                "report range start {} is not before its end {}",
                self.timezone_config.format_local(&since),
                self.timezone_config.format_local(&until)
            )));
        }

        if !self.subscribers.contains(msisdn)? {
            return Err(CdrError::UnknownSubscriber(msisdn.clone()));
        }

        let placed = self.records.find_by_initiator(msisdn)?.ok_or_else(|| {
            CdrError::SubscriberNotFound {
                msisdn: msisdn.clone(),
                role: CallRole::Initiator,
            }
        })?;

        let range = TimeRangeFilter::new(since, until);
        let selected: Vec<CallRecord> = placed
            .into_iter()
            .filter(|record| range.matches(record))
            .collect();

        if selected.is_empty() {
            return Err(CdrError::NoRecordsInRange(msisdn.clone()));
        }

        debug!("Collected {} calls for {}", selected.len(), msisdn);
        Ok(selected)
    }

    /// Collect and write a report, creating the reports directory if needed
    pub async fn write_report(
        &self,
        msisdn: &Msisdn,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<CdrReport> {
        let records = self.collect(msisdn, since, until)?;
        let contents = call_records_to_csv(&records, &self.timezone_config)?;

        let report_id = Uuid::new_v4();
        let path = self.reports_dir.join(format!("{msisdn}_{report_id}.csv"));

        tokio::fs::create_dir_all(&self.reports_dir).await?;
        tokio::fs::write(&path, contents).await?;

        info!(
            "Wrote {} calls for {} to {}",
            records.len(),
            msisdn,
            path.display()
        );

        Ok(CdrReport {
            report_id,
            path,
            record_count: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdr2udr_core::store::{InMemoryRecordStore, InMemorySubscriberDirectory};
    use cdr2udr_core::types::CallType;
    use chrono::{TimeDelta, TimeZone};
    use tempfile::TempDir;

    const CALLER: &str = "79001112233";
    const RECEIVER: &str = "79101112233";

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn reporter(dir: &Path) -> CdrReporter {
        let records = Arc::new(InMemoryRecordStore::new());
        for day in [1, 5, 10] {
            records
                .save(
                    CallRecord::new(
                        CallType::Outgoing,
                        Msisdn::new(CALLER),
                        Msisdn::new(RECEIVER),
                        at(day, 12),
                        at(day, 12) + TimeDelta::minutes(3),
                    )
                    .unwrap(),
                )
                .unwrap();
        }
        let subscribers =
            Arc::new(InMemorySubscriberDirectory::with_numbers([CALLER, RECEIVER]).unwrap());
        CdrReporter::new(records, subscribers, dir, TimezoneConfig::utc())
    }

    #[test]
    fn test_collect_is_exclusive() {
        let dir = TempDir::new().unwrap();
        let reporter = reporter(dir.path());
        let caller = Msisdn::new(CALLER);

        let inside = reporter.collect(&caller, at(1, 12), at(10, 12)).unwrap();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].start_time(), at(5, 12));

        let all = reporter.collect(&caller, at(1, 0), at(11, 0)).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_collect_errors() {
        let dir = TempDir::new().unwrap();
        let reporter = reporter(dir.path());

        assert!(matches!(
            reporter.collect(&Msisdn::new("79991234567"), at(1, 0), at(2, 0)),
            Err(CdrError::UnknownSubscriber(_))
        ));
        assert!(matches!(
            reporter.collect(&Msisdn::new(RECEIVER), at(1, 0), at(20, 0)),
            Err(CdrError::SubscriberNotFound {
                role: CallRole::Initiator,
                ..
            })
        ));
        assert!(matches!(
            reporter.collect(&Msisdn::new(CALLER), at(11, 0), at(20, 0)),
            Err(CdrError::NoRecordsInRange(_))
        ));
        assert!(matches!(
            reporter.collect(&Msisdn::new(CALLER), at(20, 0), at(1, 0)),
            Err(CdrError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_write_report_creates_file() {
        let dir = TempDir::new().unwrap();
        let reports_dir = dir.path().join("nested").join("reports");
        let reporter = reporter(&reports_dir);

        let report = reporter
            .write_report(&Msisdn::new(CALLER), at(1, 0), at(6, 0))
            .await
            .unwrap();

        assert_eq!(report.record_count, 2);
        assert_eq!(
            report.path.file_name().unwrap().to_string_lossy(),
            format!("{CALLER}_{}.csv", report.report_id)
        );

        let contents = tokio::fs::read_to_string(&report.path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "callType,caller,receiver,startTime,endTime");
        assert_eq!(
            lines[1],
            "01,79001112233,79101112233,2024-03-01T12:00:00,2024-03-01T12:03:00"
        );
        assert_eq!(lines.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_report_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let reports_dir = dir.path().join("reports");
        let reporter = reporter(&reports_dir);

        let result = reporter
            .write_report(&Msisdn::new(CALLER), at(20, 0), at(21, 0))
            .await;

        assert!(result.is_err());
        assert!(!reports_dir.exists());
    }
}
