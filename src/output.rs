//! Output formatting module for cdr2udr
//!
//! This module renders engine results for the outside world:
//! - Table format for human-readable usage summaries
//! - JSON format for machine-readable usage summaries
//! - CSV rows for call detail records
//!
//! # Examples
//!
//! ```
//! use cdr2udr::aggregation::Totals;
//! use cdr2udr::output::get_formatter;
//! use cdr2udr::types::{Msisdn, UsageSummary};
//! use chrono::TimeDelta;
//!
//! let summaries = vec![UsageSummary::new(
//!     Msisdn::new("79001112233"),
//!     TimeDelta::hours(2),
//!     TimeDelta::minutes(45),
//! )];
//! let totals = Totals::from_summaries(&summaries);
//!
//! let table = get_formatter(false).format_summaries(&summaries, &totals).unwrap();
//! assert!(table.contains("02:00:00"));
//!
//! let json = get_formatter(true).format_summaries(&summaries, &totals).unwrap();
//! assert!(json.contains("\"receiverTotal\": \"00:45:00\""));
//! ```

use cdr2udr_core::error::Result;
use cdr2udr_core::timezone::TimezoneConfig;
use cdr2udr_core::types::{CallRecord, UsageSummary, format_hms};
use prettytable::{Table, format, row};
use std::io::Write;

use crate::aggregation::Totals;

/// Column names of a call detail record export
pub const CDR_HEADER: [&str; 5] = ["callType", "caller", "receiver", "startTime", "endTime"];

/// Trait for usage summary formatters
pub trait OutputFormatter {
    /// Format a single subscriber's summary
    fn format_summary(&self, summary: &UsageSummary) -> Result<String>;

    /// Format a batch of summaries with grand totals
    fn format_summaries(&self, summaries: &[UsageSummary], totals: &Totals) -> Result<String>;
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Subscriber",
            b -> "Initiated",
            b -> "Received"
        ]);
        table
    }
}

impl OutputFormatter for TableFormatter {
    fn format_summary(&self, summary: &UsageSummary) -> Result<String> {
        let mut table = Self::new_table();
        table.add_row(row![
            summary.subscriber_id,
            r -> format_hms(summary.initiator_total),
            r -> format_hms(summary.receiver_total)
        ]);
        Ok(table.to_string())
    }

    fn format_summaries(&self, summaries: &[UsageSummary], totals: &Totals) -> Result<String> {
        let mut table = Self::new_table();

        for summary in summaries {
            table.add_row(row![
                summary.subscriber_id,
                r -> format_hms(summary.initiator_total),
                r -> format_hms(summary.receiver_total)
            ]);
        }

        table.add_row(row![
            b -> "TOTAL",
            br -> format_hms(totals.initiator_total),
            br -> format_hms(totals.receiver_total)
        ]);

        Ok(table.to_string())
    }
}

/// JSON formatter for machine-readable output
///
/// A single summary renders as an object, a batch as an array of objects in
/// report order. Totals are left out of the JSON form.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_summary(&self, summary: &UsageSummary) -> Result<String> {
        Ok(serde_json::to_string_pretty(summary)?)
    }

    fn format_summaries(&self, summaries: &[UsageSummary], _totals: &Totals) -> Result<String> {
        Ok(serde_json::to_string_pretty(summaries)?)
    }
}

/// Get the formatter matching the JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}

/// Write call records as CSV, header row first
///
/// Timestamps are written as local wall-clock time in the configured zone.
pub fn write_call_records<W: Write>(
    writer: W,
    records: &[CallRecord],
    timezone: &TimezoneConfig,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CDR_HEADER)?;

    for record in records {
        csv_writer.write_record([
            record.call_type().code().to_string(),
            record.caller().to_string(),
            record.receiver().to_string(),
            timezone.format_local(&record.start_time()),
            timezone.format_local(&record.end_time()),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render call records as an in-memory CSV document
pub fn call_records_to_csv(records: &[CallRecord], timezone: &TimezoneConfig) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_call_records(&mut buffer, records, timezone)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdr2udr_core::types::{CallType, Msisdn};
    use chrono::{TimeDelta, TimeZone, Utc};

    fn summaries() -> Vec<UsageSummary> {
        vec![
            UsageSummary::new(
                Msisdn::new("79001112233"),
                TimeDelta::seconds(3661),
                TimeDelta::zero(),
            ),
            UsageSummary::new(
                Msisdn::new("79101112233"),
                TimeDelta::hours(90),
                TimeDelta::minutes(1),
            ),
        ]
    }

    #[test]
    fn test_table_formatter_summaries() {
        let data = summaries();
        let output = TableFormatter
            .format_summaries(&data, &Totals::from_summaries(&data))
            .unwrap();

        assert!(output.contains("Subscriber"));
        assert!(output.contains("79001112233"));
        assert!(output.contains("01:01:01"));
        assert!(output.contains("90:00:00"));
        assert!(output.contains("TOTAL"));
        assert!(output.contains("91:01:01"));
    }

    #[test]
    fn test_table_formatter_single() {
        let output = TableFormatter.format_summary(&summaries()[0]).unwrap();
        assert!(output.contains("79001112233"));
        assert!(output.contains("00:00:00"));
        assert!(!output.contains("TOTAL"));
    }

    #[test]
    fn test_json_formatter() {
        let data = summaries();

        let single: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_summary(&data[0]).unwrap()).unwrap();
        assert_eq!(single["subscriberId"], "79001112233");
        assert_eq!(single["initiatorTotal"], "01:01:01");
        assert_eq!(single["receiverTotal"], "00:00:00");

        let batch: serde_json::Value = serde_json::from_str(
            &JsonFormatter
                .format_summaries(&data, &Totals::from_summaries(&data))
                .unwrap(),
        )
        .unwrap();
        let batch = batch.as_array().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1]["subscriberId"], "79101112233");
        assert_eq!(batch[1]["initiatorTotal"], "90:00:00");
    }

    #[test]
    fn test_csv_header_and_rows() {
        let start = Utc.with_ymd_and_hms(2024, 2, 29, 23, 15, 0).unwrap();
        let records = vec![
            CallRecord::new(
                CallType::Outgoing,
                Msisdn::new("79001112233"),
                Msisdn::new("79101112233"),
                start,
                start + TimeDelta::minutes(50),
            )
            .unwrap(),
        ];

        let csv = String::from_utf8(call_records_to_csv(&records, &TimezoneConfig::utc()).unwrap())
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "callType,caller,receiver,startTime,endTime");
        assert_eq!(
            lines[1],
            "01,79001112233,79101112233,2024-02-29T23:15:00,2024-03-01T00:05:00"
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_csv_empty_has_header() {
        let csv = call_records_to_csv(&[], &TimezoneConfig::utc()).unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "callType,caller,receiver,startTime,endTime\n"
        );
    }
}
