//! CLI interface for cdr2udr
//!
//! Every invocation first seeds a fresh call history, then runs one report
//! against it.
//!
//! # Example
//!
//! ```bash
//! # Usage of one subscriber in March
//! cdr2udr udr 79001112233 --period M --month 3
//!
//! # Whole-year usage of every subscriber as JSON
//! cdr2udr --json udr-all
//!
//! # Calls placed by a subscriber in a time range, written to reports/
//! cdr2udr cdr 79001112233 --since 2024-01-01T00:00:00 --until 2024-02-01T00:00:00
//!
//! # Reproducible history dump
//! cdr2udr --seed 42 generate > history.csv
//! ```

use cdr2udr_core::error::{CdrError, Result};
use cdr2udr_core::timezone::TimezoneConfig;
use cdr2udr_core::types::{Msisdn, ReportMonth};
use cdr2udr_generator::{DEFAULT_SUBSCRIBERS, GeneratorConfig};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// Generate call detail records and report subscriber usage
#[derive(Parser, Debug, Clone)]
#[command(name = "cdr2udr")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Timezone for month boundaries and timestamps (e.g. "Europe/Moscow", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC for month boundaries and timestamps (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    #[command(flatten)]
    pub generator: GeneratorArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Bounds of the history generated at start-up
#[derive(Args, Debug, Clone)]
pub struct GeneratorArgs {
    /// Minimum number of generated calls (inclusive)
    #[arg(long, env = "CDR2UDR_MIN_RECORDS", default_value_t = 1000, global = true)]
    pub min_records: usize,

    /// Maximum number of generated calls (exclusive)
    #[arg(long, env = "CDR2UDR_MAX_RECORDS", default_value_t = 2000, global = true)]
    pub max_records: usize,

    /// Upper bound of a generated call's length in minutes (exclusive, at most one year)
    #[arg(long, env = "CDR2UDR_MAX_CALL_MINUTES", default_value_t = 120, global = true)]
    pub max_call_minutes: i64,

    /// Seed for a reproducible history
    #[arg(long, env = "CDR2UDR_SEED", global = true)]
    pub seed: Option<u64>,

    /// Comma-separated subscriber pool (defaults to the ten reference numbers)
    #[arg(
        long,
        env = "CDR2UDR_SUBSCRIBERS",
        value_delimiter = ',',
        global = true
    )]
    pub subscribers: Vec<String>,
}

impl GeneratorArgs {
    pub fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            min_records: self.min_records,
            max_records: self.max_records,
            max_call_minutes: self.max_call_minutes,
        }
    }

    /// The subscriber pool, trimmed, falling back to the reference numbers
    pub fn pool(&self) -> Vec<Msisdn> {
        let given: Vec<Msisdn> = self
            .subscribers
            .iter()
            .map(|number| number.trim())
            .filter(|number| !number.is_empty())
            .map(Msisdn::new)
            .collect();

        if given.is_empty() {
            DEFAULT_SUBSCRIBERS.iter().copied().map(Msisdn::new).collect()
        } else {
            given
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Usage detail report for one subscriber
    Udr {
        /// Subscriber number
        msisdn: String,

        /// Reporting period: M (one month) or Y (whole year)
        #[arg(long, value_parser = parse_period)]
        period: Option<Period>,

        /// Month number (1-12), required with --period M
        #[arg(long, value_parser = parse_report_month)]
        month: Option<ReportMonth>,
    },

    /// Usage detail reports for every subscriber
    UdrAll {
        /// Month number (1-12); the whole year when omitted
        #[arg(long, value_parser = parse_report_month)]
        month: Option<ReportMonth>,
    },

    /// Write the calls a subscriber placed in a time range to a CSV report
    Cdr {
        /// Subscriber number
        msisdn: String,

        /// Range start, exclusive (YYYY-MM-DDTHH:MM:SS, local time)
        #[arg(long)]
        since: String,

        /// Range end, exclusive (YYYY-MM-DDTHH:MM:SS, local time)
        #[arg(long)]
        until: String,

        /// Directory the report is written to
        #[arg(long, env = "CDR2UDR_REPORTS_DIR", default_value = "reports")]
        reports_dir: PathBuf,
    },

    /// Print the generated call history as CSV
    Generate,
}

/// Reporting period of a single-subscriber report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month,
    Year,
}

impl FromStr for Period {
    type Err = CdrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "M" | "m" => Ok(Period::Month),
            "Y" | "y" => Ok(Period::Year),
            other => Err(CdrError::InvalidArgument(format!(
                "Invalid period '{other}', expected M or Y"
            ))),
        }
    }
}

/// Parse a period flag (`M` or `Y`, any case)
pub fn parse_period(value: &str) -> Result<Period> {
    value.parse()
}

/// Parse a month flag into a validated month number
pub fn parse_report_month(value: &str) -> Result<ReportMonth> {
    value.parse()
}

/// Parse a `YYYY-MM-DDTHH:MM:SS` wall-clock time in the given zone
pub fn parse_local_datetime(value: &str, timezone: &TimezoneConfig) -> Result<DateTime<Utc>> {
    timezone.parse_local(value)
}

/// Resolve the month a single-subscriber report covers
///
/// A month without a period implies `M`; `Y` ignores any month given.
pub fn resolve_month(period: Option<Period>, month: Option<ReportMonth>) -> Result<Option<ReportMonth>> {
    match (period, month) {
        (Some(Period::Month), None) => Err(CdrError::InvalidArgument(
            "--period M requires --month".to_string(),
        )),
        (Some(Period::Year), _) => Ok(None),
        (_, month) => Ok(month),
    }
}
