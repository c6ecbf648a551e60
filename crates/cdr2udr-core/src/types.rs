//! Core domain types for cdr2udr
//!
//! This module contains the call-record schema shared by the generator and
//! the aggregator, the derived usage summary, and the strongly-typed
//! identifiers and month numbers that flow between them.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CdrError, Result};

/// Strongly-typed subscriber number
///
/// # Examples
/// ```
/// use cdr2udr_core::types::Msisdn;
///
/// let msisdn = Msisdn::new("79001112233");
/// assert_eq!(msisdn.as_str(), "79001112233");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Msisdn(String);

impl Msisdn {
    /// Create a new Msisdn from any string-like type
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Msisdn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Msisdn {
    fn from(number: &str) -> Self {
        Self::new(number)
    }
}

/// Registered subscriber: a numeric key plus the subscriber number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    /// Key assigned by the directory at registration
    pub id: u64,
    /// Subscriber number
    pub msisdn: Msisdn,
}

/// Two-state call classifier carried by every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CallType {
    /// Outgoing call, tagged `01`
    #[serde(rename = "01")]
    Outgoing,
    /// Incoming call, tagged `02`
    #[serde(rename = "02")]
    Incoming,
}

impl CallType {
    /// Wire tag of the call type
    pub fn code(&self) -> &'static str {
        match self {
            CallType::Outgoing => "01",
            CallType::Incoming => "02",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Side of a call a subscriber is looked up by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallRole {
    /// The subscriber placed the call
    Initiator,
    /// The subscriber received the call
    Receiver,
}

impl fmt::Display for CallRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallRole::Initiator => write!(f, "initiator"),
            CallRole::Receiver => write!(f, "receiver"),
        }
    }
}

/// One synthesized call event
///
/// Records are validated on construction and expose read-only accessors,
/// so a stored record always satisfies `caller != receiver` and
/// `start_time < end_time`.
///
/// # Examples
/// ```
/// use cdr2udr_core::types::{CallRecord, CallType, Msisdn};
/// use chrono::{TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
/// let record = CallRecord::new(
///     CallType::Outgoing,
///     Msisdn::new("79001112233"),
///     Msisdn::new("79101112233"),
///     start,
///     start + chrono::TimeDelta::minutes(5),
/// )
/// .unwrap();
///
/// assert_eq!(record.duration().num_seconds(), 300);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    call_type: CallType,
    caller: Msisdn,
    receiver: Msisdn,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl CallRecord {
    /// Create a record, rejecting self-calls and empty or inverted intervals
    pub fn new(
        call_type: CallType,
        caller: Msisdn,
        receiver: Msisdn,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self> {
        if caller == receiver {
            return Err(CdrError::InvalidRecord(format!(
                "caller and receiver are both {caller}"
            )));
        }
        if start_time >= end_time {
            return Err(CdrError::InvalidRecord(format!(
                "start {start_time} is not before end {end_time}"
            )));
        }

        Ok(Self {
            call_type,
            caller,
            receiver,
            start_time,
            end_time,
        })
    }

    pub fn call_type(&self) -> CallType {
        self.call_type
    }

    pub fn caller(&self) -> &Msisdn {
        &self.caller
    }

    pub fn receiver(&self) -> &Msisdn {
        &self.receiver
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Time between start and end
    pub fn duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }

    /// The party the record is indexed under for `role`
    pub fn party(&self, role: CallRole) -> &Msisdn {
        match role {
            CallRole::Initiator => &self.caller,
            CallRole::Receiver => &self.receiver,
        }
    }
}

/// Calendar month number, always within `1..=12`
///
/// # Examples
/// ```
/// use cdr2udr_core::types::ReportMonth;
///
/// assert_eq!(ReportMonth::new(2).unwrap().get(), 2);
/// assert!(ReportMonth::new(0).is_err());
/// assert!("13".parse::<ReportMonth>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReportMonth(u32);

impl ReportMonth {
    /// Validate a month number
    pub fn new(month: u32) -> Result<Self> {
        if (1..=12).contains(&month) {
            Ok(Self(month))
        } else {
            Err(CdrError::InvalidMonth(month))
        }
    }

    /// Get the month number
    pub fn get(&self) -> u32 {
        self.0
    }

    /// All twelve months in calendar order
    pub fn all() -> impl Iterator<Item = ReportMonth> {
        (1..=12).map(ReportMonth)
    }
}

impl TryFrom<u32> for ReportMonth {
    type Error = CdrError;

    fn try_from(month: u32) -> Result<Self> {
        Self::new(month)
    }
}

impl FromStr for ReportMonth {
    type Err = CdrError;

    fn from_str(s: &str) -> Result<Self> {
        let month = s
            .trim()
            .parse::<u32>()
            .map_err(|_| CdrError::InvalidArgument(format!("Invalid month number '{s}'")))?;
        Self::new(month)
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Usage detail report for one subscriber
///
/// Derived from the subscriber's call records on every request and never
/// stored. Serializes to `subscriberId`, `initiatorTotal` and
/// `receiverTotal`, with both totals rendered as `HH:MM:SS`.
///
/// # Examples
/// ```
/// use cdr2udr_core::types::{Msisdn, UsageSummary};
/// use chrono::TimeDelta;
///
/// let summary = UsageSummary::new(
///     Msisdn::new("79001112233"),
///     TimeDelta::hours(2),
///     TimeDelta::zero(),
/// );
/// let json = serde_json::to_value(&summary).unwrap();
/// assert_eq!(json["initiatorTotal"], "02:00:00");
/// assert_eq!(json["receiverTotal"], "00:00:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    /// Subscriber the summary belongs to
    pub subscriber_id: Msisdn,
    /// Total time spent placing calls
    #[serde(serialize_with = "serialize_hms")]
    pub initiator_total: TimeDelta,
    /// Total time spent receiving calls
    #[serde(serialize_with = "serialize_hms")]
    pub receiver_total: TimeDelta,
}

impl UsageSummary {
    /// Create a new summary
    pub fn new(subscriber_id: Msisdn, initiator_total: TimeDelta, receiver_total: TimeDelta) -> Self {
        Self {
            subscriber_id,
            initiator_total,
            receiver_total,
        }
    }

    /// Whether both totals are zero
    pub fn is_silent(&self) -> bool {
        self.initiator_total.is_zero() && self.receiver_total.is_zero()
    }
}

/// Render a duration as `HH:MM:SS` from total elapsed seconds
///
/// Hours are not wrapped at 24, and negative durations render as zero.
///
/// # Examples
/// ```
/// use cdr2udr_core::types::format_hms;
/// use chrono::TimeDelta;
///
/// assert_eq!(format_hms(TimeDelta::seconds(3661)), "01:01:01");
/// assert_eq!(format_hms(TimeDelta::hours(90)), "90:00:00");
/// ```
pub fn format_hms(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn serialize_hms<S>(duration: &TimeDelta, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_hms(*duration))
}
