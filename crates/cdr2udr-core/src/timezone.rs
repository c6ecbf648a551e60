//! Timezone handling for call timestamps
//!
//! Records are stored in UTC. The calendar month a call belongs to, and the
//! wall-clock form written to reports, depend on the zone configured here.

use chrono::{DateTime, Datelike, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

use crate::error::{CdrError, Result};

/// Wall-clock format used for report timestamps and range arguments
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Configuration for timezone handling
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// The timezone used for month bucketing and rendering
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        let tz = get_local_timezone();
        Self {
            is_utc: tz == Tz::UTC,
            tz,
        }
    }
}

impl TimezoneConfig {
    /// UTC configuration, mostly useful for tests
    pub fn utc() -> Self {
        Self {
            tz: Tz::UTC,
            is_utc: true,
        }
    }

    /// Create a configuration from CLI arguments
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> Result<Self> {
        if use_utc {
            return Ok(Self::utc());
        }

        match timezone_str {
            Some(tz_str) => {
                let tz = Tz::from_str(tz_str).map_err(|_| {
                    CdrError::InvalidTimezone(format!(
                        "'{tz_str}'. Use format like 'Europe/Moscow', 'Asia/Tokyo', or 'UTC'"
                    ))
                })?;
                Ok(Self {
                    tz,
                    is_utc: tz == Tz::UTC,
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Calendar month (1-12) of an instant in the configured zone
    pub fn month_of(&self, instant: &DateTime<Utc>) -> u32 {
        instant.with_timezone(&self.tz).month()
    }

    /// Render an instant as local wall-clock time
    pub fn format_local(&self, instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format(LOCAL_DATETIME_FORMAT)
            .to_string()
    }

    /// Parse a `YYYY-MM-DDTHH:MM:SS` wall-clock time in the configured zone
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant; times
    /// skipped by a DST jump are rejected.
    pub fn parse_local(&self, value: &str) -> Result<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(value, LOCAL_DATETIME_FORMAT).map_err(|_| {
            CdrError::InvalidDate(format!(
                "Invalid date-time '{value}', expected YYYY-MM-DDTHH:MM:SS"
            ))
        })?;

        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => Err(CdrError::InvalidDate(format!(
                "'{value}' does not exist in timezone {}",
                self.display_name()
            ))),
        }
    }
}

/// Detect the system's local timezone, falling back to UTC
pub fn get_local_timezone() -> Tz {
    #[allow(clippy::collapsible_if)]
    if let Ok(tz_str) = std::env::var("TZ") {
        if let Ok(tz) = Tz::from_str(&tz_str) {
            debug!("Using timezone from TZ environment variable: {}", tz_str);
            return tz;
        }
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => match Tz::from_str(&tz_str) {
            Ok(tz) => {
                debug!("Using system timezone: {}", tz_str);
                tz
            }
            Err(_) => {
                debug!("Unrecognized system timezone '{}', using UTC", tz_str);
                Tz::UTC
            }
        },
        Err(e) => {
            debug!("Could not detect system timezone ({}), using UTC", e);
            Tz::UTC
        }
    }
}
