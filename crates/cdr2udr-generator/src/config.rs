//! Generator bounds

use cdr2udr_core::error::{CdrError, Result};

/// Longest call the generator accepts: one leap year, in minutes
pub const MAX_CALL_MINUTES_LIMIT: i64 = 60 * 24 * 366;

/// Tunable bounds of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Lower bound of the record count (inclusive)
    pub min_records: usize,
    /// Upper bound of the record count (exclusive)
    pub max_records: usize,
    /// Upper bound of a call's length in minutes (exclusive); a bound of 1
    /// makes every call last one minute
    pub max_call_minutes: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_records: 1000,
            max_records: 2000,
            max_call_minutes: 120,
        }
    }
}

impl GeneratorConfig {
    /// Check the bounds describe a non-empty draw
    pub fn validate(&self) -> Result<()> {
        if self.min_records == 0 {
            return Err(CdrError::Config("min_records must be at least 1".into()));
        }
        if self.min_records >= self.max_records {
            return Err(CdrError::Config(format!(
                "min_records ({}) must be below max_records ({})",
                self.min_records, self.max_records
            )));
        }
        if !(1..=MAX_CALL_MINUTES_LIMIT).contains(&self.max_call_minutes) {
            return Err(CdrError::Config(format!(
                "max_call_minutes must be between 1 and {}, got {}",
                MAX_CALL_MINUTES_LIMIT, self.max_call_minutes
            )));
        }
        Ok(())
    }
}
