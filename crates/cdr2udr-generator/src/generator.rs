//! Call record generator
//!
//! Produces a randomized call history for a fixed subscriber pool over the
//! year ending at the generation instant.
//!
//! # Placement
//!
//! Calls are placed one after another. A cursor starts at the beginning of
//! the window and moves to the end of each placed call. The next start is
//! drawn between the cursor and an upper bound obtained by splitting the
//! time left before `now` evenly between the calls still to place:
//!
//! ```text
//! max_start = cursor + (now - cursor) / remaining
//! ```
//!
//! The bound shrinks as the cursor advances, so starts come out in order
//! without sorting and the last call may start anywhere up to `now`.
//!
//! # Examples
//!
//! ```
//! use cdr2udr_core::store::{InMemoryRecordStore, RecordStore};
//! use cdr2udr_core::types::Msisdn;
//! use cdr2udr_generator::{CallRecordGenerator, GeneratorConfig, StdRandom};
//! use chrono::Utc;
//!
//! let pool = vec![Msisdn::new("79001112233"), Msisdn::new("79101112233")];
//! let store = InMemoryRecordStore::new();
//! let mut generator = CallRecordGenerator::new(GeneratorConfig::default(), StdRandom::seeded(42));
//!
//! let written = generator.generate(&pool, &store, Utc::now()).unwrap();
//! assert!((1000..2000).contains(&written));
//! assert_eq!(store.all().unwrap().len(), written);
//! ```

use cdr2udr_core::error::{CdrError, Result};
use cdr2udr_core::store::{RecordStore, SubscriberDirectory};
use cdr2udr_core::types::{CallRecord, CallType, Msisdn};
use chrono::{DateTime, Months, SubsecRound, TimeDelta, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::random::RandomSource;

/// Start of the generation window: one calendar year before `now`
pub fn window_start(now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    now.checked_sub_months(Months::new(12))
        .ok_or_else(|| CdrError::InvalidDate(format!("cannot go back one year from {now}")))
}

/// Latest start allowed for the next call when `remaining` calls are left
///
/// Splits the whole seconds between `cursor` and `now` evenly. With a single
/// call left the bound is `now` itself.
pub fn max_start_time(cursor: DateTime<Utc>, now: DateTime<Utc>, remaining: usize) -> DateTime<Utc> {
    let total_seconds = (now - cursor).num_seconds().max(0);
    let per_call = total_seconds / remaining.max(1) as i64;
    cursor + TimeDelta::seconds(per_call)
}

/// Generator of synthetic call history
pub struct CallRecordGenerator<R: RandomSource> {
    config: GeneratorConfig,
    random: R,
    show_progress: bool,
}

impl<R: RandomSource> CallRecordGenerator<R> {
    /// Create a new generator
    pub fn new(config: GeneratorConfig, random: R) -> Self {
        Self {
            config,
            random,
            show_progress: false,
        }
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Get the generator bounds
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a batch of records ending at `now` and save each to `store`
    ///
    /// Returns the number of records written. Fails before writing anything
    /// when the pool has fewer than two distinct subscribers or the config
    /// is invalid.
    ///
    /// If a call ends at `now` before every drawn record is placed, the
    /// window is exhausted: generation stops early with a warning and the
    /// count returned is below the drawn record count.
    pub fn generate(
        &mut self,
        pool: &[Msisdn],
        store: &dyn RecordStore,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let distinct: HashSet<&Msisdn> = pool.iter().collect();
        if distinct.len() < 2 {
            return Err(CdrError::InsufficientSubscribers {
                found: distinct.len(),
            });
        }
        self.config.validate()?;

        let now = now.trunc_subsecs(0);
        let window_start = window_start(now)?;
        let record_count = self.random.range(
            self.config.min_records as i64,
            self.config.max_records as i64,
        ) as usize;

        info!(
            "Generating {} call records between {} and {}",
            record_count, window_start, now
        );

        let progress = if self.show_progress {
            let pb = ProgressBar::new(record_count as u64);
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} {msg} [{bar:40}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb.set_message("Generating call records");
            Some(pb)
        } else {
            None
        };

        let mut cursor = window_start;
        let mut written = 0;

        for index in 0..record_count {
            if cursor >= now {
                warn!(
                    "Generation window exhausted after {} of {} records",
                    written, record_count
                );
                break;
            }

            let remaining = record_count - index;
            let record = self.next_record(pool, cursor, now, remaining)?;
            cursor = record.end_time();

            store.save(record)?;
            written += 1;

            if let Some(ref pb) = progress {
                pb.set_position(written as u64);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!("Generated {written} call records"));
        }
        info!("Generated {} call records", written);

        Ok(written)
    }

    fn next_record(
        &mut self,
        pool: &[Msisdn],
        cursor: DateTime<Utc>,
        now: DateTime<Utc>,
        remaining: usize,
    ) -> Result<CallRecord> {
        let max_start = max_start_time(cursor, now, remaining);
        let slack = (max_start - cursor).num_seconds();
        let start_time = cursor + TimeDelta::seconds(self.random.range(0, slack));

        let minutes = self.random.range(1, self.config.max_call_minutes);
        let duration = TimeDelta::try_minutes(minutes)
            .ok_or_else(|| CdrError::Config(format!("call length of {minutes} minutes is out of range")))?;
        let end_time = start_time
            .checked_add_signed(duration)
            .ok_or_else(|| CdrError::InvalidDate(format!("call starting {start_time} ends out of range")))?
            .min(now);

        let caller = &pool[self.random.index(pool.len())];
        let receiver = loop {
            let candidate = &pool[self.random.index(pool.len())];
            if candidate != caller {
                break candidate;
            }
        };

        let call_type = if self.random.coin() {
            CallType::Outgoing
        } else {
            CallType::Incoming
        };

        debug!(
            "Placing call {} -> {} at {} (remaining {})",
            caller, receiver, start_time, remaining
        );

        CallRecord::new(
            call_type,
            caller.clone(),
            receiver.clone(),
            start_time,
            end_time,
        )
    }
}

/// Reset both collaborators, register `pool` and generate a fresh history
///
/// Meant to run once at start-up, before any report is computed.
pub fn seed_history<R: RandomSource>(
    directory: &dyn SubscriberDirectory,
    store: &dyn RecordStore,
    pool: &[Msisdn],
    generator: &mut CallRecordGenerator<R>,
    now: DateTime<Utc>,
) -> Result<usize> {
    store.clear()?;
    directory.clear()?;

    for msisdn in pool {
        directory.register(msisdn.clone())?;
    }

    let subscribers = directory.list_all()?;
    generator.generate(&subscribers, store, now)
}
