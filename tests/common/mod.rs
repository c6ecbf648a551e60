//! Common test utilities and helpers for cdr2udr tests
//!
//! Record builders, a fixed generation clock, and a small hand-built call
//! history whose totals are known in advance.

use cdr2udr::{
    aggregation::UsageAggregator,
    cdr_report::CdrReporter,
    generator::{CallRecordGenerator, GeneratorConfig, StdRandom, seed_history},
    store::{InMemoryRecordStore, InMemorySubscriberDirectory, RecordStore},
    timezone::TimezoneConfig,
    types::{CallRecord, CallType, Msisdn},
};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::path::Path;
use std::sync::Arc;

/// First reference subscriber
pub const ALICE: &str = "79001112233";
/// Second reference subscriber
pub const BOB: &str = "79101112233";
/// Third reference subscriber
pub const CAROL: &str = "79201112233";

/// Fixed generation instant used across tests
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Builder for creating test CallRecord instances
pub struct CallRecordBuilder {
    call_type: CallType,
    caller: String,
    receiver: String,
    start: DateTime<Utc>,
    duration: TimeDelta,
}

impl CallRecordBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            call_type: CallType::Outgoing,
            caller: ALICE.to_string(),
            receiver: BOB.to_string(),
            start: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            duration: TimeDelta::minutes(1),
        }
    }

    pub fn between(mut self, caller: &str, receiver: &str) -> Self {
        self.caller = caller.to_string();
        self.receiver = receiver.to_string();
        self
    }

    #[allow(dead_code)]
    pub fn incoming(mut self) -> Self {
        self.call_type = CallType::Incoming;
        self
    }

    pub fn with_date(mut self, year: i32, month: u32, day: u32, hour: u32) -> Self {
        self.start = Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap();
        self
    }

    pub fn with_seconds(mut self, seconds: i64) -> Self {
        self.duration = TimeDelta::seconds(seconds);
        self
    }

    /// Build the CallRecord
    pub fn build(self) -> CallRecord {
        CallRecord::new(
            self.call_type,
            Msisdn::new(self.caller),
            Msisdn::new(self.receiver),
            self.start,
            self.start + self.duration,
        )
        .unwrap()
    }
}

/// Shared collaborators for one test run
pub struct TestContext {
    pub records: Arc<InMemoryRecordStore>,
    pub subscribers: Arc<InMemorySubscriberDirectory>,
}

#[allow(dead_code)]
impl TestContext {
    /// Empty store with the given subscribers registered
    pub fn with_subscribers(numbers: &[&str]) -> Self {
        Self {
            records: Arc::new(InMemoryRecordStore::new()),
            subscribers: Arc::new(
                InMemorySubscriberDirectory::with_numbers(numbers.iter().copied()).unwrap(),
            ),
        }
    }

    /// Alice, Bob and Carol with a known history:
    ///
    /// - Alice calls Bob for 2h on 2024-01-15
    /// - Bob calls Alice for 1h on 2024-02-03
    /// - Carol calls Alice for 30m on 2024-02-20
    /// - Alice calls Carol for 45s on 2024-12-31 23:00
    pub fn scenario() -> Self {
        let context = Self::with_subscribers(&[ALICE, BOB, CAROL]);
        for record in [
            CallRecordBuilder::new()
                .between(ALICE, BOB)
                .with_date(2024, 1, 15, 10)
                .with_seconds(7200)
                .build(),
            CallRecordBuilder::new()
                .between(BOB, ALICE)
                .with_date(2024, 2, 3, 8)
                .with_seconds(3600)
                .build(),
            CallRecordBuilder::new()
                .between(CAROL, ALICE)
                .with_date(2024, 2, 20, 18)
                .with_seconds(1800)
                .build(),
            CallRecordBuilder::new()
                .between(ALICE, CAROL)
                .with_date(2024, 12, 31, 23)
                .with_seconds(45)
                .build(),
        ] {
            context.records.save(record).unwrap();
        }
        context
    }

    /// Seed a generated history for the given pool at the fixed clock
    pub fn generated(pool: &[&str], seed: u64) -> Self {
        let context = Self::with_subscribers(&[]);
        let pool: Vec<Msisdn> = pool.iter().copied().map(Msisdn::new).collect();
        let mut generator =
            CallRecordGenerator::new(GeneratorConfig::default(), StdRandom::seeded(seed));

        seed_history(
            context.subscribers.as_ref(),
            context.records.as_ref(),
            &pool,
            &mut generator,
            fixed_now(),
        )
        .unwrap();
        context
    }

    pub fn aggregator(&self) -> UsageAggregator {
        UsageAggregator::new(
            self.records.clone(),
            self.subscribers.clone(),
            TimezoneConfig::utc(),
        )
    }

    pub fn reporter(&self, reports_dir: &Path) -> CdrReporter {
        CdrReporter::new(
            self.records.clone(),
            self.subscribers.clone(),
            reports_dir,
            TimezoneConfig::utc(),
        )
    }
}
