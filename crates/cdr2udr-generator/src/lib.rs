//! Synthetic call history for cdr2udr
//!
//! This crate produces a randomized, chronologically ordered batch of call
//! detail records covering the year that ends at the generation instant,
//! and writes it through a [`cdr2udr_core::RecordStore`].

pub mod config;
pub mod generator;
pub mod random;

pub use config::{GeneratorConfig, MAX_CALL_MINUTES_LIMIT};
pub use generator::{CallRecordGenerator, max_start_time, seed_history, window_start};
pub use random::{RandomSource, StdRandom};

/// Reference subscriber pool used when none is configured
pub const DEFAULT_SUBSCRIBERS: &[&str] = &[
    "79001112233",
    "79101112233",
    "79201112233",
    "79301112233",
    "79401112233",
    "79501112233",
    "79601112233",
    "79701112233",
    "79801112233",
    "79901112233",
];
