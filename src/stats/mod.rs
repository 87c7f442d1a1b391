//! Registry statistics

pub mod metrics;

pub use metrics::{CounterSnapshot, RegistryCounters, RegistryStats};
