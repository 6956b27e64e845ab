//! Metric record types
//!
//! Derived values produced by the metrics aggregator. Immutable once computed.

use rust_decimal::Decimal;
use std::time::Duration;

/// Throughput figures for one benchmark run segment
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRecord {
    /// Number of ledger nodes in the network under test
    pub nodes: usize,

    /// Number of sender accounts (clients) issuing load
    pub client: usize,

    /// Offered load in transactions per second
    pub rate: Decimal,

    /// Effective measurement window in seconds (90% of the wall-clock window)
    pub duration: Decimal,

    /// Confirmed transactions per second over the effective window, 4 decimals
    pub tps: Decimal,

    /// Confirmed value per second over the effective window, 4 decimals
    pub ctps: Decimal,
}

/// Distribution of wait-and-measure latencies
///
/// Failed samples are counted but never contribute to the statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    /// Number of confirmed samples
    pub samples: usize,
    /// Number of failed samples excluded from the statistics
    pub failed: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub p50: Duration,
    pub p99: Duration,
}

/// Time series collected over one throughput run, input to the aggregator
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThroughputSamples {
    /// Cumulative confirmed-transaction counts, in sampling order
    pub transactions: Vec<u64>,

    /// Cumulative confirmed-value samples, in sampling order
    pub balance: Vec<u64>,

    /// Number of transactions offered during the run
    pub times: u64,

    /// Number of ledger nodes in the network under test
    pub nodes: usize,

    /// Number of sender accounts
    pub senders: usize,

    /// Wall-clock measurement window
    pub duration: Duration,
}

/// Outcome of one query workload run
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
    /// Endpoint the queries were addressed to
    pub url: String,
    /// Balance queries issued
    pub times: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Wall-clock time spent issuing the balance queries
    pub duration: Duration,
}
