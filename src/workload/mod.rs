//! Benchmark workloads
//!
//! This module defines the Strategy pattern for complete benchmark runs. A
//! workload provisions what it needs through a [`DagAdapter`], drives load
//! or queries against it and writes its CSV report. The workload kind is
//! selected at runtime.
//!
//! - `throughput` - paced round-robin load with receiver sampling, reduced to TPS/CTPS
//! - `latency` - sequential wait-and-measure transfers
//! - `query` - repeated balance queries plus one history fetch

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::DagAdapter;
use crate::cli::WorkloadType;
use crate::io::BenchConfig;
use crate::types::BenchError;

pub mod latency;
pub mod query;
pub mod throughput;

pub use latency::LatencyWorkload;
pub use query::QueryWorkload;
pub use throughput::ThroughputWorkload;

/// One complete benchmark run against a network
#[async_trait]
pub trait Workload: Send + Sync {
    /// Run the workload through `adapter` and write its report to `output`
    ///
    /// # Errors
    ///
    /// Provisioning and aggregation failures end the run. Individual dispatch
    /// and query failures are logged and counted by the adapter; they only
    /// end the run where a workload cannot continue without the result.
    async fn run(
        &self,
        adapter: Arc<dyn DagAdapter>,
        output: &mut (dyn Write + Send),
    ) -> Result<(), BenchError>;
}

/// Create a workload of the given kind from a loaded configuration
pub fn create_workload(kind: WorkloadType, config: &BenchConfig) -> Box<dyn Workload> {
    match kind {
        WorkloadType::Throughput => Box::new(ThroughputWorkload::from_config(config)),
        WorkloadType::Latency => Box::new(LatencyWorkload::new(config.latency_samples)),
        WorkloadType::Query => Box::new(QueryWorkload::from_config(config)),
    }
}
