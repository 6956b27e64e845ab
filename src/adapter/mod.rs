//! Network adapter contract
//!
//! Workloads drive a network under test only through [`DagAdapter`]. Each
//! supported network contributes one implementation composing the core
//! components for its ledger capability:
//!
//! ```text
//! DagAdapter
//!     └── HashgraphAdapter<L: Ledger>
//!         ├── AccountProvisioner  (provision_*)
//!         ├── TransactionDispatcher (dispatch_*)
//!         ├── QueryExecutor       (query_*)
//!         └── metrics             (compute_metrics)
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::DispatchStats;
use crate::types::{
    Account, BenchError, MetricsRecord, Node, Query, ThroughputSamples, TransactionId,
};

pub mod hashgraph;

pub use hashgraph::HashgraphAdapter;

/// Capability surface a benchmark workload needs from a network
///
/// Implementations must be shareable across tasks: the throughput workload
/// issues dispatches from many spawned tasks at once.
#[async_trait]
pub trait DagAdapter: Send + Sync {
    /// Short network name used in logs and reports
    fn name(&self) -> &'static str;

    /// Establish the operator context before any other call
    async fn init(&self) -> Result<(), BenchError>;

    async fn provision_senders(&self, count: usize) -> Result<Vec<Account>, BenchError>;

    async fn provision_receiver(&self) -> Result<Account, BenchError>;

    /// Fire-and-forget transfer
    async fn dispatch_send(
        &self,
        sender: &Account,
        receiver: &Account,
    ) -> Result<TransactionId, BenchError>;

    /// Round-robin fire-and-forget transfer for tick `order`
    async fn dispatch_send_async(
        &self,
        senders: &[Account],
        order: u64,
        receiver: &Account,
    ) -> Result<TransactionId, BenchError>;

    /// Wait-and-measure transfer from sender `send_times`
    async fn dispatch_send_and_wait(
        &self,
        senders: &[Account],
        send_times: usize,
        receiver: &Account,
    ) -> Result<Duration, BenchError>;

    async fn query_balance(&self, account: &Account) -> Result<u64, BenchError>;

    async fn query_history(&self, account: &Account) -> Result<(), BenchError>;

    async fn query_transaction_count(&self, account: &Account) -> Result<usize, BenchError>;

    /// Reduce one run's samples to its throughput records
    fn compute_metrics(&self, samples: &ThroughputSamples)
        -> Result<Vec<MetricsRecord>, BenchError>;

    /// Describe the nodes of the network under test
    fn generate_nodes(&self, urls: &[String]) -> Vec<Node>;

    /// Describe a query workload against `ip:port`
    fn generate_query(&self, ip: &str, port: u16, times: usize) -> Query;

    /// Counters of every dispatch issued through this adapter
    fn dispatch_stats(&self) -> Arc<DispatchStats>;

    /// Release per-run resources and report run totals
    async fn finalise(&self) -> Result<(), BenchError>;
}
