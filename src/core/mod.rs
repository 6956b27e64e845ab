//! Core benchmark components
//!
//! This module contains the pieces a workload composes:
//! - `provisioner` - Operator bootstrap and sender/receiver account creation
//! - `dispatcher` - Transfer dispatch under the three delivery policies
//! - `query` - Read-only balance and history queries
//! - `metrics` - Reduction of collected series into throughput and latency figures

pub mod dispatcher;
pub mod metrics;
pub mod provisioner;
pub mod query;

pub use dispatcher::{
    select_sender, wrap_latency, DispatchConfig, DispatchStats, TransactionDispatcher,
    DEFAULT_LATENCY_WINDOW,
};
pub use metrics::{summarize_latencies, throughput_records};
pub use provisioner::{AccountProvisioner, FundingConfig};
pub use query::QueryExecutor;
