//! Ledger Benchmark Library
//! # Overview
//!
//! This library drives value-transfer benchmarks against distributed-ledger
//! networks: it provisions funded test accounts, dispatches transfers under
//! several delivery policies, queries ledger state and reduces what it
//! observed into throughput and latency figures.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, TransactionId, MetricsRecord, etc.)
//! - [`ledger`] - Ledger capability traits and the in-memory ledger
//! - [`core`] - Benchmark components:
//!   - [`core::provisioner`] - Operator bootstrap and account creation
//!   - [`core::dispatcher`] - Transfer dispatch and latency capture
//!   - [`core::query`] - Balance and history queries
//!   - [`core::metrics`] - TPS/CTPS and latency reduction
//! - [`adapter`] - Per-network capability contract used by workloads
//! - [`workload`] - Throughput, latency and query workloads
//! - [`io`] - Configuration loading and CSV reports
//! - [`cli`] - CLI arguments parsing and logging setup
//!
//! # Delivery Policies
//!
//! - **Fire-and-forget**: submit and return once accepted
//! - **Round-robin**: fire-and-forget from sender `order mod len(senders)`
//! - **Wait-and-measure**: submit, await the receipt and report the
//!   submission-to-consensus latency
//!
//! # Metrics
//!
//! Throughput is computed over 90% of the measurement window:
//! - `tps`: confirmed transactions per second
//! - `ctps`: confirmed value per second
//! - `rate`: offered transactions per second

// Module declarations
pub mod adapter;
pub mod cli;
pub mod core;
pub mod io;
pub mod ledger;
pub mod types;
pub mod workload;

pub use adapter::{DagAdapter, HashgraphAdapter};
pub use core::{AccountProvisioner, QueryExecutor, TransactionDispatcher};
pub use io::{write_latency_csv, write_query_csv, write_throughput_csv, BenchConfig};
pub use ledger::InMemoryLedger;
pub use types::{
    Account, AccountId, BenchError, LatencySummary, MetricsRecord, OperatorCredentials,
    ThroughputSamples, TransactionId,
};
pub use workload::{create_workload, Workload};
