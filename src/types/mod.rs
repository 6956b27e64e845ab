//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account identifiers, key material and operator credentials
//! - `transaction`: Transaction identifiers, receipts and records
//! - `metrics`: Throughput and latency result records
//! - `workload`: Node and query workload descriptions
//! - `error`: Error types for the benchmark driver

pub mod account;
pub mod error;
pub mod metrics;
pub mod transaction;
pub mod workload;

pub use account::{Account, AccountId, OperatorCredentials, PrivateKey, PublicKey, UNITS_PER_WHOLE};
pub use error::{BenchError, LedgerError};
pub use metrics::{LatencySummary, MetricsRecord, QueryReport, ThroughputSamples};
pub use transaction::{TransactionId, TransactionReceipt, TransactionRecord};
pub use workload::{Node, Query};
