//! I/O module
//!
//! Handles configuration input and CSV report output.
//!
//! # Components
//!
//! - `config` - JSON workload configuration loading and validation
//! - `csv_format` - Throughput, latency and query report serialization

pub mod config;
pub mod csv_format;

pub use config::BenchConfig;
pub use csv_format::{write_latency_csv, write_query_csv, write_throughput_csv};
