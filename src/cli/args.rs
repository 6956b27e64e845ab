use crate::io::BenchConfig;
use crate::types::{BenchError, OperatorCredentials};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Benchmark a distributed-ledger network with value-transfer workloads
#[derive(Parser, Debug)]
#[command(name = "ledger-bench")]
#[command(about = "Benchmark a distributed-ledger network with value-transfer workloads", long_about = None)]
pub struct CliArgs {
    /// JSON workload configuration
    #[arg(short, long = "config", value_name = "FILE", help = "Path to the JSON configuration file")]
    pub config: PathBuf,

    /// Workload to run
    #[arg(
        long = "workload",
        value_name = "WORKLOAD",
        default_value = "throughput",
        help = "Workload: 'throughput', 'latency' or 'query'"
    )]
    pub workload: WorkloadType,

    /// Offered transactions per second, overrides the configuration
    #[arg(long = "rate", value_name = "TPS")]
    pub rate: Option<u64>,

    /// Throughput run length in seconds, overrides the configuration
    #[arg(long = "duration", value_name = "SECONDS")]
    pub duration: Option<u64>,

    /// Operator account id, `shard.realm.num`
    #[arg(long = "operator-id", env = "OPERATOR_ID", value_name = "ID")]
    pub operator_id: Option<String>,

    /// Operator private key, hex encoded
    #[arg(
        long = "operator-key",
        env = "OPERATOR_KEY",
        value_name = "KEY",
        hide_env_values = true
    )]
    pub operator_key: Option<String>,

    /// Operator balance of the in-memory network, in whole units
    #[arg(long = "operator-balance", value_name = "UNITS", default_value_t = 1_000_000)]
    pub operator_balance: u64,

    /// Consensus delay of the in-memory network
    #[arg(long = "confirmation-delay-ms", value_name = "MS", default_value_t = 0)]
    pub confirmation_delay_ms: u64,

    /// Tokio worker threads
    #[arg(
        long = "worker-threads",
        value_name = "COUNT",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Report destination, stdout when absent
    #[arg(short, long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Available benchmark workloads
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WorkloadType {
    Throughput,
    Latency,
    Query,
}

impl CliArgs {
    /// Operator credentials from flags or their environment fallbacks
    pub fn operator_credentials(&self) -> Result<OperatorCredentials, BenchError> {
        OperatorCredentials::from_parts(self.operator_id.as_deref(), self.operator_key.as_deref())
    }

    /// Runtime worker threads, falling back to the number of CPU cores
    ///
    /// A zero value is replaced by the default with a warning.
    pub fn worker_threads(&self) -> usize {
        match self.worker_threads {
            Some(0) => {
                tracing::warn!(
                    default = num_cpus::get(),
                    "Invalid worker thread count (0), using default"
                );
                num_cpus::get()
            }
            Some(count) => count,
            None => num_cpus::get(),
        }
    }

    /// Apply command-line overrides to a loaded configuration
    pub fn apply_overrides(&self, config: &mut BenchConfig) -> Result<(), BenchError> {
        if let Some(rate) = self.rate {
            config.rate = rate;
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
        }
        config.validate()
    }
}
