//! Benchmark configuration file
//!
//! A JSON document describing the network under test and the workload shape:
//!
//! ```json
//! {
//!   "node_url": ["127.0.0.1:50211"],
//!   "sender_num": 10,
//!   "query_ip": "127.0.0.1",
//!   "query_port": 5600,
//!   "query_times": 20,
//!   "rate": 50,
//!   "duration_secs": 30
//! }
//! ```
//!
//! Everything after `query_times` is optional.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::core::{DispatchConfig, FundingConfig};
use crate::types::BenchError;

fn default_rate() -> u64 {
    10
}

fn default_duration_secs() -> u64 {
    10
}

fn default_latency_samples() -> usize {
    10
}

fn default_sample_interval_ms() -> u64 {
    1_000
}

fn default_latency_window_secs() -> u64 {
    60
}

/// Workload configuration loaded from disk
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BenchConfig {
    /// Node endpoints, `host:port`
    pub node_url: Vec<String>,

    /// Sender accounts used by the throughput workload
    pub sender_num: usize,

    pub query_ip: String,
    pub query_port: u16,

    /// Balance queries issued by the query workload
    pub query_times: usize,

    /// Offered load in transactions per second
    #[serde(default = "default_rate")]
    pub rate: u64,

    /// Length of the throughput run
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,

    /// Wait-and-measure samples taken by the latency workload
    #[serde(default = "default_latency_samples")]
    pub latency_samples: usize,

    /// Interval between receiver samples during a throughput run
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Window latencies are wrapped into; `0` reports true elapsed time
    #[serde(default = "default_latency_window_secs")]
    pub latency_window_secs: u64,

    #[serde(default)]
    pub funding: FundingConfig,
}

impl BenchConfig {
    /// Read and validate a configuration file
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Config` if the file cannot be read, is malformed
    /// or fails validation.
    pub fn load(path: &Path) -> Result<Self, BenchError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BenchError::config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let config: BenchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject workload shapes that cannot produce a measurement
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.sender_num == 0 {
            return Err(BenchError::config("sender_num must be at least 1"));
        }
        if self.rate == 0 {
            return Err(BenchError::config("rate must be at least 1"));
        }
        if self.duration_secs == 0 {
            return Err(BenchError::config("duration_secs must be at least 1"));
        }
        if self.sample_interval_ms == 0 {
            return Err(BenchError::config("sample_interval_ms must be at least 1"));
        }
        if self.latency_samples == 0 {
            return Err(BenchError::config("latency_samples must be at least 1"));
        }
        if self.funding.transfer_amount == 0 {
            return Err(BenchError::config("funding.transfer_amount must be at least 1"));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Dispatch settings derived from this configuration
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            transfer_amount: self.funding.transfer_amount,
            latency_window: (self.latency_window_secs > 0)
                .then(|| Duration::from_secs(self.latency_window_secs)),
        }
    }
}
