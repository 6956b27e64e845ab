//! Query workload
//!
//! Provisions a receiver, moves one transfer into it so its history is not
//! empty, then issues `times` balance queries followed by one history fetch.
//! The funding transfer is fire-and-forget; if it fails the queries still run
//! against the receiver's empty history.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::adapter::DagAdapter;
use crate::io::{write_query_csv, BenchConfig};
use crate::types::{BenchError, QueryReport};
use crate::workload::Workload;

/// Repeated read-only queries against a freshly funded receiver
#[derive(Debug, Clone)]
pub struct QueryWorkload {
    ip: String,
    port: u16,
    times: usize,
}

impl QueryWorkload {
    pub fn new(ip: impl Into<String>, port: u16, times: usize) -> Self {
        Self {
            ip: ip.into(),
            port,
            times,
        }
    }

    pub fn from_config(config: &BenchConfig) -> Self {
        Self::new(config.query_ip.clone(), config.query_port, config.query_times)
    }
}

#[async_trait]
impl Workload for QueryWorkload {
    async fn run(
        &self,
        adapter: Arc<dyn DagAdapter>,
        output: &mut (dyn Write + Send),
    ) -> Result<(), BenchError> {
        let query = adapter.generate_query(&self.ip, self.port, self.times);

        let mut funders = adapter.provision_senders(1).await?;
        let receiver = adapter.provision_receiver().await?;
        if let Some(funder) = funders.pop() {
            if let Err(e) = adapter.dispatch_send(&funder, &receiver).await {
                warn!(error = %e, "Funding transfer failed, querying an empty history");
            }
        }
        info!(network = adapter.name(), url = %query.url, times = query.times, "Starting query run");

        let started = Instant::now();
        let mut succeeded = 0;
        for _ in 0..query.times {
            if adapter.query_balance(&receiver).await.is_ok() {
                succeeded += 1;
            }
        }
        let duration = started.elapsed();

        let history = adapter.query_history(&receiver).await.is_ok();
        info!(succeeded, history, elapsed_secs = duration.as_secs_f64(), "Queries completed");

        let report = QueryReport {
            url: query.url,
            times: query.times,
            succeeded,
            failed: query.times - succeeded,
            duration,
        };
        write_query_csv(&report, output)
    }
}
