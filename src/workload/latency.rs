//! Latency workload
//!
//! Issues one wait-and-measure transfer per sample, strictly one after the
//! other, each from its own sender (sender index = sample index). Failed
//! samples stay in the report as empty rows and are left out of the summary.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::adapter::DagAdapter;
use crate::core::summarize_latencies;
use crate::io::write_latency_csv;
use crate::types::BenchError;
use crate::workload::Workload;

/// Sequential wait-and-measure sampling
#[derive(Debug, Clone, Copy)]
pub struct LatencyWorkload {
    samples: usize,
}

impl LatencyWorkload {
    pub fn new(samples: usize) -> Self {
        Self { samples }
    }
}

#[async_trait]
impl Workload for LatencyWorkload {
    async fn run(
        &self,
        adapter: Arc<dyn DagAdapter>,
        output: &mut (dyn Write + Send),
    ) -> Result<(), BenchError> {
        let senders = adapter.provision_senders(self.samples).await?;
        let receiver = adapter.provision_receiver().await?;
        info!(network = adapter.name(), samples = self.samples, "Starting latency run");

        let mut samples: Vec<Option<Duration>> = Vec::with_capacity(self.samples);
        for send_times in 0..self.samples {
            let latency = adapter
                .dispatch_send_and_wait(&senders, send_times, &receiver)
                .await
                .ok();
            samples.push(latency);
        }

        write_latency_csv(&samples, output)?;

        let summary = summarize_latencies(&samples)?;
        info!(
            samples = summary.samples,
            failed = summary.failed,
            min_secs = summary.min.as_secs_f64(),
            mean_secs = summary.mean.as_secs_f64(),
            p50_secs = summary.p50.as_secs_f64(),
            p99_secs = summary.p99.as_secs_f64(),
            max_secs = summary.max.as_secs_f64(),
            "Latency measured"
        );
        Ok(())
    }
}
