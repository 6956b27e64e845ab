//! Throughput workload
//!
//! # Flow
//!
//! ```text
//! provision senders + receiver
//!     │
//!     ├── sampler task ── every sample_interval: (record count, balance) of receiver
//!     │
//!     └── ticker ── rate ticks/s for duration: spawn send_round_robin(order = tick)
//!             │
//!             └── join all sends, stop sampler, take final sample
//!                     │
//!                     └── compute_metrics ── throughput CSV
//! ```
//!
//! The receiver's record count tracks confirmed transfers and its balance
//! tracks confirmed value, so first and last samples bound what the network
//! confirmed during the run.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapter::DagAdapter;
use crate::io::{write_throughput_csv, BenchConfig};
use crate::types::{Account, BenchError, ThroughputSamples};
use crate::workload::Workload;

/// Paced round-robin load with periodic receiver sampling
#[derive(Debug, Clone)]
pub struct ThroughputWorkload {
    node_urls: Vec<String>,
    senders: usize,
    /// Offered transactions per second
    rate: u64,
    duration: Duration,
    sample_interval: Duration,
}

impl ThroughputWorkload {
    pub fn new(
        node_urls: Vec<String>,
        senders: usize,
        rate: u64,
        duration: Duration,
        sample_interval: Duration,
    ) -> Self {
        Self {
            node_urls,
            senders,
            rate,
            duration,
            sample_interval,
        }
    }

    pub fn from_config(config: &BenchConfig) -> Self {
        Self::new(
            config.node_url.clone(),
            config.sender_num,
            config.rate,
            config.duration(),
            config.sample_interval(),
        )
    }

    /// Transactions offered over the whole run
    ///
    /// A fractional last second offers its share of `rate`, rounded down.
    pub fn times(&self) -> u64 {
        let offered = u128::from(self.rate) * self.duration.as_millis() / 1000;
        u64::try_from(offered).unwrap_or(u64::MAX)
    }

    fn tick_period(&self) -> Duration {
        Duration::from_nanos((1_000_000_000 / self.rate.max(1)).max(1))
    }
}

/// One observation of the receiver
async fn sample(adapter: &dyn DagAdapter, receiver: &Account) -> Result<(u64, u64), BenchError> {
    let count = adapter.query_transaction_count(receiver).await?;
    let balance = adapter.query_balance(receiver).await?;
    Ok((count as u64, balance))
}

/// Append one observation to `observations`, skipping a failed query
async fn record_sample(
    adapter: &dyn DagAdapter,
    receiver: &Account,
    observations: &mut Vec<(u64, u64)>,
    stage: &str,
) {
    match sample(adapter, receiver).await {
        Ok(observation) => observations.push(observation),
        Err(e) => warn!(stage, error = %e, "Receiver sample skipped"),
    }
}

/// Sample the receiver every `period` until `shutdown` fires
///
/// Failed samples are skipped; the series only holds successful ones.
async fn run_sampler(
    adapter: Arc<dyn DagAdapter>,
    receiver: Arc<Account>,
    period: Duration,
    shutdown: CancellationToken,
) -> Vec<(u64, u64)> {
    let mut series = Vec::new();
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial sample is taken by the caller.
    timer.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = timer.tick() => match sample(adapter.as_ref(), &receiver).await {
                Ok(observation) => {
                    debug!(count = observation.0, balance = observation.1, "Receiver sampled");
                    series.push(observation);
                }
                Err(e) => warn!(error = %e, "Receiver sample skipped"),
            },
        }
    }
    series
}

#[async_trait]
impl Workload for ThroughputWorkload {
    async fn run(
        &self,
        adapter: Arc<dyn DagAdapter>,
        output: &mut (dyn Write + Send),
    ) -> Result<(), BenchError> {
        let nodes = adapter.generate_nodes(&self.node_urls);
        let senders: Arc<[Account]> = adapter.provision_senders(self.senders).await?.into();
        let receiver = Arc::new(adapter.provision_receiver().await?);

        let mut observations = Vec::new();
        record_sample(adapter.as_ref(), &receiver, &mut observations, "initial").await;

        let shutdown = CancellationToken::new();
        let sampler = tokio::spawn(run_sampler(
            Arc::clone(&adapter),
            Arc::clone(&receiver),
            self.sample_interval,
            shutdown.clone(),
        ));

        let times = self.times();
        info!(
            network = adapter.name(),
            nodes = nodes.len(),
            senders = senders.len(),
            rate = self.rate,
            duration_secs = self.duration.as_secs_f64(),
            times,
            "Starting throughput run"
        );

        let mut ticker = interval(self.tick_period());
        let mut in_flight = Vec::with_capacity(times as usize);
        for order in 0..times {
            ticker.tick().await;
            let adapter = Arc::clone(&adapter);
            let senders = Arc::clone(&senders);
            let receiver = Arc::clone(&receiver);
            in_flight.push(tokio::spawn(async move {
                // Failures are already logged and counted by the dispatcher
                let _ = adapter
                    .dispatch_send_async(&senders, order, &receiver)
                    .await;
            }));
        }
        join_all(in_flight).await;
        info!("All sends completed");

        shutdown.cancel();
        match sampler.await {
            Ok(series) => observations.extend(series),
            Err(e) => warn!(error = %e, "Sampler task failed"),
        }
        record_sample(adapter.as_ref(), &receiver, &mut observations, "final").await;

        let (transactions, balance): (Vec<u64>, Vec<u64>) = observations.into_iter().unzip();
        let samples = ThroughputSamples {
            transactions,
            balance,
            times,
            nodes: nodes.len(),
            senders: senders.len(),
            duration: self.duration,
        };
        let records = adapter.compute_metrics(&samples)?;
        for record in &records {
            info!(tps = %record.tps, ctps = %record.ctps, rate = %record.rate, "Throughput measured");
        }

        write_throughput_csv(&records, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::one_per_second(1, 10_000, 10, Duration::from_secs(1))]
    #[case::fifty(50, 2_000, 100, Duration::from_millis(20))]
    #[case::thousand(1000, 3000, 3000, Duration::from_millis(1))]
    #[case::half_second(20, 500, 10, Duration::from_millis(50))]
    #[case::below_one_tick(1, 999, 0, Duration::from_secs(1))]
    fn test_offered_load(
        #[case] rate: u64,
        #[case] millis: u64,
        #[case] times: u64,
        #[case] period: Duration,
    ) {
        let workload = ThroughputWorkload::new(
            vec![],
            1,
            rate,
            Duration::from_millis(millis),
            Duration::from_secs(1),
        );

        assert_eq!(workload.times(), times);
        assert_eq!(workload.tick_period(), period);
    }
}
