//! Benchmark suite for the dispatch and metrics hot paths
//!
//! Uses the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! # Scenarios
//!
//! - Round-robin sender selection
//! - Throughput reduction over growing sample series
//! - Latency summaries over growing sample sets
//! - Concurrent round-robin dispatch against the in-memory ledger

use ledger_bench::adapter::{DagAdapter, HashgraphAdapter};
use ledger_bench::core::{
    select_sender, summarize_latencies, throughput_records, DispatchConfig, FundingConfig,
};
use ledger_bench::ledger::InMemoryLedger;
use ledger_bench::types::ThroughputSamples;
use std::sync::Arc;
use std::time::Duration;

fn main() {
    divan::main();
}

/// Benchmark sender selection across a large pool
#[divan::bench]
fn round_robin_selection() -> usize {
    (0..10_000u64)
        .filter_map(|order| select_sender(divan::black_box(order), 64))
        .sum()
}

/// Benchmark throughput reduction with `len` samples per series
#[divan::bench(args = [10, 1_000, 100_000])]
fn throughput_reduction(bencher: divan::Bencher, len: u64) {
    let samples = ThroughputSamples {
        transactions: (0..len).collect(),
        balance: (0..len).map(|n| n * 2).collect(),
        times: len,
        nodes: 4,
        senders: 10,
        duration: Duration::from_secs(100),
    };

    bencher.bench(|| throughput_records(divan::black_box(&samples)));
}

/// Benchmark latency summaries with `len` samples, every tenth one failed
#[divan::bench(args = [10, 1_000, 100_000])]
fn latency_summary(bencher: divan::Bencher, len: u64) {
    let samples: Vec<Option<Duration>> = (0..len)
        .map(|n| (n % 10 != 0).then(|| Duration::from_micros(n * 37 % 60_000_000)))
        .collect();

    bencher.bench(|| summarize_latencies(divan::black_box(&samples)));
}

/// Benchmark `count` concurrent round-robin sends through the adapter
#[divan::bench(args = [100, 1_000])]
fn concurrent_dispatch(bencher: divan::Bencher, count: u64) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .build()
        .expect("Failed to create tokio runtime");

    let (ledger, credentials) = InMemoryLedger::genesis(1_000_000);
    let adapter = Arc::new(HashgraphAdapter::new(
        Arc::new(ledger),
        credentials,
        FundingConfig::default(),
        DispatchConfig::default(),
    ));
    let (senders, receiver) = runtime.block_on(async {
        let senders: Arc<[_]> = adapter
            .provision_senders(8)
            .await
            .expect("Failed to provision senders")
            .into();
        let receiver = Arc::new(
            adapter
                .provision_receiver()
                .await
                .expect("Failed to provision receiver"),
        );
        (senders, receiver)
    });

    bencher.bench(|| {
        runtime.block_on(async {
            let tasks: Vec<_> = (0..count)
                .map(|order| {
                    let adapter = Arc::clone(&adapter);
                    let senders = Arc::clone(&senders);
                    let receiver = Arc::clone(&receiver);
                    tokio::spawn(async move {
                        let _ = adapter
                            .dispatch_send_async(&senders, order, &receiver)
                            .await;
                    })
                })
                .collect();
            futures::future::join_all(tasks).await
        })
    });
}
