//! Ledger benchmark CLI
//!
//! Command-line driver running one benchmark workload and writing its CSV
//! report.
//!
//! # Usage
//!
//! ```bash
//! export OPERATOR_ID=0.0.2
//! export OPERATOR_KEY=<hex ed25519 seed>
//! cargo run -- --config bench.json > throughput.csv
//! cargo run -- --config bench.json --workload latency --confirmation-delay-ms 2500
//! cargo run -- --config bench.json --workload query --output query.csv
//! cargo run -- --config bench.json --rate 200 --duration 30 --worker-threads 8
//! ```
//!
//! The network under test is the in-process ledger, seeded with the operator
//! credentials and `--operator-balance` whole units.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (bad configuration, missing credentials, provisioning failure, etc.)

use ledger_bench::adapter::{DagAdapter, HashgraphAdapter};
use ledger_bench::cli::{self, CliArgs};
use ledger_bench::io::BenchConfig;
use ledger_bench::ledger::InMemoryLedger;
use ledger_bench::types::{BenchError, UNITS_PER_WHOLE};
use ledger_bench::workload;
use std::io::Write;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

fn main() {
    let args = cli::parse_args();
    cli::init_logging(&args.log_level);

    if let Err(e) = run(&args) {
        error!(error = %e, "Benchmark failed");
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), BenchError> {
    let mut config = BenchConfig::load(&args.config)?;
    args.apply_overrides(&mut config)?;
    let credentials = args.operator_credentials()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.worker_threads())
        .enable_time()
        .build()
        .map_err(|e| BenchError::config(format!("Failed to create tokio runtime: {}", e)))?;

    let mut output: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    runtime.block_on(async {
        let ledger = InMemoryLedger::with_operator(
            &credentials,
            args.operator_balance.saturating_mul(UNITS_PER_WHOLE),
        )
        .with_confirmation_delay(Duration::from_millis(args.confirmation_delay_ms));

        let adapter: Arc<dyn DagAdapter> = Arc::new(HashgraphAdapter::new(
            Arc::new(ledger),
            credentials.clone(),
            config.funding,
            config.dispatch_config(),
        ));
        adapter.init().await?;
        info!(network = adapter.name(), workload = ?args.workload, "Adapter ready");

        let workload = workload::create_workload(args.workload, &config);
        let result = workload.run(Arc::clone(&adapter), output.as_mut()).await;
        adapter.finalise().await?;
        result
    })
}
