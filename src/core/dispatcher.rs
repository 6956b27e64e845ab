//! Transfer dispatch under the three delivery policies
//!
//! This module provides the `TransactionDispatcher`, which issues unit
//! transfers from provisioned senders to a receiver.
//!
//! # Delivery policies
//!
//! - **Fire-and-forget** ([`TransactionDispatcher::send`]): submit and return
//!   once the network accepted the transfer.
//! - **Round-robin** ([`TransactionDispatcher::send_round_robin`]): pick sender
//!   `order mod len(senders)`, then fire-and-forget. Meant to be called
//!   concurrently, one call per tick of offered load.
//! - **Wait-and-measure** ([`TransactionDispatcher::send_and_wait`]): pick the
//!   sender at an absolute index, submit, await the receipt and report the
//!   submission-to-consensus latency.
//!
//! # Failure semantics
//!
//! Every failure is logged and counted here and returned as a value. Nothing
//! is retried and nothing panics past this boundary, so load-generating
//! callers can drop the result and keep issuing transfers.
//!
//! # Thread Safety
//!
//! The dispatcher holds no mutable state besides atomic counters. Each call
//! authenticates its own context, so concurrent calls never share one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{debug, trace, warn};

use crate::ledger::{Ledger, LedgerClient};
use crate::types::{Account, BenchError, LedgerError, TransactionId};

/// Default latency wrap window
pub const DEFAULT_LATENCY_WINDOW: Duration = Duration::from_secs(60);

/// Dispatch settings shared by all delivery policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Amount moved by each transfer, in the ledger's smallest unit
    pub transfer_amount: u64,

    /// Window wait-and-measure latencies are wrapped into
    ///
    /// Latencies are reported modulo this window so results stay comparable
    /// with earlier reports. `None` reports the true elapsed time.
    pub latency_window: Option<Duration>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            transfer_amount: 1,
            latency_window: Some(DEFAULT_LATENCY_WINDOW),
        }
    }
}

/// Counters across every dispatch path
///
/// Fire-and-forget callers usually ignore the returned result; these
/// counters are how their failures still show up in a report.
#[derive(Debug, Default)]
pub struct DispatchStats {
    submitted: AtomicU64,
    failed: AtomicU64,
    confirmed: AtomicU64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_confirmed(&self) {
        self.confirmed.fetch_add(1, Ordering::Relaxed);
    }

    /// Transfers accepted by the network
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Transfers that failed at any step
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Wait-and-measure transfers whose receipt was obtained
    pub fn confirmed(&self) -> u64 {
        self.confirmed.load(Ordering::Relaxed)
    }
}

/// Index of the sender serving tick `order` in a pool of `pool_size`
///
/// Returns `None` for an empty pool.
pub fn select_sender(order: u64, pool_size: usize) -> Option<usize> {
    if pool_size == 0 {
        return None;
    }
    Some((order % pool_size as u64) as usize)
}

/// Wrap `elapsed` into `window`; `None` or a zero window leaves it untouched
pub fn wrap_latency(elapsed: Duration, window: Option<Duration>) -> Duration {
    match window {
        Some(window) if !window.is_zero() => {
            Duration::from_nanos((elapsed.as_nanos() % window.as_nanos()) as u64)
        }
        _ => elapsed,
    }
}

/// Issues transfers from provisioned senders
pub struct TransactionDispatcher<L: Ledger> {
    ledger: Arc<L>,
    config: DispatchConfig,
    stats: Arc<DispatchStats>,
}

impl<L: Ledger> TransactionDispatcher<L> {
    pub fn new(ledger: Arc<L>, config: DispatchConfig) -> Self {
        Self {
            ledger,
            config,
            stats: Arc::new(DispatchStats::new()),
        }
    }

    /// Shared handle to the dispatch counters
    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    pub fn config(&self) -> DispatchConfig {
        self.config
    }

    /// Fire-and-forget transfer from `sender` to `receiver`
    ///
    /// Returns once the network accepted the submission. Failures are logged
    /// and counted; the caller may ignore the result.
    pub async fn send(
        &self,
        sender: &Account,
        receiver: &Account,
    ) -> Result<TransactionId, BenchError> {
        self.fire("send", sender, receiver).await
    }

    /// Fire-and-forget transfer from sender `order mod len(senders)`
    ///
    /// Completion order across concurrent calls is unspecified.
    pub async fn send_round_robin(
        &self,
        senders: &[Account],
        order: u64,
        receiver: &Account,
    ) -> Result<TransactionId, BenchError> {
        const OPERATION: &str = "send_round_robin";

        let Some(index) = select_sender(order, senders.len()) else {
            self.stats.record_failed();
            warn!(operation = OPERATION, order, "No senders to dispatch from");
            return Err(BenchError::EmptySenderPool);
        };
        self.fire(OPERATION, &senders[index], receiver).await
    }

    /// Transfer from the sender at `send_times` and wait for consensus
    ///
    /// The wall-clock time is taken immediately before submission, because the
    /// consensus timestamp it is compared with is itself wall-clock. The result
    /// is wrapped into the configured latency window.
    ///
    /// # Errors
    ///
    /// Any failure (unknown sender, rejection, receipt timeout, clock skew)
    /// is logged, counted and returned. Callers must treat it as a missing
    /// sample, never as a zero latency.
    pub async fn send_and_wait(
        &self,
        senders: &[Account],
        send_times: usize,
        receiver: &Account,
    ) -> Result<Duration, BenchError> {
        const OPERATION: &str = "send_and_wait";

        let Some(sender) = senders.get(send_times) else {
            self.stats.record_failed();
            warn!(operation = OPERATION, index = send_times, pool_size = senders.len(), "Unknown sender");
            return Err(BenchError::UnknownSender {
                index: send_times,
                pool_size: senders.len(),
            });
        };

        let result = self.measure(sender, receiver).await;
        match &result {
            Ok(latency) => {
                self.stats.record_confirmed();
                debug!(
                    operation = OPERATION,
                    sender = %sender.id,
                    latency_secs = latency.as_secs_f64(),
                    "Transfer confirmed"
                );
            }
            Err(e) => {
                self.stats.record_failed();
                warn!(operation = OPERATION, sender = %sender.id, error = %e, "Dispatch failed");
            }
        }
        result
    }

    async fn fire(
        &self,
        operation: &str,
        sender: &Account,
        receiver: &Account,
    ) -> Result<TransactionId, BenchError> {
        match self.submit(sender, receiver).await {
            Ok((_, transaction)) => {
                self.stats.record_submitted();
                trace!(operation, %transaction, "Transfer submitted");
                Ok(transaction)
            }
            Err(e) => {
                self.stats.record_failed();
                warn!(operation, sender = %sender.id, error = %e, "Dispatch failed");
                Err(BenchError::dispatch(operation, e))
            }
        }
    }

    /// SUBMITTED -> AWAITING_CONFIRMATION -> CONFIRMED | FAILED
    async fn measure(&self, sender: &Account, receiver: &Account) -> Result<Duration, BenchError> {
        const OPERATION: &str = "send_and_wait";

        let submitted_at = SystemTime::now();
        let (client, transaction) = self
            .submit(sender, receiver)
            .await
            .map_err(|e| BenchError::dispatch(OPERATION, e))?;
        self.stats.record_submitted();
        trace!(%transaction, "Awaiting confirmation");

        let receipt = client
            .get_receipt(&transaction)
            .await
            .map_err(|e| BenchError::dispatch(OPERATION, e))?;
        let elapsed = receipt
            .consensus_timestamp
            .duration_since(submitted_at)
            .map_err(|e| BenchError::ClockSkew {
                skew_ms: e.duration().as_millis(),
            })?;

        Ok(wrap_latency(elapsed, self.config.latency_window))
    }

    /// Authenticate as `sender` and submit one transfer to `receiver`
    async fn submit(
        &self,
        sender: &Account,
        receiver: &Account,
    ) -> Result<(L::Client, TransactionId), LedgerError> {
        let client = self.ledger.authenticate(&sender.id, &sender.key).await?;
        let transaction = client
            .submit_transfer(&sender.id, &receiver.id, self.config.transfer_amount)
            .await?;
        Ok((client, transaction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provisioner::{AccountProvisioner, FundingConfig};
    use crate::ledger::InMemoryLedger;
    use rstest::rstest;

    struct Fixture {
        ledger: InMemoryLedger,
        dispatcher: TransactionDispatcher<InMemoryLedger>,
        senders: Vec<Account>,
        receiver: Account,
    }

    async fn fixture(sender_count: usize, config: DispatchConfig) -> Fixture {
        let (ledger, credentials) = InMemoryLedger::genesis(100_000);
        let shared = Arc::new(ledger.clone());
        let provisioner =
            AccountProvisioner::new(Arc::clone(&shared), credentials, FundingConfig::default());
        let senders = provisioner.create_senders(sender_count).await.unwrap();
        let receiver = provisioner.create_receiver().await.unwrap();

        Fixture {
            ledger,
            dispatcher: TransactionDispatcher::new(shared, config),
            senders,
            receiver,
        }
    }

    #[rstest]
    #[case(0, 3, Some(0))]
    #[case(1, 3, Some(1))]
    #[case(3, 3, Some(0))]
    #[case(7, 3, Some(1))]
    #[case(u64::MAX, 2, Some(1))]
    #[case(5, 1, Some(0))]
    #[case(5, 0, None)]
    fn test_select_sender(#[case] order: u64, #[case] pool: usize, #[case] expected: Option<usize>) {
        assert_eq!(select_sender(order, pool), expected);
        // Same inputs, same selection
        assert_eq!(select_sender(order, pool), select_sender(order, pool));
    }

    #[rstest]
    #[case::below_window(Duration::from_secs(15), Some(DEFAULT_LATENCY_WINDOW), Duration::from_secs(15))]
    #[case::wraps(Duration::from_secs(75), Some(DEFAULT_LATENCY_WINDOW), Duration::from_secs(15))]
    #[case::exact_window(Duration::from_secs(60), Some(DEFAULT_LATENCY_WINDOW), Duration::ZERO)]
    #[case::unwrapped(Duration::from_secs(75), None, Duration::from_secs(75))]
    #[case::zero_window(Duration::from_millis(1500), Some(Duration::ZERO), Duration::from_millis(1500))]
    fn test_wrap_latency(
        #[case] elapsed: Duration,
        #[case] window: Option<Duration>,
        #[case] expected: Duration,
    ) {
        assert_eq!(wrap_latency(elapsed, window), expected);
    }

    #[tokio::test]
    async fn test_send_moves_one_unit() {
        let f = fixture(1, DispatchConfig::default()).await;

        f.dispatcher.send(&f.senders[0], &f.receiver).await.unwrap();

        assert_eq!(
            f.ledger.balance_of(&f.receiver.id),
            Some(f.receiver.balance + 1)
        );
        assert_eq!(f.dispatcher.stats().submitted(), 1);
    }

    #[tokio::test]
    async fn test_failed_send_does_not_disturb_later_sends() {
        let f = fixture(1, DispatchConfig::default()).await;
        f.ledger.reject_next_submissions(1);

        let first = f.dispatcher.send(&f.senders[0], &f.receiver).await;
        let second = f.dispatcher.send(&f.senders[0], &f.receiver).await;

        assert!(matches!(first, Err(BenchError::DispatchRejected { .. })));
        assert!(second.is_ok());
        let stats = f.dispatcher.stats();
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.submitted(), 1);
    }

    #[tokio::test]
    async fn test_round_robin_spreads_load_over_pool() {
        let f = fixture(3, DispatchConfig::default()).await;

        for order in 0..6 {
            f.dispatcher
                .send_round_robin(&f.senders, order, &f.receiver)
                .await
                .unwrap();
        }

        for sender in &f.senders {
            assert_eq!(f.ledger.balance_of(&sender.id), Some(sender.balance - 2));
        }
    }

    #[tokio::test]
    async fn test_round_robin_concurrent_sends_all_land() {
        let f = fixture(4, DispatchConfig::default()).await;

        let sends = (0..40).map(|order| {
            f.dispatcher
                .send_round_robin(&f.senders, order, &f.receiver)
        });
        let results = futures::future::join_all(sends).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(
            f.ledger.balance_of(&f.receiver.id),
            Some(f.receiver.balance + 40)
        );
    }

    #[tokio::test]
    async fn test_round_robin_with_empty_pool() {
        let f = fixture(0, DispatchConfig::default()).await;

        let result = f.dispatcher.send_round_robin(&f.senders, 3, &f.receiver).await;

        assert_eq!(result, Err(BenchError::EmptySenderPool));
        assert_eq!(f.dispatcher.stats().failed(), 1);
    }

    #[rstest]
    #[case::short(Duration::from_secs(2), 2.0)]
    #[case::wrapped(Duration::from_secs(75), 15.0)]
    #[case::just_under_window(Duration::from_millis(59_500), 59.5)]
    #[tokio::test]
    async fn test_send_and_wait_reports_scripted_delay(
        #[case] delay: Duration,
        #[case] expected_secs: f64,
    ) {
        let f = fixture(1, DispatchConfig::default()).await;
        f.ledger.set_confirmation_delay(delay);

        let latency = f
            .dispatcher
            .send_and_wait(&f.senders, 0, &f.receiver)
            .await
            .unwrap();

        assert!(
            (latency.as_secs_f64() - expected_secs).abs() < 0.25,
            "expected ~{}s, got {:?}",
            expected_secs,
            latency
        );
        assert_eq!(f.dispatcher.stats().confirmed(), 1);
    }

    #[tokio::test]
    async fn test_send_and_wait_without_window_reports_true_elapsed() {
        let config = DispatchConfig {
            latency_window: None,
            ..DispatchConfig::default()
        };
        let f = fixture(1, config).await;
        f.ledger.set_confirmation_delay(Duration::from_secs(75));

        let latency = f
            .dispatcher
            .send_and_wait(&f.senders, 0, &f.receiver)
            .await
            .unwrap();

        assert!(latency >= Duration::from_secs(75));
        assert!(latency < Duration::from_secs(76));
    }

    #[tokio::test]
    async fn test_send_and_wait_unknown_sender() {
        let f = fixture(2, DispatchConfig::default()).await;

        let result = f.dispatcher.send_and_wait(&f.senders, 2, &f.receiver).await;

        assert_eq!(
            result,
            Err(BenchError::UnknownSender {
                index: 2,
                pool_size: 2
            })
        );
    }

    #[tokio::test]
    async fn test_send_and_wait_receipt_timeout() {
        let f = fixture(1, DispatchConfig::default()).await;
        f.ledger.time_out_next_receipts(1);

        let result = f.dispatcher.send_and_wait(&f.senders, 0, &f.receiver).await;

        assert!(matches!(result, Err(BenchError::DispatchTimeout { .. })));
        let stats = f.dispatcher.stats();
        // Accepted by the network even though the receipt never arrived
        assert_eq!(stats.submitted(), 1);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.confirmed(), 0);
    }

    #[rstest]
    #[case::lag_only(Duration::ZERO, Duration::from_secs(5))]
    #[case::lag_exceeds_delay(Duration::from_secs(2), Duration::from_secs(10))]
    #[tokio::test]
    async fn test_send_and_wait_consensus_before_submission_is_failed_sample(
        #[case] delay: Duration,
        #[case] lag: Duration,
    ) {
        let f = fixture(1, DispatchConfig::default()).await;
        f.ledger.set_confirmation_delay(delay);
        f.ledger.set_consensus_lag(lag);

        let result = f.dispatcher.send_and_wait(&f.senders, 0, &f.receiver).await;

        match result {
            Err(BenchError::ClockSkew { skew_ms }) => {
                assert!(skew_ms >= (lag - delay).as_millis() - 50, "skew {}ms", skew_ms);
            }
            other => panic!("expected clock skew, got {:?}", other),
        }
        let stats = f.dispatcher.stats();
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.confirmed(), 0);
    }
}
