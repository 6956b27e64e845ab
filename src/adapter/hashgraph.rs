//! Hashgraph network adapter
//!
//! Wires the provisioner, dispatcher and query executor to one shared
//! ledger capability. Account ids follow the `shard.realm.num` scheme.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::adapter::DagAdapter;
use crate::core::{
    throughput_records, AccountProvisioner, DispatchConfig, DispatchStats, FundingConfig,
    QueryExecutor, TransactionDispatcher,
};
use crate::ledger::Ledger;
use crate::types::{
    Account, BenchError, MetricsRecord, Node, OperatorCredentials, Query, ThroughputSamples,
    TransactionId,
};

/// Adapter for Hashgraph-style networks reachable through `L`
pub struct HashgraphAdapter<L: Ledger> {
    provisioner: AccountProvisioner<L>,
    dispatcher: TransactionDispatcher<L>,
    queries: QueryExecutor<L>,
}

impl<L: Ledger> HashgraphAdapter<L> {
    /// Build an adapter acting with `credentials` on `ledger`
    ///
    /// The dispatcher's transfer amount always follows `funding`.
    pub fn new(
        ledger: Arc<L>,
        credentials: OperatorCredentials,
        funding: FundingConfig,
        dispatch: DispatchConfig,
    ) -> Self {
        let dispatch = DispatchConfig {
            transfer_amount: funding.transfer_amount,
            ..dispatch
        };
        Self {
            provisioner: AccountProvisioner::new(Arc::clone(&ledger), credentials, funding),
            dispatcher: TransactionDispatcher::new(Arc::clone(&ledger), dispatch),
            queries: QueryExecutor::new(ledger),
        }
    }

    /// Accounts created through this adapter so far
    pub fn provisioned(&self) -> Vec<Account> {
        self.provisioner.provisioned()
    }
}

#[async_trait]
impl<L: Ledger> DagAdapter for HashgraphAdapter<L> {
    fn name(&self) -> &'static str {
        "hashgraph"
    }

    async fn init(&self) -> Result<(), BenchError> {
        self.provisioner.bootstrap_client().await?;
        Ok(())
    }

    async fn provision_senders(&self, count: usize) -> Result<Vec<Account>, BenchError> {
        self.provisioner.create_senders(count).await
    }

    async fn provision_receiver(&self) -> Result<Account, BenchError> {
        self.provisioner.create_receiver().await
    }

    async fn dispatch_send(
        &self,
        sender: &Account,
        receiver: &Account,
    ) -> Result<TransactionId, BenchError> {
        self.dispatcher.send(sender, receiver).await
    }

    async fn dispatch_send_async(
        &self,
        senders: &[Account],
        order: u64,
        receiver: &Account,
    ) -> Result<TransactionId, BenchError> {
        self.dispatcher
            .send_round_robin(senders, order, receiver)
            .await
    }

    async fn dispatch_send_and_wait(
        &self,
        senders: &[Account],
        send_times: usize,
        receiver: &Account,
    ) -> Result<Duration, BenchError> {
        self.dispatcher
            .send_and_wait(senders, send_times, receiver)
            .await
    }

    async fn query_balance(&self, account: &Account) -> Result<u64, BenchError> {
        self.queries.get_balance(account).await
    }

    async fn query_history(&self, account: &Account) -> Result<(), BenchError> {
        self.queries.get_history(account).await
    }

    async fn query_transaction_count(&self, account: &Account) -> Result<usize, BenchError> {
        self.queries.get_transaction_count(account).await
    }

    fn compute_metrics(
        &self,
        samples: &ThroughputSamples,
    ) -> Result<Vec<MetricsRecord>, BenchError> {
        throughput_records(samples)
    }

    fn generate_nodes(&self, urls: &[String]) -> Vec<Node> {
        urls.iter()
            .map(|url| Node {
                url: format!("http://{}", url),
            })
            .collect()
    }

    fn generate_query(&self, ip: &str, port: u16, times: usize) -> Query {
        Query {
            url: format!("http://{}:{}", ip, port),
            times,
        }
    }

    fn dispatch_stats(&self) -> Arc<DispatchStats> {
        self.dispatcher.stats()
    }

    async fn finalise(&self) -> Result<(), BenchError> {
        let stats = self.dispatcher.stats();
        info!(
            network = self.name(),
            accounts = self.provisioner.provisioned().len(),
            submitted = stats.submitted(),
            confirmed = stats.confirmed(),
            failed = stats.failed(),
            "Run finished"
        );
        Ok(())
    }
}
