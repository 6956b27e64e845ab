//! Read-only queries against ledger state
//!
//! Each query authenticates as the account it inspects, the way a wallet
//! would, and never mutates ledger or in-memory state. Failures are logged
//! at this boundary and returned as `BenchError::Query`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ledger::{Ledger, LedgerClient};
use crate::types::{Account, BenchError, LedgerError, TransactionRecord};

/// Issues balance and history queries
pub struct QueryExecutor<L: Ledger> {
    ledger: Arc<L>,
}

impl<L: Ledger> QueryExecutor<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Current balance of `account` in the ledger's smallest unit
    pub async fn get_balance(&self, account: &Account) -> Result<u64, BenchError> {
        const OPERATION: &str = "get_balance";

        let result = async {
            let client = self.ledger.authenticate(&account.id, &account.key).await?;
            client.account_balance(&account.id).await
        }
        .await;

        match result {
            Ok(balance) => {
                debug!(account = %account.id, balance, "Balance queried");
                Ok(balance)
            }
            Err(e) => Err(Self::failed(OPERATION, account, e)),
        }
    }

    /// Fetch and log the transfer history of `account`
    ///
    /// Only success or failure is reported; the records are not returned.
    pub async fn get_history(&self, account: &Account) -> Result<(), BenchError> {
        let records = self.records("get_history", account).await?;
        debug!(account = %account.id, records = records.len(), "History queried");
        for record in &records {
            debug!(
                transaction = %record.transaction_id,
                sender = %record.sender,
                receiver = %record.receiver,
                amount = record.amount,
                "History record"
            );
        }
        Ok(())
    }

    /// Number of transfer records touching `account`
    ///
    /// An account without records yields `0`.
    pub async fn get_transaction_count(&self, account: &Account) -> Result<usize, BenchError> {
        let count = self
            .records("get_transaction_count", account)
            .await?
            .len();
        debug!(account = %account.id, count, "Transaction count queried");
        Ok(count)
    }

    async fn records(
        &self,
        operation: &str,
        account: &Account,
    ) -> Result<Vec<TransactionRecord>, BenchError> {
        let result = async {
            let client = self.ledger.authenticate(&account.id, &account.key).await?;
            client.account_records(&account.id).await
        }
        .await;

        result.map_err(|e| Self::failed(operation, account, e))
    }

    fn failed(operation: &str, account: &Account, source: LedgerError) -> BenchError {
        warn!(operation, account = %account.id, error = %source, "Query failed");
        BenchError::query(operation, account.id, source)
    }
}
