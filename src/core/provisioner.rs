//! Account provisioning
//!
//! This module provides the `AccountProvisioner`, which authenticates the
//! operator identity and mints the funded sender and receiver accounts a
//! benchmark run dispatches between.
//!
//! The provisioner is responsible for:
//! - Establishing the operator's authorization context (once per run)
//! - Creating sender accounts sequentially, in request order
//! - Creating the receiver account every transfer targets
//! - Remembering every account it created, including partial batches
//!
//! Account creation consumes operator balance and increases the on-ledger
//! account count. Neither effect is reversed by this crate.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::ledger::{Ledger, LedgerClient};
use crate::types::{Account, BenchError, LedgerError, OperatorCredentials, PrivateKey, UNITS_PER_WHOLE};

/// Initial balances and transfer size of a workload, in the ledger's smallest unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FundingConfig {
    /// Balance every sender starts with
    pub sender_balance: u64,
    /// Balance the receiver starts with
    pub receiver_balance: u64,
    /// Amount moved by each transfer
    pub transfer_amount: u64,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            sender_balance: 100 * UNITS_PER_WHOLE,
            receiver_balance: 10 * UNITS_PER_WHOLE,
            transfer_amount: 1,
        }
    }
}

/// Creates and tracks the accounts of a benchmark run
pub struct AccountProvisioner<L: Ledger> {
    ledger: Arc<L>,

    /// Operator identity, supplied by the caller
    credentials: OperatorCredentials,

    funding: FundingConfig,

    /// Operator authorization context, established on first use
    operator: OnceCell<L::Client>,

    /// Every account created so far, in creation order
    provisioned: RwLock<Vec<Account>>,
}

impl<L: Ledger> AccountProvisioner<L> {
    /// Create a provisioner acting with the operator's authority
    pub fn new(ledger: Arc<L>, credentials: OperatorCredentials, funding: FundingConfig) -> Self {
        Self {
            ledger,
            credentials,
            funding,
            operator: OnceCell::new(),
            provisioned: RwLock::new(Vec::new()),
        }
    }

    pub fn funding(&self) -> FundingConfig {
        self.funding
    }

    /// Authenticate as the operator
    ///
    /// The context is established once and reused by every later call.
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Provisioning` if the network rejects the credential pair.
    pub async fn bootstrap_client(&self) -> Result<&L::Client, BenchError> {
        self.operator
            .get_or_try_init(|| async {
                let client = self
                    .ledger
                    .authenticate(&self.credentials.account_id, &self.credentials.key)
                    .await
                    .map_err(|e| BenchError::provisioning(None, e))?;
                info!(operator = %self.credentials.account_id, "Operator authenticated");
                Ok::<_, BenchError>(client)
            })
            .await
    }

    /// Create `count` funded sender accounts, one after the other
    ///
    /// The returned accounts are in request order; round-robin dispatch
    /// indexes into this order.
    ///
    /// # Errors
    ///
    /// Stops at the first failed creation and returns its error. Accounts
    /// created before it stay valid on the ledger and remain available through
    /// [`AccountProvisioner::provisioned`]; nothing is rolled back.
    pub async fn create_senders(&self, count: usize) -> Result<Vec<Account>, BenchError> {
        info!(count, "Generating senders");

        let mut senders = Vec::with_capacity(count);
        for index in 0..count {
            match self
                .create_account(self.funding.sender_balance, Some(index))
                .await
            {
                Ok(account) => senders.push(account),
                Err(e) => {
                    error!(index, created = senders.len(), error = %e, "Sender creation failed");
                    return Err(e);
                }
            }
        }

        info!(count = senders.len(), "Senders generated");
        Ok(senders)
    }

    /// Create the account every transfer of the run targets
    pub async fn create_receiver(&self) -> Result<Account, BenchError> {
        let receiver = self
            .create_account(self.funding.receiver_balance, None)
            .await?;
        info!(receiver = %receiver.id, "Receiver generated");
        Ok(receiver)
    }

    /// Snapshot of every account created so far, in creation order
    pub fn provisioned(&self) -> Vec<Account> {
        self.provisioned.read().clone()
    }

    /// Submit an account creation and read its receipt for the new id
    async fn create_account(
        &self,
        initial_balance: u64,
        index: Option<usize>,
    ) -> Result<Account, BenchError> {
        let client = self.bootstrap_client().await?;
        let key = PrivateKey::generate();

        let transaction = client
            .create_account(&key.public_key(), initial_balance)
            .await
            .map_err(|e| BenchError::provisioning(index, e))?;
        let receipt = client
            .get_receipt(&transaction)
            .await
            .map_err(|e| BenchError::provisioning(index, e))?;
        let id = receipt.account_id.ok_or_else(|| {
            BenchError::provisioning(
                index,
                LedgerError::not_found(format!("account id in receipt of {}", transaction)),
            )
        })?;

        debug!(account = %id, initial_balance, "Account created");
        let account = Account::new(id, key, initial_balance);
        self.provisioned.write().push(account.clone());
        Ok(account)
    }
}
