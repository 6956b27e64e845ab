//! In-process ledger for dry runs, tests and benches
//!
//! This module provides `InMemoryLedger`, an implementation of the ledger
//! capability that keeps accounts, receipts and transfer records in
//! concurrent maps.
//!
//! # Design
//!
//! State lives in `DashMap`s behind an `Arc`, so every authorization context
//! handed out by [`InMemoryLedger::authenticate`] shares the same ledger.
//! Balance updates take one entry lock at a time; a transfer debits the sender,
//! releases it, then credits the receiver.
//!
//! # Scripted behaviour
//!
//! Consensus is not simulated. A submission is final immediately and its
//! consensus timestamp is the submission time plus a configurable
//! confirmation delay, which lets tests observe any latency without sleeping.
//! A consensus clock running behind the local one, rejected submissions,
//! failed lookups, receipt timeouts and an unreachable network can all be
//! scripted.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{Ledger, LedgerClient};
use crate::types::{
    AccountId, LedgerError, OperatorCredentials, PrivateKey, PublicKey, TransactionId,
    TransactionReceipt, TransactionRecord, UNITS_PER_WHOLE,
};

/// First account number handed out to created accounts
const FIRST_USER_ACCOUNT: u64 = 1001;

/// Account number of the genesis operator
const GENESIS_OPERATOR: u64 = 2;

/// Scripted failures, consumed one per affected call
#[derive(Debug, Default)]
pub struct FaultPlan {
    reject_submissions: AtomicUsize,
    timeout_receipts: AtomicUsize,
    fail_queries: AtomicUsize,
    unavailable: AtomicBool,
}

impl FaultPlan {
    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[derive(Debug, Clone)]
struct LedgerAccount {
    public_key: PublicKey,
    balance: u64,
}

#[derive(Debug)]
struct LedgerState {
    accounts: DashMap<AccountId, LedgerAccount>,
    receipts: DashMap<TransactionId, TransactionReceipt>,
    records: DashMap<AccountId, Vec<TransactionRecord>>,
    next_account: AtomicU64,
    next_nonce: AtomicU64,
    confirmation_delay_ms: AtomicU64,
    /// How far consensus timestamps lag behind the local clock
    consensus_lag_ms: AtomicU64,
    faults: FaultPlan,
}

impl LedgerState {
    fn next_transaction(&self, payer: AccountId) -> TransactionId {
        TransactionId {
            payer,
            nonce: self.next_nonce.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn consensus_timestamp(&self) -> SystemTime {
        let delayed = SystemTime::now()
            + Duration::from_millis(self.confirmation_delay_ms.load(Ordering::Relaxed));
        let lag = Duration::from_millis(self.consensus_lag_ms.load(Ordering::Relaxed));
        delayed.checked_sub(lag).unwrap_or(SystemTime::UNIX_EPOCH)
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.faults.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable {
                message: "network unreachable".to_string(),
            });
        }
        Ok(())
    }

    fn check_query(&self) -> Result<(), LedgerError> {
        self.check_available()?;
        if FaultPlan::take(&self.faults.fail_queries) {
            return Err(LedgerError::Unavailable {
                message: "mirror node busy".to_string(),
            });
        }
        Ok(())
    }

    /// Debit `amount` from `account`, refusing to overdraw it
    fn debit(&self, account: &AccountId, amount: u64, status: &str, operation: &str) -> Result<(), LedgerError> {
        let mut entry = self
            .accounts
            .get_mut(account)
            .ok_or_else(|| LedgerError::rejected(operation, "INVALID_ACCOUNT_ID"))?;
        entry.balance = entry
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::rejected(operation, status))?;
        Ok(())
    }
}

/// Ledger kept entirely in process memory
///
/// Cloning is cheap and every clone observes the same state.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    state: Arc<LedgerState>,
}

impl InMemoryLedger {
    /// Create an empty ledger with no accounts
    pub fn new() -> Self {
        Self {
            state: Arc::new(LedgerState {
                accounts: DashMap::new(),
                receipts: DashMap::new(),
                records: DashMap::new(),
                next_account: AtomicU64::new(FIRST_USER_ACCOUNT),
                next_nonce: AtomicU64::new(0),
                confirmation_delay_ms: AtomicU64::new(0),
                consensus_lag_ms: AtomicU64::new(0),
                faults: FaultPlan::default(),
            }),
        }
    }

    /// Create a ledger whose operator account belongs to `credentials`
    pub fn with_operator(credentials: &OperatorCredentials, balance: u64) -> Self {
        let ledger = Self::new();
        ledger.insert_account(credentials.account_id, credentials.key.public_key(), balance);
        ledger
    }

    /// Create a ledger with a freshly keyed genesis operator holding `whole_units`
    pub fn genesis(whole_units: u64) -> (Self, OperatorCredentials) {
        let credentials = OperatorCredentials {
            account_id: AccountId::new(GENESIS_OPERATOR),
            key: PrivateKey::generate(),
        };
        let ledger = Self::with_operator(&credentials, whole_units.saturating_mul(UNITS_PER_WHOLE));
        (ledger, credentials)
    }

    /// Set the gap between submission and consensus timestamps
    pub fn with_confirmation_delay(self, delay: Duration) -> Self {
        self.set_confirmation_delay(delay);
        self
    }

    pub fn set_confirmation_delay(&self, delay: Duration) {
        self.state
            .confirmation_delay_ms
            .store(delay.as_millis() as u64, Ordering::Relaxed);
    }

    /// Stamp consensus `lag` behind the local clock, after any confirmation delay
    ///
    /// A lag larger than the delay puts consensus before submission.
    pub fn set_consensus_lag(&self, lag: Duration) {
        self.state
            .consensus_lag_ms
            .store(lag.as_millis() as u64, Ordering::Relaxed);
    }

    /// Reject the next `count` transfer submissions with status `BUSY`
    pub fn reject_next_submissions(&self, count: usize) {
        self.state
            .faults
            .reject_submissions
            .store(count, Ordering::SeqCst);
    }

    /// Time out the next `count` receipt lookups
    pub fn time_out_next_receipts(&self, count: usize) {
        self.state
            .faults
            .timeout_receipts
            .store(count, Ordering::SeqCst);
    }

    /// Fail the next `count` balance or record lookups as unavailable
    pub fn fail_next_queries(&self, count: usize) {
        self.state.faults.fail_queries.store(count, Ordering::SeqCst);
    }

    /// Make every call fail as if the network were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state
            .faults
            .unavailable
            .store(unavailable, Ordering::SeqCst);
    }

    /// Balance of `account`, if it exists
    pub fn balance_of(&self, account: &AccountId) -> Option<u64> {
        self.state.accounts.get(account).map(|entry| entry.balance)
    }

    /// Number of accounts on the ledger, operator included
    pub fn account_count(&self) -> usize {
        self.state.accounts.len()
    }

    fn insert_account(&self, id: AccountId, public_key: PublicKey, balance: u64) {
        self.state.accounts.insert(
            id,
            LedgerAccount {
                public_key,
                balance,
            },
        );
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    type Client = InMemoryClient;

    async fn authenticate(
        &self,
        account: &AccountId,
        key: &PrivateKey,
    ) -> Result<Self::Client, LedgerError> {
        self.state.check_available()?;

        let authorized = self
            .state
            .accounts
            .get(account)
            .is_some_and(|entry| entry.public_key == key.public_key());
        if !authorized {
            return Err(LedgerError::Unauthorized {
                account: account.to_string(),
            });
        }

        Ok(InMemoryClient {
            state: Arc::clone(&self.state),
            operator: *account,
        })
    }
}

/// Authorization context on an [`InMemoryLedger`]
#[derive(Debug)]
pub struct InMemoryClient {
    state: Arc<LedgerState>,
    operator: AccountId,
}

#[async_trait]
impl LedgerClient for InMemoryClient {
    fn operator(&self) -> AccountId {
        self.operator
    }

    async fn submit_transfer(
        &self,
        sender: &AccountId,
        receiver: &AccountId,
        amount: u64,
    ) -> Result<TransactionId, LedgerError> {
        const OPERATION: &str = "transfer";
        self.state.check_available()?;

        // Only the authenticated account may sign for its own funds
        if *sender != self.operator {
            return Err(LedgerError::rejected(OPERATION, "INVALID_SIGNATURE"));
        }
        if FaultPlan::take(&self.state.faults.reject_submissions) {
            return Err(LedgerError::rejected(OPERATION, "BUSY"));
        }
        if !self.state.accounts.contains_key(receiver) {
            return Err(LedgerError::rejected(OPERATION, "INVALID_ACCOUNT_ID"));
        }

        self.state
            .debit(sender, amount, "INSUFFICIENT_ACCOUNT_BALANCE", OPERATION)?;
        if let Some(mut entry) = self.state.accounts.get_mut(receiver) {
            entry.balance = entry.balance.saturating_add(amount);
        }

        let transaction_id = self.state.next_transaction(self.operator);
        let consensus_timestamp = self.state.consensus_timestamp();
        let record = TransactionRecord {
            transaction_id,
            sender: *sender,
            receiver: *receiver,
            amount,
            consensus_timestamp,
        };

        self.state.records.entry(*sender).or_default().push(record.clone());
        if sender != receiver {
            self.state.records.entry(*receiver).or_default().push(record);
        }
        self.state.receipts.insert(
            transaction_id,
            TransactionReceipt {
                transaction_id,
                account_id: None,
                consensus_timestamp,
            },
        );

        Ok(transaction_id)
    }

    async fn get_receipt(
        &self,
        transaction: &TransactionId,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.state.check_available()?;

        if FaultPlan::take(&self.state.faults.timeout_receipts) {
            return Err(LedgerError::Timeout {
                operation: "get_receipt".to_string(),
                after_ms: self.state.confirmation_delay_ms.load(Ordering::Relaxed),
            });
        }

        self.state
            .receipts
            .get(transaction)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LedgerError::not_found(format!("receipt for {}", transaction)))
    }

    async fn create_account(
        &self,
        public_key: &PublicKey,
        initial_balance: u64,
    ) -> Result<TransactionId, LedgerError> {
        self.state.check_available()?;

        self.state.debit(
            &self.operator,
            initial_balance,
            "INSUFFICIENT_PAYER_BALANCE",
            "create_account",
        )?;

        let account_id = AccountId::new(self.state.next_account.fetch_add(1, Ordering::Relaxed));
        self.state.accounts.insert(
            account_id,
            LedgerAccount {
                public_key: *public_key,
                balance: initial_balance,
            },
        );

        let transaction_id = self.state.next_transaction(self.operator);
        self.state.receipts.insert(
            transaction_id,
            TransactionReceipt {
                transaction_id,
                account_id: Some(account_id),
                consensus_timestamp: self.state.consensus_timestamp(),
            },
        );

        Ok(transaction_id)
    }

    async fn account_balance(&self, account: &AccountId) -> Result<u64, LedgerError> {
        self.state.check_query()?;

        self.state
            .accounts
            .get(account)
            .map(|entry| entry.balance)
            .ok_or_else(|| LedgerError::not_found(format!("account {}", account)))
    }

    async fn account_records(
        &self,
        account: &AccountId,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.state.check_query()?;

        if !self.state.accounts.contains_key(account) {
            return Err(LedgerError::not_found(format!("account {}", account)));
        }
        Ok(self
            .state
            .records
            .get(account)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
