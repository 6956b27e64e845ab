//! Ledger capability
//!
//! The driver never talks to a ledger network directly. It consumes this
//! capability-style interface, which a network SDK binding (or the in-process
//! [`InMemoryLedger`]) implements.
//!
//! # Components
//!
//! - [`Ledger`] - authenticates an identity and hands out a client context
//! - [`LedgerClient`] - operations performed under one authorization context
//! - [`memory`] - in-process implementation backed by DashMap

use async_trait::async_trait;

use crate::types::{
    AccountId, LedgerError, PrivateKey, PublicKey, TransactionId, TransactionReceipt,
    TransactionRecord,
};

pub mod memory;

pub use memory::{FaultPlan, InMemoryLedger};

/// Entry point to a ledger network
///
/// Each call to [`Ledger::authenticate`] produces an independent
/// authorization context. Contexts are not assumed to be safe to share
/// between concurrent operations.
#[async_trait]
pub trait Ledger: Send + Sync + 'static {
    /// Authorization context produced by `authenticate`
    type Client: LedgerClient + 'static;

    /// Establish a context acting as `account`, signing with `key`
    async fn authenticate(
        &self,
        account: &AccountId,
        key: &PrivateKey,
    ) -> Result<Self::Client, LedgerError>;
}

/// Operations available under one authorization context
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Account this context acts as
    fn operator(&self) -> AccountId;

    /// Submit a transfer of `amount` from `sender` to `receiver`
    ///
    /// Resolves once the network accepted the submission, not at consensus.
    async fn submit_transfer(
        &self,
        sender: &AccountId,
        receiver: &AccountId,
        amount: u64,
    ) -> Result<TransactionId, LedgerError>;

    /// Wait for the confirmation record of a submitted operation
    async fn get_receipt(
        &self,
        transaction: &TransactionId,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Submit creation of an account owned by `public_key`, funded by the operator
    async fn create_account(
        &self,
        public_key: &PublicKey,
        initial_balance: u64,
    ) -> Result<TransactionId, LedgerError>;

    /// Current balance of `account` in the smallest unit
    async fn account_balance(&self, account: &AccountId) -> Result<u64, LedgerError>;

    /// Transfer records touching `account`
    async fn account_records(
        &self,
        account: &AccountId,
    ) -> Result<Vec<TransactionRecord>, LedgerError>;
}
