//! Transaction-related types for the ledger benchmark driver
//!
//! This module defines the identifiers, receipts and records the ledger
//! capability returns for submitted operations.

use super::account::AccountId;
use std::fmt;
use std::time::SystemTime;

/// Identifier of a submitted ledger operation
///
/// Unique per payer; displayed as `payer@nonce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId {
    /// Account that paid for (and signed) the operation
    pub payer: AccountId,
    /// Ledger-assigned sequence number
    pub nonce: u64,
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.payer, self.nonce)
    }
}

/// Confirmation record for a submitted operation
///
/// Obtained by awaiting the receipt of a pending transaction. Account
/// creations carry the newly assigned `account_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_id: TransactionId,

    /// New account id (account creation only)
    pub account_id: Option<AccountId>,

    /// Time at which the network reached consensus on the operation
    pub consensus_timestamp: SystemTime,
}

/// Historical record of a confirmed transfer touching an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub sender: AccountId,
    pub receiver: AccountId,
    /// Amount in the ledger's smallest unit
    pub amount: u64,
    pub consensus_timestamp: SystemTime,
}
