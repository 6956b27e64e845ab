//! Error types for the ledger benchmark driver
//!
//! Two layers of errors live here:
//!
//! - [`LedgerError`] is what the ledger capability reports (the SDK/network side).
//! - [`BenchError`] is the driver's own taxonomy. Every component maps ledger
//!   failures into it at its boundary.
//!
//! # Error Categories
//!
//! - **Provisioning Errors**: account creation or operator bootstrap failed. Fatal to a run.
//! - **Dispatch Errors**: a transfer was rejected or timed out. Logged, the run continues.
//! - **Query Errors**: a read against ledger state failed. Logged, the run continues.
//! - **Aggregation Errors**: degenerate metric inputs (zero duration, empty series).
//! - **Ambient Errors**: configuration, credentials, I/O and CSV output.

use thiserror::Error;

/// Failure reported by the ledger capability
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The network did not answer in time
    #[error("{operation} timed out after {after_ms}ms")]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// How long the capability waited
        after_ms: u64,
    },

    /// The network refused the operation with a status code
    #[error("{operation} rejected with status {status}")]
    Rejected {
        /// Operation that was rejected
        operation: String,
        /// Ledger status code (e.g. `INSUFFICIENT_PAYER_BALANCE`)
        status: String,
    },

    /// The referenced account or transaction does not exist
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing entity
        what: String,
    },

    /// The credential pair was not accepted
    #[error("Credentials rejected for account {account}")]
    Unauthorized {
        /// Account the caller tried to authenticate as
        account: String,
    },

    /// Transport-level failure
    #[error("Ledger unavailable: {message}")]
    Unavailable {
        /// Description of the transport failure
        message: String,
    },
}

impl LedgerError {
    /// Create a Rejected error
    pub fn rejected(operation: &str, status: &str) -> Self {
        LedgerError::Rejected {
            operation: operation.to_string(),
            status: status.to_string(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(what: impl Into<String>) -> Self {
        LedgerError::NotFound { what: what.into() }
    }
}

/// Main error type for the benchmark driver
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BenchError {
    /// Account creation or operator bootstrap failed
    ///
    /// This is a fatal error. Accounts created before the failure stay valid.
    #[error("Provisioning failed{}: {source}", .index.map(|i| format!(" at account {}", i)).unwrap_or_default())]
    Provisioning {
        /// Position in the requested batch (if the failure happened in a batch)
        index: Option<usize>,
        /// Underlying ledger failure
        source: LedgerError,
    },

    /// Operator credentials were not supplied
    #[error("Missing operator credential: {name}")]
    MissingCredential {
        /// Name of the missing value (e.g. `OPERATOR_ID`)
        name: String,
    },

    /// A credential or identifier could not be parsed
    #[error("Invalid {what} '{value}': {reason}")]
    InvalidCredential {
        /// Kind of value being parsed
        what: String,
        /// Offending input (never key material)
        value: String,
        /// Why the value was refused
        reason: String,
    },

    /// A transfer was not confirmed in time
    #[error("Dispatch timed out in {operation}: {source}")]
    DispatchTimeout {
        /// Delivery policy that observed the timeout
        operation: String,
        /// Underlying ledger failure
        source: LedgerError,
    },

    /// A transfer was refused by the ledger
    #[error("Dispatch rejected in {operation}: {source}")]
    DispatchRejected {
        /// Delivery policy that observed the rejection
        operation: String,
        /// Underlying ledger failure
        source: LedgerError,
    },

    /// Absolute sender index does not exist in the pool
    #[error("No sender at index {index} (pool size {pool_size})")]
    UnknownSender {
        /// Requested index
        index: usize,
        /// Number of provisioned senders
        pool_size: usize,
    },

    /// Round-robin dispatch was asked to choose from zero senders
    #[error("Sender pool is empty")]
    EmptySenderPool,

    /// Consensus timestamp precedes the submission timestamp
    #[error("Consensus timestamp is {skew_ms}ms before submission")]
    ClockSkew {
        /// How far the consensus timestamp lies in the past
        skew_ms: u128,
    },

    /// A read against ledger state failed
    #[error("Query {operation} failed for account {account}: {source}")]
    Query {
        /// Query that failed
        operation: String,
        /// Account the query targeted
        account: String,
        /// Underlying ledger failure
        source: LedgerError,
    },

    /// Degenerate time-series input to the metrics aggregator
    #[error("Cannot aggregate metrics: {message}")]
    Aggregation {
        /// Description of the degenerate input
        message: String,
    },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV report could not be written
    #[error("CSV error: {message}")]
    Csv {
        /// Description of the CSV error
        message: String,
    },
}

impl From<std::io::Error> for BenchError {
    fn from(error: std::io::Error) -> Self {
        BenchError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for BenchError {
    fn from(error: csv::Error) -> Self {
        BenchError::Csv {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(error: serde_json::Error) -> Self {
        BenchError::Config {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl BenchError {
    /// Create a Provisioning error
    pub fn provisioning(index: Option<usize>, source: LedgerError) -> Self {
        BenchError::Provisioning { index, source }
    }

    /// Map a ledger failure seen while dispatching into the dispatch taxonomy
    ///
    /// Timeouts stay timeouts; every other ledger failure counts as a rejection.
    pub fn dispatch(operation: &str, source: LedgerError) -> Self {
        match source {
            LedgerError::Timeout { .. } => BenchError::DispatchTimeout {
                operation: operation.to_string(),
                source,
            },
            _ => BenchError::DispatchRejected {
                operation: operation.to_string(),
                source,
            },
        }
    }

    /// Create a Query error
    pub fn query(operation: &str, account: impl ToString, source: LedgerError) -> Self {
        BenchError::Query {
            operation: operation.to_string(),
            account: account.to_string(),
            source,
        }
    }

    /// Create an Aggregation error
    pub fn aggregation(message: impl Into<String>) -> Self {
        BenchError::Aggregation {
            message: message.into(),
        }
    }

    /// Create a Config error
    pub fn config(message: impl Into<String>) -> Self {
        BenchError::Config {
            message: message.into(),
        }
    }

    /// Create a MissingCredential error
    pub fn missing_credential(name: &str) -> Self {
        BenchError::MissingCredential {
            name: name.to_string(),
        }
    }

    /// Create an InvalidCredential error
    pub fn invalid_credential(what: &str, value: &str, reason: impl Into<String>) -> Self {
        BenchError::InvalidCredential {
            what: what.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error belongs to the dispatch category
    pub fn is_dispatch(&self) -> bool {
        matches!(
            self,
            BenchError::DispatchTimeout { .. }
                | BenchError::DispatchRejected { .. }
                | BenchError::UnknownSender { .. }
                | BenchError::EmptySenderPool
                | BenchError::ClockSkew { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::provisioning_in_batch(
        BenchError::provisioning(Some(3), LedgerError::rejected("create_account", "INSUFFICIENT_PAYER_BALANCE")),
        "Provisioning failed at account 3: create_account rejected with status INSUFFICIENT_PAYER_BALANCE"
    )]
    #[case::provisioning_bootstrap(
        BenchError::provisioning(None, LedgerError::Unauthorized { account: "0.0.2".to_string() }),
        "Provisioning failed: Credentials rejected for account 0.0.2"
    )]
    #[case::missing_credential(
        BenchError::missing_credential("OPERATOR_KEY"),
        "Missing operator credential: OPERATOR_KEY"
    )]
    #[case::unknown_sender(
        BenchError::UnknownSender { index: 7, pool_size: 4 },
        "No sender at index 7 (pool size 4)"
    )]
    #[case::query(
        BenchError::query("get_balance", "0.0.1001", LedgerError::not_found("account 0.0.1001")),
        "Query get_balance failed for account 0.0.1001: account 0.0.1001 not found"
    )]
    #[case::aggregation(
        BenchError::aggregation("duration is zero"),
        "Cannot aggregate metrics: duration is zero"
    )]
    #[case::clock_skew(
        BenchError::ClockSkew { skew_ms: 250 },
        "Consensus timestamp is 250ms before submission"
    )]
    fn test_error_display(#[case] error: BenchError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::timeout(
        LedgerError::Timeout { operation: "get_receipt".to_string(), after_ms: 30_000 },
        true
    )]
    #[case::rejected(LedgerError::rejected("transfer", "BUSY"), false)]
    #[case::unavailable(LedgerError::Unavailable { message: "connection reset".to_string() }, false)]
    fn test_dispatch_mapping(#[case] source: LedgerError, #[case] is_timeout: bool) {
        let error = BenchError::dispatch("send_and_wait", source);
        assert!(error.is_dispatch());
        assert_eq!(
            matches!(error, BenchError::DispatchTimeout { .. }),
            is_timeout
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: BenchError = io_error.into();
        assert!(matches!(error, BenchError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }

    #[test]
    fn test_query_error_is_not_dispatch() {
        let error = BenchError::query("get_history", "0.0.5", LedgerError::not_found("x"));
        assert!(!error.is_dispatch());
    }
}
