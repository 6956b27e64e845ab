//! Workload description types

/// A reachable member of the ledger network
///
/// Descriptive only; all operations address the network through one client handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub url: String,
}

/// Shape of a query workload: which endpoint and how many repetitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub url: String,
    pub times: usize,
}
