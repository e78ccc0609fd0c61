//! Registered endpoint identifiers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown endpoint identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown endpoint: {0}")]
pub struct EndpointParseError(pub String);

/// A remote operation the transport knows how to resolve.
///
/// The string form is the stable identifier used as the first segment of
/// every cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    /// All employees.
    Employees,
    /// One page of transactions across all employees.
    PaginatedTransactions,
    /// Every transaction of a single employee.
    TransactionsByEmployee,
    /// Approve or reject a single transaction.
    SetTransactionApproval,
}

impl Endpoint {
    /// All registered endpoints.
    pub const ALL: [Endpoint; 4] = [
        Self::Employees,
        Self::PaginatedTransactions,
        Self::TransactionsByEmployee,
        Self::SetTransactionApproval,
    ];

    /// Get the endpoint identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::PaginatedTransactions => "paginatedTransactions",
            Self::TransactionsByEmployee => "transactionsByEmployee",
            Self::SetTransactionApproval => "setTransactionApproval",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.as_str() == s)
            .ok_or_else(|| EndpointParseError(s.to_string()))
    }
}
