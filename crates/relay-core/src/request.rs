//! Typed request parameters, one variant per endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::Endpoint;

/// Parameters for `paginatedTransactions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedRequestParams {
    /// Zero-based page number. Absent means the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Parameters for `transactionsByEmployee`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestByEmployeeParams {
    /// Employee whose transactions are requested.
    pub employee_id: String,
}

/// Parameters for `setTransactionApproval`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTransactionApprovalParams {
    /// Transaction to update.
    pub transaction_id: String,
    /// New approval state.
    pub value: bool,
}

/// A request against a registered endpoint.
///
/// Each variant carries exactly the parameters its endpoint accepts, so
/// callers cannot pair an endpoint with the wrong parameter shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "endpoint", content = "params", rename_all = "camelCase")]
pub enum EndpointRequest {
    /// List all employees.
    Employees,
    /// Fetch one page of transactions.
    PaginatedTransactions(PaginatedRequestParams),
    /// Fetch all transactions of one employee.
    TransactionsByEmployee(RequestByEmployeeParams),
    /// Set the approval flag of one transaction.
    SetTransactionApproval(SetTransactionApprovalParams),
}

impl EndpointRequest {
    /// Request a page of transactions.
    pub fn page(page: u32) -> Self {
        Self::PaginatedTransactions(PaginatedRequestParams { page: Some(page) })
    }

    /// Request the transactions of an employee.
    pub fn by_employee(employee_id: impl Into<String>) -> Self {
        Self::TransactionsByEmployee(RequestByEmployeeParams {
            employee_id: employee_id.into(),
        })
    }

    /// Request an approval change.
    pub fn set_approval(transaction_id: impl Into<String>, value: bool) -> Self {
        Self::SetTransactionApproval(SetTransactionApprovalParams {
            transaction_id: transaction_id.into(),
            value,
        })
    }

    /// Get the endpoint this request targets.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Employees => Endpoint::Employees,
            Self::PaginatedTransactions(_) => Endpoint::PaginatedTransactions,
            Self::TransactionsByEmployee(_) => Endpoint::TransactionsByEmployee,
            Self::SetTransactionApproval(_) => Endpoint::SetTransactionApproval,
        }
    }

    /// Get the request parameters as a JSON object.
    ///
    /// The object is the serde form of the parameter struct, so it always
    /// matches the wire format. Returns `None` when the request carries no
    /// parameters.
    pub fn params(&self) -> Option<Value> {
        match self {
            Self::Employees => None,
            Self::PaginatedTransactions(p) if p.page.is_none() => None,
            Self::PaginatedTransactions(p) => serde_json::to_value(p).ok(),
            Self::TransactionsByEmployee(p) => serde_json::to_value(p).ok(),
            Self::SetTransactionApproval(p) => serde_json::to_value(p).ok(),
        }
    }
}

impl From<PaginatedRequestParams> for EndpointRequest {
    fn from(params: PaginatedRequestParams) -> Self {
        Self::PaginatedTransactions(params)
    }
}

impl From<RequestByEmployeeParams> for EndpointRequest {
    fn from(params: RequestByEmployeeParams) -> Self {
        Self::TransactionsByEmployee(params)
    }
}

impl From<SetTransactionApprovalParams> for EndpointRequest {
    fn from(params: SetTransactionApprovalParams) -> Self {
        Self::SetTransactionApproval(params)
    }
}
