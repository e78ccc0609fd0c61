//! In-memory transport serving employees and transactions.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use relay_core::{
    Employee, Endpoint, EndpointRequest, PaginatedResponse, Transaction, TransportConfig,
};
use serde_json::Value;
use tracing::debug;

use crate::transport::{FetchError, Transport};

#[derive(Debug)]
struct MockData {
    employees: Vec<Employee>,
    transactions: Vec<Transaction>,
}

/// Transport backed by an in-memory data set.
///
/// Supports simulated latency, forced per-endpoint failures and counts every
/// call it receives.
#[derive(Debug)]
pub struct MockTransport {
    data: Mutex<MockData>,
    calls: Mutex<BTreeMap<Endpoint, usize>>,
    config: TransportConfig,
}

impl MockTransport {
    /// Create a transport over the built-in fixture.
    pub fn new(config: TransportConfig) -> Self {
        let (employees, transactions) = fixture();
        Self::with_data(employees, transactions, config)
    }

    /// Create a transport over the given records.
    pub fn with_data(employees: Vec<Employee>, transactions: Vec<Transaction>, config: TransportConfig) -> Self {
        Self {
            data: Mutex::new(MockData {
                employees,
                transactions,
            }),
            calls: Mutex::new(BTreeMap::new()),
            config,
        }
    }

    fn data(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of calls received for an endpoint.
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&endpoint)
            .copied()
            .unwrap_or(0)
    }

    /// Total number of calls received.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).values().sum()
    }

    /// Current state of a transaction, bypassing any cache.
    pub fn transaction(&self, id: &str) -> Option<Transaction> {
        self.data().transactions.iter().find(|tx| tx.id == id).cloned()
    }

    fn record_call(&self, endpoint: Endpoint) {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(endpoint)
            .or_insert(0) += 1;
    }

    fn resolve(&self, request: &EndpointRequest) -> Result<Value, FetchError> {
        match request {
            EndpointRequest::Employees => Ok(serde_json::to_value(&self.data().employees)?),

            EndpointRequest::PaginatedTransactions(params) => {
                let page = params.page.unwrap_or(0);
                let response = paginate(&self.data().transactions, page, self.config.page_size)?;
                Ok(serde_json::to_value(response)?)
            }

            EndpointRequest::TransactionsByEmployee(params) => {
                if params.employee_id.is_empty() {
                    return Err(FetchError::InvalidRequest("employee id is required".to_string()));
                }
                let data = self.data();
                let matching: Vec<&Transaction> = data
                    .transactions
                    .iter()
                    .filter(|tx| tx.employee.id == params.employee_id)
                    .collect();
                Ok(serde_json::to_value(matching)?)
            }

            EndpointRequest::SetTransactionApproval(params) => {
                let mut data = self.data();
                let transaction = data
                    .transactions
                    .iter_mut()
                    .find(|tx| tx.id == params.transaction_id)
                    .ok_or_else(|| {
                        FetchError::InvalidRequest(format!("unknown transaction: {}", params.transaction_id))
                    })?;
                transaction.approved = params.value;
                Ok(Value::Null)
            }
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, request: &EndpointRequest) -> Result<Value, FetchError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        let endpoint = request.endpoint();
        self.record_call(endpoint);
        debug!(%endpoint, params = ?request.params(), "mock transport call");

        if self.config.fail_endpoints.contains(&endpoint) {
            return Err(FetchError::Unavailable(endpoint));
        }

        self.resolve(request)
    }
}

fn paginate(
    transactions: &[Transaction],
    page: u32,
    page_size: usize,
) -> Result<PaginatedResponse<Vec<Transaction>>, FetchError> {
    let page_size = page_size.max(1);
    let start = (page as usize).saturating_mul(page_size);

    if start >= transactions.len() && page > 0 {
        return Err(FetchError::InvalidRequest(format!("page {} out of range", page)));
    }

    let end = start.saturating_add(page_size).min(transactions.len());
    let next_page = (end < transactions.len()).then_some(page + 1);

    Ok(PaginatedResponse {
        data: transactions[start.min(end)..end].to_vec(),
        next_page,
    })
}

fn fixture() -> (Vec<Employee>, Vec<Transaction>) {
    let employees = vec![
        Employee::new("E1", "Ada", "Lovelace"),
        Employee::new("E2", "Grace", "Hopper"),
        Employee::new("E3", "Alan", "Turing"),
    ];
    let merchants = ["Social Media Ads Inc", "Linear", "Figma", "Uber Eats"];

    let transactions = (1..=12)
        .map(|n: usize| Transaction {
            id: format!("T{}", n),
            amount: (n * 37 % 500) as f64 + 0.99,
            employee: employees[(n - 1) % employees.len()].clone(),
            merchant: merchants[n % merchants.len()].to_string(),
            date: format!("2026-01-{:02}", n),
            approved: n % 3 == 0,
        })
        .collect();

    (employees, transactions)
}
