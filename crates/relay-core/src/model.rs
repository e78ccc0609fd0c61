//! Domain records served by the endpoints.

use serde::{Deserialize, Serialize};

/// An employee who owns transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    /// Create a new employee.
    pub fn new(id: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A card transaction awaiting (or past) approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub employee: Employee,
    pub merchant: String,
    pub date: String,
    pub approved: bool,
}

/// A page of results with a cursor to the next page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: T,
    /// Next page number, or `None` on the last page.
    pub next_page: Option<u32>,
}

impl<T> PaginatedResponse<T> {
    /// Check if there are more pages.
    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }
}
