//! Scripted session against the mock transport.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use relay_cache::CacheKey;
use relay_core::{
    CacheConfig, Employee, Endpoint, EndpointRequest, PaginatedResponse, RelayConfig, Transaction,
};
use relay_data::{AppContext, CachingClient, MockTransport};
use relay_observability::CacheMetrics;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::DemoArgs;
use crate::context::Context;
use crate::output::{source_badge, truncate, Output};

const TOTAL_STEPS: usize = 8;

/// One fetch performed by the session.
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub key: String,
    pub from_cache: bool,
}

/// Result of a demo session.
#[derive(Debug, Clone, Serialize)]
pub struct DemoSummary {
    pub cache_enabled: bool,
    pub steps: Vec<StepSummary>,
    pub approved_in_page: Option<bool>,
    pub approved_in_listing: Option<bool>,
    pub cleared: usize,
    pub remaining_keys: Vec<String>,
    pub transport_calls: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<CacheMetrics>,
}

/// Run the demo command.
pub async fn run(args: DemoArgs, ctx: &Context) -> Result<()> {
    let summary = run_session(&ctx.config, &args, &ctx.output).await?;

    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return Ok(());
    }

    ctx.output.header("Summary");
    ctx.output.kv(
        "transport calls",
        &summary.transport_calls.values().sum::<usize>().to_string(),
    );
    for (endpoint, calls) in &summary.transport_calls {
        ctx.output.list_item(&format!("{}: {}", endpoint, calls));
    }
    if let Some(metrics) = &summary.metrics {
        ctx.output.kv("cache", &metrics.to_human());
    }
    ctx.output.success("Demo complete");

    Ok(())
}

struct Session<'a> {
    client: CachingClient<MockTransport>,
    transport: Arc<MockTransport>,
    output: &'a Output,
    steps: Vec<StepSummary>,
    step: usize,
}

impl Session<'_> {
    async fn fetch<D: DeserializeOwned>(&mut self, label: &str, request: &EndpointRequest) -> Result<D> {
        self.step += 1;
        let before = self.transport.total_calls();
        let result = self.client.fetch_with_cache::<D>(request).await;
        let from_cache = self.transport.total_calls() == before;

        let key = CacheKey::for_request(request).into_string();
        self.output.step(
            self.step,
            TOTAL_STEPS,
            &format!("{} ({}) from {}", label, key, source_badge(from_cache)),
        );
        self.steps.push(StepSummary { key, from_cache });

        result.ok_or_else(|| self.failure(label))
    }

    async fn mutate(&mut self, label: &str, request: &EndpointRequest) -> Result<()> {
        self.step += 1;
        self.output.step(self.step, TOTAL_STEPS, label);
        self.client
            .fetch_without_cache::<()>(request)
            .await
            .ok_or_else(|| self.failure(label))
    }

    fn failure(&self, label: &str) -> anyhow::Error {
        match self.client.tracker().last_error() {
            Some(e) => anyhow!("{} failed: {}", label, e),
            None => anyhow!("{} failed", label),
        }
    }

    fn show_cache(&self) {
        let Some(store) = self.client.cache() else {
            self.output.kv("cache", "disabled");
            return;
        };
        for (key, payload) in store.snapshot() {
            self.output.list_item(&format!("{} = {}", key, truncate(&payload, 72)));
        }
    }
}

/// Run the scripted session and collect what happened.
pub async fn run_session(config: &RelayConfig, args: &DemoArgs, output: &Output) -> Result<DemoSummary> {
    let app = AppContext::new(&CacheConfig {
        enabled: config.cache.enabled && !args.no_cache,
    });
    let transport = Arc::new(MockTransport::new(config.transport.clone()));
    let approved = !args.unapprove;

    output.header("Relay demo");
    output.kv("cache", if app.cache().is_some() { "enabled" } else { "disabled" });

    let mut session = Session {
        client: app.client(Arc::clone(&transport)),
        transport: Arc::clone(&transport),
        output,
        steps: Vec::new(),
        step: 0,
    };

    let employees: Vec<Employee> = session.fetch("Employees", &EndpointRequest::Employees).await?;
    for employee in &employees {
        output.list_item(&format!("{} {}", employee.id, employee.full_name()));
    }

    let page_request = EndpointRequest::page(0);
    let page: PaginatedResponse<Vec<Transaction>> = session.fetch("Transactions page 0", &page_request).await?;
    output.kv("transactions", &page.data.len().to_string());
    output.kv("more pages", &page.has_next().to_string());
    let _: PaginatedResponse<Vec<Transaction>> = session.fetch("Transactions page 0 again", &page_request).await?;

    let listing_request = EndpointRequest::by_employee(args.employee.as_str());
    let listing: Vec<Transaction> = session
        .fetch(&format!("Transactions of {}", args.employee), &listing_request)
        .await?;
    output.kv("transactions", &listing.len().to_string());

    session
        .mutate(
            &format!("Set {} approved = {}", args.approve, approved),
            &EndpointRequest::set_approval(args.approve.as_str(), approved),
        )
        .await?;
    session.show_cache();

    let page: PaginatedResponse<Vec<Transaction>> = session.fetch("Transactions page 0 after approval", &page_request).await?;
    let approved_in_page = find_approved(&page.data, &args.approve);
    let listing: Vec<Transaction> = session.fetch("Employee transactions after approval", &listing_request).await?;
    let approved_in_listing = find_approved(&listing, &args.approve);
    output.kv("approved in page", &format!("{:?}", approved_in_page));
    output.kv("approved in listing", &format!("{:?}", approved_in_listing));

    session.step += 1;
    let cleared = session.client.clear_cache_by_endpoint(&[Endpoint::PaginatedTransactions]);
    output.step(session.step, TOTAL_STEPS, &format!("Cleared {} paginated entries", cleared));
    session.show_cache();

    let transport_calls = Endpoint::ALL
        .iter()
        .map(|endpoint| (endpoint.as_str().to_string(), transport.calls(*endpoint)))
        .filter(|(_, calls)| *calls > 0)
        .collect();

    Ok(DemoSummary {
        cache_enabled: app.cache().is_some(),
        steps: session.steps,
        approved_in_page,
        approved_in_listing,
        cleared,
        remaining_keys: app.cache().map(|store| store.keys()).unwrap_or_default(),
        transport_calls,
        metrics: app.cache().map(CacheMetrics::capture),
    })
}

fn find_approved(transactions: &[Transaction], id: &str) -> Option<bool> {
    transactions.iter().find(|tx| tx.id == id).map(|tx| tx.approved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> Output {
        Output::new(false, true)
    }

    fn sources(summary: &DemoSummary) -> Vec<bool> {
        summary.steps.iter().map(|step| step.from_cache).collect()
    }

    #[tokio::test]
    async fn test_session_with_cache() {
        let summary = run_session(&RelayConfig::default(), &DemoArgs::default(), &quiet())
            .await
            .unwrap();

        assert!(summary.cache_enabled);
        assert_eq!(sources(&summary), vec![false, false, true, false, true, true]);
        assert_eq!(summary.approved_in_page, Some(true));
        assert_eq!(summary.approved_in_listing, Some(true));
        assert_eq!(summary.cleared, 1);
        assert_eq!(
            summary.remaining_keys,
            vec![
                "employees".to_string(),
                r#"transactionsByEmployee@{"employeeId":"E1"}"#.to_string()
            ]
        );
        assert_eq!(summary.transport_calls.get("paginatedTransactions"), Some(&1));
        assert_eq!(summary.transport_calls.get("setTransactionApproval"), Some(&1));

        let metrics = summary.metrics.unwrap();
        assert_eq!(metrics.hits, 3);
        assert_eq!(metrics.misses, 3);
        assert_eq!(metrics.invalidated, 2);
    }

    #[tokio::test]
    async fn test_session_without_cache() {
        let args = DemoArgs {
            no_cache: true,
            ..DemoArgs::default()
        };
        let summary = run_session(&RelayConfig::default(), &args, &quiet()).await.unwrap();

        assert!(!summary.cache_enabled);
        assert!(sources(&summary).iter().all(|from_cache| !from_cache));
        assert_eq!(summary.approved_in_page, Some(true));
        assert_eq!(summary.cleared, 0);
        assert!(summary.remaining_keys.is_empty());
        assert!(summary.metrics.is_none());
        assert_eq!(summary.transport_calls.get("paginatedTransactions"), Some(&3));
    }

    #[tokio::test]
    async fn test_session_unapprove() {
        let args = DemoArgs {
            approve: "T3".to_string(),
            employee: "E3".to_string(),
            unapprove: true,
            ..DemoArgs::default()
        };
        let summary = run_session(&RelayConfig::default(), &args, &quiet()).await.unwrap();

        assert_eq!(summary.approved_in_page, Some(false));
        assert_eq!(summary.approved_in_listing, Some(false));
    }

    #[tokio::test]
    async fn test_session_reports_transport_failure() {
        let mut config = RelayConfig::default();
        config.transport.fail_endpoints = vec![Endpoint::Employees];

        let err = run_session(&config, &DemoArgs::default(), &quiet()).await.unwrap_err();
        assert_eq!(err.to_string(), "Employees failed: endpoint unavailable: employees");
    }
}
