#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopintel_core::Target;
use shopintel_normalizer::KeywordStructurer;
use shopintel_orchestrator::{CatalogDiscovery, CompetitorEntry, Orchestrator, OrchestratorConfig};
use shopintel_scraper::FetchConfig;

pub fn test_config(max_concurrent_targets: usize) -> OrchestratorConfig {
    OrchestratorConfig {
        fetch: FetchConfig {
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_millis(500),
            user_agent: "shopintel-test/0.1".to_owned(),
            max_retries: 0,
            backoff_base: Duration::ZERO,
            inter_request_delay: Duration::ZERO,
        },
        max_concurrent_targets,
        max_products: 1000,
        discovery_limit: 3,
    }
}

pub fn orchestrator(max_concurrent_targets: usize, catalog: Vec<CompetitorEntry>) -> Orchestrator {
    Orchestrator::new(
        test_config(max_concurrent_targets),
        Arc::new(KeywordStructurer),
        Arc::new(CatalogDiscovery::from_entries(catalog).expect("valid catalog")),
    )
}

pub fn target_for(server: &MockServer) -> Target {
    Target::parse(&server.uri()).expect("mock server uri is a valid target")
}

/// Mounts a minimal storefront: a homepage and a one-page catalog.
pub async fn mount_store(server: &MockServer, titles: &[&str], homepage_delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body><main>Shop</main></body></html>")
                .set_delay(homepage_delay),
        )
        .mount(server)
        .await;

    let products: Vec<_> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| json!({"id": i + 1, "title": title}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": products})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .mount(server)
        .await;
}

pub async fn store(titles: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    mount_store(&server, titles, Duration::ZERO).await;
    server
}
