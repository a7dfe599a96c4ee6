//! Cached hooks against a mock API.

mod common;

use std::time::Duration;

use common::{client_json, harness, machine_json, page_json};
use intersul_console::hooks::{CatalogHooks, ClientHooks, SERVICE_DETAIL, SERVICES_PREFIX};
use intersul_console::{ErrorKind, MemoryStorage};
use intersul_query::{QueryOptions, query_key};
use intersul_types::{
    ClientQuery, CreateCatalogRequest, CreateStepRequest, UpdateCatalogRequest,
    UpdateClientRequest,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn catalog_request(model: &str) -> CreateCatalogRequest {
    serde_json::from_value(json!({"model": model, "manufacturer": "Ricoh"})).unwrap()
}

fn ids(page: &Value) -> Vec<i64> {
    page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Clients
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_client_list_is_served_from_cache() {
    let h = harness(MemoryStorage::new()).await;
    Mock::given(method("GET"))
        .and(path("/clients"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([client_json(1, "Gráfica Sul")])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let query = ClientQuery::default();
    let first = h.ctx.clients().list(&query).await.unwrap();
    let second = h.ctx.clients().list(&query).await.unwrap();
    assert_eq!(first, second);
    assert!(h.ctx.cache().is_fresh(&ClientHooks::list_key(&query)).await);
}

#[tokio::test]
async fn test_short_search_never_fetches() {
    let h = harness(MemoryStorage::new()).await;
    Mock::given(method("GET"))
        .and(path("/clients/search"))
        .and(query_param("q", "gr"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([client_json(1, "Gráfica Sul")])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.ctx.clients().search("g").await.unwrap().is_empty());
    assert!(h.ctx.clients().search("").await.unwrap().is_empty());
    assert_eq!(h.ctx.clients().search("gr").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_client_update_writes_detail_and_invalidates_list() {
    let h = harness(MemoryStorage::new()).await;
    Mock::given(method("GET"))
        .and(path("/clients"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([client_json(7, "Gráfica Sul")])),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/clients/7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(client_json(7, "Gráfica Sul Ltda")),
        )
        .mount(&h.server)
        .await;

    let query = ClientQuery::default();
    h.ctx.clients().list(&query).await.unwrap();

    let request = UpdateClientRequest {
        name: Some("Gráfica Sul Ltda".to_string()),
        ..Default::default()
    };
    let updated = h.ctx.clients().update(7, &request).await.unwrap();
    assert_eq!(updated.name, "Gráfica Sul Ltda");

    let detail = h.ctx.cache().get(&ClientHooks::detail_key(7)).await.unwrap();
    assert_eq!(detail["name"], "Gráfica Sul Ltda");
    assert!(!h.ctx.cache().is_fresh(&ClientHooks::list_key(&query)).await);
}

#[tokio::test]
async fn test_client_delete_removes_detail() {
    let h = harness(MemoryStorage::new()).await;
    Mock::given(method("GET"))
        .and(path("/clients/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_json(7, "Gráfica Sul")))
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/clients/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    h.ctx.clients().get(7).await.unwrap();
    assert!(h.ctx.cache().contains(&ClientHooks::detail_key(7)).await);

    h.ctx.clients().delete(7).await.unwrap();
    assert!(!h.ctx.cache().contains(&ClientHooks::detail_key(7)).await);
}

#[tokio::test]
async fn test_failed_client_create_leaves_cache_alone() {
    let h = harness(MemoryStorage::new()).await;
    Mock::given(method("POST"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&h.server)
        .await;

    let key = query_key!["clients", "stats"];
    h.ctx
        .cache()
        .set_entry_with(
            key.clone(),
            json!({"total": 1, "active": 1, "inactive": 0, "suspended": 0}),
            QueryOptions::new().stale_time(Duration::from_secs(300)),
        )
        .await;

    let request = serde_json::from_value(json!({"name": "Nova", "email": "nova@example.com"}))
        .unwrap();
    let err = h.ctx.clients().create(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
    assert!(h.ctx.cache().is_fresh(&key).await);
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

async fn mount_catalog_page(h: &common::Harness, records: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/copy-machines/catalog"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(records)))
        .mount(&h.server)
        .await;
}

#[tokio::test]
async fn test_catalog_create_failure_rolls_back() {
    let h = harness(MemoryStorage::new()).await;
    mount_catalog_page(&h, vec![machine_json(1, "MP 2014")]).await;
    Mock::given(method("POST"))
        .and(path("/copy-machines/catalog"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .expect(1)
        .mount(&h.server)
        .await;

    h.ctx.catalog().list(None, 1, 10).await.unwrap();
    let key = CatalogHooks::list_key(None, 1, 10);
    let before = h.ctx.cache().get(&key).await.unwrap();

    let err = h
        .ctx
        .catalog()
        .create(&catalog_request("IM 430"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(h.ctx.cache().get(&key).await.unwrap(), before);
}

#[tokio::test]
async fn test_catalog_create_success_reconciles() {
    let h = harness(MemoryStorage::new()).await;
    mount_catalog_page(&h, vec![machine_json(1, "MP 2014")]).await;
    Mock::given(method("POST"))
        .and(path("/copy-machines/catalog"))
        .respond_with(ResponseTemplate::new(201).set_body_json(machine_json(40, "IM 430")))
        .mount(&h.server)
        .await;

    h.ctx.catalog().list(None, 1, 10).await.unwrap();
    let created = h.ctx.catalog().create(&catalog_request("IM 430")).await.unwrap();
    assert_eq!(created.id, 40);

    let key = CatalogHooks::list_key(None, 1, 10);
    let page = h.ctx.cache().get(&key).await.unwrap();
    let page_ids = ids(&page);
    assert!(page_ids.contains(&40));
    assert!(page_ids.iter().all(|id| *id > 0));
    assert!(!h.ctx.cache().is_fresh(&key).await);
    assert!(h.ctx.cache().contains(&CatalogHooks::detail_key(40)).await);
}

#[tokio::test]
async fn test_catalog_update_and_delete() {
    let h = harness(MemoryStorage::new()).await;
    mount_catalog_page(&h, vec![machine_json(1, "MP 2014"), machine_json(2, "MP 3054")]).await;
    Mock::given(method("PATCH"))
        .and(path("/copy-machines/catalog/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machine_json(1, "MP 2014 SP")))
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/copy-machines/catalog/2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&h.server)
        .await;

    h.ctx.catalog().list(None, 1, 10).await.unwrap();

    let patch: UpdateCatalogRequest = serde_json::from_value(json!({"model": "MP 2014 SP"})).unwrap();
    h.ctx.catalog().update(1, &patch).await.unwrap();
    let detail = h.ctx.cache().get(&CatalogHooks::detail_key(1)).await.unwrap();
    assert_eq!(detail["model"], "MP 2014 SP");

    h.ctx.catalog().delete(2).await.unwrap();
    let page = h
        .ctx
        .cache()
        .get(&CatalogHooks::list_key(None, 1, 10))
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![1]);
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["model"], "MP 2014 SP");
}

#[test]
fn test_empty_search_shares_the_unfiltered_key() {
    assert_eq!(
        CatalogHooks::list_key(Some(""), 1, 10),
        CatalogHooks::list_key(None, 1, 10)
    );
    assert_ne!(
        CatalogHooks::list_key(Some("ricoh"), 1, 10),
        CatalogHooks::list_key(None, 1, 10)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Services and dashboard
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_step_changes_invalidate_service_keys() {
    let h = harness(MemoryStorage::new()).await;
    Mock::given(method("POST"))
        .and(path("/services/3/steps"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 9, "title": "Trocar toner"})),
        )
        .mount(&h.server)
        .await;

    let fresh = QueryOptions::new().stale_time(Duration::from_secs(300));
    let detail = query_key![SERVICE_DETAIL, 3u32];
    let list = query_key![SERVICES_PREFIX, 3u32];
    for key in [&detail, &list] {
        h.ctx
            .cache()
            .set_entry_with(key.clone(), json!({"id": 3}), fresh)
            .await;
    }

    let request: CreateStepRequest =
        serde_json::from_value(json!({"title": "Trocar toner"})).unwrap();
    let step = h.ctx.services().create_step(3, &request).await.unwrap();
    assert_eq!(step.id, 9);

    assert!(!h.ctx.cache().is_fresh(&detail).await);
    assert!(!h.ctx.cache().is_fresh(&list).await);
}

async fn mount_stats(h: &common::Harness, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&h.server)
        .await;
}

#[tokio::test]
async fn test_dashboard_aggregates_stats() {
    let h = harness(MemoryStorage::new()).await;
    mount_stats(
        &h,
        "/clients/stats",
        json!({"total": 12, "active": 10, "inactive": 1, "suspended": 1}),
    )
    .await;
    mount_stats(
        &h,
        "/services/stats",
        json!({"total": 30, "pending": 5, "in_progress": 4, "completed": 20, "cancelled": 1}),
    )
    .await;
    mount_stats(&h, "/users/stats", json!({"total": 6, "active": 5, "inactive": 1})).await;
    mount_stats(
        &h,
        "/copy-machines/stats",
        json!({
            "total_machines": 40,
            "active_machines": 35,
            "maintenance_required": 2,
            "total_clients": 12,
            "average_machines_per_client": 3.3
        }),
    )
    .await;

    let stats = h.ctx.dashboard().stats().await.unwrap();
    assert_eq!(stats.clients.total, 12);
    assert_eq!(stats.services.completed, 20);
    assert_eq!(stats.users.active, 5);
    assert_eq!(stats.copy_machines.total_machines, 40);

    // Cached: each endpoint is hit once.
    h.ctx.dashboard().stats().await.unwrap();
}

#[tokio::test]
async fn test_dashboard_tolerates_missing_fleet_stats() {
    let h = harness(MemoryStorage::new()).await;
    mount_stats(
        &h,
        "/clients/stats",
        json!({"total": 12, "active": 10, "inactive": 1, "suspended": 1}),
    )
    .await;
    mount_stats(
        &h,
        "/services/stats",
        json!({"total": 0, "pending": 0, "in_progress": 0, "completed": 0, "cancelled": 0}),
    )
    .await;
    mount_stats(&h, "/users/stats", json!({"total": 1, "active": 1, "inactive": 0})).await;
    Mock::given(method("GET"))
        .and(path("/copy-machines/stats"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.server)
        .await;

    let stats = h.ctx.dashboard().stats().await.unwrap();
    assert_eq!(stats.copy_machines.total_machines, 0);
    assert_eq!(stats.copy_machines.total_clients, 12);
}
