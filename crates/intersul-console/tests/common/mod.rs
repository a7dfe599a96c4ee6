#![allow(dead_code)]

use std::sync::Arc;

use intersul_config::{ApiConfig, CacheSettings, ConsoleConfig};
use intersul_console::{AppContext, MemoryStorage, RecordingNavigator, StaticAppearance};
use serde_json::{Value, json};
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub ctx: AppContext,
    pub navigator: Arc<RecordingNavigator>,
    pub storage: Arc<MemoryStorage>,
}

pub async fn harness(storage: MemoryStorage) -> Harness {
    let server = MockServer::start().await;
    let config = ConsoleConfig {
        api: Some(ApiConfig {
            url: server.uri(),
            timeout_secs: 5,
        }),
        cache: Some(CacheSettings {
            enable_cleanup_task: false,
            ..Default::default()
        }),
        ..Default::default()
    };
    let storage = Arc::new(storage);
    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = AppContext::init(
        &config,
        storage.clone(),
        navigator.clone(),
        Arc::new(StaticAppearance::new(false)),
    )
    .unwrap();

    Harness {
        server,
        ctx,
        navigator,
        storage,
    }
}

pub fn user_json(role: &str) -> Value {
    json!({
        "id": 3,
        "name": "Ana Souza",
        "email": "ana@intersul.com.br",
        "role": role,
        "is_active": true,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

pub fn client_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("contato{}@example.com", id),
        "status": "active",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

pub fn machine_json(id: i64, model: &str) -> Value {
    json!({
        "id": id,
        "model": model,
        "manufacturer": "Ricoh",
        "features": [],
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

pub fn page_json(records: Vec<Value>) -> Value {
    let total = records.len();
    json!({
        "data": records,
        "total": total,
        "page": 1,
        "limit": 10,
        "total_pages": 1
    })
}
