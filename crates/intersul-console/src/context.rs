//! Application context: the shared state every hook works against.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use intersul_client::{ApiClient, AuthHooks};
use intersul_config::ConsoleConfig;
use intersul_query::{CacheConfig, QueryCache};
use intersul_session::{
    LOGIN_PATH, Navigator, SessionStore, Storage, SystemAppearance, ThemeStore,
};

use crate::error::Result;
use crate::hooks::{
    AuthHooksApi, CatalogHooks, CategoryHooks, ClientHooks, DashboardHooks, FranchiseHooks,
    InstalledMachineHooks, ServiceHooks, UserHooks,
};

/// Bridges the HTTP transport to the session.
///
/// Requests carry the session's token; a 401 signs the user out and sends
/// them to the login page.
pub struct SessionAuth {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionAuth {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl AuthHooks for SessionAuth {
    fn bearer_token(&self) -> Option<String> {
        self.session.token()
    }

    fn on_unauthorized(&self) {
        warn!("Request unauthorized, signing out");
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.navigator.navigate(LOGIN_PATH);
    }
}

/// Everything a console front end needs, built once at startup.
pub struct AppContext {
    config: ConsoleConfig,
    client: ApiClient,
    cache: QueryCache,
    session: Arc<SessionStore>,
    theme: Arc<ThemeStore>,
    navigator: Arc<dyn Navigator>,
    shutdown: CancellationToken,
    cleanup: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("client", &self.client)
            .field("session", &self.session)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build the context and restore persisted state.
    ///
    /// The cache cleanup task is only started when called inside a Tokio
    /// runtime.
    pub fn init(
        config: &ConsoleConfig,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
        appearance: Arc<dyn SystemAppearance>,
    ) -> Result<Self> {
        info!("Initializing console context");

        let session = Arc::new(SessionStore::new(storage.clone()));
        let restored = session.init()?;
        let theme = Arc::new(ThemeStore::new(storage, appearance));
        let theme_state = theme.init();
        debug!(
            state = ?restored.state,
            theme = %theme_state.theme,
            "Persisted state restored"
        );

        let settings = config.cache();
        let cache = QueryCache::new(
            CacheConfig::new()
                .with_max_entries(settings.max_entries)
                .with_cleanup_task(settings.enable_cleanup_task)
                .with_cleanup_interval(settings.cleanup_interval()),
        );

        let shutdown = CancellationToken::new();
        let cleanup = if tokio::runtime::Handle::try_current().is_ok() {
            cache.spawn_cleanup_task(shutdown.clone())
        } else {
            debug!("No runtime, cache cleanup task not started");
            None
        };

        let api = config.api();
        let client = ApiClient::builder()
            .base_url(&api.url)
            .timeout(api.timeout())
            .auth(Arc::new(SessionAuth::new(session.clone(), navigator.clone())))
            .build()?;

        Ok(Self {
            config: config.clone(),
            client,
            cache,
            session,
            theme,
            navigator,
            shutdown,
            cleanup: Mutex::new(cleanup),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn theme(&self) -> &Arc<ThemeStore> {
        &self.theme
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Hooks
    // ─────────────────────────────────────────────────────────────────────────

    pub fn auth(&self) -> AuthHooksApi {
        AuthHooksApi::new(self.client.clone(), self.cache.clone(), self.session.clone())
    }

    pub fn catalog(&self) -> CatalogHooks {
        CatalogHooks::new(self.client.clone(), self.cache.clone())
    }

    pub fn installed_machines(&self) -> InstalledMachineHooks {
        InstalledMachineHooks::new(self.client.clone(), self.cache.clone())
    }

    pub fn franchises(&self) -> FranchiseHooks {
        FranchiseHooks::new(self.client.clone(), self.cache.clone())
    }

    pub fn clients(&self) -> ClientHooks {
        ClientHooks::new(self.client.clone(), self.cache.clone())
    }

    pub fn services(&self) -> ServiceHooks {
        ServiceHooks::new(self.client.clone(), self.cache.clone())
    }

    pub fn users(&self) -> UserHooks {
        UserHooks::new(self.client.clone(), self.cache.clone())
    }

    pub fn categories(&self) -> CategoryHooks {
        CategoryHooks::new(self.client.clone(), self.cache.clone())
    }

    pub fn dashboard(&self) -> DashboardHooks {
        DashboardHooks::new(self.client.clone(), self.cache.clone())
    }

    /// Drop all cached data and stop background work.
    pub async fn teardown(&self) {
        self.shutdown.cancel();
        let cleanup = self.cleanup.lock().take();
        if let Some(handle) = cleanup
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Cache cleanup task ended abnormally");
        }
        self.cache.clear().await;
        self.session.teardown();
        info!("Console context torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intersul_session::{MemoryStorage, RecordingNavigator, SessionState, StaticAppearance};

    fn context() -> (AppContext, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::new());
        let ctx = AppContext::init(
            &ConsoleConfig::default(),
            Arc::new(MemoryStorage::new()),
            navigator.clone(),
            Arc::new(StaticAppearance::new(false)),
        )
        .unwrap();
        (ctx, navigator)
    }

    #[test]
    fn test_init_without_runtime() {
        let (ctx, _) = context();
        assert_eq!(ctx.session().snapshot().state, SessionState::Anonymous);
        assert_eq!(ctx.client().base_url().as_str(), "http://localhost:3000/");
    }

    #[tokio::test]
    async fn test_teardown_clears_cache() {
        let (ctx, _) = context();
        ctx.cache()
            .set_entry(intersul_query::query_key!["clients", 1u32], serde_json::json!({"id": 1}))
            .await;
        assert_eq!(ctx.cache().len().await, 1);

        ctx.teardown().await;
        assert!(ctx.cache().is_empty().await);
        assert_eq!(ctx.session().snapshot().state, SessionState::Uninitialized);
    }

    #[test]
    fn test_session_auth_signs_out_on_unauthorized() {
        let storage = Arc::new(MemoryStorage::new());
        let session = Arc::new(SessionStore::new(storage));
        let navigator = Arc::new(RecordingNavigator::new());
        let auth = SessionAuth::new(session.clone(), navigator.clone());

        auth.on_unauthorized();
        assert_eq!(session.snapshot().state, SessionState::Anonymous);
        assert_eq!(navigator.count(LOGIN_PATH), 1);
        assert_eq!(auth.bearer_token(), None);
    }
}
