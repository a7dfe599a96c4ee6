//! The signed-in identity and its lifecycle.
//!
//! ```text
//! Uninitialized ──init()──▶ Loading ──▶ Authenticated ◀──login()──┐
//!                                  └──▶ Anonymous ◀──logout()─────┘
//! ```
//!
//! The token and user are persisted through a [`Storage`] so a later run can
//! restore them. Observers subscribe to a `watch` channel of [`Session`]
//! snapshots.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use intersul_types::{User, UserPatch, UserRole};

use crate::error::Result;
use crate::storage::{Storage, TOKEN_KEY, USER_KEY};

/// Lifecycle state of a [`SessionStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
}

/// Snapshot of the session.
///
/// Role predicates are computed from the current user on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub state: SessionState,
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl Session {
    fn initial() -> Self {
        Self {
            state: SessionState::Uninitialized,
            user: None,
            token: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    fn authenticated(user: User, token: String) -> Self {
        Self {
            state: SessionState::Authenticated,
            user: Some(user),
            token: Some(token),
            is_authenticated: true,
            is_loading: false,
        }
    }

    fn anonymous() -> Self {
        Self {
            state: SessionState::Anonymous,
            user: None,
            token: None,
            is_authenticated: false,
            is_loading: false,
        }
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(|r| r.is_admin())
    }

    pub fn is_manager(&self) -> bool {
        self.role().is_some_and(|r| r.is_manager_or_above())
    }

    pub fn is_technician(&self) -> bool {
        self.role().is_some_and(|r| r.is_technician_or_above())
    }

    pub fn is_commercial(&self) -> bool {
        self.role().is_some_and(|r| r.is_commercial_or_above())
    }

    pub fn can_manage_users(&self) -> bool {
        self.is_admin()
    }

    pub fn can_manage_services(&self) -> bool {
        self.is_manager()
    }

    pub fn can_view_reports(&self) -> bool {
        self.is_manager()
    }
}

/// Owner of the session state.
#[derive(Debug)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    tx: watch::Sender<Session>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let (tx, _) = watch::channel(Session::initial());
        Self { storage, tx }
    }

    /// Restore the session from storage.
    ///
    /// Both a token and a user must be stored. A stored user that does not
    /// parse is treated as corrupt: both keys are removed and the session
    /// becomes anonymous.
    pub fn init(&self) -> Result<Session> {
        self.tx.send_modify(|s| {
            s.state = SessionState::Loading;
            s.is_loading = true;
        });

        let token = self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let user = self.storage.get(USER_KEY);

        let session = match (token, user) {
            (Some(token), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    info!(user = %user.email, "Session restored");
                    Session::authenticated(user, token)
                }
                Err(e) => {
                    warn!(error = %e, "Stored user is corrupt, clearing session");
                    self.clear_storage()?;
                    Session::anonymous()
                }
            },
            _ => {
                debug!("No stored session");
                Session::anonymous()
            }
        };

        self.tx.send_replace(session.clone());
        Ok(session)
    }

    /// Persist and adopt a new identity.
    pub fn login(&self, user: User, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.storage.set(TOKEN_KEY, &token)?;
        self.storage.set(USER_KEY, &serde_json::to_string(&user)?)?;

        info!(user = %user.email, role = %user.role, "Signed in");
        self.tx.send_replace(Session::authenticated(user, token));
        Ok(())
    }

    /// Forget the identity. Safe to call when already signed out.
    ///
    /// The in-memory session is cleared even when storage fails; the
    /// storage error is still returned.
    pub fn logout(&self) -> Result<()> {
        let was_authenticated = self.tx.borrow().is_authenticated;
        let cleared = self.clear_storage();
        self.tx.send_replace(Session::anonymous());
        if was_authenticated {
            info!("Signed out");
        }
        cleared
    }

    /// Merge `patch` into the signed-in user and persist the result.
    ///
    /// Returns the updated user, or `None` when nobody is signed in.
    pub fn update_user(&self, patch: &UserPatch) -> Result<Option<User>> {
        let Some(mut user) = self.tx.borrow().user.clone() else {
            return Ok(None);
        };
        patch.apply(&mut user);
        self.storage.set(USER_KEY, &serde_json::to_string(&user)?)?;

        let updated = user.clone();
        self.tx.send_modify(|s| s.user = Some(user));
        Ok(Some(updated))
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.tx.send_modify(|s| s.is_loading = is_loading);
    }

    /// Current session.
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// The current bearer token, if signed in.
    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Return to `Uninitialized` without touching storage.
    pub fn teardown(&self) {
        self.tx.send_replace(Session::initial());
        debug!("Session store torn down");
    }

    /// Remove both keys even if the first removal fails; reports the first error.
    fn clear_storage(&self) -> Result<()> {
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        token.and(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::MemoryStorage;

    fn user(role: UserRole) -> User {
        serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "Ana Souza",
            "email": "ana@intersul.com.br",
            "role": role.as_str(),
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn store_with(storage: MemoryStorage) -> (SessionStore, Arc<MemoryStorage>) {
        let storage = Arc::new(storage);
        (SessionStore::new(storage.clone()), storage)
    }

    #[test]
    fn test_initial_state() {
        let (store, _) = store_with(MemoryStorage::new());
        let session = store.snapshot();
        assert_eq!(session.state, SessionState::Uninitialized);
        assert!(session.is_loading);
        assert!(!session.is_authenticated);
    }

    #[test]
    fn test_init_without_storage_is_anonymous() {
        let (store, _) = store_with(MemoryStorage::new());
        let session = store.init().unwrap();
        assert_eq!(session.state, SessionState::Anonymous);
        assert!(!session.is_loading);
    }

    #[test]
    fn test_init_restores_stored_session() {
        let raw = serde_json::to_string(&user(UserRole::Manager)).unwrap();
        let (store, _) = store_with(MemoryStorage::with_entries([
            (TOKEN_KEY, "tok"),
            (USER_KEY, raw.as_str()),
        ]));

        let session = store.init().unwrap();
        assert_eq!(session.state, SessionState::Authenticated);
        assert_eq!(session.token.as_deref(), Some("tok"));
        assert!(session.is_manager());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_init_clears_corrupt_user() {
        let (store, storage) = store_with(MemoryStorage::with_entries([
            (TOKEN_KEY, "tok"),
            (USER_KEY, "{not json"),
        ]));

        let session = store.init().unwrap();
        assert_eq!(session.state, SessionState::Anonymous);
        assert_eq!(storage.get(TOKEN_KEY), None);
        assert_eq!(storage.get(USER_KEY), None);
    }

    /// Storage whose token removal always fails.
    #[derive(Debug, Default)]
    struct StuckToken(MemoryStorage);

    impl Storage for StuckToken {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            if key == TOKEN_KEY {
                return Err(Error::Io {
                    path: "session.json".into(),
                    source: std::io::Error::other("read-only"),
                });
            }
            self.0.remove(key)
        }
    }

    #[test]
    fn test_logout_removes_user_when_token_removal_fails() {
        let storage = Arc::new(StuckToken::default());
        let store = SessionStore::new(storage.clone());
        store.init().unwrap();
        store.login(user(UserRole::Technician), "tok").unwrap();

        let err = store.logout().unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(storage.get(USER_KEY), None);
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok"));
        assert_eq!(store.snapshot().state, SessionState::Anonymous);
    }

    #[test]
    fn test_login_persists_and_logout_is_idempotent() {
        let (store, storage) = store_with(MemoryStorage::new());
        store.init().unwrap();

        store.login(user(UserRole::Admin), "tok").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok"));
        assert!(storage.get(USER_KEY).is_some());
        assert!(store.snapshot().can_manage_users());

        store.logout().unwrap();
        store.logout().unwrap();
        let session = store.snapshot();
        assert_eq!(session.state, SessionState::Anonymous);
        assert_eq!(session.user, None);
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[test]
    fn test_update_user_merges_and_persists() {
        let (store, storage) = store_with(MemoryStorage::new());
        assert_eq!(store.update_user(&UserPatch::default()).unwrap(), None);

        store.login(user(UserRole::Technician), "tok").unwrap();
        let patch = UserPatch {
            name: Some("Ana S.".to_string()),
            ..Default::default()
        };
        let updated = store.update_user(&patch).unwrap().unwrap();
        assert_eq!(updated.name, "Ana S.");
        assert_eq!(updated.email, "ana@intersul.com.br");

        let stored: User = serde_json::from_str(&storage.get(USER_KEY).unwrap()).unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn test_role_predicates() {
        let cases = [
            (UserRole::Admin, [true, true, true, true, true, true, true]),
            (UserRole::Manager, [false, true, true, true, false, true, true]),
            (UserRole::Technician, [false, false, true, false, false, false, false]),
            (UserRole::Commercial, [false, false, false, true, false, false, false]),
        ];
        for (role, expected) in cases {
            let session = Session::authenticated(user(role), "t".to_string());
            let actual = [
                session.is_admin(),
                session.is_manager(),
                session.is_technician(),
                session.is_commercial(),
                session.can_manage_users(),
                session.can_manage_services(),
                session.can_view_reports(),
            ];
            assert_eq!(actual, expected, "role {}", role);
        }

        let anonymous = Session::anonymous();
        assert!(!anonymous.is_technician());
        assert!(!anonymous.can_view_reports());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let (store, _) = store_with(MemoryStorage::new());
        let mut rx = store.subscribe();

        store.login(user(UserRole::Admin), "tok").unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated);

        store.logout().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().state, SessionState::Anonymous);

        store.teardown();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().state, SessionState::Uninitialized);
    }
}
