//! Sign-in, sign-out and the signed-in profile.

use std::sync::Arc;

use intersul_client::ApiClient;
use intersul_query::{QueryCache, QueryKey, QueryOptions, query_key};
use intersul_session::SessionStore;
use intersul_types::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest, User,
};
use tracing::{error, warn};

use super::{logged, minutes};
use crate::error::Result;

pub const AUTH_PREFIX: &str = "auth";

pub struct AuthHooksApi {
    client: ApiClient,
    cache: QueryCache,
    session: Arc<SessionStore>,
}

impl AuthHooksApi {
    pub(crate) fn new(client: ApiClient, cache: QueryCache, session: Arc<SessionStore>) -> Self {
        Self {
            client,
            cache,
            session,
        }
    }

    pub fn profile_key() -> QueryKey {
        query_key![AUTH_PREFIX, "profile"]
    }

    /// Sign in and, when the server returns both user and token, adopt the
    /// new session.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let response = self.client.auth().login(request).await.map_err(|e| {
            error!(email = %request.email, error = %e, "Login failed");
            e
        })?;
        self.adopt(&response)?;
        Ok(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<LoginResponse> {
        let response = self.client.auth().register(request).await.map_err(|e| {
            error!(email = %request.email, error = %e, "Registration failed");
            e
        })?;
        self.adopt(&response)?;
        Ok(response)
    }

    pub async fn profile(&self) -> Result<User> {
        let api = self.client.auth();
        let user = self
            .cache
            .fetch(
                Self::profile_key(),
                QueryOptions::new().stale_time(minutes(5)),
                || async move { api.profile().await },
            )
            .await?;
        Ok(user)
    }

    /// Sign out locally: forget the session and every cached query.
    ///
    /// Both are cleared even if the stored credentials could not be
    /// removed; that failure is still returned.
    pub async fn logout(&self) -> Result<()> {
        let cleared = self.session.logout();
        self.cache.clear().await;
        cleared?;
        Ok(())
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<MessageResponse> {
        logged(
            "change password",
            self.client.auth().change_password(request).await,
        )
    }

    fn adopt(&self, response: &LoginResponse) -> Result<()> {
        match response.credentials() {
            Some((user, token)) => self.session.login(user.clone(), token)?,
            None => warn!("Auth response without credentials, session unchanged"),
        }
        Ok(())
    }
}
