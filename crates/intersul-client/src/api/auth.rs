//! Auth API.

use serde::{Deserialize, Serialize};

use intersul_types::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest, User,
};

use crate::client::ApiClient;
use crate::error::Result;

/// Response of `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Auth API client.
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.client.post("auth/login", request).await
    }

    /// Create an account; the response may carry a session.
    pub async fn register(&self, request: &RegisterRequest) -> Result<LoginResponse> {
        self.client.post("auth/register", request).await
    }

    /// The signed-in user.
    pub async fn profile(&self) -> Result<User> {
        self.client.get("auth/profile").await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<MessageResponse> {
        self.client.post("auth/change-password", request).await
    }

    pub async fn refresh(&self) -> Result<RefreshResponse> {
        self.client.post_empty("auth/refresh").await
    }
}
