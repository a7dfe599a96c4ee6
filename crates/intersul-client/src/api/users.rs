//! Users API (admin).

use intersul_types::{EntityId, RegisterRequest, UpdateUserRequest, User, UserQuery, UserStats};

use crate::client::ApiClient;
use crate::error::Result;

/// Users API client.
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Vec<User>> {
        self.client.get_with_query("users", query).await
    }

    pub async fn get(&self, id: EntityId) -> Result<User> {
        self.client.get(&format!("users/{}", id)).await
    }

    pub async fn create(&self, request: &RegisterRequest) -> Result<User> {
        self.client.post("users", request).await
    }

    pub async fn update(&self, id: EntityId, request: &UpdateUserRequest) -> Result<User> {
        self.client.patch(&format!("users/{}", id), request).await
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.client.delete(&format!("users/{}", id)).await
    }

    /// Flip the user's active flag; returns the updated user.
    pub async fn toggle_active(&self, id: EntityId) -> Result<User> {
        self.client
            .patch_empty(&format!("users/{}/toggle-active", id))
            .await
    }

    pub async fn stats(&self) -> Result<UserStats> {
        self.client.get("users/stats").await
    }
}
