//! Console users (admin only on the server side).

use intersul_client::ApiClient;
use intersul_query::{KeySegment, QueryCache, QueryKey, QueryOptions, query_key};
use intersul_types::{
    EntityId, RegisterRequest, UpdateUserRequest, User, UserQuery, UserStats,
};

use super::{logged, minutes};
use crate::error::Result;

pub const USERS_PREFIX: &str = "users";

pub struct UserHooks {
    client: ApiClient,
    cache: QueryCache,
}

impl UserHooks {
    pub(crate) fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub fn list_key(query: &UserQuery) -> QueryKey {
        query_key![USERS_PREFIX, KeySegment::json(query)]
    }

    pub fn detail_key(id: EntityId) -> QueryKey {
        query_key![USERS_PREFIX, id]
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Vec<User>> {
        let api = self.client.users();
        let users = self
            .cache
            .fetch(
                Self::list_key(query),
                QueryOptions::new().stale_time(minutes(2)),
                || async move { api.list(query).await },
            )
            .await?;
        Ok(users)
    }

    pub async fn get(&self, id: EntityId) -> Result<User> {
        let api = self.client.users();
        let user = self
            .cache
            .fetch(
                Self::detail_key(id),
                QueryOptions::new().stale_time(minutes(5)),
                || async move { api.get(id).await },
            )
            .await?;
        Ok(user)
    }

    pub async fn stats(&self) -> Result<UserStats> {
        let api = self.client.users();
        let stats = self
            .cache
            .fetch(
                query_key![USERS_PREFIX, "stats"],
                QueryOptions::new().stale_time(minutes(5)),
                || async move { api.stats().await },
            )
            .await?;
        Ok(stats)
    }

    pub async fn create(&self, request: &RegisterRequest) -> Result<User> {
        let created = logged("create user", self.client.users().create(request).await)?;
        self.cache.invalidate(&query_key![USERS_PREFIX]).await;
        Ok(created)
    }

    pub async fn update(&self, id: EntityId, request: &UpdateUserRequest) -> Result<User> {
        let updated = logged("update user", self.client.users().update(id, request).await)?;
        self.store(&updated).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        logged("delete user", self.client.users().delete(id).await)?;
        self.cache.remove_entry(&Self::detail_key(id)).await;
        self.cache.invalidate(&query_key![USERS_PREFIX]).await;
        Ok(())
    }

    /// Flip the account's active flag.
    pub async fn toggle_active(&self, id: EntityId) -> Result<User> {
        let user = logged("toggle user", self.client.users().toggle_active(id).await)?;
        self.store(&user).await?;
        Ok(user)
    }

    async fn store(&self, user: &User) -> Result<()> {
        self.cache
            .set_entry(Self::detail_key(user.id), serde_json::to_value(user)?)
            .await;
        self.cache.invalidate(&query_key![USERS_PREFIX]).await;
        Ok(())
    }
}
