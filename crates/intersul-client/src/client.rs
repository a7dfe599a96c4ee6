//! Main client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{AuthApi, CategoriesApi, ClientsApi, CopyMachinesApi, ServicesApi, UsersApi};
use crate::error::{Error, ErrorBody, Result};

/// Default timeout for requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Credential source and 401 reaction, consulted on every request.
///
/// The transport never stores a token itself: it asks the hooks each time, so
/// a login or logout elsewhere takes effect on the next call.
pub trait AuthHooks: Send + Sync {
    /// Token for the `Authorization: Bearer` header. `None` sends no header.
    fn bearer_token(&self) -> Option<String>;

    /// Called once for every 401 response, before the error is returned.
    fn on_unauthorized(&self) {}
}

/// Hooks for unauthenticated use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuth;

impl AuthHooks for NoAuth {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Hooks with a fixed token.
#[derive(Clone)]
pub struct StaticToken(pub String);

impl AuthHooks for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Intersul API client.
///
/// Cheap to clone; clones share the connection pool and hooks.
///
/// # Example
///
/// ```no_run
/// use intersul_client::ApiClient;
///
/// # async fn example() -> intersul_client::Result<()> {
/// let client = ApiClient::builder()
///     .base_url("http://localhost:3000")
///     .build()?;
///
/// let stats = client.clients().stats().await?;
/// println!("{} clients", stats.total);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    auth: Arc<dyn AuthHooks>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the clients API.
    pub fn clients(&self) -> ClientsApi {
        ClientsApi::new(self.clone())
    }

    /// Access the services API.
    pub fn services(&self) -> ServicesApi {
        ServicesApi::new(self.clone())
    }

    /// Access the users API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the categories API.
    pub fn categories(&self) -> CategoriesApi {
        CategoriesApi::new(self.clone())
    }

    /// Access the copy-machines API (catalog, installed machines, franchises).
    pub fn copy_machines(&self) -> CopyMachinesApi {
        CopyMachinesApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Make a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.request(Method::GET, path)?;
        self.send(request).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path)?.query(query);
        self.send(request).await
    }

    /// Make a POST request with a JSON body.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path)?.json(body);
        self.send(request).await
    }

    /// Make a POST request without a body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.request(Method::POST, path)?;
        self.send(request).await
    }

    /// Make a POST request with a multipart body.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T> {
        let request = self.request(Method::POST, path)?.multipart(form);
        self.send(request).await
    }

    /// Make a PATCH request with a JSON body.
    pub(crate) async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PATCH, path)?.json(body);
        self.send(request).await
    }

    /// Make a PATCH request without a body.
    pub(crate) async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.request(Method::PATCH, path)?;
        self.send(request).await
    }

    /// Make a PATCH request with a multipart body.
    pub(crate) async fn patch_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T> {
        let request = self.request(Method::PATCH, path)?.multipart(form);
        self.send(request).await
    }

    /// Make a DELETE request. Any response body is discarded.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let request = self.request(Method::DELETE, path)?;
        let response = self.execute(request).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Start a request with the timeout and the current credentials.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        let mut request = self
            .inner
            .http
            .request(method, url)
            .timeout(self.inner.timeout);

        if let Some(token) = self.inner.auth.bearer_token()
            && !token.is_empty()
        {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::Config("Invalid auth token".to_string()))?;
            request = request.header(AUTHORIZATION, value);
        }

        Ok(request)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        request.send().await.map_err(|e| {
            tracing::debug!(error = %e, "request failed without a response");
            Error::network(&e)
        })
    }

    /// Send a request and decode a JSON response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        let bytes = response.bytes().await.map_err(|e| Error::network(&e))?;
        // Endpoints that answer with an empty body decode as JSON `null`.
        if bytes.is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status();
        let url = response.url().path().to_string();
        let body = match response.bytes().await {
            Ok(bytes) => ErrorBody::from_bytes(&bytes),
            Err(e) => {
                tracing::debug!(error = %e, "failed to read error body");
                ErrorBody::default()
            }
        };

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(path = %url, "request unauthorized");
            self.inner.auth.on_unauthorized();
            return Error::Unauthorized { body };
        }

        tracing::debug!(status = status.as_u16(), path = %url, "API error response");
        Error::Api {
            status: status.as_u16(),
            body,
        }
    }
}

/// Builder for creating an [`ApiClient`].
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    auth: Arc<dyn AuthHooks>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            auth: Arc::new(NoAuth),
            user_agent: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the credential hooks.
    pub fn auth(mut self, hooks: Arc<dyn AuthHooks>) -> Self {
        self.auth = hooks;
        self
    }

    /// Use a fixed bearer token.
    pub fn auth_token(self, token: impl Into<String>) -> Self {
        self.auth(Arc::new(StaticToken(token.into())))
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("intersul-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                auth: self.auth,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
