//! Typed REST client for the project-management backend
//!
//! Envelopes are resolved here, at the boundary: list endpoints answer with
//! `{ data, pagination }` or a bare array, detail endpoints with `{ data }`
//! or the bare object. Anything else is [`CoreError::UnexpectedShape`].
//! Resource methods live in [`resources`].

pub mod resources;

pub use resources::ProgressFn;

use crate::cache::QueryCache;
use crate::config::PmboardConfig;
use crate::error::CoreError;
use crate::list::FetchParams;
use crate::session_store::SessionStore;
use pmboard_types::{ApiMessage, Detail, ListResponse, Project, Ticket};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything the dashboards aggregate: all projects and all tickets
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub projects: Vec<Project>,
    pub tickets: Vec<Ticket>,
}

/// HTTP client bound to one backend and one session store
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    /// Raw list bodies, keyed by resource plus sorted parameters
    lists: QueryCache<Arc<serde_json::Value>>,
    /// Dropdown sources (projects, users), kept longer
    options: QueryCache<Arc<serde_json::Value>>,
    /// Dashboard aggregates
    dashboard: QueryCache<Arc<DashboardData>>,
}

impl ApiClient {
    pub fn new(config: &PmboardConfig, session: Arc<dyn SessionStore>) -> Result<Self, CoreError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("pmboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::Network {
                endpoint: config.api_base().to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            http,
            base_url: config.api_base().to_string(),
            session,
            lists: QueryCache::new(config.list_stale_time()),
            options: QueryCache::new(config.options_ttl()),
            dashboard: QueryCache::new(config.dashboard_stale_time()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request with the bearer token attached when one is stored
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.session.get().token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and map transport failures and non-2xx statuses
    async fn send(&self, endpoint: &str, builder: RequestBuilder) -> Result<Response, CoreError> {
        debug!(endpoint, "Sending request");
        let response = builder.send().await.map_err(|e| CoreError::Network {
            endpoint: endpoint.to_string(),
            source: Box::new(e),
        })?;
        check_status(endpoint, response).await
    }

    async fn body_bytes(endpoint: &str, response: Response) -> Result<Vec<u8>, CoreError> {
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| CoreError::Network {
                endpoint: endpoint.to_string(),
                source: Box::new(e),
            })
    }

    async fn get_json(&self, path: &str, params: &FetchParams) -> Result<serde_json::Value, CoreError> {
        let builder = self.request(Method::GET, path).query(&params.to_query_pairs());
        let response = self.send(path, builder).await?;
        let bytes = Self::body_bytes(path, response).await?;
        serde_json::from_slice(&bytes).map_err(|e| unexpected(path, e))
    }

    /// GET a collection
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &FetchParams,
    ) -> Result<ListResponse<T>, CoreError> {
        let key = params.cache_key(path);
        let value = self
            .lists
            .get_or_fetch(&key, async { self.get_json(path, params).await.map(Arc::new) })
            .await?;
        decode_value(path, &value)
    }

    /// GET a collection through the long-lived options cache
    pub async fn options<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, CoreError> {
        let params = FetchParams::default();
        let value = self
            .options
            .get_or_fetch(path, async { self.get_json(path, &params).await.map(Arc::new) })
            .await?;
        decode_value::<ListResponse<T>>(path, &value).map(|list| list.into_parts().0)
    }

    /// GET a single object
    pub async fn detail<T: DeserializeOwned>(&self, path: &str) -> Result<T, CoreError> {
        let response = self.send(path, self.request(Method::GET, path)).await?;
        decode::<Detail<T>>(path, response).await.map(Detail::into_inner)
    }

    /// POST a JSON body and decode the created object
    pub async fn create<B, T>(&self, path: &str, body: &B) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.write_json(Method::POST, path, body).await
    }

    /// PUT a full replacement
    pub async fn update<B, T>(&self, path: &str, body: &B) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.write_json(Method::PUT, path, body).await
    }

    /// PATCH selected fields
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.write_json(Method::PATCH, path, body).await
    }

    async fn write_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(path, self.request(method, path).json(body)).await?;
        let value = decode::<Detail<T>>(path, response).await?.into_inner();
        self.invalidate(path).await;
        Ok(value)
    }

    /// Request whose response body is ignored (DELETE, mark-as-read)
    pub async fn send_empty(&self, method: Method, path: &str) -> Result<(), CoreError> {
        self.send(path, self.request(method, path)).await?;
        self.invalidate(path).await;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), CoreError> {
        self.send_empty(Method::DELETE, path).await
    }

    /// GET raw bytes (attachment download)
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, CoreError> {
        let response = self.send(path, self.request(Method::GET, path)).await?;
        Self::body_bytes(path, response).await
    }

    /// Drop cached collections touched by a mutation on `path`
    /// (`/tickets/7` drops `/tickets` and `/tickets?...`)
    pub async fn invalidate(&self, path: &str) {
        let resource = resource_of(path);
        self.lists.invalidate_prefix(resource).await;
        self.options.invalidate_prefix(resource).await;
        // Aggregates span every resource
        self.dashboard.clear();
    }

    pub fn clear_cache(&self) {
        self.lists.clear();
        self.options.clear();
        self.dashboard.clear();
    }

    pub(crate) fn dashboard_cache(&self) -> &QueryCache<Arc<DashboardData>> {
        &self.dashboard
    }
}

/// `/tickets/7/comments` -> `/tickets`
fn resource_of(path: &str) -> &str {
    let trimmed = path.trim_start_matches('/');
    let end = trimmed.find(['/', '?']).unwrap_or(trimmed.len());
    &path[..path.len() - trimmed.len() + end]
}

fn unexpected(endpoint: &str, e: serde_json::Error) -> CoreError {
    CoreError::UnexpectedShape {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    }
}

fn decode_value<T: DeserializeOwned>(endpoint: &str, value: &serde_json::Value) -> Result<T, CoreError> {
    T::deserialize(value).map_err(|e| unexpected(endpoint, e))
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, CoreError> {
    let bytes = ApiClient::body_bytes(endpoint, response).await?;
    serde_json::from_slice(&bytes).map_err(|e| unexpected(endpoint, e))
}

/// Map a non-2xx response to `Unauthenticated` or `Api { status, message }`,
/// keeping the backend's `{ message }` either way
async fn check_status(endpoint: &str, response: Response) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ApiMessage>(&body)
        .map(|m| m.message)
        .unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        warn!(endpoint, %message, "Request rejected: not authenticated");
        return Err(CoreError::Unauthenticated { message });
    }
    warn!(endpoint, status = status.as_u16(), %message, "Request failed");
    Err(CoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_of() {
        assert_eq!(resource_of("/tickets/7/comments"), "/tickets");
        assert_eq!(resource_of("/tickets"), "/tickets");
        assert_eq!(resource_of("projects/3"), "projects");
        assert_eq!(resource_of("/notifications?page=1"), "/notifications");
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = PmboardConfig {
            api_base_url: "http://localhost:9/api/".into(),
            ..Default::default()
        };
        let client =
            ApiClient::new(&config, Arc::new(crate::session_store::MemorySessionStore::new())).unwrap();
        assert_eq!(client.url("/projects"), "http://localhost:9/api/projects");
        assert_eq!(client.url("users"), "http://localhost:9/api/users");
    }
}
