//! Cached query layer over the remote API.
//!
//! Each read declares a cache key and is served from an in-process moka
//! cache until its entry expires or a mutation invalidates it. Mutations
//! declare the resources they touch; those entries are evicted only after
//! the mutation succeeds.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::client::ApiClient;
use crate::sync::errors::SyncError;

const DEFAULT_CACHE_CAPACITY: u64 = 1_024;
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache key for a remote query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: String,
    pub id: Option<String>,
}

impl QueryKey {
    pub fn list(resource: &str) -> Self {
        Self { resource: resource.to_string(), id: None }
    }

    pub fn one(resource: &str, id: &str) -> Self {
        Self { resource: resource.to_string(), id: Some(id.to_string()) }
    }

    fn cache_key(&self) -> String {
        match &self.id {
            Some(id) => format!("{}:{id}", self.resource),
            None => self.resource.clone(),
        }
    }
}

/// Query/mutation wrapper with per-key response caching.
pub struct QueryClient {
    api: Arc<ApiClient>,
    cache: Cache<String, serde_json::Value>,
}

impl QueryClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self::with_ttl(api, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(api: Arc<ApiClient>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(DEFAULT_CACHE_CAPACITY)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        Self { api, cache }
    }

    /// Fetch a resource collection, served from cache when fresh.
    pub async fn query_list<T>(&self, resource: &str) -> Result<Vec<T>, SyncError>
    where
        T: DeserializeOwned + Serialize,
    {
        let key = QueryKey::list(resource);
        if let Some(cached) = self.cache.get(&key.cache_key()) {
            debug!(key = %key.cache_key(), "query cache hit");
            return serde_json::from_value(cached)
                .map_err(|e| SyncError::Client(format!("corrupt cache entry: {e}")));
        }

        let items: Vec<T> = self.api.get_list(resource).await?;
        let value = serde_json::to_value(&items)
            .map_err(|e| SyncError::Client(format!("uncacheable response: {e}")))?;
        self.cache.insert(key.cache_key(), value);
        Ok(items)
    }

    /// Fetch a single resource by id, served from cache when fresh.
    pub async fn query_one<T>(&self, resource: &str, id: &str) -> Result<T, SyncError>
    where
        T: DeserializeOwned + Serialize,
    {
        let key = QueryKey::one(resource, id);
        if let Some(cached) = self.cache.get(&key.cache_key()) {
            debug!(key = %key.cache_key(), "query cache hit");
            return serde_json::from_value(cached)
                .map_err(|e| SyncError::Client(format!("corrupt cache entry: {e}")));
        }

        let item: T = self.api.get_one(resource, id).await?;
        let value = serde_json::to_value(&item)
            .map_err(|e| SyncError::Client(format!("uncacheable response: {e}")))?;
        self.cache.insert(key.cache_key(), value);
        Ok(item)
    }

    /// POST a mutation and evict the named resources on success.
    ///
    /// Failed mutations leave the cache untouched, matching the remote
    /// system's behaviour of only refetching after committed writes.
    pub async fn mutate<B, T>(
        &self,
        resource: &str,
        body: &B,
        invalidates: &[&str],
    ) -> Result<T, SyncError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let result: T = self.api.post_json(resource, body).await?;
        for target in invalidates {
            self.invalidate(target);
        }
        Ok(result)
    }

    /// Evict every cached entry for a resource, including per-id entries.
    pub fn invalidate(&self, resource: &str) {
        let list_key = resource.to_string();
        let prefix = format!("{resource}:");
        self.cache.invalidate(&list_key);
        // Eviction of per-id entries happens lazily; run_pending_tasks in
        // tests to observe it synchronously.
        let _ = self
            .cache
            .invalidate_entries_if(move |key, _| key.starts_with(&prefix));
        debug!(resource = resource, "query cache invalidated");
    }

    #[cfg(test)]
    fn cached(&self, key: &str) -> Option<serde_json::Value> {
        self.cache.run_pending_tasks();
        self.cache.get(&key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::client::ApiClientConfig;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Customer {
        id: String,
        name: String,
    }

    async fn client_for(server: &MockServer) -> QueryClient {
        let api = ApiClient::with_config(ApiClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            api_token: None,
        })
        .expect("client built");
        QueryClient::new(Arc::new(api))
    }

    #[tokio::test]
    async fn second_query_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": "c-1", "name": "Acme"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        let first: Vec<Customer> = client.query_list("customers").await.expect("first fetch");
        let second: Vec<Customer> = client.query_list("customers").await.expect("cached fetch");

        assert_eq!(first, second);
        assert_eq!(first[0].name, "Acme");
        // expect(1) on the mock verifies only one request went out
    }

    #[tokio::test]
    async fn mutation_evicts_declared_resources() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/customers"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "c-2", "name": "Globex"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let _: Vec<Customer> = client.query_list("customers").await.expect("seeded cache");
        assert!(client.cached("customers").is_some());

        let created: Customer = client
            .mutate("customers", &json!({"name": "Globex"}), &["customers"])
            .await
            .expect("mutation succeeded");
        assert_eq!(created.id, "c-2");

        assert!(client.cached("customers").is_none());
    }

    #[tokio::test]
    async fn failed_mutation_leaves_cache_intact() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/customers"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let _: Vec<Customer> = client.query_list("customers").await.expect("seeded cache");

        let result: Result<Customer, _> =
            client.mutate("customers", &json!({"name": "Globex"}), &["customers"]).await;
        let err = result.expect_err("mutation failed");
        assert!(matches!(err, SyncError::Server(message) if message == "db down"));

        assert!(client.cached("customers").is_some());
    }

    #[tokio::test]
    async fn invalidate_evicts_per_id_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoices/inv-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "inv-1", "name": "Invoice 1"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let _: Customer = client.query_one("invoices", "inv-1").await.expect("fetched");
        assert!(client.cached("invoices:inv-1").is_some());

        client.invalidate("invoices");
        assert!(client.cached("invoices:inv-1").is_none());
    }
}
