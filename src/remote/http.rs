//! HTTP Remote Module
//!
//! A [`RemoteStore`] that talks to the shared tier server over its REST API.
//! Every request carries a timeout; any failure is logged and degrades to an
//! empty result.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use super::{ttl_seconds, RemoteStore};
use crate::error::CoherenceError;
use crate::models::{GetResponse, HashGetResponse, HashSetRequest, SetRequest};

// == HTTP Remote ==
/// Shared tier client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base: Url,
}

impl HttpRemote {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Server root, e.g. `http://127.0.0.1:3000`
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoherenceError> {
        let base = Url::parse(base_url).map_err(|err| {
            CoherenceError::RemoteUnavailable(format!("invalid remote url '{}': {}", base_url, err))
        })?;
        if base.cannot_be_a_base() {
            return Err(CoherenceError::RemoteUnavailable(format!(
                "remote url '{}' cannot carry a path",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Server root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // == Requests ==
    async fn fetch_string(&self, key: &str) -> Result<Option<String>, CoherenceError> {
        let response = self.client.get(self.endpoint(&["get", key])).send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<GetResponse>().await?.value)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(unexpected("GET /get", key, status)),
        }
    }

    async fn store_string(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CoherenceError> {
        let body = SetRequest {
            key: key.to_string(),
            value: value.to_string(),
            ttl: Some(ttl_seconds(ttl)),
        };
        let response = self.client.put(self.endpoint(&["set"])).json(&body).send().await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(unexpected("PUT /set", key, status)),
        }
    }

    async fn fetch_hash(&self, key: &str) -> Result<HashMap<String, String>, CoherenceError> {
        let response = self.client.get(self.endpoint(&["hgetall", key])).send().await?;
        match response.status() {
            StatusCode::OK => Ok(response
                .json::<HashGetResponse>()
                .await?
                .fields
                .into_iter()
                .collect()),
            StatusCode::NOT_FOUND => Ok(HashMap::new()),
            status => Err(unexpected("GET /hgetall", key, status)),
        }
    }

    async fn store_hash(
        &self,
        key: &str,
        fields: &[(&str, &str)],
        ttl: Duration,
    ) -> Result<(), CoherenceError> {
        let body = HashSetRequest {
            key: key.to_string(),
            fields: fields
                .iter()
                .map(|(field, value)| (field.to_string(), value.to_string()))
                .collect(),
            ttl: Some(ttl_seconds(ttl)),
        };
        let response = self.client.put(self.endpoint(&["hset"])).json(&body).send().await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(unexpected("PUT /hset", key, status)),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool, CoherenceError> {
        let response = self.client.delete(self.endpoint(&["del", key])).send().await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(unexpected("DELETE /del", key, status)),
        }
    }
}

fn unexpected(op: &str, key: &str, status: StatusCode) -> CoherenceError {
    CoherenceError::RemoteUnavailable(format!("{} for '{}' returned {}", op, key, status))
}

fn degrade<T>(op: &str, key: &str, result: Result<T, CoherenceError>, empty: T) -> T {
    result.unwrap_or_else(|err| {
        warn!(op, key, error = %err, "shared tier request failed");
        empty
    })
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn get_hash(&self, key: &str) -> HashMap<String, String> {
        degrade("get_hash", key, self.fetch_hash(key).await, HashMap::new())
    }

    async fn set_hash(&self, key: &str, fields: &[(&str, &str)], ttl: Duration) -> bool {
        let result = self.store_hash(key, fields, ttl).await.map(|_| true);
        degrade("set_hash", key, result, false)
    }

    async fn get_string(&self, key: &str) -> Option<String> {
        degrade("get_string", key, self.fetch_string(key).await, None)
    }

    async fn set_string(&self, key: &str, value: &str, ttl: Duration) -> bool {
        let result = self.store_string(key, value, ttl).await.map(|_| true);
        degrade("set_string", key, result, false)
    }

    async fn delete(&self, key: &str) -> bool {
        let deleted = degrade("delete", key, self.remove(key).await, false);
        debug!(key, deleted, "shared tier delete");
        deleted
    }
}
