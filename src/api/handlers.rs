//! API Handlers
//!
//! HTTP request handlers for each shared tier endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::models::{
    DeleteResponse, GetResponse, HashGetResponse, HashSetRequest, HealthResponse, SetRequest,
    SetResponse, StatsResponse,
};
use crate::store::SharedStore;

/// Application state shared across all handlers.
///
/// Contains the shared store wrapped in Arc<RwLock<>> for thread-safe access.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe shared store
    pub store: Arc<RwLock<SharedStore>>,
}

impl AppState {
    /// Creates a new AppState owning the given store.
    pub fn new(store: SharedStore) -> Self {
        Self::from_shared(Arc::new(RwLock::new(store)))
    }

    /// Creates a new AppState over a store that is also used elsewhere,
    /// e.g. by the cleanup task or an in-process remote client.
    pub fn from_shared(store: Arc<RwLock<SharedStore>>) -> Self {
        Self { store }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(SharedStore::new(config.max_entries, config.default_ttl))
    }
}

/// Handler for PUT /set
///
/// Stores a string under a key with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(StoreError::InvalidRequest(error_msg));
    }

    let mut store = state.store.write().await;
    store.set_string(req.key.clone(), req.value, req.ttl)?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a string by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: reads update LRU order and stats
    let mut store = state.store.write().await;
    let value = store.get_string(&key)?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for PUT /hset
///
/// Merges fields into the hash at a key and resets its TTL.
pub async fn hset_handler(
    State(state): State<AppState>,
    Json(req): Json<HashSetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(StoreError::InvalidRequest(error_msg));
    }

    debug!(key = %req.key, fields = req.fields.len(), "hset");
    let mut store = state.store.write().await;
    store.set_hash(req.key.clone(), req.fields, req.ttl)?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /hgetall/:key
///
/// Returns every field of the hash at a key; a missing key has no fields.
pub async fn hgetall_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<HashGetResponse>> {
    let mut store = state.store.write().await;
    let fields = store.get_hash(&key)?;

    Ok(Json(HashGetResponse::new(key, fields)))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key of either type.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut store = state.store.write().await;
    store.delete(&key)?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let store = state.store.read().await;
    Json(StatsResponse::from(store.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
