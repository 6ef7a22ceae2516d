//! Error types
//!
//! [`StoreError`] covers the shared store and its HTTP API.
//! [`CoherenceError`] covers failures the coordinator and remote clients
//! absorb and log instead of returning.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error ==
/// Errors raised by the shared store.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// Key not found
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Key holds a value of another type
    #[error("Wrong type for key '{key}': holds a {actual}")]
    WrongType { key: String, actual: &'static str },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Store is full and eviction failed
    #[error("Store full: {0}")]
    StoreFull(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::NotFound(_) | StoreError::Expired(_) => StatusCode::NOT_FOUND,
            StoreError::WrongType { .. } => StatusCode::CONFLICT,
            StoreError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            StoreError::StoreFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Convenience Result type for the shared store.
pub type Result<T> = std::result::Result<T, StoreError>;

// == Coherence Error ==
/// Failures on the path between the tiers.
///
/// None of these reach the caller of
/// [`CacheCoordinator::get`](crate::CacheCoordinator::get): remote failures
/// degrade to "remote has nothing" and bad payloads are purged.
#[derive(Error, Debug)]
pub enum CoherenceError {
    /// The remote tier could not be reached or answered with an error
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// A remote payload could not be decoded into the requested type
    #[error("cannot deserialize payload for key '{key}': {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for publishing
    #[error("cannot serialize value for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The remote tier held a token but no payload
    #[error("payload missing for key '{0}'")]
    MissingPayload(String),
}

impl From<reqwest::Error> for CoherenceError {
    fn from(err: reqwest::Error) -> Self {
        CoherenceError::RemoteUnavailable(err.to_string())
    }
}
