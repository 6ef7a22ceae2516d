//! API Module
//!
//! HTTP handlers and routing for the shared tier REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a string
//! - `GET /get/:key` - Retrieve a string
//! - `PUT /hset` - Merge fields into a hash
//! - `GET /hgetall/:key` - Retrieve a hash
//! - `DELETE /del/:key` - Delete a key
//! - `GET /stats` - Store statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
