//! Request and Response models for the shared tier API
//!
//! The server deserializes requests and serializes responses with these
//! types; [`HttpRemote`](crate::remote::HttpRemote) does the reverse.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{HashSetRequest, SetRequest};
pub use responses::{
    DeleteResponse, ErrorResponse, GetResponse, HashGetResponse, HealthResponse, SetResponse,
    StatsResponse,
};
