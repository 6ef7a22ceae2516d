//! Store Module
//!
//! Storage engine for the shared (remote) tier.

mod shared;
mod value;


pub use shared::SharedStore;
pub use value::{StoredEntry, StoredValue};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
