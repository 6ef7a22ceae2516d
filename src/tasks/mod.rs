//! Background Tasks Module
//!
//! Contains background tasks that run periodically.
//!
//! # Tasks
//! - Shared store cleanup: removes expired records at configured intervals
//! - Local cache sweep: removes expired local slots

mod cleanup;

pub use cleanup::{spawn_cleanup_task, spawn_sweep_task};
