//! Sandboxed per-student file storage.
//!
//! Each student gets a directory under a shared base. Every path a caller
//! supplies is resolved inside that directory or rejected.

mod config;
mod guard;

pub use config::StorageConfig;
pub use guard::{sanitize_identity, StudentStorage};
