//! Botnology gateway library
//!
//! HTTP surface for stateless student authentication and per-student file
//! storage. Exposed as a library so the router can be driven in-process.

pub mod config;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::GatewayConfig;
pub use errors::ApiError;
pub use extract::{ApiJson, AuthenticatedStudent, MaybeStudent};
pub use router::build_router;
pub use state::AppState;
