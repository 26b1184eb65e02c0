//! Shared request state.

use std::sync::Arc;

use auth::TokenService;
use error::AppError;
use storage::StudentStorage;

use crate::config::GatewayConfig;

/// State handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub storage: Arc<StudentStorage>,
    pub version: String,
}

impl AppState {
    pub fn new(tokens: TokenService, storage: StudentStorage, version: impl Into<String>) -> Self {
        Self {
            tokens: Arc::new(tokens),
            storage: Arc::new(storage),
            version: version.into(),
        }
    }

    /// Build state from configuration, creating the storage base directory.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, AppError> {
        let storage = StudentStorage::open(&config.storage)?;
        Ok(Self::new(
            TokenService::new(config.auth.clone()),
            storage,
            config.version.clone(),
        ))
    }
}
