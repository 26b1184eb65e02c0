use auth::AuthConfig;
use storage::StorageConfig;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP listen address
    pub http_addr: String,

    /// Token signing settings
    pub auth: AuthConfig,

    /// Student file storage settings
    pub storage: StorageConfig,

    /// Service version
    pub version: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:8000".to_string(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self {
            auth: AuthConfig::from_env(),
            storage: StorageConfig::from_env(),
            ..Self::default()
        };

        if let Ok(addr) = std::env::var("BOTNOLOGY_HTTP_ADDR") {
            config.http_addr = addr;
        }

        config
    }
}
