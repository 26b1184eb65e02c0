//! Token signing configuration.

use std::fmt;

/// Fallback secret used when none is configured.
///
/// Anyone who reads this source can forge tokens signed with it. Production
/// deployments must set `BOTNOLOGY_TOKEN_SECRET`.
pub const DEV_SECRET: &str = "botnology-dev-secret-do-not-use-in-production";

/// Token signing configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token validity in seconds; `None` issues tokens without `exp`
    pub token_ttl_secs: Option<i64>,
}

impl AuthConfig {
    /// Create a new configuration with an explicit secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_secs: None,
        }
    }

    /// Set the token validity duration. Non-positive values are ignored.
    pub fn with_ttl(mut self, secs: i64) -> Self {
        if secs > 0 {
            self.token_ttl_secs = Some(secs);
        } else {
            tracing::warn!("Ignoring non-positive token TTL: {}", secs);
        }
        self
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = match std::env::var("BOTNOLOGY_TOKEN_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => Self::new(secret),
            _ => {
                tracing::warn!(
                    "BOTNOLOGY_TOKEN_SECRET is not set; using the development secret. \
                     Tokens issued by this process can be forged."
                );
                Self::default()
            }
        };

        if let Ok(ttl) = std::env::var("BOTNOLOGY_TOKEN_TTL_SECS") {
            match ttl.parse::<i64>() {
                Ok(n) if n > 0 => config.token_ttl_secs = Some(n),
                _ => tracing::warn!("Ignoring invalid BOTNOLOGY_TOKEN_TTL_SECS: {}", ttl),
            }
        }

        config
    }

    /// Whether the insecure fallback secret is in use.
    pub fn is_dev_secret(&self) -> bool {
        self.secret == DEV_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEV_SECRET)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert!(config.is_dev_secret());
        assert_eq!(config.token_ttl_secs, None);
    }

    #[test]
    fn test_with_ttl_ignores_non_positive() {
        assert_eq!(AuthConfig::new("s").with_ttl(0).token_ttl_secs, None);
        assert_eq!(AuthConfig::new("s").with_ttl(-60).token_ttl_secs, None);
        assert_eq!(AuthConfig::new("s").with_ttl(60).with_ttl(-1).token_ttl_secs, Some(60));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig::new("super-secret").with_ttl(60);
        let out = format!("{:?}", config);
        assert!(!out.contains("super-secret"));
        assert!(out.contains("Some(60)"));
    }
}
