//! API configuration.

use std::time::Duration;

/// Shared secret used when `VIDEO_SERVICE_API_KEY` is not set.
pub const DEFAULT_API_KEY: &str = "dev-key-change-in-prod";

/// API server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Shared secret expected in `X-API-Key`
    pub api_key: String,
    /// Round-trip to storage on every health check
    pub health_probe_storage: bool,
    /// Bound on the health probe round-trip
    pub health_probe_timeout: Duration,
    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics_enabled: bool,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_body_size", &self.max_body_size)
            .field("environment", &self.environment)
            .field("api_key", &"<redacted>")
            .field("health_probe_storage", &self.health_probe_storage)
            .field("health_probe_timeout", &self.health_probe_timeout)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            health_probe_storage: false,
            health_probe_timeout: Duration::from_secs(5),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            api_key: std::env::var("VIDEO_SERVICE_API_KEY")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            health_probe_storage: env_flag("HEALTH_PROBE_STORAGE").unwrap_or(false),
            health_probe_timeout: Duration::from_secs(
                std::env::var("HEALTH_PROBE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            metrics_enabled: env_flag("METRICS_ENABLED").unwrap_or(true),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        is_production_env(&self.environment)
    }

    /// Whether the shared secret is still the development default.
    pub fn uses_default_api_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }
}

fn is_production_env(environment: &str) -> bool {
    environment.eq_ignore_ascii_case("production")
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert!(config.uses_default_api_key());
        assert!(!config.health_probe_storage);
        assert!(config.metrics_enabled);
        assert!(!config.is_production());
    }

    #[test]
    fn test_production_is_case_insensitive() {
        assert!(is_production_env("Production"));
        assert!(!is_production_env("staging"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ApiConfig {
            api_key: "super-secret".to_string(),
            ..ApiConfig::default()
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
