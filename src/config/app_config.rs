use serde::Deserialize;

use crate::infrastructure::auth::DEFAULT_EXPIRATION_DAYS;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Token signing settings, read once at startup
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub secret: Option<String>,
    pub token_expiration_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            token_expiration_days: DEFAULT_EXPIRATION_DAYS,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[hidden]"))
            .field("token_expiration_days", &self.token_expiration_days)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Configured URL, falling back to `DATABASE_URL`
    pub fn resolve_url(&self) -> Option<String> {
        self.url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .filter(|url| !url.trim().is_empty())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert!(matches!(config.logging.format, LogFormat::Pretty));
        assert!(config.auth.secret.is_none());
        assert_eq!(config.auth.token_expiration_days, 60);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_partial_sources_fill_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("auth.secret", "shh")
            .unwrap()
            .set_override("logging.format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.auth.secret.as_deref(), Some("shh"));
        assert_eq!(config.auth.token_expiration_days, 60);
        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_configured_url_wins() {
        let database = DatabaseConfig {
            url: Some("postgres://localhost/conduit".to_string()),
            max_connections: 1,
        };

        assert_eq!(
            database.resolve_url().as_deref(),
            Some("postgres://localhost/conduit")
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let auth = AuthConfig {
            secret: Some("super-secret".to_string()),
            token_expiration_days: 60,
        };

        assert!(!format!("{:?}", auth).contains("super-secret"));
    }
}
