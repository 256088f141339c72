use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub app: AppSettings,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Without a URL the service keeps its data in memory.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    /// Public base URL, used to build QR code check-in links
    pub domain: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: i64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

fn default_requests_per_minute() -> i64 { 120 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `ENCORE__AUTH__JWT_SECRET=...` sets `auth.jwt_secret`
            .add_source(config::Environment::with_prefix("ENCORE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Builds a config from a TOML document alone.
    pub fn from_toml(raw: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        port = 8080

        [auth]
        jwt_secret = "secret"
        jwt_expiration_seconds = 3600

        [app]
        domain = "http://localhost:8080"
    "#;

    #[test]
    fn test_optional_sections_default() {
        let config = Config::from_toml(MINIMAL).unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.database.url.is_none());
        assert_eq!(config.database.max_connections, 5);
        assert!(config.redis.url.is_none());
        assert_eq!(config.limits.requests_per_minute, 120);
    }

    #[test]
    fn test_database_section() {
        let raw = format!("{}\n[database]\nurl = \"postgres://localhost/encore\"\nmax_connections = 12\n", MINIMAL);
        let config = Config::from_toml(&raw).unwrap();
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/encore"));
        assert_eq!(config.database.max_connections, 12);
    }

    #[test]
    fn test_missing_auth_fails() {
        assert!(Config::from_toml("[server]\nport = 1\n[app]\ndomain = \"x\"\n").is_err());
    }
}
