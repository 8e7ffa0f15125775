use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Full sqlx connection URL. When unset the database lives in `server.data_dir`.
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Insert demo users, phones and an order on startup
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            seed_demo_data: false,
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

impl DatabaseConfig {
    /// Resolve the connection URL, falling back to a file under `data_dir`
    pub fn resolve_url(&self, data_dir: &Path) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "sqlite:{}?mode=rwc",
                data_dir.join("phone-shop.db").display()
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens. Left empty, a random one is
    /// generated at startup by `ensure_jwt_secret`.
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// Bootstrap admin account, created on startup if missing
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
            admin_email: None,
            admin_password: None,
        }
    }
}

impl AuthConfig {
    /// Fill in a random signing secret when none is configured. Returns
    /// true if one was generated.
    pub fn ensure_jwt_secret(&mut self) -> bool {
        if !self.jwt_secret.is_empty() {
            return false;
        }
        self.jwt_secret = uuid::Uuid::new_v4().to_string();
        true
    }
}

fn default_token_ttl_hours() -> i64 {
    24
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            pagination: PaginationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.pagination.default_page_size, 20);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!(config.auth.jwt_secret.is_empty());
        assert!(!config.database.seed_demo_data);
    }

    #[test]
    fn test_missing_jwt_secret_is_generated_once() {
        let mut config = Config::from_toml("").unwrap();
        assert!(config.auth.ensure_jwt_secret());
        let generated = config.auth.jwt_secret.clone();
        assert!(!generated.is_empty());

        assert!(!config.auth.ensure_jwt_secret());
        assert_eq!(config.auth.jwt_secret, generated);

        let mut config = Config::from_toml("[auth]\njwt_secret = \"s3cret\"").unwrap();
        assert!(!config.auth.ensure_jwt_secret());
        assert_eq!(config.auth.jwt_secret, "s3cret");
    }

    #[test]
    fn test_partial_sections_override() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8081

            [auth]
            jwt_secret = "s3cret"
            admin_email = "root@shop.test"

            [pagination]
            max_page_size = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.admin_email.as_deref(), Some("root@shop.test"));
        assert!(config.auth.admin_password.is_none());
        assert_eq!(config.pagination.max_page_size, 50);
        assert_eq!(config.pagination.default_page_size, 20);
    }

    #[test]
    fn test_database_url_resolution() {
        let db = DatabaseConfig::default();
        let url = db.resolve_url(Path::new("/var/lib/shop"));
        assert!(url.starts_with("sqlite:"));
        assert!(url.contains("phone-shop.db"));

        let db = DatabaseConfig {
            url: Some("sqlite::memory:".to_string()),
            ..DatabaseConfig::default()
        };
        assert_eq!(db.resolve_url(Path::new("/ignored")), "sqlite::memory:");
    }
}
