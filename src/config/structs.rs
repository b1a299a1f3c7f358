use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Static configuration, loaded once at startup from TOML plus environment
/// overrides. Secrets always come from the environment when set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub webhook: WebhookConfig,
    pub links: LinksConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// "sqlite", "mysql", "postgres" — inferred from the URL when empty
    pub backend: String,
    pub database_url: String,
    pub pool_size: u32,
    pub retry_count: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: String::new(),
            database_url: "sqlite://afftrack.db".to_string(),
            pool_size: 10,
            retry_count: 3,
            retry_base_delay_ms: 100,
            retry_max_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub access_token_minutes: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebhookConfig {
    /// Shared fallback secret for platforms without their own entry
    pub shared_secret: String,
    /// Per-platform secrets, keyed by lowercase platform name
    pub platform_secrets: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Outbound URL templates per platform; `{product_id}` is substituted
    pub templates: HashMap<String, String>,
    pub fallback_template: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            "amazon".to_string(),
            "https://www.amazon.com/dp/{product_id}?tag=afftrack-20".to_string(),
        );
        templates.insert(
            "ebay".to_string(),
            "https://www.ebay.com/itm/{product_id}?mkcid=1&campid=afftrack".to_string(),
        );
        templates.insert(
            "aliexpress".to_string(),
            "https://www.aliexpress.com/item/{product_id}.html?aff_platform=afftrack".to_string(),
        );
        Self {
            templates,
            fallback_template: "https://out.afftrack.dev/{product_id}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json"
    pub format: String,
    /// Empty means stdout
    pub file: Option<String>,
    pub enable_rotation: bool,
    pub max_backups: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            file: None,
            enable_rotation: true,
            max_backups: 7,
        }
    }
}

impl AppConfig {
    /// Load config from `AFFTRACK_CONFIG` (default `afftrack.toml`), then
    /// apply environment overrides. Missing file means defaults.
    pub fn load() -> Self {
        let path =
            env::var("AFFTRACK_CONFIG").unwrap_or_else(|_| "afftrack.toml".to_string());

        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}; using defaults", path, e);
                    AppConfig::default()
                }
            },
            Err(_) => AppConfig::default(),
        };

        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("SERVER_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.database_url = url;
        }
        if let Ok(secret) = env::var("JWT_SECRET") {
            self.api.jwt_secret = secret;
        }
        if let Ok(secret) = env::var("WEBHOOK_SECRET") {
            self.webhook.shared_secret = secret;
        }
        // WEBHOOK_SECRET_AMAZON=... style per-platform overrides
        for (key, value) in env::vars() {
            if let Some(platform) = key.strip_prefix("WEBHOOK_SECRET_")
                && !platform.is_empty()
            {
                self.webhook
                    .platform_secrets
                    .insert(platform.to_lowercase(), value);
            }
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}
