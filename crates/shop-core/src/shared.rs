//! Shared configuration used by the core and the gateway.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file looked up when `SHOP_CONFIG` is not set (extension resolved by the `config` crate).
pub const DEFAULT_CONFIG_PATH: &str = "config/gateway";

/// Global application configuration (gateway identity + knowledge source). Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Shop identity shown by `/v1/status` and the startup log.
    pub app_name: String,
    /// Bind address for the gateway.
    pub host: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Optional JSON fact file. When unset the built-in shop facts are used.
    #[serde(default)]
    pub knowledge_path: Option<String>,
    /// If true, `shop-gateway` serves the chat page from `shop-frontend/`.
    #[serde(default)]
    pub frontend_enabled: bool,
    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "Shop Assistant".to_string(),
            host: "0.0.0.0".to_string(),
            port: 5000,
            knowledge_path: None,
            frontend_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: env `SHOP_*` (e.g. `SHOP_PORT`) > `SHOP_CONFIG` file (or
    /// `config/gateway.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("SHOP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    /// Same as [`CoreConfig::load`] with an explicit file path. A missing file is not an error.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, None)
    }

    /// Loads with `vars` standing in for the process environment when given (`SHOP_*` keys).
    pub fn load_with_env(
        config_path: &str,
        vars: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("frontend_enabled", defaults.frontend_enabled)?;

        let path = Path::new(config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder.add_source(config::File::with_name(config_path).required(false))
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("SHOP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_origins")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?;

        built.try_deserialize()
    }

    /// `host:port` for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when CORS should accept any origin.
    pub fn cors_allow_any(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}
