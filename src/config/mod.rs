//! Builds an `AppConfig` from config files and the environment.
//! Layers `config/base.toml`, the environment specific file and `APP_` prefixed env variables with `figment`.
//! Gets initialized with `OnceLock` so it only needs to get initialized once.

mod error;
mod types;

use std::{path::Path, sync::OnceLock};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

// Re-export config structs
pub use error::{ConfigError, ConfigResult};
pub use types::{AppConfig, DbConfig, Environment, NetConfig, RateLimitConfig, SslRequire};

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!(
            "{:<20} - Initializing the configuration",
            "get_or_init_config"
        );
        let base_path = std::env::current_dir().expect("Failed to determine the current DIR.");
        AppConfig::load(base_path.join("config"))
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"))
    })
}

impl AppConfig {
    /// Reads the configuration from `config_dir` and the process environment.
    pub fn load(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()?;

        let mut config = Self::figment(config_dir.as_ref(), environment).extract::<AppConfig>()?;
        config.environment = environment;

        if let Ok(port) = std::env::var("PORT") {
            config.net_config.app_port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.db_config = DbConfig::try_from(db_url.as_str())?;
        }

        // Hosted databases terminate TLS with certificates we don't verify.
        if environment.is_production() && config.db_config.require_ssl == SslRequire::Prefer {
            config.db_config.require_ssl = SslRequire::Require;
        }

        Ok(config)
    }

    fn figment(config_dir: &Path, environment: Environment) -> Figment {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
    }
}
