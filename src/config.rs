use std::env;
use std::net::IpAddr;

use config_crate::{Config as RawConfig, ConfigError, Environment, File};

use crate::models::{Kg, Pricing};
use crate::sentry_integration::SentryConfig;

enum Env {
    Development,
    Test,
    Production,
}

impl Env {
    fn new() -> Self {
        match env::var("RUN_MODE") {
            Ok(ref s) if s == "test" => Env::Test,
            Ok(ref s) if s == "production" => Env::Production,
            _ => Env::Development,
        }
    }

    fn to_string(&self) -> &'static str {
        match self {
            Env::Development => "development",
            Env::Production => "production",
            Env::Test => "test",
        }
    }
}

/// Service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Listen {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Database {
    pub dsn: String,
    #[serde(default = "Database::default_pool_size")]
    pub pool_size: u32,
}

impl Database {
    fn default_pool_size() -> u32 {
        10
    }
}

/// Storehouse capacity the dashboard measures consumption against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub max_kg: Kg,
}

impl Default for Inventory {
    fn default() -> Self {
        Self { max_kg: Kg(7000.0) }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Server listen address
    pub listen: Listen,
    /// Database settings
    pub db: Database,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub pricing: Pricing,
    /// Error reporting, disabled when absent
    pub sentry: Option<SentryConfig>,
}

impl Config {
    /// Creates config from base.toml, which are overwritten by <env>.toml, where
    /// env is one of development, test, production. After that it could be overwritten
    /// by env variables like KURA_LISTEN__PORT (this will override `listen.port` field in config)
    pub fn new() -> Result<Self, ConfigError> {
        let env = Env::new();
        let mut s = RawConfig::new();

        s.merge(File::with_name("config/base"))?;
        // Optional file specific for environment
        s.merge(File::with_name(&format!("config/{}", env.to_string())).required(false))?;

        // Add in settings from the environment (with a prefix of KURA)
        s.merge(Environment::with_prefix("KURA").separator("__"))?;

        s.try_into()
    }
}
