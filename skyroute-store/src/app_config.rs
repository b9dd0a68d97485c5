use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Applied uniformly on top of the fare: total = price * seats * (1 + tax_rate).
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    #[serde(default = "default_max_passengers")]
    pub max_passengers: usize,
    #[serde(default = "default_transition_delay_ms")]
    pub transition_delay_ms: u64,
    #[serde(default = "default_payment_delay_ms")]
    pub payment_delay_ms: u64,
    /// Seeded into the wallet only when no balance has been stored yet.
    #[serde(default)]
    pub opening_balance: Decimal,
}

fn default_tax_rate() -> Decimal { Decimal::new(18, 2) }
fn default_max_passengers() -> usize { 4 }
fn default_transition_delay_ms() -> u64 { 300 }
fn default_payment_delay_ms() -> u64 { 1500 }

impl BusinessRules {
    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }

    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    /// Same rules with every simulated delay removed.
    pub fn without_delays(mut self) -> Self {
        self.transition_delay_ms = 0;
        self.payment_delay_ms = 0;
        self
    }
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            max_passengers: default_max_passengers(),
            transition_delay_ms: default_transition_delay_ms(),
            payment_delay_ms: default_payment_delay_ms(),
            opening_balance: Decimal::ZERO,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_dir = env::var("SKYROUTE_CONFIG_DIR").unwrap_or_else(|_| "config".into());
        Self::load_from(&config_dir)
    }

    pub fn load_from(config_dir: &str) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&format!("{}/default", config_dir)))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name(&format!("{}/local", config_dir)).required(false))
            // e.g. `SKYROUTE__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("SKYROUTE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
