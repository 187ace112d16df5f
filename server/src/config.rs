//! Configuration management for the server.

use catalog_engine::SyncPolicy;
use secrecy::SecretString;
use std::env;
use std::time::Duration;

/// Default interval between scheduled sync passes (six hours).
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 6 * 60 * 60;

/// WooCommerce caps `per_page` at 100.
const MAX_PER_PAGE: u32 = 100;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Remote catalog settings
    pub woocommerce: WooCommerceConfig,
    /// Scheduled sync settings
    pub sync: SyncConfig,
}

/// Connection settings for the WooCommerce REST API.
#[derive(Debug, Clone)]
pub struct WooCommerceConfig {
    /// Store base URL, e.g. `https://shop.example.com`
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: SecretString,
    /// Products requested per page
    pub per_page: u32,
    /// Retries per page request after the first attempt
    pub max_retries: u32,
}

/// Settings for the sync scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Interval between scheduled passes; `None` disables the scheduler
    pub interval: Option<Duration>,
    /// Run a pass as soon as the server starts
    pub run_on_startup: bool,
    /// Per-record failure policy
    pub policy: SyncPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let woocommerce = WooCommerceConfig {
            base_url: lookup("WOOCOMMERCE_URL")
                .ok_or(ConfigError::Missing("WOOCOMMERCE_URL"))?
                .trim_end_matches('/')
                .to_string(),
            consumer_key: lookup("WOOCOMMERCE_CONSUMER_KEY")
                .ok_or(ConfigError::Missing("WOOCOMMERCE_CONSUMER_KEY"))?,
            consumer_secret: lookup("WOOCOMMERCE_CONSUMER_SECRET")
                .ok_or(ConfigError::Missing("WOOCOMMERCE_CONSUMER_SECRET"))?
                .into(),
            per_page: parse_or(&lookup, "WOOCOMMERCE_PER_PAGE", MAX_PER_PAGE)?,
            max_retries: parse_or(&lookup, "WOOCOMMERCE_MAX_RETRIES", 3)?,
        };

        if !(1..=MAX_PER_PAGE).contains(&woocommerce.per_page) {
            return Err(ConfigError::Invalid("WOOCOMMERCE_PER_PAGE"));
        }

        let interval_secs: u64 =
            parse_or(&lookup, "SYNC_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL_SECS)?;
        let policy = match lookup("SYNC_POLICY").as_deref().map(str::trim) {
            None | Some("") | Some("fail-fast") => SyncPolicy::FailFast,
            Some("isolate") => SyncPolicy::Isolate,
            Some(_) => return Err(ConfigError::Invalid("SYNC_POLICY")),
        };

        let sync = SyncConfig {
            interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            run_on_startup: parse_or(&lookup, "SYNC_ON_STARTUP", false)?,
            policy,
        };

        Ok(Self {
            host,
            port,
            database_url,
            woocommerce,
            sync,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid(key))
        }
        _ => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid {0} value")]
    Invalid(&'static str),
}
