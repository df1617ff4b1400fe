use crate::core::currency::CurrencySet;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_RATE_API_URL: &str = "https://open.er-api.com";
pub const DEFAULT_FLAGS_URL: &str = "https://flagsapi.com";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Pair and amount used when nothing is given on the command line.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefaultsConfig {
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: String,
    #[serde(default = "default_amount")]
    pub amount: String,
}

fn default_from() -> String {
    "USD".to_string()
}

fn default_to() -> String {
    "INR".to_string()
}

fn default_amount() -> String {
    "1".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            from: default_from(),
            to: default_to(),
            amount: default_amount(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenErApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub open_er_api: Option<OpenErApiConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            open_er_api: Some(OpenErApiConfig {
                base_url: DEFAULT_RATE_API_URL.to_string(),
                timeout_ms: DEFAULT_TIMEOUT_MS,
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FlagsConfig {
    pub base_url: String,
}

impl Default for FlagsConfig {
    fn default() -> Self {
        FlagsConfig {
            base_url: DEFAULT_FLAGS_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub flags: FlagsConfig,
    /// Optional YAML file replacing the built-in currency table.
    #[serde(default)]
    pub currency_table: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file has been set up.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("io", "ccx", "ccx").context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn rate_api_base_url(&self) -> &str {
        self.providers
            .open_er_api
            .as_ref()
            .map_or(DEFAULT_RATE_API_URL, |p| &p.base_url)
    }

    pub fn rate_api_timeout(&self) -> Duration {
        Duration::from_millis(
            self.providers
                .open_er_api
                .as_ref()
                .map_or(DEFAULT_TIMEOUT_MS, |p| p.timeout_ms),
        )
    }

    /// The configured currency table, or the built-in one.
    pub fn load_currencies(&self) -> Result<CurrencySet> {
        match &self.currency_table {
            Some(path) => CurrencySet::load_from_path(path),
            None => CurrencySet::builtin(),
        }
    }
}
