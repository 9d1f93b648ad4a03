use anyhow::{Context, Result, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs, time::Duration};
use tracing::debug;

pub const APP_ID_ENV_VAR: &str = "OPEN_EX_RATES_APPID";

/// Largest supported `conversion.max_decimals`. Beyond it, minor-unit
/// scaling exceeds the integer precision of an `f64`.
pub const MAX_DECIMALS: u32 = 15;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenExchangeRatesConfig {
    pub base_url: String,
    pub app_id: Option<String>,
}

impl Default for OpenExchangeRatesConfig {
    fn default() -> Self {
        OpenExchangeRatesConfig {
            base_url: "https://openexchangerates.org".to_string(),
            app_id: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub open_exchange_rates: OpenExchangeRatesConfig,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct CurrencyCacheConfig {
    /// Seconds before the cached currency list expires. 0 keeps it forever.
    #[serde(default)]
    pub timeout_seconds: u64,
}

impl CurrencyCacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then_some(Duration::from_secs(self.timeout_seconds))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConversionConfig {
    #[serde(default = "default_max_decimals")]
    pub max_decimals: u32,
}

fn default_max_decimals() -> u32 {
    2
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            max_decimals: default_max_decimals(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub available_currencies_cache: CurrencyCacheConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location, or defaults when no
    /// config file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        Self::load_or_default(Self::default_config_path()?)
    }

    fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            debug!("No config at {}, using defaults", path.as_ref().display());
            return Ok(Self::default());
        }
        Self::load_from_path(path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "cconverter", "cconverter")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "cconverter", "cconverter")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.conversion.max_decimals <= MAX_DECIMALS,
            "conversion.max_decimals must be at most {MAX_DECIMALS}, got {}",
            self.conversion.max_decimals
        );
        Ok(())
    }

    /// App id for the rate API; the environment takes precedence over the file.
    pub fn app_id(&self) -> Option<String> {
        self.app_id_with_override(env::var(APP_ID_ENV_VAR).ok())
    }

    fn app_id_with_override(&self, from_env: Option<String>) -> Option<String> {
        from_env
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.providers.open_exchange_rates.app_id.clone())
    }
}
