//! Dashboard configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.
//!
//! ```toml
//! [provider]
//! base_url = "https://query2.finance.yahoo.com"
//! timeout_secs = 30
//!
//! [defaults]
//! lookback_days = 365
//! table_rows = 10
//!
//! [symbols]
//! stock = "MSFT"
//! ```

use crate::domain::InstrumentKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub provider: ProviderConfig,
    pub defaults: DefaultsConfig,
    pub symbols: SymbolConfig,
}

/// HTTP settings for the market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".into(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
        }
    }
}

/// Longest default lookback accepted, about a century.
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Days before the end date used when no start date is given.
    pub lookback_days: u32,
    /// Rows shown in the historical table.
    pub table_rows: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            table_rows: 10,
        }
    }
}

/// Default ticker per instrument kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolConfig {
    pub stock: String,
    pub crypto: String,
    pub forex: String,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            stock: InstrumentKind::Stock.default_symbol().into(),
            crypto: InstrumentKind::Crypto.default_symbol().into(),
            forex: InstrumentKind::ForexPair.default_symbol().into(),
        }
    }
}

impl SymbolConfig {
    pub fn for_kind(&self, kind: InstrumentKind) -> &str {
        match kind {
            InstrumentKind::Stock => &self.stock,
            InstrumentKind::Crypto => &self.crypto,
            InstrumentKind::ForexPair => &self.forex,
        }
    }
}

impl DashboardConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be > 0".into()));
        }
        if self.defaults.lookback_days == 0 {
            return Err(ConfigError::Invalid("defaults.lookback_days must be > 0".into()));
        }
        if self.defaults.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::Invalid(format!(
                "defaults.lookback_days must be <= {MAX_LOOKBACK_DAYS}"
            )));
        }
        for kind in InstrumentKind::ALL {
            if self.symbols.for_kind(kind).trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "symbols.{kind} must not be empty"
                )));
            }
        }
        Ok(())
    }
}
