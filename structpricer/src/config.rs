//! TOML configuration.
//!
//! ```toml
//! log_filter = "info,sp_methods=debug"
//!
//! [pricer]
//! pricing_date = "2025-01-01"
//! engine = "monte_carlo"
//! steps = 250
//! draws = 50000
//! seed = 42
//!
//! [implied_volatility]
//! max_iterations = 50
//! ```
//!
//! The pricing date is a quoted `YYYY-MM-DD` string. Every section but
//! `[pricer]` may be omitted, as may every setting of the chosen engine.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sp_core::errors::{Error, Result};
use sp_pricingengines::{ImpliedVolatilitySettings, Pricer};
use tracing_subscriber::EnvFilter;

fn default_log_filter() -> String {
    "info".to_string()
}

/// Pricer profile, implied-volatility settings and log filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// `tracing` filter directives, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Engine profile and pricing date.
    pub pricer: Pricer,

    /// Newton settings for implied volatility.
    #[serde(default)]
    pub implied_volatility: ImpliedVolatilitySettings,
}

impl PricingConfig {
    /// Configuration with default settings around `pricer`.
    pub fn new(pricer: Pricer) -> Self {
        Self {
            log_filter: default_log_filter(),
            pricer,
            implied_volatility: ImpliedVolatilitySettings::default(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Check the pricer profile, the Newton settings and the log filter.
    pub fn validate(&self) -> Result<()> {
        self.pricer.validate()?;
        let iv = &self.implied_volatility;
        if iv.max_iterations == 0 || iv.tolerance <= 0.0 || iv.initial_guess <= 0.0 || iv.fallback_guess <= 0.0 {
            return Err(Error::Config(format!("invalid implied volatility settings {iv:?}")));
        }
        EnvFilter::try_new(&self.log_filter)
            .map_err(|e| Error::Config(format!("log filter {:?}: {e}", self.log_filter)))?;
        Ok(())
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }
}
