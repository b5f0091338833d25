use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    currency::{Currency, FixedRateTable, DEFAULT_EUR_TO_DKK},
    errors::{FinanceError, Result},
    storage::json_backend::DEFAULT_RETENTION,
    utils::{
        app_data_dir, config_file_in, ensure_dir,
        persistence::{read_json, write_json_atomic},
        DEFAULT_LOG_FILTER,
    },
};

/// Conversion rate from `currency` into the configured base currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FxRate {
    pub currency: Currency,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_currency: Currency,
    pub fx_rates: Vec<FxRate>,
    pub ledger_name: String,
    pub backup_retention: usize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: Currency::DKK,
            fx_rates: vec![FxRate {
                currency: Currency::EUR,
                rate: DEFAULT_EUR_TO_DKK,
            }],
            ledger_name: "default".into(),
            backup_retention: DEFAULT_RETENTION,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl Config {
    /// Builds the rate provider handed to the aggregation services.
    pub fn rate_table(&self) -> FixedRateTable {
        self.fx_rates
            .iter()
            .filter(|fx| fx.currency != self.base_currency)
            .fold(FixedRateTable::new(self.base_currency), |table, fx| {
                table.with_rate(fx.currency, fx.rate)
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.ledger_name.trim().is_empty() {
            return Err(FinanceError::validation("ledger name must not be empty"));
        }
        if let Some(fx) = self.fx_rates.iter().find(|fx| fx.rate <= Decimal::ZERO) {
            return Err(FinanceError::validation(format!(
                "conversion rate for {} must be positive",
                fx.currency
            )));
        }
        Ok(())
    }
}

/// Loads and saves `config.json` in the application data directory.
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    /// Reads the configuration; a missing file yields the defaults.
    pub fn load(&self) -> Result<Config> {
        let config = read_json::<Config>(&self.path)?.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        write_json_atomic(&self.path, config)?;
        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
