use crate::error::{AnalyticsError, AnalyticsResult};
use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 1_000;
pub const DEFAULT_FETCH_CEILING: usize = 20_000;
pub const DEFAULT_COMMISSION_RATE: f64 = 22.0;

/// Engine tuning knobs. Everything has a default, so a config file
/// only needs the fields it wants to override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Rows requested per Record Store page.
    pub page_size: usize,
    /// Hard cap on rows fetched per collection. Hitting it flags truncation.
    pub fetch_ceiling: usize,
    /// Commission percentage used when the Settings Provider has none.
    pub default_commission_rate: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            fetch_ceiling: DEFAULT_FETCH_CEILING,
            default_commission_rate: DEFAULT_COMMISSION_RATE,
        }
    }
}

impl AnalyticsConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    /// In tests, use AnalyticsConfig::default().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalyticsConfig = serde_json::from_str(&content)
            .map_err(AnalyticsError::Serialization)
            .with_context(|| format!("Cannot parse {path}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.page_size == 0 {
            return Err(AnalyticsError::InvalidConfig("page_size must be > 0".into()));
        }
        if self.fetch_ceiling < self.page_size {
            return Err(AnalyticsError::InvalidConfig(format!(
                "fetch_ceiling ({}) must be at least page_size ({})",
                self.fetch_ceiling, self.page_size
            )));
        }
        if !is_valid_rate(self.default_commission_rate) {
            return Err(AnalyticsError::InvalidConfig(format!(
                "default_commission_rate {} is outside 0-100",
                self.default_commission_rate
            )));
        }
        Ok(())
    }

    /// Resolve the commission rate for one computation.
    pub fn commission_rate(&self, provided: Option<f64>) -> f64 {
        match provided {
            Some(rate) if is_valid_rate(rate) => rate,
            Some(rate) => {
                log::warn!(
                    "commission rate {rate} is outside 0-100; using default {}",
                    self.default_commission_rate
                );
                self.default_commission_rate
            }
            None => self.default_commission_rate,
        }
    }
}

fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && (0.0..=100.0).contains(&rate)
}
