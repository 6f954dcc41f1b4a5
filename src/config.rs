//! Analysis configuration loader - parses design_values.toml
//!
//! Keeps the reliability threshold, strict mode, return periods, worker
//! count and completeness screening out of code so a batch run can be
//! retuned without recompiling. Every key is optional.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::analysis::groupings::{annual_maxima, filter_complete, into_series};
use crate::analysis::validation::ValidationPolicy;
use crate::error::ConfigError;
use crate::estimator::DesignValueEstimator;
use crate::model::{
    AnnualMaximaSeries, AnnualMaximum, DEFAULT_MIN_RELIABLE_SAMPLE, Observation, SeriesKey,
};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "design_values.toml";

/// `[analysis]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub min_reliable_sample: usize,
    pub strict: bool,
    /// Return periods, in years, evaluated for every series.
    pub return_periods: Vec<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_reliable_sample: DEFAULT_MIN_RELIABLE_SAMPLE,
            strict: false,
            return_periods: vec![10.0, 25.0, 50.0, 100.0],
        }
    }
}

/// `[batch]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// `[grouping]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Observations expected in a complete year; 0 disables screening.
    pub expected_observations_per_year: usize,
    /// Minimum fraction of expected observations for a year to count.
    pub min_completeness: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            expected_observations_per_year: 0,
            min_completeness: 0.0,
        }
    }
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DesignValueConfig {
    pub analysis: AnalysisConfig,
    pub batch: BatchConfig,
    pub grouping: GroupingConfig,
}

impl DesignValueConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: DesignValueConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy().validate()?;

        if let Some(&bad) = self
            .analysis
            .return_periods
            .iter()
            .find(|t| !(t.is_finite() && **t > 0.0))
        {
            return Err(ConfigError::Invalid(format!(
                "return periods must be positive, got {}",
                bad
            )));
        }
        if self.batch.workers == 0 {
            return Err(ConfigError::Invalid("batch.workers must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.grouping.min_completeness) {
            return Err(ConfigError::Invalid(format!(
                "grouping.min_completeness must be within [0, 1], got {}",
                self.grouping.min_completeness
            )));
        }
        Ok(())
    }

    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            min_reliable_sample: self.analysis.min_reliable_sample,
            strict: self.analysis.strict,
        }
    }

    pub fn estimator(&self) -> DesignValueEstimator {
        DesignValueEstimator::new(self.policy())
    }

    /// Applies the `[grouping]` completeness screen to grouped yearly maxima.
    pub fn screen(
        &self,
        maxima: BTreeMap<SeriesKey, Vec<AnnualMaximum>>,
    ) -> BTreeMap<SeriesKey, Vec<AnnualMaximum>> {
        filter_complete(
            maxima,
            self.grouping.expected_observations_per_year,
            self.grouping.min_completeness,
        )
    }

    /// Observations → screened annual maxima series, one per key.
    pub fn assemble(
        &self,
        observations: Vec<Observation>,
    ) -> BTreeMap<SeriesKey, crate::error::Result<AnnualMaximaSeries>> {
        into_series(self.screen(annual_maxima(observations)))
    }
}

/// Loads configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<DesignValueConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    DesignValueConfig::from_toml_str(&contents)
}

/// Loads `design_values.toml` from the working directory.
pub fn load_default_config() -> Result<DesignValueConfig, ConfigError> {
    load_config(DEFAULT_CONFIG_PATH)
}
