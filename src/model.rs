//! Core data types for the design value pipeline.
//!
//! Every type here is an immutable value: series, L-moments, fitted
//! parameters and design values are built once by the stage that owns them
//! and never mutated afterwards. Construction is the only place invariants
//! are checked; the numerics live in `analysis`.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::analysis::validation::validate_samples;
use crate::error::{DesignValueError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Euler–Mascheroni constant, the mean of the standard Gumbel distribution.
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Fewest annual maxima for which a fit is considered statistically reliable.
pub const DEFAULT_MIN_RELIABLE_SAMPLE: usize = 10;

/// Fewest annual maxima for which the second L-moment is defined.
pub const MIN_FIT_SAMPLE: usize = 2;

// ---------------------------------------------------------------------------
// Series types
// ---------------------------------------------------------------------------

/// Identifies one station/variable pair, e.g. ("1108447", "rainfall_rate_15min").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub station_id: String,
    pub variable: String,
}

impl SeriesKey {
    pub fn new(station_id: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            variable: variable.into(),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.station_id, self.variable)
    }
}

/// Annual maximum values for one station and one variable.
///
/// Values are sorted ascending on construction, so `values()` yields the
/// order statistics X(1) ≤ … ≤ X(N). Every value is finite and non-negative
/// and the series is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualMaximaSeries {
    values: Vec<f64>,
}

impl AnnualMaximaSeries {
    /// Validates and sorts the samples.
    ///
    /// Fails with `InsufficientSample` for an empty input and `InvalidInput`
    /// for the first non-finite or negative value.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(DesignValueError::InsufficientSample {
                sample_size: 0,
                required: 1,
            });
        }
        validate_samples(&values)?;

        let mut values = values;
        values.sort_by(f64::total_cmp);
        Ok(Self { values })
    }

    /// Order statistics, ascending.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TryFrom<Vec<f64>> for AnnualMaximaSeries {
    type Error = DesignValueError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl TryFrom<&[f64]> for AnnualMaximaSeries {
    type Error = DesignValueError;

    fn try_from(values: &[f64]) -> Result<Self> {
        Self::new(values.to_vec())
    }
}

/// A single raw observation handed over by the data-access layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station_id: String,
    pub variable: String,
    pub time: NaiveDateTime,
    pub value: f64,
}

/// The largest observation of one calendar year at one station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualMaximum {
    pub year: i32,
    pub value: f64,
    /// Number of valid observations that year, used for completeness checks.
    pub observation_count: usize,
}

// ---------------------------------------------------------------------------
// Estimates
// ---------------------------------------------------------------------------

/// First two sample L-moments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LMoments {
    /// Sample mean.
    pub l1: f64,
    /// Half the expected absolute difference between two draws.
    pub l2: f64,
}

/// Location/scale of a fitted Gumbel distribution.
///
/// The scale is always finite and strictly positive. `sample_size` records
/// how many annual maxima the parameters were estimated from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GumbelParameters {
    location: f64,
    scale: f64,
    sample_size: usize,
}

impl GumbelParameters {
    /// Builds parameters from an external estimator.
    pub fn new(location: f64, scale: f64, sample_size: usize) -> Result<Self> {
        if !location.is_finite() {
            return Err(DesignValueError::InvalidInput {
                reason: "location parameter must be finite".to_string(),
                value: location,
            });
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(DesignValueError::DegenerateDistribution { scale });
        }
        Ok(Self {
            location,
            scale,
            sample_size,
        })
    }

    /// ξ̂
    pub fn location(&self) -> f64 {
        self.location
    }

    /// α̂
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

// ---------------------------------------------------------------------------
// Requests and results
// ---------------------------------------------------------------------------

/// A requested return period in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnPeriod {
    years: f64,
}

impl ReturnPeriod {
    pub fn new(years: f64) -> Result<Self> {
        if !(years.is_finite() && years > 0.0) {
            return Err(DesignValueError::InvalidInput {
                reason: "return period must be a finite number of years greater than zero"
                    .to_string(),
                value: years,
            });
        }
        Ok(Self { years })
    }

    pub fn years(&self) -> f64 {
        self.years
    }

    /// Annual exceedance frequency, 1/tᵣ.
    pub fn frequency(&self) -> f64 {
        1.0 / self.years
    }
}

/// Whether the sample behind a design value met the reliability threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Reliable,
    LowSampleSize,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Reliable => "reliable",
            Confidence::LowSampleSize => "low_sample_size",
        }
    }

    pub fn is_reliable(&self) -> bool {
        matches!(self, Confidence::Reliable)
    }
}

/// Magnitude of the event expected once per `return_period_years`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DesignValue {
    pub magnitude: f64,
    pub return_period_years: f64,
    pub frequency: f64,
    pub parameters: GumbelParameters,
    pub sample_size: usize,
    pub confidence: Confidence,
}
