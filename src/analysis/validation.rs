//! Input checks and the minimum-sample-size policy.
//!
//! Samples must be finite and non-negative before they reach the estimator.
//! Short series are either flagged (default) or rejected (strict mode).

use tracing::warn;

use crate::error::{ConfigError, DesignValueError, Result};
use crate::model::{Confidence, DEFAULT_MIN_RELIABLE_SAMPLE, MIN_FIT_SAMPLE};

/// Rejects the first non-finite or negative sample.
pub fn validate_samples(values: &[f64]) -> Result<()> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(DesignValueError::InvalidInput {
                reason: format!("sample {} is not finite", index),
                value,
            });
        }
        if value < 0.0 {
            return Err(DesignValueError::InvalidInput {
                reason: format!("sample {} is negative", index),
                value,
            });
        }
    }
    Ok(())
}

/// How short series are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Below this many annual maxima a fit is statistically unreliable.
    pub min_reliable_sample: usize,
    /// Fail short series instead of flagging them.
    pub strict: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_reliable_sample: DEFAULT_MIN_RELIABLE_SAMPLE,
            strict: false,
        }
    }
}

impl ValidationPolicy {
    pub fn new(min_reliable_sample: usize, strict: bool) -> std::result::Result<Self, ConfigError> {
        let policy = Self {
            min_reliable_sample,
            strict,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Strict policy with the default threshold.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// The threshold has to leave room for the second L-moment.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.min_reliable_sample < MIN_FIT_SAMPLE {
            return Err(ConfigError::Invalid(format!(
                "min_reliable_sample must be at least {}, got {}",
                MIN_FIT_SAMPLE, self.min_reliable_sample
            )));
        }
        Ok(())
    }

    /// Classifies a sample size without logging or failing.
    pub fn confidence(&self, sample_size: usize) -> Confidence {
        if sample_size >= self.min_reliable_sample {
            Confidence::Reliable
        } else {
            Confidence::LowSampleSize
        }
    }

    /// Applies the policy ahead of a fit.
    ///
    /// In strict mode a sub-threshold sample fails with `InsufficientSample`;
    /// otherwise it is logged and reported as `LowSampleSize`.
    pub fn check_sample_size(&self, sample_size: usize) -> Result<Confidence> {
        match self.confidence(sample_size) {
            Confidence::Reliable => Ok(Confidence::Reliable),
            Confidence::LowSampleSize if self.strict => Err(DesignValueError::InsufficientSample {
                sample_size,
                required: self.min_reliable_sample,
            }),
            Confidence::LowSampleSize => {
                warn!(
                    sample_size,
                    required = self.min_reliable_sample,
                    "Annual maxima series is shorter than the reliability threshold"
                );
                Ok(Confidence::LowSampleSize)
            }
        }
    }
}
