//! Pipeline facade: series → L-moments → parameters → design value.
//!
//! `DesignValueEstimator` carries the validation policy so callers configure
//! strict mode once. The free functions `fit` and `design_value` run with the
//! default (non-strict, N ≥ 10) policy.

use tracing::debug;

use crate::analysis::gumbel::{fit_parameters, invert};
use crate::analysis::lmoments::sample_lmoments;
use crate::analysis::validation::ValidationPolicy;
use crate::error::Result;
use crate::model::{AnnualMaximaSeries, DesignValue, GumbelParameters, ReturnPeriod};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DesignValueEstimator {
    policy: ValidationPolicy,
}

impl DesignValueEstimator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Fits Gumbel parameters to an annual maxima series.
    ///
    /// # Errors
    /// - `InsufficientSample` for N < 2, or N below the threshold in strict mode
    /// - `DegenerateDistribution` when every value is equal
    pub fn fit(&self, series: &AnnualMaximaSeries) -> Result<GumbelParameters> {
        let lmoments = sample_lmoments(series)?;
        self.policy.check_sample_size(series.len())?;
        fit_parameters(&lmoments, series.len())
    }

    /// Inverts fitted parameters at one return period.
    ///
    /// # Errors
    /// - `InvalidInput` for a non-finite or non-positive return period
    /// - `OutOfDomain` when the period is incompatible with the parameters
    /// - `InsufficientSample` in strict mode for parameters fitted from a
    ///   short series by an external estimator
    pub fn design_value(
        &self,
        parameters: &GumbelParameters,
        return_period_years: f64,
    ) -> Result<DesignValue> {
        let return_period = ReturnPeriod::new(return_period_years)?;
        let sample_size = parameters.sample_size();
        let confidence = if self.policy.strict {
            self.policy.check_sample_size(sample_size)?
        } else {
            self.policy.confidence(sample_size)
        };

        let inversion = invert(parameters, return_period)?;
        debug!(
            return_period = return_period.years(),
            magnitude = inversion.magnitude,
            argument = inversion.argument,
            "Computed design value"
        );

        Ok(DesignValue {
            magnitude: inversion.magnitude,
            return_period_years: return_period.years(),
            frequency: return_period.frequency(),
            parameters: *parameters,
            sample_size,
            confidence,
        })
    }

    /// Fits the series and evaluates one return period.
    pub fn fit_design_value(
        &self,
        series: &AnnualMaximaSeries,
        return_period_years: f64,
    ) -> Result<DesignValue> {
        let parameters = self.fit(series)?;
        self.design_value(&parameters, return_period_years)
    }

    /// Fits the series once and evaluates every requested return period.
    ///
    /// The first failing period aborts the whole call.
    pub fn design_values(
        &self,
        series: &AnnualMaximaSeries,
        return_periods: &[f64],
    ) -> Result<Vec<DesignValue>> {
        let parameters = self.fit(series)?;
        return_periods
            .iter()
            .map(|&years| self.design_value(&parameters, years))
            .collect()
    }
}

/// Fits Gumbel parameters with the default validation policy.
pub fn fit(series: &AnnualMaximaSeries) -> Result<GumbelParameters> {
    DesignValueEstimator::default().fit(series)
}

/// Design value for `return_period_years` with the default validation policy.
pub fn design_value(parameters: &GumbelParameters, return_period_years: f64) -> Result<DesignValue> {
    DesignValueEstimator::default().design_value(parameters, return_period_years)
}
