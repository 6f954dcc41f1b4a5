//! Gumbel (Type-I extreme value) fitting and return-period inversion.
//!
//! Parameters come from the first two L-moments:
//!
//!   α̂ = l2 / ln 2,   ξ̂ = l1 − γ·α̂
//!
//! The design value for a return period tᵣ (frequency fᵣ = 1/tᵣ) is
//!
//!   xᵥ = ξ̂ − α̂ · ln(−ln((1 − fᵣ) + F₀)),   F₀ = exp(−exp(ξ̂/α̂))
//!
//! where F₀ is the probability mass the fitted distribution puts below zero,
//! which annual maxima cannot reach.

use tracing::debug;

use crate::error::{DesignValueError, Result};
use crate::model::{EULER_GAMMA, GumbelParameters, LMoments, ReturnPeriod};

/// Converts L-moments into Gumbel location and scale.
///
/// Fails with `DegenerateDistribution` when l2 is not strictly positive,
/// e.g. for a constant series.
pub fn fit_parameters(lmoments: &LMoments, sample_size: usize) -> Result<GumbelParameters> {
    let scale = lmoments.l2 / std::f64::consts::LN_2;
    if !(scale.is_finite() && scale > 0.0) {
        return Err(DesignValueError::DegenerateDistribution { scale });
    }
    let location = lmoments.l1 - EULER_GAMMA * scale;

    debug!(location, scale, sample_size, "Fitted Gumbel parameters");
    GumbelParameters::new(location, scale, sample_size)
}

/// Result of inverting the fitted CDF at one return period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inversion {
    pub magnitude: f64,
    /// The non-exceedance argument (1 − fᵣ) + F₀, rounded; for display only.
    pub argument: f64,
}

/// Magnitude exceeded on average once every `return_period` years.
///
/// The argument (1 − fᵣ) + F₀ must lie strictly inside (0, 1); otherwise the
/// period is incompatible with the fitted distribution and `OutOfDomain` is
/// returned.
pub fn invert(parameters: &GumbelParameters, return_period: ReturnPeriod) -> Result<Inversion> {
    let f_r = return_period.frequency();
    let f0 = parameters.zero_boundary_probability();

    // The argument is 1 + shift. Bounds are decided on the shift itself,
    // since 1 + shift rounds to 1 once fᵣ falls below f64 resolution.
    let shift = f0 - f_r;
    let argument = 1.0 + shift;

    if !(shift > -1.0 && shift < 0.0) {
        return Err(DesignValueError::OutOfDomain {
            return_period: return_period.years(),
            argument,
        });
    }

    let neg_log = -shift.ln_1p();
    let magnitude = parameters.location() - parameters.scale() * neg_log.ln();

    if !magnitude.is_finite() {
        return Err(DesignValueError::OutOfDomain {
            return_period: return_period.years(),
            argument,
        });
    }

    Ok(Inversion { magnitude, argument })
}

impl GumbelParameters {
    /// F(x) = exp(−exp(−(x − ξ̂)/α̂))
    pub fn cdf(&self, x: f64) -> f64 {
        (-(-(x - self.location()) / self.scale()).exp()).exp()
    }

    /// F₀, the fitted CDF evaluated at zero.
    pub fn zero_boundary_probability(&self) -> f64 {
        self.cdf(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(location: f64, scale: f64) -> GumbelParameters {
        GumbelParameters::new(location, scale, 30).expect("valid parameters")
    }

    fn period(years: f64) -> ReturnPeriod {
        ReturnPeriod::new(years).expect("valid period")
    }

    #[test]
    fn test_fit_parameters_formulas() {
        let lm = LMoments { l1: 11.7, l2: 101.0 / 90.0 };
        let p = fit_parameters(&lm, 10).expect("positive l2");
        let alpha = (101.0 / 90.0) / 2f64.ln();
        assert_relative_eq!(p.scale(), alpha, epsilon = 1e-12);
        assert_relative_eq!(p.location(), 11.7 - EULER_GAMMA * alpha, epsilon = 1e-12);
        assert_eq!(p.sample_size(), 10);
    }

    #[test]
    fn test_fit_parameters_zero_l2_is_degenerate() {
        let lm = LMoments { l1: 7.0, l2: 0.0 };
        assert_eq!(
            fit_parameters(&lm, 10).unwrap_err(),
            DesignValueError::DegenerateDistribution { scale: 0.0 }
        );
    }

    #[test]
    fn test_cdf_at_location_is_inverse_e() {
        let p = params(12.0, 3.0);
        assert_relative_eq!(p.cdf(12.0), (-1.0f64).exp(), epsilon = 1e-12);
        assert!(p.cdf(-100.0) < 1e-12);
        assert!(p.cdf(1000.0) > 1.0 - 1e-12);
    }

    #[test]
    fn test_zero_boundary_probability_strictly_inside_unit_interval() {
        for (location, scale) in [(0.0, 1.0), (1.0, 2.0), (-3.0, 1.5), (2.0, 0.8)] {
            let f0 = params(location, scale).zero_boundary_probability();
            assert!(f0 > 0.0 && f0 < 1.0, "F0 = {} for ({}, {})", f0, location, scale);
        }
    }

    #[test]
    fn test_invert_matches_standard_quantile_when_f0_vanishes() {
        // ξ/α = 20 puts F₀ far below f64 resolution of 1 − fᵣ.
        let p = params(40.0, 2.0);
        let inv = invert(&p, period(100.0)).expect("in domain");
        let expected = 40.0 - 2.0 * (-(0.99f64).ln()).ln();
        assert_relative_eq!(inv.magnitude, expected, epsilon = 1e-9);
        assert_relative_eq!(inv.argument, 0.99, epsilon = 1e-15);
    }

    #[test]
    fn test_invert_includes_zero_boundary_mass() {
        let p = params(0.0, 1.0);
        let f0 = (-1.0f64).exp();
        let inv = invert(&p, period(2.0)).expect("0.5 + F0 < 1");
        assert_relative_eq!(inv.argument, 0.5 + f0, epsilon = 1e-12);
        assert_relative_eq!(inv.magnitude, -(-(0.5 + f0).ln()).ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_invert_out_of_domain_when_argument_reaches_one() {
        // F₀ = e⁻¹ ≈ 0.368 > fᵣ = 0.1, so (1 − fᵣ) + F₀ > 1.
        let p = params(0.0, 1.0);
        match invert(&p, period(10.0)) {
            Err(DesignValueError::OutOfDomain { return_period, argument }) => {
                assert_eq!(return_period, 10.0);
                assert!(argument >= 1.0);
            }
            other => panic!("expected OutOfDomain, got {:?}", other),
        }
    }

    #[test]
    fn test_invert_out_of_domain_for_sub_annual_period() {
        // fᵣ = 2 drives the argument below zero.
        let p = params(10.0, 1.0);
        assert!(matches!(
            invert(&p, period(0.5)),
            Err(DesignValueError::OutOfDomain { argument, .. }) if argument <= 0.0
        ));
    }

    #[test]
    fn test_invert_accepts_periods_beyond_f64_resolution() {
        // fᵣ = 1e-17 rounds (1 − fᵣ) to 1, yet the true argument is inside (0, 1).
        let p = params(40.0, 2.0);
        let shorter = invert(&p, period(1e15)).expect("in domain");
        let longer = invert(&p, period(1e17)).expect("still in domain");
        assert_relative_eq!(longer.magnitude, 40.0 - 2.0 * 1e-17f64.ln(), epsilon = 1e-9);
        assert!(longer.magnitude > shorter.magnitude);
    }

    #[test]
    fn test_invert_monotone_in_return_period() {
        let p = params(10.765, 1.619);
        let periods = [1.01, 1.5, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 500.0, 1e4, 1e6];
        let magnitudes: Vec<f64> = periods
            .iter()
            .map(|&t| invert(&p, period(t)).expect("in domain").magnitude)
            .collect();
        for pair in magnitudes.windows(2) {
            assert!(pair[1] >= pair[0], "not monotone: {:?}", magnitudes);
        }
    }
}
