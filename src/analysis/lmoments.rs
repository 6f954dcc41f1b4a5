//! Sample L-moment estimation.
//!
//! l1 is the sample mean. l2 is the U-statistic
//!
//!   l2 = ½ · C(N,2)⁻¹ · Σ_{i>j} (X(i) − X(j))
//!
//! evaluated in linear time through the probability-weighted moments
//! b0 = l1 and b1 = (1/N) Σ ((i−1)/(N−1)) X(i), giving l2 = 2·b1 − b0
//! (Hosking, 1990).

use tracing::debug;

use crate::error::{DesignValueError, Result};
use crate::model::{AnnualMaximaSeries, LMoments, MIN_FIT_SAMPLE};

/// Computes (l1, l2) for a series of at least two values.
pub fn sample_lmoments(series: &AnnualMaximaSeries) -> Result<LMoments> {
    let values = series.values();
    let n = values.len();
    if n < MIN_FIT_SAMPLE {
        return Err(DesignValueError::InsufficientSample {
            sample_size: n,
            required: MIN_FIT_SAMPLE,
        });
    }

    let n_f = n as f64;
    let b0 = values.iter().sum::<f64>() / n_f;

    // Rank weights (i−1)/(N−1) over the ascending order statistics.
    let weighted: f64 = values
        .iter()
        .enumerate()
        .map(|(rank, &x)| rank as f64 * x)
        .sum();
    let b1 = weighted / (n_f * (n_f - 1.0));

    // A constant series can leave a tiny negative residue.
    let l2 = (2.0 * b1 - b0).max(0.0);

    debug!(sample_size = n, l1 = b0, l2, "Computed sample L-moments");
    Ok(LMoments { l1: b0, l2 })
}

/// Sample mean, defined for any non-empty series.
pub fn sample_mean(series: &AnnualMaximaSeries) -> f64 {
    let values = series.values();
    values.iter().sum::<f64>() / values.len() as f64
}
