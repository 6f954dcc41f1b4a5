//! Statistical kernel for design value estimation.
//!
//! Submodules, in pipeline order:
//! - `groupings`  — reduces raw observations to per-station annual maxima.
//! - `validation` — sample checks and the minimum-sample-size policy.
//! - `lmoments`   — first two sample L-moments of an annual maxima series.
//! - `gumbel`     — L-moment Gumbel fit and return-period inversion.
//!
//! Each stage is a pure function of its inputs; failures abort the
//! computation and are returned to the caller unchanged.

pub mod groupings;
pub mod gumbel;
pub mod lmoments;
pub mod validation;
