//! design_values: climatological design values from annual maxima.
//!
//! Fits a Gumbel (Type-I extreme value) distribution to a station's annual
//! maximum series with L-moment estimators and inverts the fitted CDF to get
//! the magnitude expected once per requested return period.
//!
//! # Module structure
//!
//! ```text
//! design_values
//! ├── model       — value types (AnnualMaximaSeries, GumbelParameters, DesignValue, …)
//! ├── error       — DesignValueError, ConfigError
//! ├── config      — analysis settings loader (design_values.toml)
//! ├── estimator   — fit / design_value pipeline facade
//! ├── cache       — (station, variable) parameter memoization
//! ├── batch       — thread-pool fan-out over independent stations
//! └── analysis
//!     ├── groupings  — observations → per-station annual maxima
//!     ├── validation — sample checks and minimum-sample-size policy
//!     ├── lmoments   — sample L-moments
//!     └── gumbel     — parameter fit and return-period inversion
//! ```
//!
//! # Example
//!
//! ```
//! use design_values::{design_value, fit, AnnualMaximaSeries};
//!
//! let series = AnnualMaximaSeries::new(vec![
//!     10.0, 12.0, 11.0, 9.0, 14.0, 13.0, 15.0, 10.0, 11.0, 12.0,
//! ])?;
//! let parameters = fit(&series)?;
//! let dv = design_value(&parameters, 50.0)?;
//! assert!(dv.magnitude > 15.0);
//! # Ok::<(), design_values::DesignValueError>(())
//! ```

pub mod analysis;
pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod estimator;
pub mod model;

pub use analysis::validation::ValidationPolicy;
pub use batch::{BatchRunner, StationOutcome, StationSeries};
pub use cache::ParameterCache;
pub use config::{load_config, DesignValueConfig};
pub use error::{ConfigError, DesignValueError};
pub use estimator::{design_value, fit, DesignValueEstimator};
pub use model::{
    AnnualMaximaSeries, AnnualMaximum, Confidence, DesignValue, GumbelParameters, LMoments,
    Observation, ReturnPeriod, SeriesKey,
};
