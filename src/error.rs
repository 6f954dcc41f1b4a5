//! Error types for the design value pipeline.
//!
//! Every stage validates its own preconditions and returns one of these
//! variants with the offending values attached. Nothing is retried and
//! nothing is defaulted to a numeric sentinel.

/// Errors raised while fitting a Gumbel distribution or inverting it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DesignValueError {
    /// A sample or request value is non-finite, negative, or otherwise malformed.
    #[error("Invalid input: {reason} (value: {value})")]
    InvalidInput { reason: String, value: f64 },

    /// Too few samples to estimate the L-moments, or fewer than the
    /// reliability threshold when running in strict mode.
    #[error("Insufficient sample: {sample_size} values, at least {required} required")]
    InsufficientSample { sample_size: usize, required: usize },

    /// The fitted (or supplied) scale is not strictly positive.
    #[error("Degenerate distribution: scale {scale} is not positive")]
    DegenerateDistribution { scale: f64 },

    /// The requested return period lies outside the fitted distribution's domain.
    #[error(
        "Return period {return_period} years is out of domain: \
         probability argument {argument} not in (0, 1)"
    )]
    OutOfDomain { return_period: f64, argument: f64 },
}

pub type Result<T> = std::result::Result<T, DesignValueError>;

/// Errors raised while loading analysis configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
