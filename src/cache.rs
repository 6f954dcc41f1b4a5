//! In-memory memoization of fitted parameters.
//!
//! Station counts are small, so this is a plain map keyed by
//! (station, variable) with no eviction. The mutex makes one cache
//! shareable across batch workers through an `Arc`; the estimator itself
//! never touches it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::error::Result;
use crate::estimator::DesignValueEstimator;
use crate::model::{AnnualMaximaSeries, GumbelParameters, SeriesKey};

#[derive(Debug, Default)]
pub struct ParameterCache {
    entries: Mutex<HashMap<SeriesKey, GumbelParameters>>,
}

impl ParameterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns cached parameters for `key`, fitting `series` on a miss.
    ///
    /// Failed fits are returned but not stored. The lock is not held while
    /// fitting, so two workers racing on the same key may both fit; both
    /// produce identical parameters.
    pub fn get_or_fit(
        &self,
        key: &SeriesKey,
        series: &AnnualMaximaSeries,
        estimator: &DesignValueEstimator,
    ) -> Result<GumbelParameters> {
        if let Some(parameters) = self.get(key) {
            debug!(series = %key, "Parameter cache hit");
            return Ok(parameters);
        }

        let parameters = estimator.fit(series)?;
        self.lock().insert(key.clone(), parameters);
        debug!(series = %key, "Parameter cache miss, stored fit");
        Ok(parameters)
    }

    pub fn get(&self, key: &SeriesKey) -> Option<GumbelParameters> {
        self.lock().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // Entries are Copy values, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<SeriesKey, GumbelParameters>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DesignValueError;

    fn series(values: &[f64]) -> AnnualMaximaSeries {
        AnnualMaximaSeries::new(values.to_vec()).expect("valid series")
    }

    #[test]
    fn test_second_lookup_returns_cached_parameters() {
        let cache = ParameterCache::new();
        let estimator = DesignValueEstimator::default();
        let key = SeriesKey::new("1108447", "rain_15min");

        let first = cache
            .get_or_fit(&key, &series(&[4.0, 6.5, 5.1, 8.8, 3.9]), &estimator)
            .expect("fit should succeed");
        // A different series under the same key must not be refitted.
        let second = cache
            .get_or_fit(&key, &series(&[100.0, 200.0]), &estimator)
            .expect("cache hit");

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_fit_is_not_cached() {
        let cache = ParameterCache::new();
        let key = SeriesKey::new("A", "rain_daily");
        let result = cache.get_or_fit(&key, &series(&[7.0; 10]), &DesignValueEstimator::default());

        assert!(matches!(result, Err(DesignValueError::DegenerateDistribution { .. })));
        assert!(cache.is_empty());
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = ParameterCache::new();
        let key = SeriesKey::new("A", "rain_daily");
        cache
            .get_or_fit(&key, &series(&[1.0, 2.0, 3.0]), &DesignValueEstimator::default())
            .expect("fit");
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
