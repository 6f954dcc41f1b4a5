//! Annual maxima extraction and series assembly.
//!
//! `annual_maxima` takes the flat list of `Observation`s handed over by the
//! data-access layer and organizes them into per-station, per-variable
//! yearly maxima, so the estimator never has to filter a flat list itself.
//!
//! Years can be screened with `filter_complete`, which compares each year's
//! observation count against the number expected for the variable's
//! reporting interval (e.g. 35 040 for quarter-hourly rainfall rates).

use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::debug;

use crate::error::Result;
use crate::model::{AnnualMaximaSeries, AnnualMaximum, Observation, SeriesKey};

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Groups observations by (station, variable) and keeps the largest value of
/// each calendar year.
///
/// Non-finite values are treated as missing and skipped before the maximum
/// is taken. Within each key the maxima are ordered by year.
pub fn annual_maxima(observations: Vec<Observation>) -> BTreeMap<SeriesKey, Vec<AnnualMaximum>> {
    let mut by_year: BTreeMap<SeriesKey, BTreeMap<i32, AnnualMaximum>> = BTreeMap::new();
    let mut skipped = 0usize;

    for obs in observations {
        if !obs.value.is_finite() {
            skipped += 1;
            continue;
        }

        let year = obs.time.year();
        let key = SeriesKey::new(obs.station_id, obs.variable);
        let years = by_year.entry(key).or_default();

        let entry = years.entry(year).or_insert(AnnualMaximum {
            year,
            value: obs.value,
            observation_count: 0,
        });
        entry.observation_count += 1;
        if obs.value > entry.value {
            entry.value = obs.value;
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped non-finite observations");
    }

    by_year
        .into_iter()
        .map(|(key, years)| (key, years.into_values().collect()))
        .collect()
}

/// Drops years whose completeness (`observation_count / expected_per_year`)
/// is below `min_completeness`. Keys left with no years are removed.
///
/// A zero `expected_per_year` disables the filter.
pub fn filter_complete(
    maxima: BTreeMap<SeriesKey, Vec<AnnualMaximum>>,
    expected_per_year: usize,
    min_completeness: f64,
) -> BTreeMap<SeriesKey, Vec<AnnualMaximum>> {
    if expected_per_year == 0 {
        return maxima;
    }

    maxima
        .into_iter()
        .filter_map(|(key, years)| {
            let before = years.len();
            let kept: Vec<AnnualMaximum> = years
                .into_iter()
                .filter(|m| completeness(m, expected_per_year) >= min_completeness)
                .collect();
            if kept.len() < before {
                debug!(series = %key, dropped = before - kept.len(), "Dropped incomplete years");
            }
            (!kept.is_empty()).then_some((key, kept))
        })
        .collect()
}

/// Fraction of the expected observations present in a year.
pub fn completeness(maximum: &AnnualMaximum, expected_per_year: usize) -> f64 {
    maximum.observation_count as f64 / expected_per_year as f64
}

/// Builds one `AnnualMaximaSeries` per key. Each key carries its own result
/// so one malformed station does not hide the others.
pub fn into_series(
    maxima: BTreeMap<SeriesKey, Vec<AnnualMaximum>>,
) -> BTreeMap<SeriesKey, Result<AnnualMaximaSeries>> {
    maxima
        .into_iter()
        .map(|(key, years)| {
            let values = years.into_iter().map(|m| m.value).collect();
            (key, AnnualMaximaSeries::new(values))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DesignValueError;
    use chrono::NaiveDate;

    fn obs(station: &str, variable: &str, ymd: (i32, u32, u32), hour: u32, value: f64) -> Observation {
        Observation {
            station_id: station.to_string(),
            variable: variable.to_string(),
            time: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            value,
        }
    }

    // --- Grouping: basic correctness ----------------------------------------

    #[test]
    fn test_annual_maxima_keeps_largest_value_per_year() {
        let grouped = annual_maxima(vec![
            obs("1108447", "rain_15min", (2001, 6, 1), 12, 4.2),
            obs("1108447", "rain_15min", (2001, 8, 14), 3, 9.6),
            obs("1108447", "rain_15min", (2001, 9, 2), 18, 1.1),
            obs("1108447", "rain_15min", (2002, 7, 20), 6, 7.3),
        ]);

        let key = SeriesKey::new("1108447", "rain_15min");
        let years = grouped.get(&key).expect("station should be grouped");
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 2001);
        assert_eq!(years[0].value, 9.6);
        assert_eq!(years[0].observation_count, 3);
        assert_eq!(years[1].year, 2002);
        assert_eq!(years[1].value, 7.3);
    }

    #[test]
    fn test_annual_maxima_separates_stations_and_variables() {
        let grouped = annual_maxima(vec![
            obs("A", "rain_15min", (2001, 6, 1), 0, 4.0),
            obs("A", "rain_daily", (2001, 6, 1), 0, 40.0),
            obs("B", "rain_15min", (2001, 6, 1), 0, 5.0),
        ]);
        assert_eq!(grouped.len(), 3, "one entry per station/variable pair");
        assert_eq!(grouped[&SeriesKey::new("A", "rain_daily")][0].value, 40.0);
    }

    #[test]
    fn test_annual_maxima_skips_missing_values() {
        let grouped = annual_maxima(vec![
            obs("A", "rain_15min", (2001, 6, 1), 0, f64::NAN),
            obs("A", "rain_15min", (2001, 6, 2), 0, 2.5),
        ]);
        let years = &grouped[&SeriesKey::new("A", "rain_15min")];
        assert_eq!(years[0].value, 2.5);
        assert_eq!(years[0].observation_count, 1);
    }

    #[test]
    fn test_annual_maxima_empty_input_returns_empty_map() {
        assert!(annual_maxima(vec![]).is_empty());
    }

    // --- Completeness --------------------------------------------------------

    #[test]
    fn test_filter_complete_drops_sparse_years() {
        let mut observations = Vec::new();
        for day in 1..=20 {
            observations.push(obs("A", "rain_daily", (2001, 1, day), 0, day as f64));
        }
        observations.push(obs("A", "rain_daily", (2002, 1, 1), 0, 99.0));

        let filtered = filter_complete(annual_maxima(observations), 20, 0.8);
        let years = &filtered[&SeriesKey::new("A", "rain_daily")];
        assert_eq!(years.len(), 1, "2002 has 1/20 observations and should be dropped");
        assert_eq!(years[0].year, 2001);
        assert_eq!(years[0].value, 20.0);
    }

    #[test]
    fn test_filter_complete_removes_emptied_keys() {
        let grouped = annual_maxima(vec![obs("A", "rain_daily", (2001, 1, 1), 0, 1.0)]);
        assert!(filter_complete(grouped, 365, 0.5).is_empty());
    }

    #[test]
    fn test_filter_complete_disabled_without_expectation() {
        let grouped = annual_maxima(vec![obs("A", "rain_daily", (2001, 1, 1), 0, 1.0)]);
        assert_eq!(filter_complete(grouped, 0, 0.9).len(), 1);
    }

    // --- Series assembly -----------------------------------------------------

    #[test]
    fn test_into_series_reports_per_key_errors() {
        let grouped = annual_maxima(vec![
            obs("A", "rain_daily", (2001, 1, 1), 0, 12.0),
            obs("A", "rain_daily", (2002, 1, 1), 0, 8.0),
            obs("B", "rain_daily", (2001, 1, 1), 0, -3.0),
        ]);
        let series = into_series(grouped);

        let a = series[&SeriesKey::new("A", "rain_daily")]
            .as_ref()
            .expect("station A is valid");
        assert_eq!(a.values(), &[8.0, 12.0]);

        assert!(matches!(
            series[&SeriesKey::new("B", "rain_daily")],
            Err(DesignValueError::InvalidInput { .. })
        ));
    }
}
