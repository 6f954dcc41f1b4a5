//! Parallel design value computation across stations.
//!
//! Each station/variable series is an independent job: the runner fans jobs
//! out over a fixed-size thread pool, collects the outcomes over a channel
//! and hands them back in the relative order of the input. A failing station
//! only affects its own outcome.

use std::sync::Arc;
use std::sync::mpsc;

use threadpool::ThreadPool;
use tracing::{info, warn};

use crate::cache::ParameterCache;
use crate::config::DesignValueConfig;
use crate::error::Result;
use crate::estimator::DesignValueEstimator;
use crate::model::{AnnualMaximaSeries, DesignValue, SeriesKey};

// ---------------------------------------------------------------------------
// Jobs and outcomes
// ---------------------------------------------------------------------------

/// One series to evaluate.
#[derive(Debug, Clone)]
pub struct StationSeries {
    pub key: SeriesKey,
    pub series: AnnualMaximaSeries,
}

/// Design values for one series, or the error that stopped it.
#[derive(Debug, Clone)]
pub struct StationOutcome {
    pub key: SeriesKey,
    pub result: Result<Vec<DesignValue>>,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub struct BatchRunner {
    estimator: DesignValueEstimator,
    workers: usize,
    cache: Option<Arc<ParameterCache>>,
    return_periods: Vec<f64>,
}

impl BatchRunner {
    /// Zero workers is treated as one.
    pub fn new(estimator: DesignValueEstimator, workers: usize) -> Self {
        Self {
            estimator,
            workers: workers.max(1),
            cache: None,
            return_periods: Vec::new(),
        }
    }

    /// Runner using the estimator, worker count and return periods from
    /// configuration.
    pub fn from_config(config: &DesignValueConfig) -> Self {
        Self::new(config.estimator(), config.batch.workers)
            .with_return_periods(config.analysis.return_periods.clone())
    }

    /// Return periods evaluated by `run_configured`.
    pub fn with_return_periods(mut self, return_periods: Vec<f64>) -> Self {
        self.return_periods = return_periods;
        self
    }

    /// Reuse parameters across runs for keys already fitted.
    pub fn with_cache(mut self, cache: Arc<ParameterCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn return_periods(&self) -> &[f64] {
        &self.return_periods
    }

    /// Runs `jobs` against the runner's own return periods.
    pub fn run_configured(&self, jobs: Vec<StationSeries>) -> Vec<StationOutcome> {
        self.run(jobs, &self.return_periods)
    }

    /// Evaluates every return period for every job.
    ///
    /// Outcomes keep the relative order of `jobs`. A job whose worker
    /// panicked has no outcome, so positions shift after it; match outcomes
    /// to jobs by `key` rather than by index.
    pub fn run(&self, jobs: Vec<StationSeries>, return_periods: &[f64]) -> Vec<StationOutcome> {
        let total = jobs.len();
        if total == 0 {
            return Vec::new();
        }

        info!(stations = total, workers = self.workers, "Starting design value batch");

        let pool = ThreadPool::new(self.workers.min(total));
        let (tx, rx) = mpsc::channel();
        let return_periods: Arc<[f64]> = Arc::from(return_periods);

        for (index, job) in jobs.into_iter().enumerate() {
            let tx = tx.clone();
            let estimator = self.estimator;
            let cache = self.cache.clone();
            let return_periods = Arc::clone(&return_periods);

            pool.execute(move || {
                let result = evaluate(&job, &estimator, cache.as_deref(), &return_periods);
                // The receiver outlives the pool; a send error means run() panicked.
                let _ = tx.send((index, StationOutcome { key: job.key, result }));
            });
        }
        drop(tx);

        let received = rx.into_iter().inspect(|(_, outcome)| {
            if let Err(e) = &outcome.result {
                warn!(series = %outcome.key, error = %e, "Station failed");
            }
        });
        let outcomes = collect_in_order(total, received);
        pool.join();

        if outcomes.len() < total {
            warn!(
                missing = total - outcomes.len(),
                "Some batch jobs did not report (worker panic)"
            );
        }

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            stations = outcomes.len(),
            failed,
            "Design value batch complete"
        );
        outcomes
    }
}

/// Puts `(index, outcome)` pairs back into index order. Indices that never
/// arrive are skipped, not filled.
fn collect_in_order(
    total: usize,
    received: impl IntoIterator<Item = (usize, StationOutcome)>,
) -> Vec<StationOutcome> {
    let mut slots: Vec<Option<StationOutcome>> = (0..total).map(|_| None).collect();
    for (index, outcome) in received {
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(outcome);
        }
    }
    slots.into_iter().flatten().collect()
}

fn evaluate(
    job: &StationSeries,
    estimator: &DesignValueEstimator,
    cache: Option<&ParameterCache>,
    return_periods: &[f64],
) -> Result<Vec<DesignValue>> {
    let parameters = match cache {
        Some(cache) => cache.get_or_fit(&job.key, &job.series, estimator)?,
        None => estimator.fit(&job.series)?,
    };

    return_periods
        .iter()
        .map(|&years| estimator.design_value(&parameters, years))
        .collect()
}
