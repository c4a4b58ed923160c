use crate::kmeans::{lloyds, plus_plus_init};
use crate::metric::{Euclidean, Metric};
use crate::{
    rng, CancelledSnafu, Dataset, EmptyDatasetSnafu, InvalidDeltaThresholdSnafu, Model, Result,
    ThreadPoolSnafu, TooFewClustersSnafu, ZeroConcurrencySnafu, ZeroIterationsSnafu,
};
use rand::RngExt;
use snafu::prelude::*;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_DELTA_THRESHOLD: f64 = 0.01;

/// Worker count used when none is configured: the parallelism the OS
/// reports for this process, or 1 if it cannot tell.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Fewer changed points than this in a round means convergence.
fn change_threshold(n: usize, delta: f64) -> usize {
    (n as f64 * delta).floor() as usize
}

// A round where nothing moved is a fixed point, whatever the threshold
fn has_converged(changes: usize, change_threshold: usize) -> bool {
    changes == 0 || changes < change_threshold
}

/// k-means configuration.
///
/// Nothing is checked until [`Trainer::fit`] (or [`Trainer::validate`]) runs,
/// and a trainer can be reused for any number of independent fits.
#[derive(Debug, Clone)]
pub struct Trainer<M = Euclidean> {
    k: usize,
    max_iterations: usize,
    metric: M,
    delta_threshold: f64,
    concurrency: usize,
    cancellation: Option<Arc<AtomicBool>>,
}

impl Trainer<Euclidean> {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            metric: Euclidean,
            delta_threshold: DEFAULT_DELTA_THRESHOLD,
            concurrency: default_concurrency(),
            cancellation: None,
        }
    }
}

impl<M: Metric> Trainer<M> {
    pub fn with_metric<N: Metric>(self, metric: N) -> Trainer<N> {
        Trainer {
            k: self.k,
            max_iterations: self.max_iterations,
            metric,
            delta_threshold: self.delta_threshold,
            concurrency: self.concurrency,
            cancellation: self.cancellation,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Fraction of the dataset allowed to switch clusters in one round while
    /// still counting the run as converged.
    pub fn with_delta_threshold(mut self, delta: f64) -> Self {
        self.delta_threshold = delta;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Stops training with [`Error::Cancelled`](crate::Error::Cancelled) once
    /// `flag` is set. The flag is only looked at between rounds.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn delta_threshold(&self) -> f64 {
        self.delta_threshold
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.k >= 2, TooFewClustersSnafu { k: self.k });
        ensure!(self.max_iterations >= 1, ZeroIterationsSnafu);
        ensure!(
            (0.0..=1.0).contains(&self.delta_threshold),
            InvalidDeltaThresholdSnafu {
                delta: self.delta_threshold
            }
        );
        ensure!(self.concurrency >= 1, ZeroConcurrencySnafu);
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Clusters `data` using the crate's fixed-seed generator, so repeated
    /// calls give the same model.
    pub fn fit(&self, data: &Dataset) -> Result<Model<M>>
    where
        M: Clone,
    {
        self.fit_with_rng(data, &mut rng::new())
    }

    pub fn fit_with_rng(&self, data: &Dataset, rng: &mut impl RngExt) -> Result<Model<M>>
    where
        M: Clone,
    {
        self.validate()?;
        ensure!(!data.is_empty(), EmptyDatasetSnafu);

        let n = data.len();
        let k = self.k;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .thread_name(|i| format!("kcomp-worker-{i}"))
            .build()
            .context(ThreadPoolSnafu)?;

        let mut centroids: Vec<f64> = plus_plus_init::find_initial(rng, data, k, &self.metric)
            .into_iter()
            .flat_map(|i| data.point(i).iter().copied())
            .collect();
        let mut mapping = lloyds::unassigned(n);
        let mut sizes = vec![0; k];

        let change_threshold = change_threshold(n, self.delta_threshold);

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iterations {
            if self.is_cancelled() {
                return CancelledSnafu { iterations }.fail();
            }

            let update = lloyds::lloyds_round(
                &pool,
                data,
                &self.metric,
                self.concurrency,
                iterations,
                &mut mapping,
                &mut centroids,
            )?;
            iterations += 1;
            sizes = update.counts;

            debug!(
                iteration = iterations,
                changes = update.changes,
                change_threshold,
                empty_clusters = update.empty_clusters,
                "lloyds round finished"
            );

            if has_converged(update.changes, change_threshold) {
                converged = true;
                break;
            }
        }

        info!(n, k, iterations, converged, "k-means fit finished");

        Ok(Model::new(
            self.metric.clone(),
            data.dim(),
            centroids,
            mapping,
            sizes,
            iterations,
            converged,
        ))
    }
}
