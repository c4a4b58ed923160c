//! Color reduction by parallel k-means clustering.
//!
//! Pixels are handed to the engine as a [`Dataset`] of fixed-dimension
//! vectors (3 channels for RGB, 4 for RGBA). A [`Trainer`] seeds `k`
//! centroids with k-means++, then refines them with Lloyd's algorithm,
//! splitting every assignment pass across a pool of workers. The result is
//! an immutable [`Model`] that maps every input point to a cluster and can
//! classify new points.
//!
//! ```
//! use kcomp::{Dataset, Trainer};
//!
//! let data = Dataset::from_rows(&[
//!     [0.0, 0.0],
//!     [0.0, 1.0],
//!     [10.0, 10.0],
//!     [10.0, 11.0],
//! ])
//! .unwrap();
//!
//! let model = Trainer::new(2)
//!     .with_max_iterations(50)
//!     .with_delta_threshold(0.0)
//!     .fit(&data)
//!     .unwrap();
//!
//! let guesses = model.guesses();
//! assert_eq!(guesses[0], guesses[1]);
//! assert_eq!(guesses[2], guesses[3]);
//! assert_ne!(guesses[0], guesses[2]);
//! assert_eq!(model.predict(&[9.0, 9.0]), guesses[2]);
//! ```

mod dataset;
#[cfg(feature = "_debug")]
pub mod kmeans;
#[cfg(not(feature = "_debug"))]
mod kmeans;
pub mod metric;
mod model;
pub mod palette;
pub mod rng;
mod trainer;

pub use dataset::Dataset;
pub use metric::{Euclidean, Metric, SquaredEuclidean};
pub use model::Model;
pub use rgb::{RGB8, RGBA8};
pub use trainer::{
    default_concurrency, Trainer, DEFAULT_DELTA_THRESHOLD, DEFAULT_MAX_ITERATIONS,
};

use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("number of clusters must be at least 2, got {k}"))]
    TooFewClusters { k: usize },

    #[snafu(display("number of iterations must be at least 1"))]
    ZeroIterations,

    #[snafu(display("delta threshold must be within [0, 1], got {delta}"))]
    InvalidDeltaThreshold { delta: f64 },

    #[snafu(display("concurrency must be at least 1"))]
    ZeroConcurrency,

    #[snafu(display("dataset is empty"))]
    EmptyDataset,

    #[snafu(display("point dimension must be positive"))]
    ZeroDimension,

    #[snafu(display("expected a point of dimension {expected}, got {got}"))]
    DimensionMismatch { expected: usize, got: usize },

    #[snafu(display("buffer length {len} is not a multiple of the dimension {dim}"))]
    RaggedBuffer { len: usize, dim: usize },

    #[snafu(display("point {index} has a NaN or infinite coordinate"))]
    NonFinite { index: usize },

    #[snafu(display("{points} points of dimension {dim} do not fit in memory"))]
    CapacityOverflow { dim: usize, points: usize },

    #[snafu(display("model was trained on {expected} points, image has {got} pixels"))]
    PixelCountMismatch { expected: usize, got: usize },

    #[snafu(display("failed to build the worker pool"))]
    ThreadPool { source: rayon::ThreadPoolBuildError },

    #[snafu(display("a worker panicked during iteration {iteration}"))]
    WorkerPanicked { iteration: usize },

    #[snafu(display("training cancelled after {iterations} iterations"))]
    Cancelled { iterations: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
