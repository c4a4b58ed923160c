use crate::metric::{nearest, Euclidean, Metric};
use crate::{DimensionMismatchSnafu, Result};
use snafu::prelude::*;

/// The outcome of a fit: centroids, the cluster of every training point and
/// how the run ended. Read-only once built.
#[derive(Debug, Clone)]
pub struct Model<M = Euclidean> {
    metric: M,
    dim: usize,
    centroids: Vec<f64>,
    mapping: Vec<usize>,
    sizes: Vec<usize>,
    iterations: usize,
    converged: bool,
}

impl<M> Model<M> {
    pub(crate) fn new(
        metric: M,
        dim: usize,
        centroids: Vec<f64>,
        mapping: Vec<usize>,
        sizes: Vec<usize>,
        iterations: usize,
        converged: bool,
    ) -> Self {
        debug_assert_eq!(centroids.len(), sizes.len() * dim);
        debug_assert_eq!(mapping.len(), sizes.iter().sum::<usize>());
        Self {
            metric,
            dim,
            centroids,
            mapping,
            sizes,
            iterations,
            converged,
        }
    }

    /// Number of clusters.
    #[inline]
    pub fn k(&self) -> usize {
        self.sizes.len()
    }

    /// Dimension of the centroids, and of the points `predict` accepts.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Centroid of cluster `i`.
    ///
    /// # Panics
    ///
    /// If `i >= self.k()`.
    pub fn cluster(&self, i: usize) -> &[f64] {
        assert!(
            i < self.k(),
            "cluster index {i} out of range for {} clusters",
            self.k()
        );
        &self.centroids[i * self.dim..(i + 1) * self.dim]
    }

    pub fn centroids(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.centroids.chunks_exact(self.dim)
    }

    /// Cluster of every training point, in dataset order.
    pub fn guesses(&self) -> &[usize] {
        &self.mapping
    }

    /// Number of training points in each cluster. An entry can be zero when
    /// the dataset has fewer distinct points than clusters.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Refinement rounds that ran.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the run stopped because assignments settled, rather than by
    /// hitting the iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }
}

impl<M: Metric> Model<M> {
    /// Cluster whose centroid is nearest to `point` under the training
    /// metric. Ties go to the lowest index.
    ///
    /// # Panics
    ///
    /// If `point` does not have the model's dimension.
    pub fn predict(&self, point: &[f64]) -> usize {
        assert_eq!(
            point.len(),
            self.dim,
            "point dimension does not match the model"
        );
        nearest(&self.metric, point, self.centroids())
    }

    pub fn try_predict(&self, point: &[f64]) -> Result<usize> {
        ensure!(
            point.len() == self.dim,
            DimensionMismatchSnafu {
                expected: self.dim,
                got: point.len()
            }
        );
        Ok(nearest(&self.metric, point, self.centroids()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::SquaredEuclidean;
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn model() -> Model {
        Model::new(
            Euclidean,
            2,
            vec![0.0, 0.5, 10.0, 10.5, 5.0, 0.0],
            vec![0, 0, 1, 1, 2],
            vec![2, 2, 1],
            3,
            true,
        )
    }

    #[test]
    fn accessors() {
        let model = model();
        assert_eq!(model.k(), 3);
        assert_eq!(model.dim(), 2);
        assert_eq!(model.cluster(1), &[10.0, 10.5]);
        assert_eq!(model.guesses(), &[0, 0, 1, 1, 2]);
        assert_eq!(model.sizes(), &[2, 2, 1]);
        assert_eq!(model.iterations(), 3);
        assert!(model.converged());
        assert_eq!(model.centroids().len(), 3);
    }

    #[test]
    #[should_panic(expected = "cluster index 3 out of range for 3 clusters")]
    fn cluster_out_of_range() {
        model().cluster(3);
    }

    #[test]
    fn predict() {
        let model = model();
        assert_eq!(model.predict(&[0.1, 0.1]), 0);
        assert_eq!(model.predict(&[9.0, 12.0]), 1);
        assert_eq!(model.predict(&[4.0, -1.0]), 2);
        for i in 0..model.k() {
            assert_eq!(model.predict(model.cluster(i)), i);
        }
    }

    #[test]
    fn predict_tie_goes_to_lowest_index() {
        let model = Model::new(
            SquaredEuclidean,
            1,
            vec![-1.0, 1.0],
            vec![0, 1],
            vec![1, 1],
            1,
            true,
        );
        assert_eq!(model.predict(&[0.0]), 0);
    }

    #[test]
    #[should_panic(expected = "point dimension does not match the model")]
    fn predict_dimension_mismatch() {
        model().predict(&[1.0, 2.0, 3.0]);
    }

    #[test]
    fn try_predict_dimension_mismatch() {
        let model = model();
        assert_eq!(model.try_predict(&[9.0, 9.0]).unwrap(), 1);
        assert!(matches!(
            model.try_predict(&[1.0]),
            Err(Error::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
    }
}
