//! Distance metrics between points of equal dimension.

/// Dissimilarity between two points of the same dimension.
///
/// Implementations must return a non-negative value. Nothing else is
/// assumed: symmetry and the triangle inequality are never relied upon.
///
/// Any `Fn(&[f64], &[f64]) -> f64` that is `Send + Sync` is a metric.
pub trait Metric: Send + Sync {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;

    /// Weight of `a` when k-means++ considers it as the next seed, given that
    /// `b` is its nearest chosen seed.
    fn seeding_weight(&self, a: &[f64], b: &[f64]) -> f64 {
        let d = self.distance(a, b);
        d * d
    }
}

#[inline(always)]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .fold(0.0, |acc, (&x, &y)| (x - y).mul_add(x - y, acc))
}

/// Straight-line distance. The default metric.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Euclidean;

/// Euclidean distance without the square root.
///
/// Ordering of distances is the same as [`Euclidean`], so clustering and
/// prediction produce the same result; only the magnitudes differ. Use it
/// to skip a square root per comparison.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SquaredEuclidean;

impl Metric for Euclidean {
    #[inline(always)]
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        squared_euclidean(a, b).sqrt()
    }

    #[inline(always)]
    fn seeding_weight(&self, a: &[f64], b: &[f64]) -> f64 {
        squared_euclidean(a, b)
    }
}

impl Metric for SquaredEuclidean {
    #[inline(always)]
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        squared_euclidean(a, b)
    }

    #[inline(always)]
    fn seeding_weight(&self, a: &[f64], b: &[f64]) -> f64 {
        squared_euclidean(a, b)
    }
}

impl<F> Metric for F
where
    F: Fn(&[f64], &[f64]) -> f64 + Send + Sync,
{
    #[inline(always)]
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        self(a, b)
    }
}

/// Index of the centroid closest to `point`. Ties go to the lowest index.
#[inline]
pub(crate) fn nearest<'a, M>(
    metric: &M,
    point: &[f64],
    centroids: impl IntoIterator<Item = &'a [f64]>,
) -> usize
where
    M: Metric + ?Sized,
{
    let mut min = f64::INFINITY;
    let mut min_idx = 0;
    for (j, centroid) in centroids.into_iter().enumerate() {
        let d = metric.distance(point, centroid);
        if d < min {
            min = d;
            min_idx = j;
        }
    }
    min_idx
}
