use crate::metric::Metric;
use crate::Dataset;
use rand::RngExt;

/// Picks an index with probability proportional to its weight.
///
/// Zero-weight indices are never picked while some weight is positive. When
/// every weight is zero (all points coincide with chosen seeds) the pick is
/// uniform.
#[inline(always)]
fn sample_by_distance(rng: &mut impl RngExt, min_distances: &[f64], sum: f64) -> usize {
    if !(sum > 0.0 && sum.is_finite()) {
        return rng.random_range(0..min_distances.len());
    }

    let random_threshold = rng.random::<f64>() * sum;
    let mut cumsum = 0.0;
    let mut last_positive = 0;

    for (i, &distance) in min_distances.iter().enumerate() {
        cumsum += distance;
        if distance > 0.0 {
            last_positive = i;
        }
        if cumsum > random_threshold {
            return i;
        }
    }

    // Rounding kept the running sum at or below the threshold
    last_positive
}

/// k-means++ seeding: returns the dataset indices of `k` initial centroids.
///
/// Indices may repeat when the dataset has fewer than `k` distinct points.
pub fn find_initial<M>(rng: &mut impl RngExt, data: &Dataset, k: usize, metric: &M) -> Vec<usize>
where
    M: Metric + ?Sized,
{
    let n = data.len();
    assert!(n > 0);

    let mut init_points = Vec::<usize>::with_capacity(k);
    let c0 = rng.random_range(0..n);
    init_points.push(c0);

    let seed = data.point(c0);
    let mut min_distances: Vec<f64> = data
        .iter()
        .map(|p| metric.seeding_weight(p, seed))
        .collect();

    for _ in 1..k {
        let sum: f64 = min_distances.iter().sum();
        let next = sample_by_distance(rng, &min_distances, sum);
        init_points.push(next);

        let seed = data.point(next);
        for (min, p) in min_distances.iter_mut().zip(data.iter()) {
            let d = metric.seeding_weight(p, seed);
            if d < *min {
                *min = d;
            }
        }
    }

    init_points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{Euclidean, SquaredEuclidean};
    use crate::rng;
    use pretty_assertions::{assert_eq, assert_ne};

    fn diagonal(values: &[f64]) -> Dataset {
        Dataset::from_rows(values.iter().map(|&v| [v, v, v])).unwrap()
    }

    #[test]
    fn basic_invariants() {
        let mut rng = rng::new();
        let data = diagonal(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

        for k in 2..=6 {
            let result = find_initial(&mut rng, &data, k, &Euclidean);
            assert_eq!(result.len(), k, "must return exactly k indices");

            for &idx in &result {
                assert!(idx < data.len(), "index must be valid");
            }

            let mut sorted = result.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), k, "indices must be distinct");
        }
    }

    #[test]
    fn k_equals_n() {
        let mut rng = rng::new();
        let data = diagonal(&[0.0, 10.0, 20.0, 30.0]);

        let mut result = find_initial(&mut rng, &data, 4, &Euclidean);
        result.sort();
        assert_eq!(result, vec![0, 1, 2, 3]);
    }

    #[test]
    fn k_greater_than_distinct_points() {
        let mut rng = rng::new();
        let data = diagonal(&[7.0, 7.0, 7.0, 7.0]);

        let result = find_initial(&mut rng, &data, 3, &Euclidean);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|&idx| idx < 4));
    }

    #[test]
    fn k_greater_than_n() {
        let mut rng = rng::new();
        let data = diagonal(&[0.0, 10.0]);

        let result = find_initial(&mut rng, &data, 5, &Euclidean);
        assert_eq!(result.len(), 5);
        assert!(result.contains(&0));
        assert!(result.contains(&1));
    }

    #[test]
    fn unequal_cluster_sizes() {
        let mut rng = rng::new();

        // Dense cluster near origin (indices 0..10) + two distant outliers (10, 11)
        let mut values = (0..10).map(|i| i as f64 * 0.01).collect::<Vec<_>>();
        values.push(100.0);
        values.push(-100.0);
        let data = diagonal(&values);

        let result = find_initial(&mut rng, &data, 3, &Euclidean);
        assert!(
            result.contains(&10),
            "outlier at index 10 should be selected"
        );
        assert!(
            result.contains(&11),
            "outlier at index 11 should be selected"
        );
    }

    #[test]
    fn duplicate_coordinates() {
        let mut rng = rng::new();

        // Two points at the same location + one elsewhere
        let data = diagonal(&[0.0, 0.0, 10.0]);

        let result = find_initial(&mut rng, &data, 2, &Euclidean);
        assert_eq!(result.len(), 2);
        assert_ne!(
            data.point(result[0]),
            data.point(result[1]),
            "selected centroids should have distinct coordinates"
        );
    }

    #[test]
    fn three_clusters() {
        let mut rng = rng::new();

        // Indices:            0     1      2     3     4      5
        // Clusters:           0     1      2     0     1      2
        let data = diagonal(&[0.0, 10.0, -10.0, 0.1, 10.1, -10.1]);

        let result = find_initial(&mut rng, &data, 3, &Euclidean);
        assert!(
            result.contains(&0) || result.contains(&3),
            "The result contains the first cluster"
        );
        assert!(
            result.contains(&1) || result.contains(&4),
            "The result contains the second cluster"
        );
        assert!(
            result.contains(&2) || result.contains(&5),
            "The result contains the third cluster"
        );
    }

    #[test]
    fn builtin_metrics_seed_identically() {
        let data = diagonal(&[0.0, 0.5, 3.0, 9.0, 9.5, 20.0, 21.0, 40.0]);

        let a = find_initial(&mut rng::from_seed(7), &data, 4, &Euclidean);
        let b = find_initial(&mut rng::from_seed(7), &data, 4, &SquaredEuclidean);
        assert_eq!(a, b);
    }

    #[test]
    fn sample_skips_zero_weights() {
        let mut rng = rng::new();
        for _ in 0..100 {
            assert_eq!(sample_by_distance(&mut rng, &[0.0, 0.0, 5.0, 0.0], 5.0), 2);
        }
    }

    #[test]
    fn sample_all_zero_weights() {
        let mut rng = rng::new();
        for _ in 0..100 {
            assert!(sample_by_distance(&mut rng, &[0.0; 4], 0.0) < 4);
        }
    }
}
