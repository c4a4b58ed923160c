use super::UNASSIGNED;
use crate::metric::{nearest, Metric};
use crate::{Dataset, Result, WorkerPanickedSnafu};
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::debug;

/// What one worker hands back after an assignment pass over its shard.
///
/// A shard owns the dataset indices `worker, worker + stride, …`, and
/// `assignments[j]` is the new cluster of index `worker + j * stride`.
#[derive(Debug)]
pub struct Shard {
    pub assignments: Vec<usize>,
    pub changes: usize,
    pub sums: Vec<f64>,
    pub counts: Vec<usize>,
}

#[inline]
pub fn assign_shard<M>(
    data: &Dataset,
    centroids: &[f64],
    previous: &[usize],
    metric: &M,
    worker: usize,
    stride: usize,
) -> Shard
where
    M: Metric + ?Sized,
{
    let dim = data.dim();
    let k = centroids.len() / dim;

    let mut shard = Shard {
        assignments: Vec::with_capacity(data.len() / stride + 1),
        changes: 0,
        sums: vec![0.0; centroids.len()],
        counts: vec![0; k],
    };

    for i in (worker..data.len()).step_by(stride) {
        let point = data.point(i);
        let cluster = nearest(metric, point, centroids.chunks_exact(dim));

        if previous[i] != cluster {
            shard.changes += 1;
        }

        shard.assignments.push(cluster);
        shard.counts[cluster] += 1;
        for (sum, &x) in shard.sums[cluster * dim..(cluster + 1) * dim]
            .iter_mut()
            .zip(point)
        {
            *sum += x;
        }
    }

    shard
}

#[derive(Debug)]
pub struct UpdateResult {
    pub changes: usize,
    pub counts: Vec<usize>,
    pub empty_clusters: usize,
}

/// Mean of the members of `cluster` without summing them first, so it stays
/// finite whenever the members are.
fn running_mean(data: &Dataset, mapping: &[usize], cluster: usize, mean: &mut [f64]) {
    mean.fill(0.0);
    let members = mapping.iter().enumerate().filter(|&(_, &c)| c == cluster);
    for (seen, (i, _)) in members.enumerate() {
        let n = (seen + 1) as f64;
        for (m, &x) in mean.iter_mut().zip(data.point(i)) {
            *m += x / n - *m / n;
        }
    }
}

/// Folds the shards, in worker order, into the mapping and the centroids.
///
/// A cluster that received no points keeps its previous centroid. When the
/// summed coordinates of a cluster overflow, its mean is recomputed
/// incrementally from the members; if even that is not finite the previous
/// centroid is kept.
pub fn update_centroids(
    shards: Vec<Shard>,
    data: &Dataset,
    mapping: &mut [usize],
    centroids: &mut [f64],
) -> UpdateResult {
    let dim = data.dim();
    let stride = shards.len();
    let k = centroids.len() / dim;

    let mut changes = 0;
    let mut counts = vec![0usize; k];
    let mut sums = vec![0f64; centroids.len()];

    for (worker, shard) in shards.into_iter().enumerate() {
        for (j, cluster) in shard.assignments.into_iter().enumerate() {
            mapping[worker + j * stride] = cluster;
        }
        changes += shard.changes;
        for (total, count) in counts.iter_mut().zip(shard.counts) {
            *total += count;
        }
        for (total, sum) in sums.iter_mut().zip(shard.sums) {
            *total += sum;
        }
    }

    let mut empty_clusters = 0;
    let mut mean = vec![0f64; dim];
    for (c, &count) in counts.iter().enumerate() {
        if count == 0 {
            empty_clusters += 1;
            continue;
        }

        let scale = 1.0 / count as f64;
        for (m, &sum) in mean.iter_mut().zip(&sums[c * dim..(c + 1) * dim]) {
            *m = sum * scale;
        }
        if !mean.iter().all(|m| m.is_finite()) {
            debug!(cluster = c, count, "cluster sum overflowed, recomputing mean");
            running_mean(data, mapping, c, &mut mean);
            if !mean.iter().all(|m| m.is_finite()) {
                continue;
            }
        }
        centroids[c * dim..(c + 1) * dim].copy_from_slice(&mean);
    }

    UpdateResult {
        changes,
        counts,
        empty_clusters,
    }
}

/// One assignment + update round on `pool`.
///
/// Exactly `concurrency` shard tasks run, and all of them finish before
/// anything is written. A panic in any of them fails the whole round.
pub fn lloyds_round<M>(
    pool: &rayon::ThreadPool,
    data: &Dataset,
    metric: &M,
    concurrency: usize,
    iteration: usize,
    mapping: &mut [usize],
    centroids: &mut [f64],
) -> Result<UpdateResult>
where
    M: Metric + ?Sized,
{
    assert_eq!(mapping.len(), data.len());
    assert!(concurrency > 0);

    let shards = {
        let previous: &[usize] = mapping;
        let snapshot: &[f64] = centroids;
        catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                (0..concurrency)
                    .into_par_iter()
                    .with_max_len(1)
                    .map(|worker| {
                        assign_shard(data, snapshot, previous, metric, worker, concurrency)
                    })
                    .collect::<Vec<_>>()
            })
        }))
        .map_err(|_| WorkerPanickedSnafu { iteration }.build())?
    };

    Ok(update_centroids(shards, data, mapping, centroids))
}

/// Mapping to start from: nothing assigned yet, so the first round counts
/// every point as a change.
pub fn unassigned(n: usize) -> Vec<usize> {
    vec![UNASSIGNED; n]
}
