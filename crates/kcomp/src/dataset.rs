use crate::{
    CapacityOverflowSnafu, DimensionMismatchSnafu, NonFiniteSnafu, RaggedBufferSnafu, Result,
    ZeroDimensionSnafu,
};
use snafu::prelude::*;

/// An ordered set of points sharing one dimension.
///
/// Points are stored back to back in a single buffer, so point `i` occupies
/// `values[i * dim..(i + 1) * dim]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    dim: usize,
    values: Vec<f64>,
}

impl Dataset {
    pub fn new(dim: usize) -> Result<Self> {
        Self::with_capacity(dim, 0)
    }

    /// Reserves room for `points` points up front. A reservation that cannot
    /// be represented or allocated is an error rather than a panic.
    pub fn with_capacity(dim: usize, points: usize) -> Result<Self> {
        ensure!(dim > 0, ZeroDimensionSnafu);
        let mut values = Vec::new();
        dim.checked_mul(points)
            .and_then(|capacity| values.try_reserve_exact(capacity).ok())
            .context(CapacityOverflowSnafu { dim, points })?;
        Ok(Self { dim, values })
    }

    /// Builds a dataset from rows, taking the dimension from the first one.
    ///
    /// An empty iterator yields [`Error::ZeroDimension`](crate::Error::ZeroDimension),
    /// since there is nothing to infer the dimension from.
    pub fn from_rows<I, R>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f64]>,
    {
        let mut rows = rows.into_iter();
        let Some(first) = rows.next() else {
            return ZeroDimensionSnafu.fail();
        };
        let first = first.as_ref();

        let mut dataset = Self::with_capacity(first.len(), rows.size_hint().0.saturating_add(1))?;
        dataset.push(first)?;
        for row in rows {
            dataset.push(row.as_ref())?;
        }
        Ok(dataset)
    }

    /// Wraps an already flattened buffer of `values.len() / dim` points.
    pub fn from_flat(dim: usize, values: Vec<f64>) -> Result<Self> {
        ensure!(dim > 0, ZeroDimensionSnafu);
        ensure!(
            values.len().is_multiple_of(dim),
            RaggedBufferSnafu {
                len: values.len(),
                dim
            }
        );
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return NonFiniteSnafu {
                index: position / dim,
            }
            .fail();
        }
        Ok(Self { dim, values })
    }

    /// Appends one point. NaN and infinite coordinates are rejected, so every
    /// stored point has a finite distance to any finite centroid.
    pub fn push(&mut self, point: &[f64]) -> Result<()> {
        ensure!(
            point.len() == self.dim,
            DimensionMismatchSnafu {
                expected: self.dim,
                got: point.len()
            }
        );
        ensure!(
            point.iter().all(|v| v.is_finite()),
            NonFiniteSnafu { index: self.len() }
        );
        self.values.extend_from_slice(point);
        Ok(())
    }

    #[inline(always)]
    pub fn point(&self, i: usize) -> &[f64] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() / self.dim
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.dim)
    }
}
