//! Conversions between centroids and 8-bit colors.
//!
//! Channels are expected in the `0.0..=255.0` range, which is what
//! datasets built from 8-bit pixels contain.

use crate::{DimensionMismatchSnafu, Model, Result};
use rgb::{RGB8, RGBA8};
use snafu::prelude::*;

#[inline]
fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Rounds the first three channels of `centroid` to an [`RGB8`].
///
/// # Panics
///
/// If `centroid` has fewer than three channels.
pub fn to_rgb8(centroid: &[f64]) -> RGB8 {
    RGB8::new(channel(centroid[0]), channel(centroid[1]), channel(centroid[2]))
}

/// Rounds the four channels of `centroid` to an [`RGBA8`].
///
/// # Panics
///
/// If `centroid` has fewer than four channels.
pub fn to_rgba8(centroid: &[f64]) -> RGBA8 {
    RGBA8::new(
        channel(centroid[0]),
        channel(centroid[1]),
        channel(centroid[2]),
        channel(centroid[3]),
    )
}

impl<M> Model<M> {
    /// One color per cluster, for a model trained on RGB points.
    pub fn palette_rgb(&self) -> Result<Vec<RGB8>> {
        ensure!(
            self.dim() == 3,
            DimensionMismatchSnafu {
                expected: 3usize,
                got: self.dim()
            }
        );
        Ok(self.centroids().map(to_rgb8).collect())
    }

    /// One color per cluster, for a model trained on RGBA points.
    pub fn palette_rgba(&self) -> Result<Vec<RGBA8>> {
        ensure!(
            self.dim() == 4,
            DimensionMismatchSnafu {
                expected: 4usize,
                got: self.dim()
            }
        );
        Ok(self.centroids().map(to_rgba8).collect())
    }
}

#[cfg(feature = "image")]
mod buffers {
    use super::*;
    use crate::{Dataset, Error, Metric, PixelCountMismatchSnafu};
    use image::{ImageBuffer, Rgb, Rgba};
    use std::ops::{Deref, DerefMut};

    impl<'a, Container> TryFrom<&'a ImageBuffer<Rgb<u8>, Container>> for Dataset
    where
        Container: Deref<Target = [u8]>,
    {
        type Error = Error;

        fn try_from(img: &'a ImageBuffer<Rgb<u8>, Container>) -> Result<Self> {
            Dataset::from_flat(3, img.as_raw().iter().copied().map(f64::from).collect())
        }
    }

    impl<'a, Container> TryFrom<&'a ImageBuffer<Rgba<u8>, Container>> for Dataset
    where
        Container: Deref<Target = [u8]>,
    {
        type Error = Error;

        fn try_from(img: &'a ImageBuffer<Rgba<u8>, Container>) -> Result<Self> {
            Dataset::from_flat(4, img.as_raw().iter().copied().map(f64::from).collect())
        }
    }

    fn check_pixel_count<M>(model: &Model<M>, pixels: usize) -> Result<()> {
        ensure!(
            model.guesses().len() == pixels,
            PixelCountMismatchSnafu {
                expected: model.guesses().len(),
                got: pixels
            }
        );
        Ok(())
    }

    /// Replaces every pixel of `img` with the color of its nearest centroid.
    ///
    /// Every pixel is classified again with [`Model::predict`], so `img` may
    /// be any image. For the image the model was trained on,
    /// [`remap_rgb_with_guesses`] reuses the stored assignments instead.
    pub fn remap_rgb<M, Container>(
        model: &Model<M>,
        img: &mut ImageBuffer<Rgb<u8>, Container>,
    ) -> Result<()>
    where
        M: Metric,
        Container: Deref<Target = [u8]> + DerefMut,
    {
        let palette = model.palette_rgb()?;
        for pixel in img.pixels_mut() {
            let color = palette[model.predict(&pixel.0.map(f64::from))];
            pixel.0 = [color.r, color.g, color.b];
        }
        Ok(())
    }

    /// Replaces every pixel of `img` with the color of its nearest centroid.
    ///
    /// Classifies every pixel again; see [`remap_rgba_with_guesses`] for the
    /// training image itself.
    pub fn remap_rgba<M, Container>(
        model: &Model<M>,
        img: &mut ImageBuffer<Rgba<u8>, Container>,
    ) -> Result<()>
    where
        M: Metric,
        Container: Deref<Target = [u8]> + DerefMut,
    {
        let palette = model.palette_rgba()?;
        for pixel in img.pixels_mut() {
            let color = palette[model.predict(&pixel.0.map(f64::from))];
            pixel.0 = [color.r, color.g, color.b, color.a];
        }
        Ok(())
    }

    /// Recolors the image the model was trained on from its stored cluster
    /// assignments, without computing any distance.
    ///
    /// Pixel `i` (row-major) takes the color of `model.guesses()[i]`, so
    /// `img` must have exactly as many pixels as the training dataset had
    /// points, or [`Error::PixelCountMismatch`] is returned.
    pub fn remap_rgb_with_guesses<M, Container>(
        model: &Model<M>,
        img: &mut ImageBuffer<Rgb<u8>, Container>,
    ) -> Result<()>
    where
        Container: Deref<Target = [u8]> + DerefMut,
    {
        let palette = model.palette_rgb()?;
        check_pixel_count(model, img.pixels().len())?;
        for (pixel, &cluster) in img.pixels_mut().zip(model.guesses()) {
            let color = palette[cluster];
            pixel.0 = [color.r, color.g, color.b];
        }
        Ok(())
    }

    /// RGBA counterpart of [`remap_rgb_with_guesses`].
    pub fn remap_rgba_with_guesses<M, Container>(
        model: &Model<M>,
        img: &mut ImageBuffer<Rgba<u8>, Container>,
    ) -> Result<()>
    where
        Container: Deref<Target = [u8]> + DerefMut,
    {
        let palette = model.palette_rgba()?;
        check_pixel_count(model, img.pixels().len())?;
        for (pixel, &cluster) in img.pixels_mut().zip(model.guesses()) {
            let color = palette[cluster];
            pixel.0 = [color.r, color.g, color.b, color.a];
        }
        Ok(())
    }
}

#[cfg(feature = "image")]
pub use buffers::{remap_rgb, remap_rgb_with_guesses, remap_rgba, remap_rgba_with_guesses};
