// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Resource limits for JPEG decoding.

use crate::{
    error::{Error, Result},
    geometry::OutputGeometry,
};

/// Configurable resource limits for the decoder.
///
/// These limits help protect against denial-of-service attacks from images whose headers
/// announce huge dimensions. They are checked after header parsing and before the result
/// buffer is allocated.
///
/// By default every limit is `None` (unlimited). Use [`JpegDecoderLimits::default_safe()`]
/// for general use, or [`JpegDecoderLimits::restrictive()`] for untrusted content.
///
/// # Example
///
/// ```
/// use jpeg_planar::api::JpegDecoderLimits;
///
/// let limits = JpegDecoderLimits::restrictive();
/// assert_eq!(limits.max_pixels, Some(100_000_000));
/// ```
#[derive(Clone, Debug, Default)]
pub struct JpegDecoderLimits {
    /// Maximum total pixels allowed (width * height).
    /// Recommended safe: `1 << 28`.
    pub max_pixels: Option<usize>,

    /// Maximum width or height.
    /// JPEG itself caps dimensions at 65535.
    pub max_dimension: Option<usize>,

    /// Maximum size in bytes of the result buffer.
    pub max_output_bytes: Option<usize>,

    /// Maximum memory the bitstream engine may use for its own decoding buffers.
    /// Forwarded to engines that support such a cap.
    pub max_decoding_buffer_bytes: Option<usize>,
}

impl JpegDecoderLimits {
    /// Returns limits suitable for general use.
    pub fn default_safe() -> Self {
        Self {
            max_pixels: Some(1 << 28), // ~268 megapixels
            max_dimension: None,
            max_output_bytes: Some(1 << 30),
            max_decoding_buffer_bytes: Some(1 << 31),
        }
    }

    /// Returns restrictive limits for untrusted content.
    pub fn restrictive() -> Self {
        Self {
            max_pixels: Some(100_000_000),
            max_dimension: Some(16384),
            max_output_bytes: Some(256 << 20),
            max_decoding_buffer_bytes: Some(1 << 30),
        }
    }

    /// Returns limits with all restrictions disabled.
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub(crate) fn check(&self, geometry: &OutputGeometry) -> Result<()> {
        let (width, height) = (geometry.width, geometry.height);
        let exceeded = self
            .max_dimension
            .is_some_and(|max| width > max || height > max)
            || self.max_pixels.is_some_and(|max| width * height > max)
            || self
                .max_output_bytes
                .is_some_and(|max| geometry.total_bytes > max);
        if exceeded {
            return Err(Error::ImageSizeTooLarge(width, height));
        }
        Ok(())
    }
}
