// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Output buffer layout: plane strides, row counts and byte offsets.

use std::ops::Range;

use crate::error::{Error, Result};

/// Layout of the decoded output, derived from the component count of the JPEG header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// One component, one plane of `width * height` bytes.
    Grayscale,
    /// Three components: full-resolution Y plane followed by U and V planes subsampled 2x2.
    Yuv420,
}

impl ColorMode {
    pub fn from_components(components: usize) -> Result<Self> {
        match components {
            1 => Ok(Self::Grayscale),
            3 => Ok(Self::Yuv420),
            n => Err(Error::UnsupportedLayout(n)),
        }
    }

    pub fn components(&self) -> usize {
        match self {
            Self::Grayscale => 1,
            Self::Yuv420 => 3,
        }
    }
}

/// A single tightly packed plane inside the result buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlaneGeometry {
    /// Bytes per row; there is no padding between rows.
    pub stride: usize,
    pub rows: usize,
    /// Byte offset of the first row inside the result buffer.
    pub offset: usize,
}

impl PlaneGeometry {
    pub fn byte_len(&self) -> usize {
        self.stride * self.rows
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.offset..self.offset + self.byte_len()
    }

    /// Byte range of `row` inside the result buffer.
    pub fn row_range(&self, row: usize) -> Range<usize> {
        debug_assert!(row < self.rows);
        let start = self.offset + row * self.stride;
        start..start + self.stride
    }
}

/// Geometry of the whole result buffer, computed from header dimensions alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutputGeometry {
    pub mode: ColorMode,
    pub width: usize,
    pub height: usize,
    pub luma: PlaneGeometry,
    /// U and V planes, present for [`ColorMode::Yuv420`] only.
    pub chroma: Option<[PlaneGeometry; 2]>,
    pub total_bytes: usize,
}

impl OutputGeometry {
    pub fn new(mode: ColorMode, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImageSize(width, height));
        }
        let luma_bytes = width
            .checked_mul(height)
            .ok_or(Error::ImageSizeTooLarge(width, height))?;
        let luma = PlaneGeometry {
            stride: width,
            rows: height,
            offset: 0,
        };
        let (chroma, total_bytes) = match mode {
            ColorMode::Grayscale => (None, luma_bytes),
            ColorMode::Yuv420 => {
                let stride = width.div_ceil(2);
                let rows = height.div_ceil(2);
                let plane_bytes = stride.checked_mul(rows).ok_or(Error::ArithmeticOverflow)?;
                let u = PlaneGeometry {
                    stride,
                    rows,
                    offset: luma_bytes,
                };
                let v = PlaneGeometry {
                    stride,
                    rows,
                    offset: luma_bytes
                        .checked_add(plane_bytes)
                        .ok_or(Error::ArithmeticOverflow)?,
                };
                let total = plane_bytes
                    .checked_mul(2)
                    .and_then(|c| c.checked_add(luma_bytes))
                    .ok_or(Error::ImageSizeTooLarge(width, height))?;
                (Some([u, v]), total)
            }
        };
        Ok(Self {
            mode,
            width,
            height,
            luma,
            chroma,
            total_bytes,
        })
    }

    pub fn chroma_stride(&self) -> Option<usize> {
        self.chroma.map(|[u, _]| u.stride)
    }

    pub fn chroma_rows(&self) -> Option<usize> {
        self.chroma.map(|[u, _]| u.rows)
    }

    /// Chroma rows covering luma rows `first_row..first_row + rows`.
    ///
    /// Chroma row `c` covers luma rows `2c` and `2c + 1`.
    pub fn chroma_rows_for(&self, first_row: usize, rows: usize) -> Range<usize> {
        first_row / 2..(first_row + rows).div_ceil(2)
    }
}
