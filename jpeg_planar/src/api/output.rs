// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::geometry::{ColorMode, OutputGeometry, PlaneGeometry};

/// A borrowed, tightly packed plane of the result buffer.
#[derive(Copy, Clone, Debug)]
pub struct PlaneView<'a> {
    pub data: &'a [u8],
    pub stride: usize,
    pub rows: usize,
}

impl<'a> PlaneView<'a> {
    fn new(buffer: &'a [u8], plane: &PlaneGeometry) -> Self {
        Self {
            data: &buffer[plane.byte_range()],
            stride: plane.stride,
            rows: plane.rows,
        }
    }

    pub fn row(&self, row: usize) -> &'a [u8] {
        &self.data[row * self.stride..(row + 1) * self.stride]
    }
}

#[derive(Copy, Clone, Debug)]
pub enum Planes<'a> {
    Grayscale {
        y: PlaneView<'a>,
    },
    Yuv420 {
        y: PlaneView<'a>,
        u: PlaneView<'a>,
        v: PlaneView<'a>,
    },
}

impl<'a> Planes<'a> {
    pub fn y(&self) -> PlaneView<'a> {
        match self {
            Self::Grayscale { y } | Self::Yuv420 { y, .. } => *y,
        }
    }
}

/// A fully decoded image: the raw buffer and the geometry that describes it.
#[derive(Debug)]
pub struct DecodedImage {
    pub(crate) data: Vec<u8>,
    pub(crate) geometry: OutputGeometry,
    pub(crate) icc_profile: Option<Vec<u8>>,
    pub(crate) exif: Option<Vec<u8>>,
}

impl DecodedImage {
    /// The whole buffer: Y plane, then U and V planes in 4:2:0 mode.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    pub fn color_mode(&self) -> ColorMode {
        self.geometry.mode
    }

    pub fn geometry(&self) -> &OutputGeometry {
        &self.geometry
    }

    pub fn planes(&self) -> Planes<'_> {
        let y = PlaneView::new(&self.data, &self.geometry.luma);
        match self.geometry.chroma {
            None => Planes::Grayscale { y },
            Some([u, v]) => Planes::Yuv420 {
                y,
                u: PlaneView::new(&self.data, &u),
                v: PlaneView::new(&self.data, &v),
            },
        }
    }

    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.icc_profile.as_deref()
    }

    pub fn exif_data(&self) -> Option<&[u8]> {
        self.exif.as_deref()
    }
}
