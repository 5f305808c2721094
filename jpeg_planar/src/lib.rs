// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Decodes baseline JPEG images into raw planar buffers: 4:2:0 YUV for color
//! images, a single luma plane for grayscale ones.
//!
//! ```no_run
//! use jpeg_planar::api::JpegDecoder;
//!
//! let jpeg = std::fs::read("image.jpg").unwrap();
//! let mut decoder = JpegDecoder::default();
//! if decoder.decompress_image(&jpeg) {
//!     let yuv: &[u8] = decoder.decompressed_image();
//!     assert_eq!(yuv.len(), decoder.decompressed_image_size());
//! }
//! ```

#![deny(unsafe_code)]
pub mod abort;
pub mod api;
pub mod deinterleave;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod session;
pub mod util;
