// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Interface to the bitstream engine that performs the actual JPEG decoding.
//!
//! The decode driver never looks inside the compressed stream itself. Entropy decoding,
//! dequantization, the inverse DCT and color conversion all live behind
//! [`ScanlineEngine`], which hands out decoded rows a batch at a time.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::{abort::AbortSignal, geometry::ColorMode};

mod software;
#[cfg(test)]
pub(crate) mod synthetic;

pub use self::software::{JpegDecoderEngine, JpegDecoderSession};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Format(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Output was not started")]
    OutputNotStarted,
    #[error("All scanlines were already produced")]
    Exhausted,
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Frame information reported by header parsing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeaderInfo {
    pub width: usize,
    pub height: usize,
    pub components: usize,
    /// Bits per sample.
    pub precision: u8,
}

/// Subsampled chroma rows accompanying a batch of luma rows.
#[derive(Debug)]
pub struct ChromaRows<'a> {
    /// Index of the first chroma row. Chroma row `c` covers luma rows `2c` and `2c + 1`.
    pub first_row: usize,
    pub rows: usize,
    /// `rows` tightly packed rows of `ceil(width / 2)` bytes each.
    pub u: &'a [u8],
    pub v: &'a [u8],
}

/// One batch of decoded scanlines.
#[derive(Debug)]
pub struct ScanlineBatch<'a> {
    /// Index of the first luma row in the image.
    pub first_row: usize,
    pub rows: usize,
    /// `rows` tightly packed rows of `width` bytes each.
    pub luma: &'a [u8],
    /// Present in [`ColorMode::Yuv420`] only, delivered at the native 2x2 subsampled
    /// frequency: a batch starting at luma row `r` with `n` rows carries chroma rows
    /// `r / 2 .. ceil((r + n) / 2)`.
    pub chroma: Option<ChromaRows<'a>>,
}

/// Decoding state for a single encoded image.
///
/// Calls happen in order: [`install_abort_handler`](Self::install_abort_handler),
/// [`read_header`](Self::read_header), [`start_output`](Self::start_output), then
/// [`read_scanlines`](Self::read_scanlines) until every row was produced, and finally
/// [`release`](Self::release) on every path.
pub trait EngineSession {
    /// Installs the channel used to report fatal errors. Called before any other method.
    fn install_abort_handler(&mut self, signal: AbortSignal);

    fn read_header(&mut self) -> EngineResult<HeaderInfo>;

    fn start_output(&mut self, mode: ColorMode) -> EngineResult<()>;

    /// Produces between 1 and `max_rows` scanlines following the previous batch.
    fn read_scanlines(&mut self, max_rows: usize) -> EngineResult<ScanlineBatch<'_>>;

    /// Frees the internal decoding state. Must be idempotent.
    fn release(&mut self);

    /// Embedded ICC profile, available once output has been started.
    fn icc_profile(&self) -> Option<&[u8]> {
        None
    }

    /// Raw EXIF payload, available once output has been started.
    fn exif_data(&self) -> Option<&[u8]> {
        None
    }
}

/// A bitstream engine. Engines may keep scratch memory across sessions, but a session
/// borrows its engine exclusively, so they are never used reentrantly.
pub trait ScanlineEngine {
    type Session<'a>: EngineSession
    where
        Self: 'a;

    fn open<'a>(&'a mut self, data: &'a [u8]) -> Self::Session<'a>;
}
