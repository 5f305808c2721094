// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::abort::SessionState;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Empty input")]
    InvalidInput,
    #[error("Missing JPEG SOI marker")]
    InvalidSignature,
    #[error("Failed to parse JPEG header: {0}")]
    HeaderParse(String),
    #[error("Unsupported component count: {0}, expected 1 or 3")]
    UnsupportedLayout(usize),
    #[error("Unsupported sample precision: {0} bits")]
    UnsupportedPrecision(u8),
    #[error("Decoding aborted: {0}")]
    DecodeAbort(String),
    #[error(
        "Malformed scanline batch at row {row}: {rows} rows (requested {requested}), {detail}"
    )]
    MalformedBatch {
        row: usize,
        rows: usize,
        requested: usize,
        detail: &'static str,
    },
    #[error("Engine call not allowed in session state {0:?}")]
    InvalidSessionState(SessionState),
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    #[error("Image size too large: {0}x{1}")]
    ImageSizeTooLarge(usize, usize),
    #[error("Invalid image size: {0}x{1}")]
    InvalidImageSize(usize, usize),
    // Generic arithmetic overflow. Prefer using other errors if possible.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
