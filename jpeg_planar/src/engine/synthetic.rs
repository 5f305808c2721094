// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Scripted engine producing a known pixel pattern, for exercising the decode loop.

use super::{
    ChromaRows, EngineError, EngineResult, EngineSession, HeaderInfo, ScanlineBatch,
    ScanlineEngine,
};
use crate::{abort::AbortSignal, geometry::ColorMode};

pub fn luma_at(x: usize, y: usize) -> u8 {
    (x * 7 + y * 13) as u8
}

pub fn u_at(x: usize, y: usize) -> u8 {
    (x * 3 + y * 5 + 1) as u8
}

pub fn v_at(x: usize, y: usize) -> u8 {
    (x * 11 + y * 2 + 2) as u8
}

/// Ways the engine can violate its batch contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Misbehavior {
    /// Produces one row more than requested.
    TooManyRows,
    /// Produces no rows at all.
    NoRows,
    /// Drops the last byte of the luma rows.
    ShortLuma,
    /// Omits chroma in YUV mode.
    MissingChroma,
}

pub struct SyntheticEngine {
    pub width: usize,
    pub height: usize,
    pub components: usize,
    pub precision: u8,
    pub fail_header: bool,
    pub fail_at_row: Option<usize>,
    pub panic_at_row: Option<usize>,
    /// Reports the error through the abort signal instead of the return value.
    pub signal_only: bool,
    /// Caps the rows produced per call below what was requested.
    pub max_rows_per_call: Option<usize>,
    pub misbehavior: Option<Misbehavior>,
    pub requests: Vec<usize>,
    pub opens: usize,
    pub releases: usize,
    luma: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
}

impl SyntheticEngine {
    pub fn new(width: usize, height: usize, components: usize) -> Self {
        Self {
            width,
            height,
            components,
            precision: 8,
            fail_header: false,
            fail_at_row: None,
            panic_at_row: None,
            signal_only: false,
            max_rows_per_call: None,
            misbehavior: None,
            requests: Vec::new(),
            opens: 0,
            releases: 0,
            luma: Vec::new(),
            u: Vec::new(),
            v: Vec::new(),
        }
    }
}

pub struct SyntheticSession<'a> {
    engine: &'a mut SyntheticEngine,
    signal: Option<AbortSignal>,
    mode: Option<ColorMode>,
    next_row: usize,
}

impl ScanlineEngine for SyntheticEngine {
    type Session<'a> = SyntheticSession<'a>;

    fn open<'a>(&'a mut self, _data: &'a [u8]) -> SyntheticSession<'a> {
        self.opens += 1;
        SyntheticSession {
            engine: self,
            signal: None,
            mode: None,
            next_row: 0,
        }
    }
}

impl SyntheticSession<'_> {
    fn fail(&self, message: &str) -> EngineResult<()> {
        match (&self.signal, self.engine.signal_only) {
            (Some(signal), true) => {
                signal.raise(message);
                Ok(())
            }
            _ => Err(EngineError::Format(message.to_string())),
        }
    }
}

impl EngineSession for SyntheticSession<'_> {
    fn install_abort_handler(&mut self, signal: AbortSignal) {
        self.signal = Some(signal);
    }

    fn read_header(&mut self) -> EngineResult<HeaderInfo> {
        if self.engine.fail_header {
            self.fail("not a JPEG")?;
        }
        Ok(HeaderInfo {
            width: self.engine.width,
            height: self.engine.height,
            components: self.engine.components,
            precision: self.engine.precision,
        })
    }

    fn start_output(&mut self, mode: ColorMode) -> EngineResult<()> {
        self.mode = Some(mode);
        Ok(())
    }

    fn read_scanlines(&mut self, max_rows: usize) -> EngineResult<ScanlineBatch<'_>> {
        let mode = self.mode.ok_or(EngineError::OutputNotStarted)?;
        self.engine.requests.push(max_rows);
        let first_row = self.next_row;
        if first_row >= self.engine.height {
            return Err(EngineError::Exhausted);
        }
        if self.engine.panic_at_row == Some(first_row) {
            panic!("corrupt scan at row {first_row}");
        }
        if self.engine.fail_at_row == Some(first_row) {
            self.fail("premature end of data segment")?;
        }

        let mut rows = max_rows
            .min(self.engine.max_rows_per_call.unwrap_or(usize::MAX))
            .min(self.engine.height - first_row);
        match self.engine.misbehavior {
            Some(Misbehavior::TooManyRows) => rows += 1,
            Some(Misbehavior::NoRows) => rows = 0,
            _ => {}
        }
        self.next_row += rows;

        let engine = &mut *self.engine;
        let width = engine.width;
        engine.luma.clear();
        for y in first_row..first_row + rows {
            engine.luma.extend((0..width).map(|x| luma_at(x, y)));
        }
        if engine.misbehavior == Some(Misbehavior::ShortLuma) {
            engine.luma.pop();
        }

        let chroma = match mode {
            ColorMode::Grayscale => None,
            ColorMode::Yuv420 if engine.misbehavior == Some(Misbehavior::MissingChroma) => None,
            ColorMode::Yuv420 => {
                let chroma_width = width.div_ceil(2);
                let chroma_rows = first_row / 2..(first_row + rows).div_ceil(2);
                engine.u.clear();
                engine.v.clear();
                for cy in chroma_rows.clone() {
                    engine.u.extend((0..chroma_width).map(|cx| u_at(cx, cy)));
                    engine.v.extend((0..chroma_width).map(|cx| v_at(cx, cy)));
                }
                Some(ChromaRows {
                    first_row: chroma_rows.start,
                    rows: chroma_rows.len(),
                    u: &engine.u,
                    v: &engine.v,
                })
            }
        };

        Ok(ScanlineBatch {
            first_row,
            rows,
            luma: &engine.luma,
            chroma,
        })
    }

    fn release(&mut self) {
        self.engine.releases += 1;
        self.mode = None;
    }

    fn icc_profile(&self) -> Option<&[u8]> {
        Some(b"synthetic icc")
    }
}
