// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Engine backed by the pure Rust `jpeg-decoder` crate.
//!
//! `jpeg-decoder` decodes a whole frame at once and hands back upsampled RGB or luma
//! samples. This adapter serves those samples in scanline batches and, for color images,
//! converts them back to full-range BT.601 YCbCr with chroma box-filtered down to the
//! native 2x2 subsampled frequency.

use jpeg_decoder::{Decoder, PixelFormat};

use super::{
    ChromaRows, EngineError, EngineResult, EngineSession, HeaderInfo, ScanlineBatch,
    ScanlineEngine,
};
use crate::{abort::AbortSignal, geometry::ColorMode, util::tracing_wrappers::*};

// RGB -> YCbCr coefficients scaled by 2^16.
const FIX_Y: [i32; 3] = [19595, 38470, 7471];
const FIX_CB: [i32; 3] = [-11059, -21709, 32768];
const FIX_CR: [i32; 3] = [32768, -27439, -5329];

#[inline]
fn rgb_to_luma(rgb: &[u8]) -> u8 {
    let [r, g, b] = [rgb[0] as i32, rgb[1] as i32, rgb[2] as i32];
    ((FIX_Y[0] * r + FIX_Y[1] * g + FIX_Y[2] * b + (1 << 15)) >> 16) as u8
}

/// Chroma of a 2x2 block, given the sums of its four R, G and B samples.
#[inline]
fn block_to_chroma(sums: [i32; 3], fix: [i32; 3]) -> u8 {
    // Four samples add two bits of scale on top of the 16 bits of the coefficients.
    let value = fix[0] * sums[0] + fix[1] * sums[1] + fix[2] * sums[2] + (128 << 18) + (1 << 17);
    (value >> 18).clamp(0, 255) as u8
}

#[derive(Default)]
struct Scratch {
    luma: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
}

/// The default engine. Scratch rows are kept across sessions.
#[derive(Default)]
pub struct JpegDecoderEngine {
    max_decoding_buffer_bytes: Option<usize>,
    scratch: Scratch,
}

impl JpegDecoderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the memory `jpeg-decoder` may use for its internal decoding buffers.
    pub fn with_max_decoding_buffer_bytes(mut self, max: Option<usize>) -> Self {
        self.max_decoding_buffer_bytes = max;
        self
    }
}

impl ScanlineEngine for JpegDecoderEngine {
    type Session<'a> = JpegDecoderSession<'a>;

    fn open<'a>(&'a mut self, data: &'a [u8]) -> JpegDecoderSession<'a> {
        let mut decoder = Decoder::new(data);
        if let Some(max) = self.max_decoding_buffer_bytes {
            decoder.set_max_decoding_buffer_size(max);
        }
        JpegDecoderSession {
            scratch: &mut self.scratch,
            decoder,
            signal: None,
            header: None,
            format: None,
            pixels: Vec::new(),
            mode: None,
            next_row: 0,
            icc_profile: None,
            exif: None,
        }
    }
}

pub struct JpegDecoderSession<'a> {
    scratch: &'a mut Scratch,
    decoder: Decoder<&'a [u8]>,
    signal: Option<AbortSignal>,
    header: Option<HeaderInfo>,
    format: Option<PixelFormat>,
    pixels: Vec<u8>,
    mode: Option<ColorMode>,
    next_row: usize,
    icc_profile: Option<Vec<u8>>,
    exif: Option<Vec<u8>>,
}

impl JpegDecoderSession<'_> {
    fn abort<T>(&self, err: EngineError) -> EngineResult<T> {
        if let Some(signal) = &self.signal {
            signal.raise(err.to_string());
        }
        Err(err)
    }

    fn yuv_batch(&mut self, header: HeaderInfo, first_row: usize, rows: usize) -> EngineResult<()> {
        let width = header.width;
        let height = header.height;
        let rgb_stride = width * 3;
        let chroma_width = width.div_ceil(2);
        let chroma_rows = first_row / 2..(first_row + rows).div_ceil(2);

        let scratch = &mut *self.scratch;
        scratch.luma.clear();
        scratch.luma.try_reserve(rows * width)?;
        for y in first_row..first_row + rows {
            let src = &self.pixels[y * rgb_stride..(y + 1) * rgb_stride];
            scratch.luma.extend(src.chunks_exact(3).map(rgb_to_luma));
        }

        scratch.u.clear();
        scratch.v.clear();
        scratch.u.try_reserve(chroma_rows.len() * chroma_width)?;
        scratch.v.try_reserve(chroma_rows.len() * chroma_width)?;
        for cy in chroma_rows {
            // The last row and column are replicated when the dimension is odd.
            let top = 2 * cy;
            let bottom = (top + 1).min(height - 1);
            let top_row = &self.pixels[top * rgb_stride..(top + 1) * rgb_stride];
            let bottom_row = &self.pixels[bottom * rgb_stride..(bottom + 1) * rgb_stride];
            for cx in 0..chroma_width {
                let left = 2 * cx;
                let right = (left + 1).min(width - 1);
                let mut sums = [0i32; 3];
                for row in [top_row, bottom_row] {
                    for x in [left, right] {
                        for (sum, &sample) in sums.iter_mut().zip(&row[x * 3..x * 3 + 3]) {
                            *sum += sample as i32;
                        }
                    }
                }
                scratch.u.push(block_to_chroma(sums, FIX_CB));
                scratch.v.push(block_to_chroma(sums, FIX_CR));
            }
        }
        Ok(())
    }
}

impl EngineSession for JpegDecoderSession<'_> {
    fn install_abort_handler(&mut self, signal: AbortSignal) {
        self.signal = Some(signal);
    }

    fn read_header(&mut self) -> EngineResult<HeaderInfo> {
        if let Err(err) = self.decoder.read_info() {
            return self.abort(EngineError::Format(err.to_string()));
        }
        let Some(info) = self.decoder.info() else {
            return self.abort(EngineError::Format("missing frame header".to_string()));
        };
        #[allow(unreachable_patterns)]
        let (components, precision) = match info.pixel_format {
            PixelFormat::L8 => (1, 8),
            PixelFormat::L16 => (1, 16),
            PixelFormat::RGB24 => (3, 8),
            PixelFormat::CMYK32 => (4, 8),
            other => {
                return self.abort(EngineError::Unsupported(format!("{other:?}")));
            }
        };
        let header = HeaderInfo {
            width: info.width as usize,
            height: info.height as usize,
            components,
            precision,
        };
        debug!(?header, coding_process = ?info.coding_process, "jpeg-decoder header");
        self.header = Some(header);
        self.format = Some(info.pixel_format);
        Ok(header)
    }

    fn start_output(&mut self, mode: ColorMode) -> EngineResult<()> {
        let (Some(header), Some(format)) = (self.header, self.format) else {
            return self.abort(EngineError::Format("header was not read".to_string()));
        };
        let bytes_per_pixel = match (mode, format) {
            (ColorMode::Grayscale, PixelFormat::L8) => 1,
            (ColorMode::Yuv420, PixelFormat::RGB24) => 3,
            (mode, format) => {
                return self.abort(EngineError::Unsupported(format!(
                    "{format:?} output as {mode:?}"
                )));
            }
        };
        let pixels = match self.decoder.decode() {
            Ok(pixels) => pixels,
            Err(err) => return self.abort(EngineError::Format(err.to_string())),
        };
        if pixels.len() != header.width * header.height * bytes_per_pixel {
            return self.abort(EngineError::Format(format!(
                "decoded {} bytes for a {}x{} image",
                pixels.len(),
                header.width,
                header.height
            )));
        }
        self.icc_profile = self.decoder.icc_profile();
        self.exif = self.decoder.exif_data().map(<[u8]>::to_vec);
        self.pixels = pixels;
        self.mode = Some(mode);
        self.next_row = 0;
        Ok(())
    }

    fn read_scanlines(&mut self, max_rows: usize) -> EngineResult<ScanlineBatch<'_>> {
        let (Some(mode), Some(header)) = (self.mode, self.header) else {
            return self.abort(EngineError::OutputNotStarted);
        };
        let first_row = self.next_row;
        if first_row >= header.height {
            return self.abort(EngineError::Exhausted);
        }
        let rows = max_rows.min(header.height - first_row);
        self.next_row += rows;

        match mode {
            ColorMode::Grayscale => Ok(ScanlineBatch {
                first_row,
                rows,
                luma: &self.pixels[first_row * header.width..(first_row + rows) * header.width],
                chroma: None,
            }),
            ColorMode::Yuv420 => {
                self.yuv_batch(header, first_row, rows)?;
                Ok(ScanlineBatch {
                    first_row,
                    rows,
                    luma: &self.scratch.luma,
                    chroma: Some(ChromaRows {
                        first_row: first_row / 2,
                        rows: (first_row + rows).div_ceil(2) - first_row / 2,
                        u: &self.scratch.u,
                        v: &self.scratch.v,
                    }),
                })
            }
        }
    }

    fn release(&mut self) {
        self.pixels = Vec::new();
        self.mode = None;
    }

    fn icc_profile(&self) -> Option<&[u8]> {
        self.icc_profile.as_deref()
    }

    fn exif_data(&self) -> Option<&[u8]> {
        self.exif.as_deref()
    }
}
