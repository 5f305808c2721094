// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{DecodedImage, JpegDecoderOptions, Planes, SignatureStatus, check_signature};
use crate::{
    deinterleave,
    engine::{EngineSession, JpegDecoderEngine, ScanlineEngine},
    error::{Error, Result},
    geometry::ColorMode,
    session::DecodeSession,
    util::{tracing_wrappers::*, try_zeroed_bytes},
};

/// Number of scanlines requested from the engine per call.
///
/// Engines need at least one full vertical chroma period (one MCU row) per call for
/// subsampled images; 16 covers every supported sampling factor.
pub const BATCH_ROWS: usize = 16;

/// Decodes JPEG images into raw 4:2:0 planar YUV or grayscale buffers.
///
/// The decoder owns the buffer holding the last successfully decoded image. It is not
/// meant to be shared between threads: use one decoder per thread.
pub struct JpegDecoder<E: ScanlineEngine = JpegDecoderEngine> {
    engine: E,
    options: JpegDecoderOptions,
    result: Option<DecodedImage>,
}

impl JpegDecoder<JpegDecoderEngine> {
    pub fn new(options: JpegDecoderOptions) -> Self {
        let engine = JpegDecoderEngine::new()
            .with_max_decoding_buffer_bytes(options.limits.max_decoding_buffer_bytes);
        Self::with_engine(engine, options)
    }
}

impl Default for JpegDecoder<JpegDecoderEngine> {
    fn default() -> Self {
        Self::new(JpegDecoderOptions::default())
    }
}

impl<E: ScanlineEngine> JpegDecoder<E> {
    pub fn with_engine(engine: E, options: JpegDecoderOptions) -> Self {
        Self {
            engine,
            options,
            result: None,
        }
    }

    /// Decompresses `image`. Returns false if decoding fails for any reason.
    ///
    /// On success the image is available through [`decompressed_image`](Self::decompressed_image)
    /// until the next successful call. A failed call leaves the previous image in place.
    pub fn decompress_image(&mut self, image: &[u8]) -> bool {
        match self.try_decompress_image(image) {
            Ok(_) => true,
            #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
            Err(err) => {
                warn!(%err, "failed to decompress JPEG");
                false
            }
        }
    }

    /// Like [`decompress_image`](Self::decompress_image), reporting why decoding failed.
    pub fn try_decompress_image(&mut self, image: &[u8]) -> Result<&DecodedImage> {
        let decoded = self.decode(image)?;
        Ok(self.result.insert(decoded))
    }

    fn decode(&mut self, image: &[u8]) -> Result<DecodedImage> {
        if image.is_empty() {
            return Err(Error::InvalidInput);
        }
        if check_signature(image) != SignatureStatus::Jpeg {
            return Err(Error::InvalidSignature);
        }

        let mut session = DecodeSession::begin(self.engine.open(image), &self.options.limits)?;
        let geometry = *session.geometry();
        let mut data = match try_zeroed_bytes(geometry.total_bytes) {
            Ok(data) => data,
            Err(err) => return Err(session.abort(err.into())),
        };

        let mut row = 0;
        while row < geometry.height {
            let requested = BATCH_ROWS.min(geometry.height - row);
            let batch = session.read_scanlines(requested)?;
            let produced = batch.rows;
            trace!(row, requested, produced, "scanline batch");
            let written = deinterleave::write_batch(&geometry, &mut data, row, requested, &batch);
            if let Err(err) = written {
                return Err(session.abort(err));
            }
            row += produced;
        }
        session.finish()?;

        let capture = &self.options.metadata_capture;
        let icc_profile = capture
            .keep_icc(session.engine().icc_profile())
            .map(<[u8]>::to_vec);
        let exif = capture
            .keep_exif(session.engine().exif_data())
            .map(<[u8]>::to_vec);
        debug!(
            width = geometry.width,
            height = geometry.height,
            mode = ?geometry.mode,
            bytes = geometry.total_bytes,
            "decoded image"
        );
        Ok(DecodedImage {
            data,
            geometry,
            icc_profile,
            exif,
        })
    }

    /// The last decoded image, or `None` before the first successful call.
    pub fn result(&self) -> Option<&DecodedImage> {
        self.result.as_ref()
    }

    /// Takes ownership of the last decoded image.
    pub fn take_result(&mut self) -> Option<DecodedImage> {
        self.result.take()
    }

    /// Raw bytes of the last decoded image; empty before the first successful call.
    pub fn decompressed_image(&self) -> &[u8] {
        self.result.as_ref().map(DecodedImage::data).unwrap_or_default()
    }

    pub fn decompressed_image_size(&self) -> usize {
        self.decompressed_image().len()
    }

    pub fn decompressed_image_width(&self) -> usize {
        self.result.as_ref().map_or(0, DecodedImage::width)
    }

    pub fn decompressed_image_height(&self) -> usize {
        self.result.as_ref().map_or(0, DecodedImage::height)
    }

    pub fn color_mode(&self) -> Option<ColorMode> {
        self.result.as_ref().map(DecodedImage::color_mode)
    }

    pub fn planes(&self) -> Option<Planes<'_>> {
        self.result.as_ref().map(DecodedImage::planes)
    }

    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.result.as_ref().and_then(DecodedImage::icc_profile)
    }

    pub fn exif_data(&self) -> Option<&[u8]> {
        self.result.as_ref().and_then(DecodedImage::exif_data)
    }

    pub fn options(&self) -> &JpegDecoderOptions {
        &self.options
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
