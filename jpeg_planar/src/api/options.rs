// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::api::JpegDecoderLimits;

/// Default maximum size for a captured ICC profile (1MB).
pub const DEFAULT_ICC_SIZE_LIMIT: usize = 1024 * 1024;

/// Default maximum size for captured EXIF data (64KB, the size of one APP1 segment).
pub const DEFAULT_EXIF_SIZE_LIMIT: usize = 64 * 1024;

/// Options for capturing metadata alongside the pixels.
/// All capture flags default to false (opt-in) to avoid memory overhead.
#[derive(Debug, Clone, Default)]
pub struct MetadataCaptureOptions {
    /// Whether to keep the embedded ICC profile, retrievable via `icc_profile()`.
    pub capture_icc: bool,
    /// Whether to keep the raw EXIF payload, retrievable via `exif_data()`.
    pub capture_exif: bool,
    /// Profiles larger than this are dropped. `None` disables the limit.
    pub icc_size_limit: Option<usize>,
    /// EXIF payloads larger than this are dropped. `None` disables the limit.
    pub exif_size_limit: Option<usize>,
}

impl MetadataCaptureOptions {
    /// Create options with all metadata capture enabled and default size limits.
    pub fn capture_all_with_limits() -> Self {
        Self {
            capture_icc: true,
            capture_exif: true,
            icc_size_limit: Some(DEFAULT_ICC_SIZE_LIMIT),
            exif_size_limit: Some(DEFAULT_EXIF_SIZE_LIMIT),
        }
    }

    /// Create options with all metadata capture enabled and no size limits.
    pub fn capture_all() -> Self {
        Self {
            capture_icc: true,
            capture_exif: true,
            icc_size_limit: None,
            exif_size_limit: None,
        }
    }

    /// Create options with all metadata capture disabled.
    pub fn no_capture() -> Self {
        Self::default()
    }

    pub(crate) fn keep_icc<'a>(&self, profile: Option<&'a [u8]>) -> Option<&'a [u8]> {
        profile.filter(|p| self.capture_icc && self.icc_size_limit.is_none_or(|max| p.len() <= max))
    }

    pub(crate) fn keep_exif<'a>(&self, exif: Option<&'a [u8]>) -> Option<&'a [u8]> {
        exif.filter(|e| self.capture_exif && self.exif_size_limit.is_none_or(|max| e.len() <= max))
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct JpegDecoderOptions {
    pub limits: JpegDecoderLimits,
    /// Options for capturing ICC and EXIF metadata.
    pub metadata_capture: MetadataCaptureOptions,
}
