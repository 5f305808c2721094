// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use jpeg_planar::api::{JpegDecoder, JpegDecoderLimits, JpegDecoderOptions, Planes};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut options = JpegDecoderOptions::default();
    options.limits = JpegDecoderLimits::restrictive();
    options.limits.max_pixels = Some(1 << 22);
    let mut decoder = JpegDecoder::new(options);
    if !decoder.decompress_image(data) {
        assert_eq!(decoder.decompressed_image_size(), 0);
        return;
    }

    let (width, height) = (
        decoder.decompressed_image_width(),
        decoder.decompressed_image_height(),
    );
    let expected = match decoder.planes().unwrap() {
        Planes::Grayscale { .. } => width * height,
        Planes::Yuv420 { .. } => width * height + 2 * width.div_ceil(2) * height.div_ceil(2),
    };
    assert_eq!(decoder.decompressed_image_size(), expected);
});
