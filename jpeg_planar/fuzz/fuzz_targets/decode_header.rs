// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use jpeg_planar::abort::AbortBridge;
use jpeg_planar::engine::{JpegDecoderEngine, ScanlineEngine};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut engine = JpegDecoderEngine::new();
    let mut bridge = AbortBridge::arm(engine.open(data));
    let _ = bridge.read_header();
});
