// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    abort::{AbortBridge, SessionState},
    api::JpegDecoderLimits,
    engine::{EngineSession, HeaderInfo, ScanlineBatch},
    error::{Error, Result},
    geometry::{ColorMode, OutputGeometry},
    util::tracing_wrappers::*,
};

/// State of one decode call. Dropping it releases the engine session.
pub struct DecodeSession<S: EngineSession> {
    bridge: AbortBridge<S>,
    header: HeaderInfo,
    geometry: OutputGeometry,
}

impl<S: EngineSession> DecodeSession<S> {
    /// Parses the header, selects the color mode and computes the output geometry, then
    /// starts the engine's output.
    pub fn begin(engine_session: S, limits: &JpegDecoderLimits) -> Result<Self> {
        let mut bridge = AbortBridge::arm(engine_session);
        let header = bridge.read_header()?;
        debug!(?header, "parsed header");

        let geometry = match Self::plan(&header, limits) {
            Ok(geometry) => geometry,
            Err(err) => return Err(bridge.abort(err)),
        };
        bridge.start_output(geometry.mode)?;
        Ok(Self {
            bridge,
            header,
            geometry,
        })
    }

    fn plan(header: &HeaderInfo, limits: &JpegDecoderLimits) -> Result<OutputGeometry> {
        let mode = ColorMode::from_components(header.components)?;
        if header.precision != 8 {
            return Err(Error::UnsupportedPrecision(header.precision));
        }
        let geometry = OutputGeometry::new(mode, header.width, header.height)?;
        limits.check(&geometry)?;
        Ok(geometry)
    }

    pub fn header(&self) -> &HeaderInfo {
        &self.header
    }

    pub fn geometry(&self) -> &OutputGeometry {
        &self.geometry
    }

    pub fn state(&self) -> SessionState {
        self.bridge.state()
    }

    pub fn read_scanlines(&mut self, max_rows: usize) -> Result<ScanlineBatch<'_>> {
        self.bridge.read_scanlines(max_rows)
    }

    pub fn abort(&mut self, err: Error) -> Error {
        self.bridge.abort(err)
    }

    pub fn finish(&mut self) -> Result<()> {
        self.bridge.finish()
    }

    pub fn engine(&self) -> &S {
        self.bridge.session()
    }
}
