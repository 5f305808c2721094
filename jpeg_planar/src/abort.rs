// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Turns engine failures into ordinary errors.
//!
//! An engine can fail in three ways: by returning an [`EngineError`], by raising the
//! [`AbortSignal`] it was given, or by panicking. [`AbortBridge`] funnels all three into a
//! crate [`Error`] and releases the engine session when dropped, whatever the outcome.

use std::{
    any::Any,
    cell::Cell,
    fmt,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

use crate::{
    engine::{EngineError, EngineSession, HeaderInfo, ScanlineBatch},
    error::{Error, Result},
    geometry::ColorMode,
    util::tracing_wrappers::*,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    HeaderParsed,
    Decoding,
    Done,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

/// Channel through which an engine reports a fatal error. Only the first message is kept.
#[derive(Clone, Default)]
pub struct AbortSignal(Rc<Cell<Option<String>>>);

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AbortSignal").field(&self.is_raised()).finish()
    }
}

impl AbortSignal {
    pub fn raise(&self, message: impl Into<String>) {
        let current = self.0.take();
        self.0.set(current.or_else(|| Some(message.into())));
    }

    pub fn is_raised(&self) -> bool {
        let current = self.0.take();
        let raised = current.is_some();
        self.0.set(current);
        raised
    }

    fn take(&self) -> Option<String> {
        self.0.take()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("engine panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("engine panicked: {message}")
    } else {
        "engine panicked".to_string()
    }
}

pub struct AbortBridge<S: EngineSession> {
    session: S,
    signal: AbortSignal,
    state: SessionState,
    released: bool,
}

impl<S: EngineSession> AbortBridge<S> {
    /// Installs the abort handler; no other engine call happens before this.
    pub fn arm(mut session: S) -> Self {
        let signal = AbortSignal::default();
        session.install_abort_handler(signal.clone());
        Self {
            session,
            signal,
            state: SessionState::Idle,
            released: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    fn expect_state(&self, expected: SessionState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidSessionState(self.state))
        }
    }

    /// Maps the outcome of one engine call, moving to `Aborted` on any failure.
    fn settle<T>(
        state: &mut SessionState,
        signal: &AbortSignal,
        outcome: std::thread::Result<Result<T, EngineError>>,
    ) -> Result<T> {
        let failure = match outcome {
            Ok(Ok(value)) => match signal.take() {
                None => return Ok(value),
                Some(message) => message,
            },
            Ok(Err(err)) => signal.take().unwrap_or_else(|| err.to_string()),
            Err(payload) => panic_message(&*payload),
        };
        let err = if *state == SessionState::Idle {
            Error::HeaderParse(failure)
        } else {
            Error::DecodeAbort(failure)
        };
        warn!(from = ?*state, %err, "engine aborted");
        *state = SessionState::Aborted;
        Err(err)
    }

    pub fn read_header(&mut self) -> Result<HeaderInfo> {
        self.expect_state(SessionState::Idle)?;
        let session = &mut self.session;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| session.read_header()));
        let header = Self::settle(&mut self.state, &self.signal, outcome)?;
        self.state = SessionState::HeaderParsed;
        Ok(header)
    }

    pub fn start_output(&mut self, mode: ColorMode) -> Result<()> {
        self.expect_state(SessionState::HeaderParsed)?;
        let session = &mut self.session;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| session.start_output(mode)));
        Self::settle(&mut self.state, &self.signal, outcome)?;
        self.state = SessionState::Decoding;
        Ok(())
    }

    pub fn read_scanlines(&mut self, max_rows: usize) -> Result<ScanlineBatch<'_>> {
        self.expect_state(SessionState::Decoding)?;
        let session = &mut self.session;
        let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
            let session = session;
            session.read_scanlines(max_rows)
        }));
        Self::settle(&mut self.state, &self.signal, outcome)
    }

    /// Records a failure detected outside the engine, e.g. an unsupported layout or a
    /// malformed batch, and passes the error through.
    pub fn abort(&mut self, err: Error) -> Error {
        if !self.state.is_terminal() {
            warn!(from = ?self.state, %err, "decode aborted");
            self.state = SessionState::Aborted;
        }
        err
    }

    pub fn finish(&mut self) -> Result<()> {
        self.expect_state(SessionState::Decoding)?;
        self.state = SessionState::Done;
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        // A panicking release must not escape a drop running during unwinding.
        let session = &mut self.session;
        if panic::catch_unwind(AssertUnwindSafe(|| session.release())).is_err() {
            warn!("engine panicked while releasing its session");
        }
    }
}

impl<S: EngineSession> Drop for AbortBridge<S> {
    fn drop(&mut self) {
        trace!(state = ?self.state, "releasing engine session");
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::engine::{EngineResult, ScanlineEngine, synthetic::SyntheticEngine};

    #[test]
    fn signal_keeps_first_message() {
        let signal = AbortSignal::default();
        assert!(!signal.is_raised());
        signal.raise("first");
        signal.raise("second");
        assert!(signal.is_raised());
        assert_eq!(signal.take().as_deref(), Some("first"));
        assert!(!signal.is_raised());
    }

    #[test]
    fn signal_debug_shows_whether_raised() {
        let signal = AbortSignal::default();
        assert_eq!(format!("{signal:?}"), "AbortSignal(false)");
        signal.raise("bad huffman code");
        assert_eq!(format!("{signal:?}"), "AbortSignal(true)");
        // Formatting does not consume the message.
        assert_eq!(signal.take().as_deref(), Some("bad huffman code"));
    }

    #[test]
    fn walks_through_states() {
        let mut engine = SyntheticEngine::new(8, 4, 1);
        {
            let mut bridge = AbortBridge::arm(engine.open(&[0xff, 0xd8]));
            assert_eq!(bridge.state(), SessionState::Idle);
            bridge.read_header().unwrap();
            assert_eq!(bridge.state(), SessionState::HeaderParsed);
            bridge.start_output(ColorMode::Grayscale).unwrap();
            assert_eq!(bridge.state(), SessionState::Decoding);
            assert_eq!(bridge.read_scanlines(16).unwrap().rows, 4);
            bridge.finish().unwrap();
            assert_eq!(bridge.state(), SessionState::Done);
        }
        assert_eq!(engine.releases, 1);
    }

    #[test]
    fn header_failure_is_a_parse_error() {
        let mut engine = SyntheticEngine::new(8, 4, 1);
        engine.fail_header = true;
        {
            let mut bridge = AbortBridge::arm(engine.open(&[0xff, 0xd8]));
            assert!(matches!(bridge.read_header(), Err(Error::HeaderParse(_))));
            assert_eq!(bridge.state(), SessionState::Aborted);
            assert!(matches!(
                bridge.start_output(ColorMode::Grayscale),
                Err(Error::InvalidSessionState(SessionState::Aborted))
            ));
        }
        assert_eq!(engine.releases, 1);
    }

    #[test]
    fn panic_becomes_decode_abort() {
        let mut engine = SyntheticEngine::new(8, 40, 1);
        engine.panic_at_row = Some(16);
        {
            let mut bridge = AbortBridge::arm(engine.open(&[0xff, 0xd8]));
            bridge.read_header().unwrap();
            bridge.start_output(ColorMode::Grayscale).unwrap();
            bridge.read_scanlines(16).unwrap();
            match bridge.read_scanlines(16) {
                Err(Error::DecodeAbort(message)) => assert!(message.contains("panicked")),
                other => panic!("unexpected outcome {other:?}"),
            }
            assert_eq!(bridge.state(), SessionState::Aborted);
        }
        assert_eq!(engine.releases, 1);
    }

    #[test]
    fn raised_signal_wins_over_success() {
        struct Raising(Option<AbortSignal>);
        impl EngineSession for Raising {
            fn install_abort_handler(&mut self, signal: AbortSignal) {
                self.0 = Some(signal);
            }
            fn read_header(&mut self) -> EngineResult<HeaderInfo> {
                if let Some(signal) = &self.0 {
                    signal.raise("corrupt marker");
                }
                Ok(HeaderInfo {
                    width: 1,
                    height: 1,
                    components: 1,
                    precision: 8,
                })
            }
            fn start_output(&mut self, _mode: ColorMode) -> EngineResult<()> {
                unreachable!()
            }
            fn read_scanlines(&mut self, _max_rows: usize) -> EngineResult<ScanlineBatch<'_>> {
                unreachable!()
            }
            fn release(&mut self) {}
        }

        let mut bridge = AbortBridge::arm(Raising(None));
        match bridge.read_header() {
            Err(Error::HeaderParse(message)) => assert_eq!(message, "corrupt marker"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn abort_is_sticky() {
        let mut engine = SyntheticEngine::new(8, 4, 3);
        let mut bridge = AbortBridge::arm(engine.open(&[0xff, 0xd8]));
        bridge.read_header().unwrap();
        let err = bridge.abort(Error::UnsupportedLayout(4));
        assert!(matches!(err, Error::UnsupportedLayout(4)));
        assert_eq!(bridge.state(), SessionState::Aborted);
        assert!(bridge.finish().is_err());
    }
}
