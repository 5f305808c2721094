// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

// `warn` also names a built-in attribute, so the no-op macros are re-exported under
// their final names instead of being defined with them.
#[cfg(not(feature = "tracing"))]
mod noop {
    macro_rules! debug_ {
        ($($arg:tt)*) => {};
    }
    macro_rules! trace_ {
        ($($arg:tt)*) => {};
    }
    macro_rules! warn_ {
        ($($arg:tt)*) => {};
    }
    pub(crate) use {debug_ as debug, trace_ as trace, warn_ as warn};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop::{debug, trace, warn};
