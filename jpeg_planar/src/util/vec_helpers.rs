// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

pub trait TryWithCapacity {
    type Output;
    type Error;
    fn try_with_capacity(capacity: usize) -> Result<Self::Output, Self::Error>;
}

impl<T> TryWithCapacity for Vec<T> {
    type Output = Vec<T>;
    type Error = TryReserveError;

    fn try_with_capacity(capacity: usize) -> Result<Self::Output, Self::Error> {
        let mut vec = Vec::new();
        vec.try_reserve_exact(capacity)?;
        Ok(vec)
    }
}

/// Allocates a zero-filled byte buffer of exactly `len` bytes, reporting allocation failure
/// instead of aborting.
pub fn try_zeroed_bytes(len: usize) -> Result<Vec<u8>, TryReserveError> {
    let mut vec = <Vec<u8> as TryWithCapacity>::try_with_capacity(len)?;
    vec.resize(len, 0);
    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_bytes_have_exact_length() {
        let buf = try_zeroed_bytes(37).unwrap();
        assert_eq!(buf.len(), 37);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn huge_allocation_is_an_error() {
        assert!(try_zeroed_bytes(usize::MAX).is_err());
    }
}
