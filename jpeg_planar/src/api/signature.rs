// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// The SOI (start of image) marker every JPEG stream begins with.
pub const JPEG_SIGNATURE: [u8; 2] = [0xff, 0xd8];

#[derive(Debug, PartialEq, Eq)]
pub enum SignatureStatus {
    /// The prefix starts with a full SOI marker.
    Jpeg,
    /// The prefix is definitively not a JPEG stream.
    NotJpeg,
    /// The prefix matches the start of the marker but is too short.
    NeedsMoreInput { size_hint: usize },
}

/// Checks if the given buffer starts with a JPEG SOI marker.
pub fn check_signature(file_prefix: &[u8]) -> SignatureStatus {
    let len_to_check = file_prefix.len().min(JPEG_SIGNATURE.len());
    if file_prefix[..len_to_check] != JPEG_SIGNATURE[..len_to_check] {
        return SignatureStatus::NotJpeg;
    }
    if file_prefix.len() >= JPEG_SIGNATURE.len() {
        SignatureStatus::Jpeg
    } else {
        SignatureStatus::NeedsMoreInput {
            size_hint: JPEG_SIGNATURE.len() - file_prefix.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures() {
        assert_eq!(check_signature(&[0xff, 0xd8, 0xff, 0xe0]), SignatureStatus::Jpeg);
        assert_eq!(check_signature(&[0xff, 0xd8]), SignatureStatus::Jpeg);
        assert_eq!(
            check_signature(&[0xff]),
            SignatureStatus::NeedsMoreInput { size_hint: 1 }
        );
        assert_eq!(
            check_signature(&[]),
            SignatureStatus::NeedsMoreInput { size_hint: 2 }
        );
        assert_eq!(check_signature(&[0xff, 0x0a]), SignatureStatus::NotJpeg);
        assert_eq!(check_signature(&[0x89, b'P', b'N', b'G']), SignatureStatus::NotJpeg);
    }
}
