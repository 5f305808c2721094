// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Copies scanline batches into the planes of the result buffer.

use crate::{
    engine::ScanlineBatch,
    error::{Error, Result},
    geometry::{ColorMode, OutputGeometry, PlaneGeometry},
};

/// Checks that `batch` has the shape the geometry expects for a batch requested at
/// `row` with at most `requested` rows. Nothing is written when this fails.
fn validate(
    geometry: &OutputGeometry,
    row: usize,
    requested: usize,
    batch: &ScanlineBatch<'_>,
) -> Result<()> {
    let malformed = |detail| Error::MalformedBatch {
        row,
        rows: batch.rows,
        requested,
        detail,
    };
    if batch.rows == 0 {
        return Err(malformed("no rows produced"));
    }
    if batch.rows > requested || row + batch.rows > geometry.height {
        return Err(malformed("more rows than requested"));
    }
    if batch.first_row != row {
        return Err(malformed("batch does not follow the previous one"));
    }
    if batch.luma.len() != batch.rows * geometry.width {
        return Err(malformed("luma size does not match the image width"));
    }
    match (geometry.chroma, &batch.chroma) {
        (None, None) => Ok(()),
        (None, Some(_)) => Err(malformed("chroma rows in a grayscale image")),
        (Some(_), None) => Err(malformed("missing chroma rows")),
        (Some([u_plane, _]), Some(chroma)) => {
            let expected = geometry.chroma_rows_for(row, batch.rows);
            if chroma.first_row != expected.start || chroma.rows != expected.len() {
                return Err(malformed("chroma rows not aligned with luma rows"));
            }
            let bytes = chroma.rows * u_plane.stride;
            if chroma.u.len() != bytes || chroma.v.len() != bytes {
                return Err(malformed("chroma size does not match the chroma width"));
            }
            Ok(())
        }
    }
}

/// Copies tightly packed `rows`, starting at plane row `first_row`, into `plane`.
fn copy_rows(buffer: &mut [u8], plane: &PlaneGeometry, first_row: usize, rows: &[u8]) {
    for (i, src) in rows.chunks_exact(plane.stride).enumerate() {
        buffer[plane.row_range(first_row + i)].copy_from_slice(src);
    }
}

/// Writes one batch requested at luma row `row` into `buffer`.
///
/// Luma rows land at `row * width`. In 4:2:0 mode, chroma row `c` lands at
/// `c * ceil(width / 2)` within its plane, and covers luma rows `2c` and `2c + 1`.
pub fn write_batch(
    geometry: &OutputGeometry,
    buffer: &mut [u8],
    row: usize,
    requested: usize,
    batch: &ScanlineBatch<'_>,
) -> Result<()> {
    validate(geometry, row, requested, batch)?;
    assert_eq!(buffer.len(), geometry.total_bytes);

    copy_rows(buffer, &geometry.luma, row, batch.luma);
    if let (ColorMode::Yuv420, Some([u_plane, v_plane]), Some(chroma)) =
        (geometry.mode, geometry.chroma, &batch.chroma)
    {
        copy_rows(buffer, &u_plane, chroma.first_row, chroma.u);
        copy_rows(buffer, &v_plane, chroma.first_row, chroma.v);
    }
    Ok(())
}
