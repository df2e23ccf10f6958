// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Header/body codecs for the Whitebox GAT raster format.
//!
//! A raster on disk is a pair of files: a text header (`.dep`) describing
//! shape, bounds, type, and display hints, and a binary body (`.tas`) holding
//! the raw matrix values. [`read_pair`] and [`write_pair`] move a [`Grid`]
//! across that boundary.

pub mod body;
pub mod header;

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{CodecError, Result};
use crate::grid::attrs::{normalize, AttrValue};
use crate::grid::raster::{ByteOrder, DataType, Grid};

/// File extension of the text header.
pub const HEADER_EXT: &str = "dep";

/// File extension of the binary body.
pub const BODY_EXT: &str = "tas";

/// Body path implied by a header path (`foo.dep` -> `foo.tas`).
pub fn body_path_for(header: &Path) -> PathBuf {
    header.with_extension(BODY_EXT)
}

/// Load a grid from a header file and its body.
///
/// The body path is guessed from the header path when not given. The grid's
/// storage type and byte order come from the decoded header; an unrecognized
/// or absent `Byte Order` value falls back to little-endian. Nodata
/// substitution is not applied here; callers decide when to do that.
pub fn read_pair(header_path: &Path, body_path: Option<&Path>) -> Result<Grid> {
    if !header_path.exists() {
        return Err(CodecError::materialization(
            header_path.display().to_string(),
            "header file does not exist",
        ));
    }
    let body_path = match body_path {
        Some(p) => p.to_path_buf(),
        None => body_path_for(header_path),
    };
    if !body_path.exists() {
        return Err(CodecError::materialization(
            body_path.display().to_string(),
            "body file does not exist",
        ));
    }

    let text = fs::read_to_string(header_path).map_err(|e| {
        CodecError::materialization(header_path.display().to_string(), e.to_string())
    })?;
    let attrs = header::decode(&text)?;

    let rows = attrs
        .get_i64("rows")
        .ok_or_else(|| CodecError::missing_metadata(vec!["rows".to_string()]))?;
    let cols = attrs
        .get_i64("cols")
        .ok_or_else(|| CodecError::missing_metadata(vec!["cols".to_string()]))?;
    let dtype = DataType::from_header_value(attrs.get_str("dtype").unwrap_or("float"));
    let byte_order = attrs
        .get_str("byte_order")
        .and_then(ByteOrder::from_header_value)
        .unwrap_or(ByteOrder::LittleEndian);

    let data = body::decode(
        &body_path,
        dtype,
        byte_order,
        rows.max(0) as usize,
        cols.max(0) as usize,
    )?;
    let mut grid = Grid::new(data, attrs);
    grid.set_origin(header_path.to_path_buf(), body_path);
    Ok(grid)
}

/// Write a grid as a header/body pair next to `base`.
///
/// `base` may carry any extension; the pair lands at `base.dep`/`base.tas`.
/// Attributes are normalized against the header schema first, the byte order
/// is pinned to little-endian (the only order this writer emits), and a
/// declared stack count above one is rejected.
pub fn write_pair(grid: &Grid, base: &Path) -> Result<(PathBuf, PathBuf)> {
    let mut attrs = normalize(grid.attrs(), grid.data_type())?;
    attrs.insert(
        "byte_order",
        AttrValue::Text(ByteOrder::LittleEndian.as_str().to_string()),
    );
    attrs.insert_absent("stacks", AttrValue::Int(1));

    if let Some(stacks) = attrs.get_i64("stacks") {
        if stacks > 1 {
            return Err(CodecError::unsupported_dimensionality(stacks.max(0) as usize));
        }
    }

    let declared_rows = attrs.get_i64("rows").unwrap_or(0).max(0) as usize;
    let declared_cols = attrs.get_i64("cols").unwrap_or(0).max(0) as usize;
    if declared_rows != grid.rows() || declared_cols != grid.cols() {
        return Err(CodecError::format(
            declared_rows * declared_cols,
            grid.data().len(),
        ));
    }

    let header_path = base.with_extension(HEADER_EXT);
    let body_path = base.with_extension(BODY_EXT);

    let text = header::encode(&attrs);
    fs::write(&header_path, text).map_err(|e| {
        CodecError::materialization(header_path.display().to_string(), e.to_string())
    })?;
    body::encode_to_file(&body_path, grid.data())?;
    Ok((header_path, body_path))
}
