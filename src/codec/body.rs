// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Binary body codec for the Whitebox GAT `.tas` format.
//!
//! A body file is a flat row-major sequence of fixed-width scalars: 4-byte
//! IEEE floats or 2-byte signed integers, in the byte order declared by the
//! header (little-endian when unspecified). Writes happen one row at a time;
//! a crash mid-write can leave a partial file behind, which is an accepted
//! limitation of the format rather than something the codec hides.

use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder as _, LittleEndian, WriteBytesExt};
use ndarray::Array2;

use crate::core::error::{CodecError, Result};
use crate::grid::raster::{ByteOrder, DataType, GridData};

/// Decode a body file into 2-D storage.
///
/// The file must hold exactly `rows * cols` elements of the declared type;
/// anything else fails with [`CodecError::FormatError`] rather than being
/// silently truncated or padded.
pub fn decode(
    path: &Path,
    dtype: DataType,
    byte_order: ByteOrder,
    rows: usize,
    cols: usize,
) -> Result<GridData> {
    let bytes = fs::read(path)
        .map_err(|e| CodecError::materialization(path.display().to_string(), e.to_string()))?;

    let width = dtype.element_size();
    let expected = rows * cols;
    let actual = bytes.len() / width;
    if bytes.len() % width != 0 || actual != expected {
        return Err(CodecError::format(expected, actual));
    }

    let data = match dtype {
        DataType::Float => {
            let mut values = vec![0f32; expected];
            match byte_order {
                ByteOrder::LittleEndian => LittleEndian::read_f32_into(&bytes, &mut values),
                ByteOrder::BigEndian => BigEndian::read_f32_into(&bytes, &mut values),
            }
            let arr = Array2::from_shape_vec((rows, cols), values)
                .map_err(|_| CodecError::format(expected, actual))?;
            GridData::Float(arr)
        }
        DataType::Integer => {
            let mut values = vec![0i16; expected];
            match byte_order {
                ByteOrder::LittleEndian => LittleEndian::read_i16_into(&bytes, &mut values),
                ByteOrder::BigEndian => BigEndian::read_i16_into(&bytes, &mut values),
            }
            let arr = Array2::from_shape_vec((rows, cols), values)
                .map_err(|_| CodecError::format(expected, actual))?;
            GridData::Integer(arr)
        }
    };
    Ok(data)
}

/// Encode 2-D storage row-major in little-endian, one row per write call.
pub fn encode<W: Write>(data: &GridData, writer: &mut W) -> Result<()> {
    match data {
        GridData::Float(arr) => {
            let mut row_buf = Vec::with_capacity(arr.ncols() * 4);
            for row in arr.outer_iter() {
                row_buf.clear();
                for &v in row.iter() {
                    row_buf.write_f32::<LittleEndian>(v)?;
                }
                writer.write_all(&row_buf)?;
            }
        }
        GridData::Integer(arr) => {
            let mut row_buf = Vec::with_capacity(arr.ncols() * 2);
            for row in arr.outer_iter() {
                row_buf.clear();
                for &v in row.iter() {
                    row_buf.write_i16::<LittleEndian>(v)?;
                }
                writer.write_all(&row_buf)?;
            }
        }
    }
    Ok(())
}

/// Encode 2-D storage to a file.
pub fn encode_to_file(path: &Path, data: &GridData) -> Result<()> {
    let mut file = fs::File::create(path)
        .map_err(|e| CodecError::materialization(path.display().to_string(), e.to_string()))?;
    encode(data, &mut file)
        .map_err(|e| CodecError::materialization(path.display().to_string(), e.to_string()))?;
    file.flush()
        .map_err(|e| CodecError::materialization(path.display().to_string(), e.to_string()))?;
    Ok(())
}
