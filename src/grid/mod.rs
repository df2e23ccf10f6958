// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! In-memory raster grids and their header attributes.
//!
//! This module provides the foundational data model:
//! - [`Grid`] - a 2-D numeric raster with coordinate axes and attributes
//! - [`Attributes`] - ordered, case-insensitive header attribute map
//! - [`normalize`] - schema validation against the required/optional field sets

pub mod attrs;
pub mod raster;

pub use attrs::{
    canonical_key, normalize, AttrDefaults, AttrValue, Attributes, DataScale, METADATA_KEY,
    OPTIONAL_FIELDS, REQUIRED_FIELDS,
};
pub use raster::{
    half_open_axis, ByteOrder, DataType, Grid, GridAxes, GridData, GridOrigin, Invocation,
};
