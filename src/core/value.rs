// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Tool argument value type system.
//!
//! Provides a unified value representation for named tool arguments. The
//! marshaller pattern-matches these variants exhaustively instead of
//! branching on runtime type checks: a grid-bearing variant is materialized
//! to disk, a path is absolutized, and everything else serializes as a
//! command-line token.

use std::collections::BTreeMap;

use crate::grid::raster::Grid;

/// Named grid collection, ordered by member name so serialized path lists
/// are deterministic.
pub type GridSet = BTreeMap<String, Grid>;

/// A value bound to a named tool argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Boolean flag; only `true` emits a token
    Bool(bool),

    /// Numeric scalar, formatted without quoting
    Number(f64),

    /// Free-text scalar; numeric-looking text serializes unquoted
    Text(String),

    /// Filesystem path, absolutized before serialization
    Path(String),

    /// A single in-memory grid, materialized to a temp header/body pair
    Grid(Box<Grid>),

    /// A named collection of grids, materialized member by member
    Collection(GridSet),
}

impl ArgValue {
    /// Check if this value carries raster data (single grid or collection).
    pub fn is_raster(&self) -> bool {
        matches!(self, ArgValue::Grid(_) | ArgValue::Collection(_))
    }

    /// Check if this value is a scalar (bool, number, or text).
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ArgValue::Bool(_) | ArgValue::Number(_) | ArgValue::Text(_)
        )
    }

    /// Check if this value is a path.
    pub fn is_path(&self) -> bool {
        matches!(self, ArgValue::Path(_))
    }

    /// Try to view this value as f64.
    ///
    /// Numbers convert directly; text converts when it parses as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Number(v) => Some(*v),
            ArgValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to view this value as a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to view this value as text (text and path variants).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Text(s) | ArgValue::Path(s) => Some(s),
            _ => None,
        }
    }

    /// Try to view this value as a single grid.
    pub fn as_grid(&self) -> Option<&Grid> {
        match self {
            ArgValue::Grid(g) => Some(g),
            _ => None,
        }
    }

    /// Try to view this value as a grid collection.
    pub fn as_collection(&self) -> Option<&GridSet> {
        match self {
            ArgValue::Collection(set) => Some(set),
            _ => None,
        }
    }

    /// Human-readable variant name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ArgValue::Bool(_) => "bool",
            ArgValue::Number(_) => "number",
            ArgValue::Text(_) => "text",
            ArgValue::Path(_) => "path",
            ArgValue::Grid(_) => "grid",
            ArgValue::Collection(_) => "collection",
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Number(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Number(v as f64)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Text(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Text(s)
    }
}

impl From<Grid> for ArgValue {
    fn from(g: Grid) -> Self {
        ArgValue::Grid(Box::new(g))
    }
}

impl From<GridSet> for ArgValue {
    fn from(set: GridSet) -> Self {
        ArgValue::Collection(set)
    }
}
