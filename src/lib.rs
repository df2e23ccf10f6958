// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Terracodec
//!
//! Raster interchange library for the WhiteboxTools analysis engine.
//!
//! This library provides the plumbing between in-memory raster grids and an
//! external terrain-analysis executable, organized by concern:
//! - **Header/body codecs** for the Whitebox GAT format in [`codec`]
//! - **Grid model and attribute schema** in [`grid`]
//! - **Tool schemas and argument classification** in [`schema`]
//! - **Two-phase argument marshalling** in [`marshal`]
//! - **Process wrapper** for the executable itself in [`engine`]
//!
//! ## Example: loading and saving a raster pair
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//!
//! let grid = terracodec::codec::read_pair(Path::new("DEM.dep"), None)?;
//! println!("{} x {}", grid.rows(), grid.cols());
//! terracodec::codec::write_pair(&grid, Path::new("copy"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: running a tool against an in-memory grid
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use terracodec::core::ArgValue;
//! use terracodec::engine::Engine;
//! use terracodec::marshal::{Marshaller, Workspace};
//!
//! # let dem = unimplemented!();
//! let engine = Engine::discover()?;
//! let marshaller = Marshaller::new(Workspace::from_env()?);
//!
//! let args = vec![
//!     ("dem".to_string(), ArgValue::Grid(Box::new(dem))),
//!     ("output".to_string(), ArgValue::Path("slope.dep".to_string())),
//! ];
//! let result = engine.invoke(&marshaller, "Slope", args)?.into_result()?;
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{ArgValue, CodecError, GridSet, Result};

// Grid model and attributes
pub mod grid;

pub use grid::{Attributes, DataScale, DataType, Grid, GridData};

// Header/body codecs
pub mod codec;

pub use codec::{read_pair, write_pair};

// Tool schemas and classification
pub mod schema;

pub use schema::{ArgKind, Classifier, SchemaCache, ToolSchema};

// Argument marshalling
pub mod marshal;

pub use marshal::{Marshaller, PreparedInvocation, ToolOutput, Workspace};

// External process wrapper
pub mod engine;

pub use engine::Engine;
