// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Tool schemas and argument classification.
//!
//! This module provides the discovered-schema side of marshalling:
//! - [`SchemaCache`] - immutable tool-name to parameter-table lookup
//! - [`parse_tool_help`] - scraping a parameter table from a tool's help text
//! - [`Classifier`] - table-driven input/output/scalar argument classification

pub mod cache;
pub mod classify;
pub mod help;

pub use cache::{SchemaCache, ToolParameter, ToolSchema};
pub use classify::{
    ArgKind, Classifier, DEFAULT_INPUT_ARGS, DEFAULT_OUTPUT_ARGS, DEFAULT_SINGLE_ONLY_ARGS,
};
pub use help::parse_tool_help;
