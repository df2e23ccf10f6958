// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for terracodec.
//!
//! Provides error types for raster interchange operations:
//! - Header parsing and attribute validation
//! - Body decoding and encoding
//! - Argument marshalling and external tool invocation

use std::fmt;

/// Errors that can occur during raster interchange operations.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// Malformed header line or unparsable typed field
    ParseError {
        /// The offending header line or field
        line: String,
        /// Error message
        message: String,
    },

    /// Required attribute keys absent after normalization
    MissingMetadata {
        /// The required keys that were not found
        missing: Vec<String>,
    },

    /// `data_scale` outside the accepted enumeration
    UnsupportedDataScale {
        /// The rejected value
        value: String,
    },

    /// Feature that is deliberately not implemented (e.g. rgb rasters)
    NotImplemented {
        /// What is not implemented
        feature: String,
    },

    /// Raster body is not two-dimensional
    UnsupportedDimensionality {
        /// Number of dimensions (or stack count) encountered
        ndim: usize,
    },

    /// Body element count does not match the declared shape
    FormatError {
        /// Elements implied by the declared rows x cols
        expected: usize,
        /// Elements actually present in the file
        actual: usize,
    },

    /// I/O failure while materializing or loading a temp raster
    MaterializationFailure {
        /// Path being written or read
        path: String,
        /// Underlying cause
        cause: String,
    },

    /// External tool exited with a nonzero status
    ExternalFailure {
        /// Tool name
        tool: String,
        /// Exit status reported by the process
        exit_status: i32,
    },

    /// Multi-grid collection passed to an argument that only takes one raster
    UnsupportedDatasetForArgument {
        /// Argument name
        argument: String,
    },

    /// Other error
    Other(String),
}

impl CodecError {
    /// Create a parse error.
    pub fn parse(line: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::ParseError {
            line: line.into(),
            message: message.into(),
        }
    }

    /// Create a missing-metadata error.
    pub fn missing_metadata(missing: Vec<String>) -> Self {
        CodecError::MissingMetadata { missing }
    }

    /// Create an unsupported data-scale error.
    pub fn unsupported_data_scale(value: impl Into<String>) -> Self {
        CodecError::UnsupportedDataScale {
            value: value.into(),
        }
    }

    /// Create a not-implemented error.
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        CodecError::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Create a dimensionality error.
    pub fn unsupported_dimensionality(ndim: usize) -> Self {
        CodecError::UnsupportedDimensionality { ndim }
    }

    /// Create a body format error.
    pub fn format(expected: usize, actual: usize) -> Self {
        CodecError::FormatError { expected, actual }
    }

    /// Create a materialization failure.
    pub fn materialization(path: impl Into<String>, cause: impl Into<String>) -> Self {
        CodecError::MaterializationFailure {
            path: path.into(),
            cause: cause.into(),
        }
    }

    /// Create an external-failure error.
    pub fn external(tool: impl Into<String>, exit_status: i32) -> Self {
        CodecError::ExternalFailure {
            tool: tool.into(),
            exit_status,
        }
    }

    /// Create an unsupported-dataset error.
    pub fn unsupported_dataset(argument: impl Into<String>) -> Self {
        CodecError::UnsupportedDatasetForArgument {
            argument: argument.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::ParseError { line, message } => {
                vec![("line", line.clone()), ("message", message.clone())]
            }
            CodecError::MissingMetadata { missing } => {
                vec![("missing", missing.join(", "))]
            }
            CodecError::UnsupportedDataScale { value } => vec![("value", value.clone())],
            CodecError::NotImplemented { feature } => vec![("feature", feature.clone())],
            CodecError::UnsupportedDimensionality { ndim } => {
                vec![("ndim", ndim.to_string())]
            }
            CodecError::FormatError { expected, actual } => vec![
                ("expected", expected.to_string()),
                ("actual", actual.to_string()),
            ],
            CodecError::MaterializationFailure { path, cause } => {
                vec![("path", path.clone()), ("cause", cause.clone())]
            }
            CodecError::ExternalFailure { tool, exit_status } => vec![
                ("tool", tool.clone()),
                ("exit_status", exit_status.to_string()),
            ],
            CodecError::UnsupportedDatasetForArgument { argument } => {
                vec![("argument", argument.clone())]
            }
            CodecError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ParseError { line, message } => {
                write!(f, "Parse error in '{line}': {message}")
            }
            CodecError::MissingMetadata { missing } => {
                write!(
                    f,
                    "Missing required raster metadata keys: {}",
                    missing.join(", ")
                )
            }
            CodecError::UnsupportedDataScale { value } => {
                write!(
                    f,
                    "Data scale '{value}' is not one of continuous, categorical, boolean, rgb"
                )
            }
            CodecError::NotImplemented { feature } => {
                write!(f, "Not implemented: {feature}")
            }
            CodecError::UnsupportedDimensionality { ndim } => {
                write!(f, "Only 2-D rasters are supported, got {ndim} dimensions")
            }
            CodecError::FormatError { expected, actual } => write!(
                f,
                "Body element count mismatch: declared shape implies {expected} elements, file holds {actual}"
            ),
            CodecError::MaterializationFailure { path, cause } => {
                write!(f, "Failed to materialize raster at '{path}': {cause}")
            }
            CodecError::ExternalFailure { tool, exit_status } => {
                write!(f, "Tool '{tool}' exited with status {exit_status}")
            }
            CodecError::UnsupportedDatasetForArgument { argument } => {
                write!(
                    f,
                    "Argument '{argument}' does not accept a multi-grid collection; pass a single grid per call"
                )
            }
            CodecError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Other(format!("I/O error: {err}"))
    }
}

/// Result type for terracodec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
