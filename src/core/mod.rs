// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout terracodec.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Comprehensive error handling
//! - [`ArgValue`] - Unified tool-argument value representation

pub mod error;
pub mod value;

pub use error::{CodecError, Result};
pub use value::{ArgValue, GridSet};
