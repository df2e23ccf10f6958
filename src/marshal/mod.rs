// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Argument marshalling for external tool invocations.
//!
//! This module turns named argument values into command-line tokens and
//! reconstitutes declared outputs afterwards:
//! - [`Workspace`] - the shared temp directory for materialized rasters
//! - [`Marshaller`] - the two-phase prepare/finalize protocol
//! - [`ToolOutput`] - what an invocation produced

pub mod marshaller;
pub mod workspace;

pub use marshaller::{
    Marshaller, PendingOutput, PendingOutputs, PreparedInvocation, ToolArgs, ToolOutput,
};
pub use workspace::{Workspace, TEMP_DIR_ENV};
