// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Terracodec CLI
//!
//! Command-line tool for Whitebox GAT raster files and tool invocation.
//!
//! ## Usage
//!
//! ```sh
//! # Show a raster's header fields
//! terracodec inspect info DEM.dep
//!
//! # Show value statistics
//! terracodec inspect stats DEM.dep
//!
//! # Cache tool schemas from the executable's help output
//! terracodec schema refresh tools.json Slope Hillshade
//!
//! # Run a tool
//! terracodec run Slope dem=DEM.dep output=slope.dep zfactor=1.0
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{InspectCmd, RunCmd, SchemaCmd};
use common::Result;

/// Terracodec - raster interchange toolkit
///
/// Work with Whitebox GAT header/body raster pairs and run analysis tools
/// against in-memory or on-disk grids.
#[derive(Parser, Clone)]
#[command(name = "terracodec")]
#[command(about = "Raster interchange toolkit for the WhiteboxTools analysis engine", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Inspect raster files (header fields, value statistics)
    #[command(subcommand)]
    Inspect(InspectCmd),

    /// Schema cache operations (list, show, refresh)
    #[command(subcommand)]
    Schema(SchemaCmd),

    /// Run an analysis tool with marshalled arguments
    Run(RunCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(cmd) => cmd.run(),
        Commands::Schema(cmd) => cmd.run(),
        Commands::Run(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
