// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show raster header fields, shape, and value statistics.

use std::fs;
use std::path::PathBuf;

use clap::Subcommand;

use crate::common::{format_size, format_timestamp, Result};
use terracodec::codec::{self, body_path_for};
use terracodec::grid::GridData;

/// Inspect raster files.
#[derive(Subcommand, Clone, Debug)]
pub enum InspectCmd {
    /// Show the header fields of a raster
    Info {
        /// Header file (.dep)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Load a raster pair and show value statistics
    Stats {
        /// Header file (.dep)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

impl InspectCmd {
    pub fn run(self) -> Result<()> {
        match self {
            InspectCmd::Info { input } => cmd_info(input),
            InspectCmd::Stats { input } => cmd_stats(input),
        }
    }
}

/// Cmd: Show header fields
fn cmd_info(input: PathBuf) -> Result<()> {
    let text = fs::read_to_string(&input)?;
    let attrs = codec::header::decode(&text)?;

    println!("=== {} ===", input.display());
    if let Ok(meta) = fs::metadata(&input) {
        if let Ok(modified) = meta.modified() {
            println!("Modified: {}", format_timestamp(modified));
        }
    }
    let body = body_path_for(&input);
    match fs::metadata(&body) {
        Ok(meta) => println!("Body: {} ({})", body.display(), format_size(meta.len())),
        Err(_) => println!("Body: {} (missing)", body.display()),
    }
    println!();
    for (key, value) in attrs.iter() {
        println!("{key}: {value}");
    }
    Ok(())
}

/// Cmd: Show value statistics
fn cmd_stats(input: PathBuf) -> Result<()> {
    let mut grid = codec::read_pair(&input, None)?;
    grid.substitute_nodata();

    println!("=== {} ===", input.display());
    println!("Shape: {} rows x {} cols", grid.rows(), grid.cols());
    println!("Data type: {}", grid.data_type());
    match grid.data().value_range() {
        Some((min, max)) => println!("Range: {min} .. {max}"),
        None => println!("Range: (no valid cells)"),
    }
    if let GridData::Float(arr) = grid.data() {
        let missing = arr.iter().filter(|v| v.is_nan()).count();
        if missing > 0 {
            println!("Missing cells: {missing}");
        }
    }
    if let Some(axes) = grid.axes() {
        if let (Some(y0), Some(x0)) = (axes.y.first(), axes.x.first()) {
            println!("Origin cell: ({y0}, {x0})");
        }
    }
    Ok(())
}
