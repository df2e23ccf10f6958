// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Run command - invoke an analysis tool with marshalled arguments.

use std::path::PathBuf;

use clap::Args;

use crate::common::Result;
use terracodec::core::ArgValue;
use terracodec::engine::{Engine, OutputLine};
use terracodec::marshal::{Marshaller, ToolOutput, Workspace};
use terracodec::schema::SchemaCache;

/// Run an analysis tool.
///
/// Arguments are given as name=value pairs; values ending in .dep or
/// containing a path separator are treated as raster paths.
#[derive(Args, Clone, Debug)]
pub struct RunCmd {
    /// Tool name (e.g. Slope, Hillshade)
    #[arg(value_name = "TOOL")]
    tool: String,

    /// Tool arguments as name=value pairs; bare names become flags
    #[arg(value_name = "NAME=VALUE")]
    args: Vec<String>,

    /// Schema cache file for output discovery
    #[arg(long, value_name = "CACHE")]
    cache: Option<PathBuf>,

    /// Suppress the tool's own output lines
    #[arg(short, long)]
    quiet: bool,
}

impl RunCmd {
    pub fn run(self) -> Result<()> {
        let mut marshaller = Marshaller::new(Workspace::from_env()?);
        if let Some(cache_path) = &self.cache {
            marshaller = marshaller.with_schemas(SchemaCache::load(cache_path)?);
        }
        let engine = Engine::discover()?;

        let args: Vec<(String, ArgValue)> = self
            .args
            .iter()
            .map(|raw| parse_arg(raw))
            .collect::<Result<_>>()?;

        let prepared = marshaller.prepare(&self.tool, args)?;
        let quiet = self.quiet;
        let status = engine.run_tool(&self.tool, &prepared.tokens, |line| {
            if !quiet {
                match line {
                    OutputLine::Progress { label, percent } => eprintln!("{label} {percent}%"),
                    OutputLine::Error(msg) => eprintln!("ERROR: {msg}"),
                    OutputLine::ElapsedTime(t) => eprintln!("Elapsed time: {t}"),
                    OutputLine::Plain(msg) => eprintln!("{msg}"),
                }
            }
            true
        })?;

        match marshaller.finalize(prepared.pending, status)?.into_result()? {
            ToolOutput::None { .. } => println!("{} completed", self.tool),
            ToolOutput::Single(grid) => {
                println!(
                    "{} completed: {} rows x {} cols",
                    self.tool,
                    grid.rows(),
                    grid.cols()
                );
            }
            ToolOutput::Multiple(grids) => {
                println!("{} completed: {} outputs", self.tool, grids.len());
                for (name, grid) in &grids {
                    println!("  {name}: {} rows x {} cols", grid.rows(), grid.cols());
                }
            }
            ToolOutput::Failure { .. } => unreachable!("converted by into_result"),
        }
        Ok(())
    }
}

/// Parse one name=value pair into an argument binding.
fn parse_arg(raw: &str) -> Result<(String, ArgValue)> {
    let (name, value) = match raw.split_once('=') {
        Some((name, value)) => (name.trim_start_matches('-'), value),
        None => return Ok((raw.trim_start_matches('-').to_string(), ArgValue::Bool(true))),
    };
    if name.is_empty() {
        anyhow::bail!("argument '{raw}' has no name");
    }
    let parsed = if value.eq_ignore_ascii_case("true") {
        ArgValue::Bool(true)
    } else if value.eq_ignore_ascii_case("false") {
        ArgValue::Bool(false)
    } else if let Ok(number) = value.parse::<f64>() {
        ArgValue::Number(number)
    } else if value.ends_with(".dep") || value.contains(std::path::MAIN_SEPARATOR) {
        ArgValue::Path(value.to_string())
    } else {
        ArgValue::Text(value.to_string())
    };
    Ok((name.to_string(), parsed))
}
