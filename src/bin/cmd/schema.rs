// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema command - list, show, and refresh cached tool schemas.

use std::path::PathBuf;

use clap::Subcommand;

use crate::common::Result;
use terracodec::engine::Engine;
use terracodec::schema::SchemaCache;

/// Tool-schema cache operations.
#[derive(Subcommand, Clone, Debug)]
pub enum SchemaCmd {
    /// List the tools in a cache file
    List {
        /// Schema cache file (JSON)
        #[arg(value_name = "CACHE")]
        cache: PathBuf,
    },

    /// Show one tool's parameter table
    Show {
        /// Schema cache file (JSON)
        #[arg(value_name = "CACHE")]
        cache: PathBuf,

        /// Tool name
        #[arg(value_name = "TOOL")]
        tool: String,
    },

    /// Rebuild a cache file by scraping the executable's help output
    Refresh {
        /// Output cache file (JSON)
        #[arg(value_name = "CACHE")]
        cache: PathBuf,

        /// Tools to scrape; all listed tools when omitted
        #[arg(value_name = "TOOL")]
        tools: Vec<String>,
    },
}

impl SchemaCmd {
    pub fn run(self) -> Result<()> {
        match self {
            SchemaCmd::List { cache } => cmd_list(cache),
            SchemaCmd::Show { cache, tool } => cmd_show(cache, tool),
            SchemaCmd::Refresh { cache, tools } => cmd_refresh(cache, tools),
        }
    }
}

/// Cmd: List cached tools
fn cmd_list(cache: PathBuf) -> Result<()> {
    let cache = SchemaCache::load(&cache)?;
    println!("{} cached tool schemas:", cache.len());
    for name in cache.names() {
        let description = cache
            .get(name)
            .map(|s| s.description.as_str())
            .unwrap_or_default();
        if description.is_empty() {
            println!("  {name}");
        } else {
            println!("  {name}: {description}");
        }
    }
    Ok(())
}

/// Cmd: Show one parameter table
fn cmd_show(cache: PathBuf, tool: String) -> Result<()> {
    let cache = SchemaCache::load(&cache)?;
    let schema = cache
        .get(&tool)
        .ok_or_else(|| anyhow::anyhow!("tool '{tool}' is not in the cache"))?;

    println!("=== {} ===", schema.name);
    if !schema.description.is_empty() {
        println!("{}", schema.description);
    }
    println!();
    for param in &schema.parameters {
        println!("{:<28} {}", param.flags.join(", "), param.help);
    }
    Ok(())
}

/// Cmd: Refresh the cache from the executable
fn cmd_refresh(cache_path: PathBuf, tools: Vec<String>) -> Result<()> {
    let engine = Engine::discover()?;
    let tools = if tools.is_empty() {
        engine.list_tools()?
    } else {
        tools
    };
    let cache = engine.build_schema_cache(&tools)?;
    cache.save(&cache_path)?;
    println!(
        "Cached {} tool schemas to {}",
        cache.len(),
        cache_path.display()
    );
    Ok(())
}
