// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Immutable tool-schema lookup, with JSON persistence.
//!
//! A [`SchemaCache`] maps tool names to their declared parameter tables. It
//! is built once (from the external tool's own help output, or from a cached
//! JSON file) and then passed read-only into the marshaller. There is no
//! global registry; the cache is an explicitly constructed value.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{CodecError, Result};

/// One declared parameter of a tool: its flag spellings and help text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Flag spellings as scraped ("-i", "--input")
    pub flags: Vec<String>,
    /// Help text for the parameter
    pub help: String,
}

impl ToolParameter {
    /// Create a parameter from flag spellings and help text.
    pub fn new(flags: Vec<String>, help: impl Into<String>) -> Self {
        Self {
            flags,
            help: help.into(),
        }
    }

    /// The bare argument name: the first long flag without its dashes,
    /// falling back to the first flag of any kind.
    pub fn name(&self) -> Option<&str> {
        self.flags
            .iter()
            .find(|f| f.starts_with("--"))
            .map(|f| f.trim_start_matches('-'))
            .or_else(|| self.flags.first().map(|f| f.trim_start_matches('-')))
            .filter(|n| !n.is_empty())
    }
}

/// Declared parameter table for one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name as the external executable knows it
    pub name: String,
    /// One-line tool description, when the help text carried one
    pub description: String,
    /// Declared parameters in help order
    pub parameters: Vec<ToolParameter>,
}

impl ToolSchema {
    /// Create an empty schema for a tool.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameters: Vec::new(),
        }
    }

    /// Bare argument names in declaration order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter_map(ToolParameter::name)
            .collect()
    }

    /// Check whether the tool declares an argument by bare name.
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameter_names().iter().any(|n| *n == name)
    }
}

/// Lookup table from tool name to its declared parameters.
///
/// Tool names compare case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCache {
    tools: HashMap<String, ToolSchema>,
}

impl SchemaCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tool schema, keyed by its lower-cased name.
    pub fn insert(&mut self, schema: ToolSchema) {
        self.tools.insert(schema.name.to_lowercase(), schema);
    }

    /// Look up a tool schema.
    pub fn get(&self, tool: &str) -> Option<&ToolSchema> {
        self.tools.get(&tool.to_lowercase())
    }

    /// Check whether a tool is cached.
    pub fn contains(&self, tool: &str) -> bool {
        self.get(tool).is_some()
    }

    /// All cached tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.values().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of cached tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Parse a cache from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CodecError::parse("schema cache", format!("invalid JSON: {e}")))
    }

    /// Serialize the cache to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CodecError::Other(format!("schema cache serialization failed: {e}")))
    }

    /// Load a cache from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| CodecError::materialization(path.display().to_string(), e.to_string()))?;
        Self::from_json(&json)
    }

    /// Save the cache to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json)
            .map_err(|e| CodecError::materialization(path.display().to_string(), e.to_string()))
    }
}
