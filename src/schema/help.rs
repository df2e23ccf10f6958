// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Tool-help scraping.
//!
//! The external executable documents each tool's parameters only in its own
//! `--toolhelp` text. This module turns that text into a [`ToolSchema`]:
//! flag spellings and help strings from the `Parameters:` section, the
//! one-line description, and a synthesized `--wd` working-directory
//! parameter every tool accepts.

use regex::Regex;

use crate::schema::cache::{ToolParameter, ToolSchema};

/// Parse a tool's help text into its parameter schema.
pub fn parse_tool_help(tool: &str, help_text: &str) -> ToolSchema {
    // One or two dashes followed by a letter; the table's "----" separator
    // rows do not match.
    let flag_re = Regex::new(r"^-{1,2}[A-Za-z][A-Za-z0-9_]*$").expect("static flag pattern");

    let mut schema = ToolSchema::new(tool);
    let mut in_params = false;
    let mut in_examples = false;

    for raw_line in help_text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("Description:") {
            schema.description = rest.trim().to_string();
            continue;
        }
        let lower = line.to_lowercase();
        if lower.contains("parameters:") {
            in_params = true;
            continue;
        }
        if lower.contains("example usage") || line.starts_with(">>") {
            in_examples = true;
            continue;
        }
        if !in_params || in_examples {
            continue;
        }

        // The parameter table separates flags from help with punctuation and
        // whitespace; strip the separators and split.
        let cleaned: String = line
            .chars()
            .map(|c| if matches!(c, ',' | '=' | '>' | '.') { ' ' } else { c })
            .collect();
        let mut flags = Vec::new();
        let mut help_words = Vec::new();
        for token in cleaned.split_whitespace() {
            if flag_re.is_match(token) {
                flags.push(token.to_string());
            } else if !token.starts_with('-') {
                help_words.push(token);
            }
        }
        if flags.is_empty() {
            continue;
        }
        // Short-only spellings imply the canonical long names.
        if flags == ["-i"] {
            flags.push("--input".to_string());
        } else if flags == ["-o"] {
            flags.push("--output".to_string());
        }
        schema
            .parameters
            .push(ToolParameter::new(flags, help_words.join(" ")));
    }

    if !schema.has_parameter("wd") {
        schema.parameters.push(ToolParameter::new(
            vec!["--wd".to_string()],
            "Working directory",
        ));
    }
    schema
}
