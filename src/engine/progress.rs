// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Classification of the external tool's streamed output lines.
//!
//! Tools report progress as "<label> NN%" lines interleaved with plain log
//! text, error lines, and a final elapsed-time line. Classifying them lets a
//! caller redraw progress in place instead of scrolling.

/// One classified line of tool output.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    /// A progress report: label plus percentage complete
    Progress {
        /// What the tool is doing
        label: String,
        /// Percent complete, 0-100
        percent: u32,
    },
    /// A line the tool flags as an error
    Error(String),
    /// The final elapsed-time report (value with units)
    ElapsedTime(String),
    /// Anything else
    Plain(String),
}

/// Classify a line of tool output.
pub fn classify_line(line: &str) -> OutputLine {
    let trimmed = line.trim();
    if trimmed.contains('%') {
        if let Some(last) = trimmed.split_whitespace().last() {
            if let Ok(percent) = last.trim_end_matches('%').parse::<u32>() {
                let label = trimmed
                    .strip_suffix(last)
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                return OutputLine::Progress { label, percent };
            }
        }
    }
    let lower = trimmed.to_lowercase();
    if lower.contains("error") {
        return OutputLine::Error(trimmed.to_string());
    }
    if lower.starts_with("elapsed time (excluding i/o):") {
        let value = trimmed
            .splitn(2, ':')
            .nth(1)
            .map(str::trim)
            .unwrap_or_default();
        return OutputLine::ElapsedTime(value.to_string());
    }
    OutputLine::Plain(trimmed.to_string())
}
