// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Text header codec for the Whitebox GAT `.dep` format.
//!
//! A header is an ordered sequence of `Key: Value` lines. Keys are title-cased
//! on disk and lower-snake-cased internally; `Cols`/`Rows`/`Stacks` parse as
//! integers, the bounds and display range parse as floats, `Data Type` and
//! `Byte Order` are kept verbatim, and every other value is upper-cased.
//! Repeated `Metadata Entry` lines accumulate newline-joined instead of
//! overwriting each other.

use crate::core::error::{CodecError, Result};
use crate::grid::attrs::{canonical_key, AttrValue, Attributes, METADATA_KEY};

/// Integer-typed header fields, by canonical key.
const INT_FIELDS: [&str; 3] = ["cols", "rows", "stacks"];

/// Float-typed header fields, by canonical key.
const FLOAT_FIELDS: [&str; 8] = [
    "min",
    "max",
    "north",
    "south",
    "east",
    "west",
    "display_min",
    "display_max",
];

/// Fields whose values are kept verbatim rather than upper-cased.
const VERBATIM_FIELDS: [&str; 2] = ["dtype", "byte_order"];

/// Canonical on-disk field order, by canonical key. Metadata entries follow.
const FIELD_ORDER: [&str; 20] = [
    "min",
    "max",
    "north",
    "south",
    "east",
    "west",
    "cols",
    "rows",
    "stacks",
    "dtype",
    "z_units",
    "xy_units",
    "projection",
    "data_scale",
    "display_min",
    "display_max",
    "preferred_palette",
    "palette_nonlinearity",
    "nodata",
    "byte_order",
];

/// On-disk spelling of a canonical key ("dtype" -> "Data Type",
/// "xy_units" -> "Xy Units").
fn disk_key(canonical: &str) -> String {
    if canonical == "dtype" {
        return "Data Type".to_string();
    }
    canonical
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode header text into an attribute map.
///
/// Blank lines and lines whose value is empty are skipped, so an encoded
/// header's empty-string defaults do not invent attribute keys on the way
/// back in. A non-blank line without a `:` separator, or a typed field whose
/// value does not parse, fails with [`CodecError::ParseError`].
pub fn decode(text: &str) -> Result<Attributes> {
    let mut attrs = Attributes::new();
    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let (key_part, value_part) = line
            .split_once(':')
            .ok_or_else(|| CodecError::parse(line, "line lacks a ':' separator"))?;
        let canonical = canonical_key(key_part.trim());
        let value = value_part.trim();
        if value.is_empty() {
            continue;
        }

        let parsed = if INT_FIELDS.contains(&canonical.as_str()) {
            let v: i64 = value
                .parse()
                .map_err(|_| CodecError::parse(line, "expected an integer value"))?;
            AttrValue::Int(v)
        } else if FLOAT_FIELDS.contains(&canonical.as_str()) {
            let v: f64 = value
                .parse()
                .map_err(|_| CodecError::parse(line, "expected a numeric value"))?;
            AttrValue::Float(v)
        } else if VERBATIM_FIELDS.contains(&canonical.as_str()) {
            AttrValue::Text(value.to_string())
        } else {
            AttrValue::Text(value.to_uppercase())
        };

        if canonical == METADATA_KEY {
            attrs.append_metadata(&parsed.to_string());
        } else {
            attrs.insert(&canonical, parsed);
        }
    }
    Ok(attrs)
}

/// Encode an attribute map as header text.
///
/// Every field of the canonical order is written, empty-valued when absent.
/// A multi-line `metadata_entry` value expands into one `Metadata Entry`
/// line per newline-delimited segment.
pub fn encode(attrs: &Attributes) -> String {
    let mut lines = Vec::with_capacity(FIELD_ORDER.len() + 1);
    for canonical in FIELD_ORDER {
        let value = attrs
            .get(canonical)
            .map(|v| v.to_string())
            .unwrap_or_default();
        lines.push(format!("{}: {}", disk_key(canonical), value));
    }
    if let Some(AttrValue::Text(meta)) = attrs.get(METADATA_KEY) {
        for segment in meta.split('\n') {
            if !segment.is_empty() {
                lines.push(format!("Metadata Entry: {segment}"));
            }
        }
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
