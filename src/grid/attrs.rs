// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Header attribute map and schema validation.
//!
//! Attributes carry the typed key/value pairs of a raster header: ordered,
//! case-insensitive lookup, a distinguished multi-valued `metadata_entry`
//! field, and a normalizer that validates a map against the required and
//! optional field sets before encoding.

use crate::core::error::{CodecError, Result};
use crate::grid::raster::{DataType, Grid, GridData};

/// Attribute keys that must be present after normalization.
pub const REQUIRED_FIELDS: [&str; 12] = [
    "max",
    "min",
    "north",
    "south",
    "east",
    "west",
    "cols",
    "rows",
    "dtype",
    "z_units",
    "xy_units",
    "data_scale",
];

/// Attribute keys that default to an empty string when absent.
pub const OPTIONAL_FIELDS: [&str; 8] = [
    "display_min",
    "display_max",
    "metadata_entry",
    "projection",
    "preferred_palette",
    "palette_nonlinearity",
    "byte_order",
    "nodata",
];

/// The multi-valued attribute key: repeated header lines accumulate here.
pub const METADATA_KEY: &str = "metadata_entry";

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Integer field (Cols, Rows, Stacks)
    Int(i64),
    /// Floating-point field (bounds, display range)
    Float(f64),
    /// Everything else
    Text(String),
}

impl AttrValue {
    /// Value as i64, widening or parsing where the content allows it.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            AttrValue::Float(_) => None,
            AttrValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Value as f64, widening or parsing where the content allows it.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            AttrValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Text content, for text values only.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

/// Canonical internal form of an attribute key: lower-case with whitespace
/// collapsed to underscores. The on-disk `Data Type` field is known
/// internally as `dtype`.
pub fn canonical_key(key: &str) -> String {
    let joined = key
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    if joined == "data_type" {
        "dtype".to_string()
    } else {
        joined
    }
}

/// Ordered attribute map with case-insensitive key lookup.
///
/// Keys are stored in canonical lower-snake form; insertion order is
/// preserved so a decoded header re-encodes its fields predictably.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    /// Create an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by key, case-insensitively.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        let canonical = canonical_key(key);
        self.entries
            .iter()
            .find(|(k, _)| *k == canonical)
            .map(|(_, v)| v)
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Look up a value as i64.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttrValue::as_i64)
    }

    /// Look up a value as f64. Empty text values yield `None`.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AttrValue::as_f64)
    }

    /// Look up a text value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_str)
    }

    /// Insert or replace a value, preserving the position of a replaced key.
    pub fn insert(&mut self, key: &str, value: AttrValue) {
        let canonical = canonical_key(key);
        match self.entries.iter_mut().find(|(k, _)| *k == canonical) {
            Some((_, v)) => *v = value,
            None => self.entries.push((canonical, value)),
        }
    }

    /// Insert a value only when the key is absent.
    pub fn insert_absent(&mut self, key: &str, value: AttrValue) {
        if !self.contains(key) {
            self.insert(key, value);
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        let canonical = canonical_key(key);
        let idx = self.entries.iter().position(|(k, _)| *k == canonical)?;
        Some(self.entries.remove(idx).1)
    }

    /// Append a metadata segment to the multi-valued `metadata_entry` field.
    ///
    /// Repeated header lines accumulate newline-joined rather than
    /// overwriting each other.
    pub fn append_metadata(&mut self, segment: &str) {
        match self.get(METADATA_KEY) {
            Some(AttrValue::Text(existing)) if !existing.is_empty() => {
                let joined = format!("{existing}\n{segment}");
                self.insert(METADATA_KEY, AttrValue::Text(joined));
            }
            _ => self.insert(METADATA_KEY, AttrValue::Text(segment.to_string())),
        }
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// Semantic scale of a raster's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataScale {
    /// Continuous measurements (elevation, slope, ...)
    Continuous,
    /// Categorical class labels
    Categorical,
    /// Boolean masks
    Boolean,
    /// RGB-encoded imagery; recognized but deliberately unsupported
    Rgb,
}

impl DataScale {
    /// Parse from string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "continuous" => Some(DataScale::Continuous),
            "categorical" => Some(DataScale::Categorical),
            "boolean" => Some(DataScale::Boolean),
            "rgb" => Some(DataScale::Rgb),
            _ => None,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataScale::Continuous => "continuous",
            DataScale::Categorical => "categorical",
            DataScale::Boolean => "boolean",
            DataScale::Rgb => "rgb",
        }
    }
}

/// Validate and fill an attribute map against the header schema.
///
/// Broadcasts a generic `units` value to `xy_units`/`z_units` when the
/// specific keys are absent, applies the palette fallback cascade, checks the
/// required field set, defaults the optional fields to empty strings, and
/// validates `data_scale`.
///
/// The palette cascade is preserved exactly as observed in the wild: a
/// missing `preferred_palette` sets `palette_nonlinearity` to the palette
/// file name, and only a then-still-missing `palette_nonlinearity` gets the
/// numeric default 1.0.
pub fn normalize(attrs: &Attributes, dtype: DataType) -> Result<Attributes> {
    let mut out = attrs.clone();
    out.insert("dtype", AttrValue::Text(dtype.as_str().to_string()));

    if !out.contains("xy_units") {
        if let Some(units) = out.get("units").cloned() {
            out.insert("xy_units", units);
        }
    }
    if !out.contains("z_units") {
        if let Some(units) = out.get("units").cloned() {
            out.insert("z_units", units);
        }
    }

    if !out.contains("preferred_palette") {
        out.insert(
            "palette_nonlinearity",
            AttrValue::Text("high_relief.pal".to_string()),
        );
    }
    if !out.contains("palette_nonlinearity") {
        out.insert("palette_nonlinearity", AttrValue::Float(1.0));
    }

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|k| !out.contains(k))
        .map(|k| k.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CodecError::missing_metadata(missing));
    }

    for key in OPTIONAL_FIELDS {
        out.insert_absent(key, AttrValue::Text(String::new()));
    }

    let scale_raw = out
        .get("data_scale")
        .map(|v| v.to_string())
        .unwrap_or_default();
    let scale = DataScale::parse(&scale_raw)
        .ok_or_else(|| CodecError::unsupported_data_scale(scale_raw.clone()))?;
    if scale == DataScale::Rgb {
        return Err(CodecError::not_implemented(
            "rgb rasters; serialize manually and run the tool from the command line",
        ));
    }

    Ok(out)
}

/// Defaults used to complete a grid whose attributes are missing header
/// fields.
#[derive(Debug, Clone)]
pub struct AttrDefaults {
    /// Projection description
    pub projection: String,
    /// Semantic value scale
    pub data_scale: DataScale,
    /// Vertical units
    pub z_units: String,
    /// Horizontal units
    pub xy_units: String,
    /// Nodata sentinel written in place of NaN cells
    pub nodata: Option<f64>,
    /// Preferred display palette
    pub palette: String,
    /// Palette nonlinearity exponent
    pub palette_nonlinearity: f64,
}

impl Default for AttrDefaults {
    fn default() -> Self {
        Self {
            projection: "not specified".to_string(),
            data_scale: DataScale::Continuous,
            z_units: "meters".to_string(),
            xy_units: "meters".to_string(),
            nodata: None,
            palette: "high_relief.pal".to_string(),
            palette_nonlinearity: 1.0,
        }
    }
}

impl AttrDefaults {
    /// Fill the absent header fields of a grid from these defaults and from
    /// the grid's own shape, value range, and axes.
    ///
    /// Bounds default to cell units (south 0, north rows, east 0, west cols)
    /// when the grid carries none. Float grids containing NaN require a
    /// nodata sentinel: NaN cells are rewritten to it, and the call fails
    /// with [`CodecError::MissingMetadata`] naming `nodata` when none is
    /// configured.
    pub fn fill(&self, grid: &mut Grid) -> Result<()> {
        let has_nan = match grid.data() {
            GridData::Float(a) => a.iter().any(|v| v.is_nan()),
            GridData::Integer(_) => false,
        };
        match self.nodata {
            None if has_nan => {
                return Err(CodecError::missing_metadata(vec!["nodata".to_string()]))
            }
            Some(sentinel) => {
                if let GridData::Float(a) = grid.data_mut() {
                    a.mapv_inplace(|v| if v.is_nan() { sentinel as f32 } else { v });
                }
            }
            None => {}
        }

        let (rows, cols) = (grid.rows(), grid.cols());
        let range = grid.data().value_range().unwrap_or((0.0, 0.0));
        let dtype = grid.data_type();

        let attrs = grid.attrs_mut();
        attrs.insert_absent("min", AttrValue::Float(range.0));
        attrs.insert_absent("max", AttrValue::Float(range.1));
        attrs.insert_absent("south", AttrValue::Float(0.0));
        attrs.insert_absent("north", AttrValue::Float(rows as f64));
        attrs.insert_absent("east", AttrValue::Float(0.0));
        attrs.insert_absent("west", AttrValue::Float(cols as f64));
        attrs.insert_absent("cols", AttrValue::Int(cols as i64));
        attrs.insert_absent("rows", AttrValue::Int(rows as i64));
        attrs.insert_absent("stacks", AttrValue::Int(1));
        attrs.insert_absent("dtype", AttrValue::Text(dtype.as_str().to_string()));
        attrs.insert_absent("z_units", AttrValue::Text(self.z_units.clone()));
        attrs.insert_absent("xy_units", AttrValue::Text(self.xy_units.clone()));
        attrs.insert_absent("projection", AttrValue::Text(self.projection.clone()));
        attrs.insert_absent(
            "data_scale",
            AttrValue::Text(self.data_scale.as_str().to_string()),
        );
        attrs.insert_absent("preferred_palette", AttrValue::Text(self.palette.clone()));
        attrs.insert_absent(
            "palette_nonlinearity",
            AttrValue::Float(self.palette_nonlinearity),
        );
        if let Some(sentinel) = self.nodata {
            attrs.insert_absent("nodata", AttrValue::Float(sentinel));
        }
        grid.refresh_axes();
        Ok(())
    }
}
