// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Table-driven argument classification.
//!
//! The marshaller must know, for each named argument of an operation, whether
//! it denotes an input raster, an output raster, or a scalar token. This is
//! decided by lookup tables rather than value introspection: the same word
//! can be a raster in one operation and a numeric threshold in another, so a
//! per-operation override map is consulted before the global defaults.

use std::collections::{HashMap, HashSet};

/// Role of a named argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// The argument receives a raster the tool reads
    InputRaster,
    /// The argument names a raster destination the tool writes
    OutputRaster,
    /// The argument is a scalar/pass-through command-line token
    Scalar,
}

/// Argument names that denote input rasters by default.
pub const DEFAULT_INPUT_ARGS: [&str; 32] = [
    "input",
    "inputs",
    "i",
    "pour_pts",
    "d8_pntr",
    "dem",
    "input1",
    "input2",
    "input3",
    "i1",
    "i2",
    "i3",
    "input_x",
    "input_y",
    "streams",
    "flow_accum",
    "sca",
    "nir",
    "red",
    "blue",
    "green",
    "pan",
    "destination",
    "base",
    "seed_pts",
    "source",
    "cost",
    "slope",
    "flow_dir",
    "comparison",
    "linkid",
    "watersheds",
];

/// Argument names that denote output rasters by exact match. Names with an
/// `out_` prefix are also outputs, except `out_type`, which selects an
/// output's semantic kind and stays scalar.
pub const DEFAULT_OUTPUT_ARGS: [&str; 3] = ["output", "outputs", "o"];

/// Input arguments that accept only a single grid, never a collection.
pub const DEFAULT_SINGLE_ONLY_ARGS: [&str; 2] = ["input", "dem"];

/// Two-level classification table: global defaults plus per-operation
/// overrides.
#[derive(Debug, Clone)]
pub struct Classifier {
    input_names: HashSet<String>,
    output_names: HashSet<String>,
    single_only: HashSet<String>,
    overrides: HashMap<String, HashMap<String, ArgKind>>,
}

impl Default for Classifier {
    fn default() -> Self {
        let mut classifier = Self {
            input_names: DEFAULT_INPUT_ARGS.iter().map(|s| s.to_string()).collect(),
            output_names: DEFAULT_OUTPUT_ARGS.iter().map(|s| s.to_string()).collect(),
            single_only: DEFAULT_SINGLE_ONLY_ARGS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            overrides: HashMap::new(),
        };
        // "slope" is a raster for the cost/terrain operations in the default
        // input list, but a numeric tolerance for RemoveOffTerrainObjects.
        classifier.add_override("RemoveOffTerrainObjects", "slope", ArgKind::Scalar);
        classifier
    }
}

impl Classifier {
    /// Create a classifier with empty tables.
    pub fn empty() -> Self {
        Self {
            input_names: HashSet::new(),
            output_names: HashSet::new(),
            single_only: HashSet::new(),
            overrides: HashMap::new(),
        }
    }

    /// Classify an argument name for an operation.
    ///
    /// Per-operation overrides win over the global tables; then the output
    /// rules (exact set membership, or the `out_` prefix minus `out_type`);
    /// then the input allow-list; everything else is scalar.
    pub fn classify(&self, tool: &str, name: &str) -> ArgKind {
        if let Some(kind) = self
            .overrides
            .get(&tool.to_lowercase())
            .and_then(|per_op| per_op.get(name))
        {
            return *kind;
        }
        if self.is_output_name(name) {
            return ArgKind::OutputRaster;
        }
        if self.input_names.contains(name) {
            return ArgKind::InputRaster;
        }
        ArgKind::Scalar
    }

    /// Check the output rules alone.
    pub fn is_output_name(&self, name: &str) -> bool {
        self.output_names.contains(name) || (name.starts_with("out_") && name != "out_type")
    }

    /// Whether an input argument accepts a grid collection.
    pub fn supports_collection(&self, name: &str) -> bool {
        !self.single_only.contains(name)
    }

    /// Add a name to the global input allow-list.
    pub fn add_input_name(&mut self, name: impl Into<String>) {
        self.input_names.insert(name.into());
    }

    /// Add a name to the global output set.
    pub fn add_output_name(&mut self, name: impl Into<String>) {
        self.output_names.insert(name.into());
    }

    /// Mark an input argument as single-grid-only.
    pub fn add_single_only(&mut self, name: impl Into<String>) {
        self.single_only.insert(name.into());
    }

    /// Add a per-operation override. Tool names compare case-insensitively.
    pub fn add_override(&mut self, tool: impl Into<String>, name: impl Into<String>, kind: ArgKind) {
        self.overrides
            .entry(tool.into().to_lowercase())
            .or_default()
            .insert(name.into(), kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_exact_names() {
        let c = Classifier::default();
        assert_eq!(c.classify("Slope", "output"), ArgKind::OutputRaster);
        assert_eq!(c.classify("Slope", "outputs"), ArgKind::OutputRaster);
        assert_eq!(c.classify("Slope", "o"), ArgKind::OutputRaster);
    }

    #[test]
    fn test_out_prefix_rule() {
        let c = Classifier::default();
        assert_eq!(c.classify("D8FlowAccumulation", "out_accum"), ArgKind::OutputRaster);
        // out_type selects an output kind; it is a scalar, never a raster.
        assert_eq!(c.classify("D8FlowAccumulation", "out_type"), ArgKind::Scalar);
    }

    #[test]
    fn test_input_allow_list() {
        let c = Classifier::default();
        assert_eq!(c.classify("Hillshade", "dem"), ArgKind::InputRaster);
        assert_eq!(c.classify("Watershed", "pour_pts"), ArgKind::InputRaster);
        assert_eq!(c.classify("CostDistance", "cost"), ArgKind::InputRaster);
    }

    #[test]
    fn test_unknown_name_is_scalar() {
        let c = Classifier::default();
        assert_eq!(c.classify("Hillshade", "azimuth"), ArgKind::Scalar);
        assert_eq!(c.classify("Hillshade", "zfactor"), ArgKind::Scalar);
    }

    #[test]
    fn test_per_operation_override() {
        let c = Classifier::default();
        // Globally a raster, but a tolerance for this one operation.
        assert_eq!(c.classify("CostDistance", "slope"), ArgKind::InputRaster);
        assert_eq!(
            c.classify("RemoveOffTerrainObjects", "slope"),
            ArgKind::Scalar
        );
        assert_eq!(
            c.classify("removeoffterrainobjects", "slope"),
            ArgKind::Scalar
        );
    }

    #[test]
    fn test_override_can_force_raster() {
        let mut c = Classifier::default();
        c.add_override("CustomTool", "threshold", ArgKind::InputRaster);
        assert_eq!(c.classify("CustomTool", "threshold"), ArgKind::InputRaster);
        assert_eq!(c.classify("OtherTool", "threshold"), ArgKind::Scalar);
    }

    #[test]
    fn test_single_only_set() {
        let c = Classifier::default();
        assert!(!c.supports_collection("input"));
        assert!(!c.supports_collection("dem"));
        assert!(c.supports_collection("inputs"));
    }
}
