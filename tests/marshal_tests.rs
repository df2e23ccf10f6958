// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Marshalling integration tests.
//!
//! Tests cover:
//! - Argument classification determinism through the public API
//! - Materializing grids and collections into temp header/body pairs
//! - Token serialization for scalars, paths, and flags
//! - The finalize phase: output loading, invocation records, temp cleanup

use std::fs;
use std::path::PathBuf;

use ndarray::array;

use terracodec::codec::{body_path_for, write_pair};
use terracodec::core::{ArgValue, GridSet};
use terracodec::grid::attrs::AttrValue;
use terracodec::grid::{Attributes, Grid, GridData};
use terracodec::marshal::{Marshaller, ToolOutput, Workspace};
use terracodec::schema::{parse_tool_help, ArgKind, Classifier, SchemaCache};
use terracodec::CodecError;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Get a temporary directory for test files
fn temp_dir(tag: &str) -> PathBuf {
    let random = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    std::env::temp_dir().join(format!(
        "terracodec_marshal_{tag}_{}_{}",
        std::process::id(),
        random
    ))
}

/// Cleanup guard for test temporary files
struct CleanupGuard(PathBuf);

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn test_marshaller(tag: &str) -> (Marshaller, CleanupGuard) {
    let dir = temp_dir(tag);
    let workspace = Workspace::new(&dir).expect("workspace");
    (Marshaller::new(workspace), CleanupGuard(dir))
}

fn complete_attrs() -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("min", AttrValue::Float(1.0));
    attrs.insert("max", AttrValue::Float(4.0));
    attrs.insert("north", AttrValue::Float(1.0));
    attrs.insert("south", AttrValue::Float(0.0));
    attrs.insert("east", AttrValue::Float(-1.0));
    attrs.insert("west", AttrValue::Float(1.0));
    attrs.insert("cols", AttrValue::Int(2));
    attrs.insert("rows", AttrValue::Int(2));
    attrs.insert("z_units", AttrValue::Text("METERS".to_string()));
    attrs.insert("xy_units", AttrValue::Text("METERS".to_string()));
    attrs.insert("data_scale", AttrValue::Text("CONTINUOUS".to_string()));
    attrs
}

fn sample_grid() -> Grid {
    Grid::new(
        GridData::Float(array![[1.0f32, 2.0], [3.0, 4.0]]),
        complete_attrs(),
    )
}

const SLOPE_HELP: &str = "\
Description: Calculates slope gradient from a DEM.
Parameters:
-i, --input, --dem Input raster DEM file.
-o, --output       Output raster file.
--zfactor          Optional multiplier for vertical units.
";

fn slope_schemas() -> SchemaCache {
    let mut cache = SchemaCache::new();
    cache.insert(parse_tool_help("Slope", SLOPE_HELP));
    cache
}

// ============================================================================
// Classification Determinism
// ============================================================================

#[test]
fn test_classification_determinism() {
    let classifier = Classifier::default();
    assert_eq!(
        classifier.classify("D8FlowAccumulation", "out_type"),
        ArgKind::Scalar
    );
    assert_eq!(
        classifier.classify("D8FlowAccumulation", "out_accum"),
        ArgKind::OutputRaster
    );
    assert_eq!(classifier.classify("Slope", "output"), ArgKind::OutputRaster);
    assert_eq!(classifier.classify("Slope", "no_such_name"), ArgKind::Scalar);
}

// ============================================================================
// Prepare Phase
// ============================================================================

#[test]
fn test_prepare_materializes_single_grid() {
    let (marshaller, _guard) = test_marshaller("single");
    let args = vec![("dem".to_string(), ArgValue::from(sample_grid()))];
    let prepared = marshaller.prepare("Slope", args).expect("prepare");

    let temps = prepared.pending.temp_inputs();
    assert_eq!(temps.len(), 2, "one header + one body");
    assert!(temps.iter().all(|p| p.exists()));

    let dem_token = prepared
        .tokens
        .iter()
        .find(|t| t.starts_with("--dem="))
        .expect("dem token");
    assert!(dem_token.ends_with(".dep\""));
}

#[test]
fn test_prepare_collection_joins_with_comma_space() {
    let (marshaller, _guard) = test_marshaller("collection");
    let mut set = GridSet::new();
    set.insert("raster_a".to_string(), sample_grid());
    set.insert("raster_b".to_string(), sample_grid());
    let args = vec![("inputs".to_string(), ArgValue::Collection(set))];
    let prepared = marshaller.prepare("AverageOverlay", args).expect("prepare");

    assert_eq!(prepared.pending.temp_inputs().len(), 4);
    let token = prepared
        .tokens
        .iter()
        .find(|t| t.starts_with("--inputs="))
        .expect("inputs token");
    assert!(token.contains(", "), "members joined comma-space: {token}");
    assert!(token.contains("raster_a_"));
    assert!(token.contains("raster_b_"));
}

#[test]
fn test_prepare_rejects_collection_on_single_only_argument() {
    let (marshaller, _guard) = test_marshaller("single_only");
    let mut set = GridSet::new();
    set.insert("a".to_string(), sample_grid());
    let args = vec![("dem".to_string(), ArgValue::Collection(set))];
    let err = marshaller.prepare("Slope", args).unwrap_err();
    match err {
        CodecError::UnsupportedDatasetForArgument { argument } => {
            assert_eq!(argument, "dem");
        }
        other => panic!("expected UnsupportedDatasetForArgument, got {other:?}"),
    }
}

#[test]
fn test_prepare_scalar_and_flag_tokens() {
    let (marshaller, _guard) = test_marshaller("scalars");
    let args = vec![
        ("zfactor".to_string(), ArgValue::Number(1.5)),
        ("clip".to_string(), ArgValue::Bool(true)),
        ("quiet".to_string(), ArgValue::Bool(false)),
        ("units".to_string(), ArgValue::Text("degrees".to_string())),
    ];
    let prepared = marshaller.prepare("Slope", args).expect("prepare");

    assert!(prepared.tokens.contains(&"--zfactor=1.5".to_string()));
    assert!(prepared.tokens.contains(&"--clip".to_string()));
    assert!(prepared.tokens.contains(&"--units=\"degrees\"".to_string()));
    assert!(!prepared.tokens.iter().any(|t| t.contains("quiet")));
}

#[test]
fn test_prepare_appends_working_directory() {
    let (marshaller, _guard) = test_marshaller("wd");
    let marshaller = marshaller.with_working_dir("/srv/jobs");
    let prepared = marshaller.prepare("Slope", Vec::new()).expect("prepare");
    assert!(prepared.tokens.contains(&"--wd=\"/srv/jobs\"".to_string()));

    // An explicit wd suppresses the synthesized one.
    let args = vec![("wd".to_string(), ArgValue::Path("/data".to_string()))];
    let prepared = marshaller.prepare("Slope", args).expect("prepare");
    let wd_tokens: Vec<&String> = prepared
        .tokens
        .iter()
        .filter(|t| t.starts_with("--wd="))
        .collect();
    assert_eq!(wd_tokens, vec![&"--wd=\"/data\"".to_string()]);
}

#[test]
fn test_prepare_absolutizes_path_inputs() {
    let (marshaller, _guard) = test_marshaller("paths");
    let args = vec![(
        "dem".to_string(),
        ArgValue::Path("relative/DEM.dep".to_string()),
    )];
    let prepared = marshaller.prepare("Slope", args).expect("prepare");
    let token = prepared
        .tokens
        .iter()
        .find(|t| t.starts_with("--dem="))
        .expect("dem token");
    let cwd = std::env::current_dir().unwrap();
    assert!(token.contains(&cwd.display().to_string()));
}

#[test]
fn test_prepare_accepts_semicolon_path_lists() {
    let (marshaller, _guard) = test_marshaller("semicolon");
    let args = vec![(
        "inputs".to_string(),
        ArgValue::Path("/data/a.dep;/data/b.dep".to_string()),
    )];
    let prepared = marshaller.prepare("AverageOverlay", args).expect("prepare");
    let token = prepared
        .tokens
        .iter()
        .find(|t| t.starts_with("--inputs="))
        .expect("inputs token");
    // Legacy semicolon input re-emits with the canonical delimiter.
    assert_eq!(token, "--inputs=\"/data/a.dep, /data/b.dep\"");
}

#[test]
fn test_prepare_synthesizes_declared_output() {
    let (marshaller, _guard) = test_marshaller("synth");
    let marshaller = marshaller.with_schemas(slope_schemas());
    let args = vec![("dem".to_string(), ArgValue::from(sample_grid()))];
    let prepared = marshaller.prepare("Slope", args).expect("prepare");

    let outputs = prepared.pending.outputs();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].name, "output");
    assert!(outputs[0].transient);
    assert!(prepared
        .tokens
        .iter()
        .any(|t| t.starts_with("--output=\"") && t.contains(".dep")));
}

// ============================================================================
// Finalize Phase
// ============================================================================

#[test]
fn test_finalize_success_loads_output_and_cleans_temps() {
    let (marshaller, _guard) = test_marshaller("finalize_ok");
    let out_dir = temp_dir("finalize_ok_out");
    fs::create_dir_all(&out_dir).unwrap();
    let _out_guard = CleanupGuard(out_dir.clone());
    let out_path = out_dir.join("slope_result.dep");

    let args = vec![
        ("dem".to_string(), ArgValue::from(sample_grid())),
        (
            "output".to_string(),
            ArgValue::Path(out_path.display().to_string()),
        ),
    ];
    let prepared = marshaller.prepare("Slope", args).expect("prepare");
    let temps: Vec<PathBuf> = prepared.pending.temp_inputs().to_vec();
    assert!(temps.iter().all(|p| p.exists()));

    // Stand in for the external tool: write the declared output.
    write_pair(&sample_grid(), &out_path.with_extension("")).expect("simulated tool output");

    let outcome = marshaller.finalize(prepared.pending, 0).expect("finalize");
    let grid = match outcome {
        ToolOutput::Single(grid) => *grid,
        other => panic!("expected a single grid, got {other:?}"),
    };

    let invocation = grid.invocation().expect("invocation record attached");
    assert_eq!(invocation.tool, "Slope");
    assert_eq!(invocation.exit_status, 0);
    assert!(invocation.arguments.iter().any(|t| t.starts_with("--dem=")));

    // Exactly the materialized temp pairs are gone.
    assert!(temps.iter().all(|p| !p.exists()));
    // A caller-specified output path is not transient; it stays.
    assert!(out_path.exists());
}

#[test]
fn test_finalize_removes_transient_outputs_after_load() {
    let (marshaller, _guard) = test_marshaller("finalize_transient");
    let marshaller = marshaller.with_schemas(slope_schemas());
    let args = vec![("dem".to_string(), ArgValue::from(sample_grid()))];
    let prepared = marshaller.prepare("Slope", args).expect("prepare");

    let out_path = prepared.pending.outputs()[0].path.clone();
    write_pair(&sample_grid(), &out_path.with_extension("")).expect("simulated tool output");
    assert!(out_path.exists());

    let outcome = marshaller.finalize(prepared.pending, 0).expect("finalize");
    assert!(matches!(outcome, ToolOutput::Single(_)));
    assert!(!out_path.exists(), "synthesized output pair removed");
    assert!(!body_path_for(&out_path).exists());
}

#[test]
fn test_finalize_multiple_outputs() {
    let (marshaller, _guard) = test_marshaller("finalize_multi");
    let out_dir = temp_dir("finalize_multi_out");
    fs::create_dir_all(&out_dir).unwrap();
    let _out_guard = CleanupGuard(out_dir.clone());
    let accum = out_dir.join("accum.dep");
    let pntr = out_dir.join("pntr.dep");

    let args = vec![
        ("dem".to_string(), ArgValue::from(sample_grid())),
        (
            "out_accum".to_string(),
            ArgValue::Path(accum.display().to_string()),
        ),
        (
            "out_pntr".to_string(),
            ArgValue::Path(pntr.display().to_string()),
        ),
    ];
    let prepared = marshaller
        .prepare("D8FlowAccumulation", args)
        .expect("prepare");

    write_pair(&sample_grid(), &accum.with_extension("")).unwrap();
    write_pair(&sample_grid(), &pntr.with_extension("")).unwrap();

    let outcome = marshaller.finalize(prepared.pending, 0).expect("finalize");
    match outcome {
        ToolOutput::Multiple(grids) => {
            assert_eq!(grids.len(), 2);
            assert!(grids.contains_key("out_accum"));
            assert!(grids.contains_key("out_pntr"));
        }
        other => panic!("expected multiple outputs, got {other:?}"),
    }
}

#[test]
fn test_finalize_failure_cleans_temps_without_raising() {
    let (marshaller, _guard) = test_marshaller("finalize_fail");
    let args = vec![
        ("dem".to_string(), ArgValue::from(sample_grid())),
        ("output".to_string(), ArgValue::Path("/tmp/never.dep".to_string())),
    ];
    let prepared = marshaller.prepare("Slope", args).expect("prepare");
    let temps: Vec<PathBuf> = prepared.pending.temp_inputs().to_vec();

    let outcome = marshaller.finalize(prepared.pending, 1).expect("finalize");
    assert_eq!(
        outcome,
        ToolOutput::Failure {
            tool: "Slope".to_string(),
            exit_status: 1,
        }
    );
    assert!(temps.iter().all(|p| !p.exists()), "temps cleaned on failure");

    let err = outcome.into_result().unwrap_err();
    match err {
        CodecError::ExternalFailure { tool, exit_status } => {
            assert_eq!(tool, "Slope");
            assert_eq!(exit_status, 1);
        }
        other => panic!("expected ExternalFailure, got {other:?}"),
    }
}

#[test]
fn test_finalize_missing_output_propagates_but_cleans() {
    let (marshaller, _guard) = test_marshaller("finalize_missing");
    let args = vec![
        ("dem".to_string(), ArgValue::from(sample_grid())),
        (
            "output".to_string(),
            ArgValue::Path("/tmp/terracodec_not_written.dep".to_string()),
        ),
    ];
    let prepared = marshaller.prepare("Slope", args).expect("prepare");
    let temps: Vec<PathBuf> = prepared.pending.temp_inputs().to_vec();

    // The "tool" exits zero but never wrote its output.
    let err = marshaller.finalize(prepared.pending, 0).unwrap_err();
    assert!(matches!(err, CodecError::MaterializationFailure { .. }));
    assert!(temps.iter().all(|p| !p.exists()), "temps cleaned on error");
}

#[test]
fn test_finalize_applies_nodata_substitution() {
    let (marshaller, _guard) = test_marshaller("finalize_nodata");
    let out_dir = temp_dir("finalize_nodata_out");
    fs::create_dir_all(&out_dir).unwrap();
    let _out_guard = CleanupGuard(out_dir.clone());
    let out_path = out_dir.join("classified.dep");

    let args = vec![(
        "output".to_string(),
        ArgValue::Path(out_path.display().to_string()),
    )];
    let prepared = marshaller.prepare("Watershed", args).expect("prepare");

    let mut attrs = complete_attrs();
    attrs.insert("data_scale", AttrValue::Text("categorical".to_string()));
    attrs.insert("nodata", AttrValue::Float(-9999.0));
    let output_grid = Grid::new(GridData::Integer(array![[1i16, -9999], [3, 4]]), attrs);
    write_pair(&output_grid, &out_path.with_extension("")).unwrap();

    let grid = marshaller
        .finalize(prepared.pending, 0)
        .expect("finalize")
        .into_single()
        .expect("single output");
    match grid.data() {
        GridData::Float(a) => assert!(a[(0, 1)].is_nan()),
        GridData::Integer(_) => panic!("nodata substitution must upcast"),
    }
}

#[test]
fn test_finalize_no_outputs_reports_status() {
    let (marshaller, _guard) = test_marshaller("finalize_none");
    let args = vec![("zfactor".to_string(), ArgValue::Number(2.0))];
    let prepared = marshaller.prepare("Slope", args).expect("prepare");
    let outcome = marshaller.finalize(prepared.pending, 0).expect("finalize");
    assert_eq!(outcome, ToolOutput::None { exit_status: 0 });
}
