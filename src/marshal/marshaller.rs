// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Two-phase argument marshalling.
//!
//! [`Marshaller::prepare`] turns named argument values into the flat token
//! list an external tool consumes, materializing in-memory grids to temp
//! header/body pairs and reserving temp destinations for declared outputs.
//! [`Marshaller::finalize`] runs after the tool exits: it reloads the
//! deferred outputs, applies nodata substitution, attaches the invocation
//! record, and deletes every transient file it created.
//!
//! The pending state between the phases is a plain value, not a closure, so
//! the post-invocation step is inspectable and testable on its own.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec;
use crate::core::error::{CodecError, Result};
use crate::core::value::ArgValue;
use crate::grid::raster::{Grid, Invocation};
use crate::marshal::workspace::Workspace;
use crate::schema::cache::SchemaCache;
use crate::schema::classify::{ArgKind, Classifier};

/// Named arguments to one tool invocation, in caller order.
pub type ToolArgs = Vec<(String, ArgValue)>;

/// One deferred output raster: where the external tool will write it.
#[derive(Debug, Clone)]
pub struct PendingOutput {
    /// Argument name the output was declared under
    pub name: String,
    /// Header path reserved for the tool to write
    pub path: PathBuf,
    /// Whether the path was synthesized under the temp dir and should be
    /// deleted after a successful load
    pub transient: bool,
}

/// Everything `finalize` needs after the external process exits.
#[derive(Debug, Clone)]
pub struct PendingOutputs {
    tool: String,
    tokens: Vec<String>,
    outputs: Vec<PendingOutput>,
    temp_inputs: Vec<PathBuf>,
}

impl PendingOutputs {
    /// The tool this invocation targets.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// The deferred outputs.
    pub fn outputs(&self) -> &[PendingOutput] {
        &self.outputs
    }

    /// Temp files created while materializing inputs.
    pub fn temp_inputs(&self) -> &[PathBuf] {
        &self.temp_inputs
    }
}

/// Result of `prepare`: the serialized tokens plus the deferred-output state.
#[derive(Debug, Clone)]
pub struct PreparedInvocation {
    /// Ordered command-line tokens for the external tool
    pub tokens: Vec<String>,
    /// State for the finalize phase
    pub pending: PendingOutputs,
}

/// What an invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Success with no declared raster outputs
    None {
        /// Exit status of the tool (zero)
        exit_status: i32,
    },
    /// Success with exactly one declared output
    Single(Box<Grid>),
    /// Success with several declared outputs, by argument name
    Multiple(BTreeMap<String, Grid>),
    /// The tool exited nonzero; temps were cleaned, nothing was loaded
    Failure {
        /// Tool name
        tool: String,
        /// Nonzero exit status
        exit_status: i32,
    },
}

impl ToolOutput {
    /// Convert a failure outcome into [`CodecError::ExternalFailure`].
    pub fn into_result(self) -> Result<ToolOutput> {
        match self {
            ToolOutput::Failure { tool, exit_status } => {
                Err(CodecError::external(tool, exit_status))
            }
            other => Ok(other),
        }
    }

    /// The single output grid, when there is exactly one.
    pub fn into_single(self) -> Option<Grid> {
        match self {
            ToolOutput::Single(grid) => Some(*grid),
            _ => None,
        }
    }
}

/// Marshals named arguments to command-line tokens and reconstitutes the
/// declared outputs afterwards.
#[derive(Debug, Clone)]
pub struct Marshaller {
    classifier: Classifier,
    schemas: SchemaCache,
    workspace: Workspace,
    working_dir: Option<PathBuf>,
}

impl Marshaller {
    /// Create a marshaller over a temp workspace, with the default
    /// classification tables and an empty schema cache.
    pub fn new(workspace: Workspace) -> Self {
        Self {
            classifier: Classifier::default(),
            schemas: SchemaCache::new(),
            workspace,
            working_dir: None,
        }
    }

    /// Replace the classification tables.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Attach a schema cache; declared-but-unsupplied outputs are then given
    /// synthesized temp destinations.
    pub fn with_schemas(mut self, schemas: SchemaCache) -> Self {
        self.schemas = schemas;
        self
    }

    /// Pin the working directory appended as `--wd` when the caller passes
    /// none. Defaults to the process working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The classification tables in use.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Serialize arguments for one tool invocation.
    ///
    /// Grids are written to uuid-named temp pairs under the workspace,
    /// output destinations are reserved (synthesized when the schema declares
    /// an output the caller left out), paths are absolutized, and scalars
    /// become `--name=value` tokens. A `--wd` token is appended when absent.
    pub fn prepare(&self, tool: &str, args: ToolArgs) -> Result<PreparedInvocation> {
        let mut tokens = Vec::new();
        let mut outputs = Vec::new();
        let mut temp_inputs = Vec::new();
        let mut supplied = Vec::new();
        let mut have_wd = false;

        for (name, value) in args {
            supplied.push(name.clone());
            if name == "wd" {
                have_wd = true;
            }
            match self.classifier.classify(tool, &name) {
                ArgKind::OutputRaster => {
                    self.prepare_output(&name, value, &mut tokens, &mut outputs)?
                }
                ArgKind::InputRaster => {
                    self.prepare_input(tool, &name, value, &mut tokens, &mut temp_inputs)?
                }
                ArgKind::Scalar => serialize_scalar(&name, value, &mut tokens)?,
            }
        }

        // Outputs the schema declares but the caller did not supply get a
        // temp destination so they can still be loaded back.
        if let Some(schema) = self.schemas.get(tool) {
            for pname in schema.parameter_names() {
                if supplied.iter().any(|s| s == pname) {
                    continue;
                }
                if self.classifier.classify(tool, pname) != ArgKind::OutputRaster {
                    continue;
                }
                let path = self
                    .workspace
                    .temp_base(pname)
                    .with_extension(codec::HEADER_EXT);
                debug!(tool, name = pname, path = %path.display(), "reserving temp output");
                tokens.push(format!("--{}=\"{}\"", pname, path.display()));
                outputs.push(PendingOutput {
                    name: pname.to_string(),
                    path,
                    transient: true,
                });
            }
        }

        if !have_wd {
            let wd = match &self.working_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir()?,
            };
            tokens.push(format!("--wd=\"{}\"", wd.display()));
        }

        Ok(PreparedInvocation {
            pending: PendingOutputs {
                tool: tool.to_string(),
                tokens: tokens.clone(),
                outputs,
                temp_inputs,
            },
            tokens,
        })
    }

    /// Complete an invocation given the external tool's exit status.
    ///
    /// On nonzero status the transient inputs are removed and a
    /// [`ToolOutput::Failure`] is returned; the caller decides whether that
    /// is an error ([`ToolOutput::into_result`]). On success every deferred
    /// output is loaded, nodata-substituted, stamped with the invocation
    /// record, and its synthesized temp pair removed. Cleanup failures are
    /// logged and never override the outcome.
    pub fn finalize(&self, pending: PendingOutputs, exit_status: i32) -> Result<ToolOutput> {
        let outcome = if exit_status != 0 {
            Ok(ToolOutput::Failure {
                tool: pending.tool.clone(),
                exit_status,
            })
        } else {
            self.load_outputs(&pending, exit_status)
        };
        remove_files(&pending.temp_inputs);
        outcome
    }

    fn load_outputs(&self, pending: &PendingOutputs, exit_status: i32) -> Result<ToolOutput> {
        let mut grids = BTreeMap::new();
        for output in &pending.outputs {
            let mut grid = codec::read_pair(&output.path, None)?;
            grid.substitute_nodata();
            grid.set_invocation(Invocation {
                tool: pending.tool.clone(),
                arguments: pending.tokens.clone(),
                exit_status,
            });
            grids.insert(output.name.clone(), grid);
            if output.transient {
                remove_files(&[output.path.clone(), codec::body_path_for(&output.path)]);
            }
        }
        Ok(match grids.len() {
            0 => ToolOutput::None { exit_status },
            1 => match grids.into_iter().next() {
                Some((_, grid)) => ToolOutput::Single(Box::new(grid)),
                None => ToolOutput::None { exit_status },
            },
            _ => ToolOutput::Multiple(grids),
        })
    }

    fn prepare_output(
        &self,
        name: &str,
        value: ArgValue,
        tokens: &mut Vec<String>,
        outputs: &mut Vec<PendingOutput>,
    ) -> Result<()> {
        match value {
            ArgValue::Path(p) | ArgValue::Text(p) => {
                let paths = split_paths(&p);
                let absolute: Vec<PathBuf> = paths.iter().map(|p| absolutize(p)).collect();
                for (idx, path) in absolute.iter().enumerate() {
                    let entry_name = if absolute.len() == 1 {
                        name.to_string()
                    } else {
                        format!("{name}.{}", idx + 1)
                    };
                    outputs.push(PendingOutput {
                        name: entry_name,
                        path: path.clone(),
                        transient: false,
                    });
                }
                tokens.push(format!("--{}=\"{}\"", name, join_paths(&absolute)));
                Ok(())
            }
            // A bare `true` asks for a synthesized destination.
            ArgValue::Bool(true) => {
                let path = self
                    .workspace
                    .temp_base(name)
                    .with_extension(codec::HEADER_EXT);
                tokens.push(format!("--{}=\"{}\"", name, path.display()));
                outputs.push(PendingOutput {
                    name: name.to_string(),
                    path,
                    transient: true,
                });
                Ok(())
            }
            other => Err(CodecError::Other(format!(
                "output argument '{name}' expects a destination path, got {}",
                other.kind_name()
            ))),
        }
    }

    fn prepare_input(
        &self,
        tool: &str,
        name: &str,
        value: ArgValue,
        tokens: &mut Vec<String>,
        temp_inputs: &mut Vec<PathBuf>,
    ) -> Result<()> {
        match value {
            ArgValue::Grid(grid) => {
                let base = self.workspace.temp_base(name);
                debug!(tool, name, base = %base.display(), "materializing input grid");
                let (header, body) = codec::write_pair(&grid, &base)?;
                tokens.push(format!("--{}=\"{}\"", name, header.display()));
                temp_inputs.push(header);
                temp_inputs.push(body);
                Ok(())
            }
            ArgValue::Collection(set) => {
                if !self.classifier.supports_collection(name) {
                    return Err(CodecError::unsupported_dataset(name));
                }
                let mut headers = Vec::new();
                for (member, grid) in &set {
                    let base = self.workspace.temp_base(member);
                    let (header, body) = codec::write_pair(grid, &base)?;
                    headers.push(header.clone());
                    temp_inputs.push(header);
                    temp_inputs.push(body);
                }
                tokens.push(format!("--{}=\"{}\"", name, join_paths(&headers)));
                Ok(())
            }
            ArgValue::Path(p) | ArgValue::Text(p) => {
                let absolute: Vec<PathBuf> = split_paths(&p).iter().map(|p| absolutize(p)).collect();
                tokens.push(format!("--{}=\"{}\"", name, join_paths(&absolute)));
                Ok(())
            }
            other => serialize_scalar(name, other, tokens),
        }
    }
}

/// Serialize a scalar argument as a command-line token.
///
/// True booleans become a bare flag and false ones vanish; numbers and
/// numeric-looking text serialize unquoted; everything else is quoted.
fn serialize_scalar(name: &str, value: ArgValue, tokens: &mut Vec<String>) -> Result<()> {
    match value {
        ArgValue::Bool(true) => tokens.push(format!("--{name}")),
        ArgValue::Bool(false) => {}
        ArgValue::Number(v) => tokens.push(format!("--{name}={v}")),
        ArgValue::Text(s) => {
            if s.trim().parse::<f64>().is_ok() {
                tokens.push(format!("--{name}={}", s.trim()));
            } else {
                tokens.push(format!("--{name}=\"{s}\""));
            }
        }
        ArgValue::Path(p) => {
            tokens.push(format!("--{name}=\"{}\"", absolutize(&p).display()));
        }
        other => {
            return Err(CodecError::Other(format!(
                "argument '{name}' is a scalar parameter but received a {}",
                other.kind_name()
            )))
        }
    }
    Ok(())
}

/// Split a multi-path token. Semicolons are a legacy input-only convention;
/// comma-space is canonical on emission.
fn split_paths(s: &str) -> Vec<&str> {
    let parts: Vec<&str> = if s.contains(';') {
        s.split(';').collect()
    } else {
        s.split(", ").collect()
    };
    parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect()
}

/// Join paths with the canonical comma-space delimiter.
fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lexically resolve a path against the process working directory.
fn absolutize(path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(p))
            .unwrap_or_else(|_| p.to_path_buf())
    }
}

/// Best-effort removal; failures are logged, never raised.
fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            if path.exists() {
                warn!(path = %path.display(), error = %e, "failed to remove temp file");
            }
        }
    }
}
