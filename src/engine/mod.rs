// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! External analysis-engine wrapper.
//!
//! The [`Engine`] locates and runs the WhiteboxTools executable: one blocking
//! process per call, stdout streamed line by line through a caller-supplied
//! callback. Exit status 0 means success, 1 means error, 2 means the callback
//! cancelled the run. The engine knows nothing about rasters; marshalling
//! happens before and after it.

pub mod progress;

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::core::error::{CodecError, Result};
use crate::core::value::ArgValue;
use crate::marshal::marshaller::{Marshaller, ToolOutput};
use crate::schema::cache::{SchemaCache, ToolSchema};
use crate::schema::help::parse_tool_help;

pub use progress::{classify_line, OutputLine};

/// Environment variable naming the executable's build directory.
pub const BUILD_DIR_ENV: &str = "WHITEBOX_TOOLS_BUILD";

/// Path fragments leading to the executable inside a build or install tree.
const BUILD_PATH_PARTS: [&str; 4] = ["share", "whitebox_tools", "release", "whitebox_tools"];

/// Exit status reported when the callback cancels a run.
pub const CANCELLED_STATUS: i32 = 2;

/// Handle to the external analysis executable.
#[derive(Debug, Clone)]
pub struct Engine {
    exe_path: PathBuf,
    verbose: bool,
}

impl Engine {
    /// Wrap an executable at an explicit path.
    pub fn new(exe_path: impl Into<PathBuf>) -> Result<Self> {
        let exe_path = exe_path.into();
        if !exe_path.exists() {
            return Err(CodecError::Other(format!(
                "executable not found at '{}'; set {BUILD_DIR_ENV} or pass an explicit path",
                exe_path.display()
            )));
        }
        Ok(Self {
            exe_path,
            verbose: true,
        })
    }

    /// Locate the executable from the environment.
    ///
    /// Checks `WHITEBOX_TOOLS_BUILD` (walking the standard build-tree
    /// suffixes) and then a conda prefix install.
    pub fn discover() -> Result<Self> {
        if let Some(build_dir) = std::env::var_os(BUILD_DIR_ENV) {
            let build_dir = PathBuf::from(build_dir);
            for idx in 0..BUILD_PATH_PARTS.len() {
                let mut guess = build_dir.clone();
                for part in &BUILD_PATH_PARTS[idx..] {
                    guess.push(part);
                }
                if cfg!(windows) {
                    guess.set_extension("exe");
                }
                if guess.exists() {
                    return Self::new(guess);
                }
            }
        }
        if let Some(prefix) = std::env::var_os("CONDA_PREFIX") {
            let mut guess = PathBuf::from(prefix);
            for part in &BUILD_PATH_PARTS {
                guess.push(part);
            }
            if cfg!(windows) {
                guess.set_extension("exe");
            }
            if guess.exists() {
                return Self::new(guess);
            }
        }
        Err(CodecError::Other(format!(
            "could not locate the analysis executable; set {BUILD_DIR_ENV}"
        )))
    }

    /// The executable path.
    pub fn exe_path(&self) -> &Path {
        &self.exe_path
    }

    /// Set whether runs pass `-v` to the tool.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Run one tool with pre-serialized argument tokens.
    ///
    /// Each output line is classified and handed to `on_line`; returning
    /// `false` terminates the process and reports [`CANCELLED_STATUS`].
    pub fn run_tool<F>(&self, tool: &str, tokens: &[String], mut on_line: F) -> Result<i32>
    where
        F: FnMut(&OutputLine) -> bool,
    {
        let mut command = Command::new(&self.exe_path);
        command.arg(format!("--run=\"{tool}\""));
        command.args(tokens);
        if self.verbose {
            command.arg("-v");
        }
        if let Some(dir) = self.exe_path.parent() {
            command.current_dir(dir);
        }
        debug!(tool, ?tokens, "spawning analysis tool");

        // Tools report everything on stdout; stderr passes through so a
        // crash message is never silently swallowed behind a full pipe.
        let mut child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| CodecError::Other(format!("failed to spawn '{tool}': {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CodecError::Other("child stdout unavailable".to_string()))?;
        let mut cancelled = false;
        for line in BufReader::new(stdout).lines() {
            let line = line.map_err(|e| CodecError::Other(format!("read from tool: {e}")))?;
            let classified = classify_line(&line);
            if !on_line(&classified) {
                child.kill().ok();
                cancelled = true;
                break;
            }
        }

        let status = child
            .wait()
            .map_err(|e| CodecError::Other(format!("wait for '{tool}': {e}")))?;
        if cancelled {
            return Ok(CANCELLED_STATUS);
        }
        Ok(status.code().unwrap_or(1))
    }

    /// Prepare, run, and finalize a tool invocation in one call.
    ///
    /// Output lines are forwarded to `tracing`; use [`Engine::run_tool`] with
    /// an explicit callback for interactive progress display.
    pub fn invoke(
        &self,
        marshaller: &Marshaller,
        tool: &str,
        args: Vec<(String, ArgValue)>,
    ) -> Result<ToolOutput> {
        let prepared = marshaller.prepare(tool, args)?;
        let status = self.run_tool(tool, &prepared.tokens, |line| {
            match line {
                OutputLine::Error(msg) => tracing::warn!(tool, "{msg}"),
                OutputLine::Progress { label, percent } => {
                    tracing::debug!(tool, label = %label, percent = *percent, "progress")
                }
                OutputLine::ElapsedTime(t) => tracing::debug!(tool, elapsed = %t, "finished"),
                OutputLine::Plain(msg) => tracing::debug!(tool, "{msg}"),
            }
            true
        })?;
        marshaller.finalize(prepared.pending, status)
    }

    /// Retrieve the executable's top-level help text.
    pub fn help(&self) -> Result<String> {
        self.run_capture(&["-h"])
    }

    /// Retrieve license information.
    pub fn license(&self) -> Result<String> {
        self.run_capture(&["--license"])
    }

    /// Retrieve version information.
    pub fn version(&self) -> Result<String> {
        self.run_capture(&["--version"])
    }

    /// Retrieve the help text for one tool.
    pub fn tool_help(&self, tool: &str) -> Result<String> {
        let flag = format!("--toolhelp={tool}");
        self.run_capture(&[flag.as_str()])
    }

    /// List the tools the executable offers.
    pub fn list_tools(&self) -> Result<Vec<String>> {
        let text = self.run_capture(&["--listtools"])?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string())
            .collect())
    }

    /// Scrape one tool's parameter schema from its help text.
    pub fn discover_schema(&self, tool: &str) -> Result<ToolSchema> {
        let help = self.tool_help(tool)?;
        Ok(parse_tool_help(tool, &help))
    }

    /// Build a schema cache for a set of tools.
    pub fn build_schema_cache<S: AsRef<str>>(&self, tools: &[S]) -> Result<SchemaCache> {
        let mut cache = SchemaCache::new();
        for tool in tools {
            cache.insert(self.discover_schema(tool.as_ref())?);
        }
        Ok(cache)
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.exe_path)
            .args(args)
            .output()
            .map_err(|e| CodecError::Other(format!("failed to run executable: {e}")))?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        }
        Ok(text)
    }
}
