// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Temp-directory workspace for materialized rasters.
//!
//! Temp file names carry a random uuid token; that token is the only
//! mechanism keeping concurrent callers from colliding in the shared temp
//! directory, so names must never fall back to a counter.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::core::error::{CodecError, Result};

/// Environment variable naming the temp directory.
pub const TEMP_DIR_ENV: &str = "WHITEBOX_TEMP_DIR";

/// Directory used when the environment does not name one.
const DEFAULT_DIR_NAME: &str = ".terracodec_tmp";

/// Process-wide temp directory for transient raster pairs.
#[derive(Debug, Clone)]
pub struct Workspace {
    temp_dir: PathBuf,
}

impl Workspace {
    /// Use (and create if absent) the given temp directory.
    pub fn new(temp_dir: impl Into<PathBuf>) -> Result<Self> {
        let temp_dir = temp_dir.into();
        fs::create_dir_all(&temp_dir).map_err(|e| {
            CodecError::materialization(temp_dir.display().to_string(), e.to_string())
        })?;
        Ok(Self { temp_dir })
    }

    /// Resolve the temp directory from the environment.
    ///
    /// `WHITEBOX_TEMP_DIR` wins when set; otherwise a dot-directory under the
    /// user's home is used. Fails when the directory cannot be created.
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = std::env::var_os(TEMP_DIR_ENV) {
            return Self::new(PathBuf::from(dir));
        }
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .ok_or_else(|| {
                CodecError::Other(format!(
                    "no home directory found; set {TEMP_DIR_ENV} to a writable directory"
                ))
            })?;
        Self::new(PathBuf::from(home).join(DEFAULT_DIR_NAME))
    }

    /// The temp directory.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Reserve a unique extension-less base path for a tagged temp raster.
    ///
    /// The header/body pair lands at `<base>.dep` / `<base>.tas`.
    pub fn temp_base(&self, tag: &str) -> PathBuf {
        self.temp_dir
            .join(format!("{}_{}", sanitize_tag(tag), Uuid::new_v4().simple()))
    }
}

/// Keep tags filesystem-safe without losing their readability.
fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
