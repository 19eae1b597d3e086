//! File processing records
//!
//! A [`SourceUnit`] holds one declared file's raw text and, once
//! normalization has run, its cached normalized form. Normalization
//! executes at most once per unit; re-invoking it returns the cached
//! result unchanged.

use std::path::{Path, PathBuf};

use unifile_core::{HeaderRegistry, Result};

use crate::normalizer::{self, DeclaredFiles, Normalized};

/// One declared file: canonical path, raw source, cached normalization
#[derive(Debug)]
pub struct SourceUnit {
    path: PathBuf,
    source: String,
    normalized: Option<Normalized>,
}

impl SourceUnit {
    /// Read a declared file; `path` must already be canonical
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            source,
            normalized: None,
        })
    }

    /// Build a unit from in-memory source (used by tests)
    pub fn from_source(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            normalized: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalize this unit, caching the result. The registry is only
    /// consulted on the first call; later calls are no-ops returning the
    /// cached text.
    pub fn normalize(
        &mut self,
        declared: &DeclaredFiles,
        registry: &mut HeaderRegistry,
        compress: bool,
    ) -> Result<&Normalized> {
        if self.normalized.is_none() {
            let normalized =
                normalizer::normalize(&self.path, &self.source, declared, registry, compress)?;
            self.normalized = Some(normalized);
        }
        // Populated just above when absent
        Ok(self
            .normalized
            .as_ref()
            .expect("normalization result cached"))
    }

    /// The cached normalization, if [`Self::normalize`] has run
    pub fn normalized(&self) -> Option<&Normalized> {
        self.normalized.as_ref()
    }

    /// Reliance list of the cached normalization (empty before it runs)
    pub fn reliances(&self) -> &[PathBuf] {
        self.normalized
            .as_ref()
            .map(|n| n.reliances.as_slice())
            .unwrap_or(&[])
    }
}
