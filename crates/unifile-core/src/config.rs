//! Job configuration and path pretreatment
//!
//! A [`Config`] describes a merge job the way the caller states it
//! (possibly relative paths, optional output). [`Config::resolve`] turns
//! it into a [`ResolvedJob`] with canonical absolute paths, failing fast
//! on anything missing before a single source file is read.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::{Error, Result};

/// File extensions considered C-family sources when scanning a directory
const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx"];

/// Merge job description as provided by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Working directory used to resolve relative paths (default: cwd)
    pub work_dir: Option<PathBuf>,

    /// Main source file (the one containing `main`)
    pub main_file: PathBuf,

    /// Extra source files the merged unit may include
    pub extra_files: Vec<PathBuf>,

    /// Directories to scan for additional extra sources
    pub extra_dirs: Vec<PathBuf>,

    /// Output file (default: `<main-stem>.output.<ext>` in the working directory)
    pub output: Option<PathBuf>,

    /// Whether to compact each file's text while merging
    pub compress: bool,
}

impl Config {
    /// Create a configuration for `main_file` with compression enabled
    pub fn new(main_file: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: None,
            main_file: main_file.into(),
            extra_files: Vec::new(),
            extra_dirs: Vec::new(),
            output: None,
            compress: true,
        }
    }

    /// Validate the configuration and resolve every path to canonical
    /// absolute form.
    ///
    /// Extra files are sorted by canonical path and deduplicated so that
    /// processing order (and with it header deduplication and resolver
    /// tie-breaks) is deterministic regardless of how they were declared.
    pub fn resolve(&self) -> Result<ResolvedJob> {
        let cwd = std::env::current_dir()?;

        let work_dir = match &self.work_dir {
            Some(dir) if !dir.as_os_str().is_empty() => absolute(&cwd, dir),
            _ => cwd.clone(),
        };
        let work_dir = work_dir.canonicalize().map_err(|_| {
            Error::Config(format!(
                "working directory \"{}\" does not exist",
                work_dir.display()
            ))
        })?;

        if self.main_file.as_os_str().is_empty() {
            return Err(Error::Config("main source file path is empty".into()));
        }
        let main_file = absolute(&work_dir, &self.main_file);
        let main_file = main_file.canonicalize().map_err(|_| {
            Error::Config(format!(
                "main source file \"{}\" does not exist (working directory \"{}\")",
                main_file.display(),
                work_dir.display()
            ))
        })?;

        let mut extra_files = Vec::new();
        for extra in &self.extra_files {
            // Empty entries are tolerated and skipped
            if extra.as_os_str().is_empty() {
                continue;
            }
            let path = absolute(&work_dir, extra);
            let path = path.canonicalize().map_err(|_| {
                Error::Config(format!(
                    "extra source file \"{}\" does not exist (working directory \"{}\")",
                    path.display(),
                    work_dir.display()
                ))
            })?;
            extra_files.push(path);
        }
        for dir in &self.extra_dirs {
            let dir = absolute(&work_dir, dir);
            extra_files.extend(collect_sources(&dir)?);
        }

        extra_files.sort();
        extra_files.dedup();
        // The main file is always processed; listing it as an extra would
        // emit it twice.
        extra_files.retain(|path| path != &main_file);

        let output = match &self.output {
            Some(path) if !path.as_os_str().is_empty() => absolute(&work_dir, path),
            _ => default_output(&work_dir, &main_file),
        };

        debug!(
            work_dir = %work_dir.display(),
            main = %main_file.display(),
            extras = extra_files.len(),
            "resolved merge job"
        );

        Ok(ResolvedJob {
            work_dir,
            main_file,
            extra_files,
            output,
            compress: self.compress,
        })
    }
}

/// A fully resolved merge job: every path absolute and canonical, extras
/// sorted, output location decided.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedJob {
    pub work_dir: PathBuf,
    pub main_file: PathBuf,
    pub extra_files: Vec<PathBuf>,
    pub output: PathBuf,
    pub compress: bool,
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Default output path: `<main-stem>.output.<ext>` beside the working
/// directory, keeping the main file's extension.
fn default_output(work_dir: &Path, main_file: &Path) -> PathBuf {
    let stem = main_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".to_string());

    match main_file.extension() {
        Some(ext) => work_dir.join(format!("{}.output.{}", stem, ext.to_string_lossy())),
        None => work_dir.join(format!("{}.output", stem)),
    }
}

/// Collect C-family sources under `dir`, sorted for determinism
fn collect_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::Config(format!(
            "extra source directory \"{}\" does not exist",
            dir.display()
        )));
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry =
            entry.map_err(|e| Error::Config(format!("cannot scan \"{}\": {}", dir.display(), e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .map(|ext| {
                SOURCE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false);
        if matches {
            sources.push(entry.path().canonicalize()?);
        }
    }
    Ok(sources)
}
