//! Unifile Merge Engine
//!
//! Merges a main C-family source file and its declared extra files into
//! a single compilation unit, ordered so that every file follows the
//! files it includes.
//!
//! ## Modules
//!
//! - `normalizer` - per-file line-state machine (compaction + include extraction)
//! - `unit` - file processing records with cached normalization
//! - `resolver` - dependency ordering (Kahn's algorithm)
//! - `assembler` - concatenation and output writing
//! - `quickstrip` - secondary whole-file regex comment stripper

pub mod assembler;
pub mod normalizer;
pub mod quickstrip;
pub mod resolver;
pub mod unit;

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};
use unifile_core::{HeaderRegistry, ResolvedJob, Result};

use normalizer::DeclaredFiles;
use unit::SourceUnit;

/// Summary of a completed merge, in emission order
#[derive(Debug, Serialize)]
pub struct MergeReport {
    pub work_dir: PathBuf,
    pub main_file: PathBuf,
    pub output: PathBuf,
    /// Merged files in emission order with their reliances
    pub files: Vec<FileReport>,
    pub bytes_written: usize,
}

/// One merged file and the declared files it relies on
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub reliances: Vec<PathBuf>,
}

/// Drives a resolved job through normalization, ordering, and assembly
pub struct Merger {
    job: ResolvedJob,
}

impl Merger {
    pub fn new(job: ResolvedJob) -> Self {
        Self { job }
    }

    /// Run the merge: load and normalize every declared file (main first,
    /// then extras in their deterministic order), resolve the emission
    /// order, assemble, and write the output. Nothing is written unless
    /// every step succeeds.
    pub fn run(&self) -> Result<MergeReport> {
        let job = &self.job;
        let mut registry = HeaderRegistry::new();

        let declared = DeclaredFiles::new(
            std::iter::once(job.main_file.clone()).chain(job.extra_files.iter().cloned()),
        );

        // Main is normalized first so its standard includes win
        // deduplication, even though its text is emitted last.
        let mut main_unit = SourceUnit::load(&job.main_file)?;
        main_unit.normalize(&declared, &mut registry, job.compress)?;

        let mut units = Vec::with_capacity(job.extra_files.len() + 1);
        for path in &job.extra_files {
            let mut unit = SourceUnit::load(path)?;
            unit.normalize(&declared, &mut registry, job.compress)?;
            debug!(file = %path.display(), reliances = unit.reliances().len(), "processed");
            units.push(unit);
        }
        // Declared last, so it sorts last among ties
        units.push(main_unit);

        let order = resolver::resolve_order(&units)?;
        let document = assembler::assemble(&units, &order);
        assembler::write_output(&job.output, &document)?;

        info!(
            files = units.len(),
            output = %job.output.display(),
            "merge complete"
        );

        Ok(MergeReport {
            work_dir: job.work_dir.clone(),
            main_file: job.main_file.clone(),
            output: job.output.clone(),
            files: order
                .iter()
                .map(|&i| FileReport {
                    path: units[i].path().to_path_buf(),
                    reliances: units[i].reliances().to_vec(),
                })
                .collect(),
            bytes_written: document.len(),
        })
    }
}
