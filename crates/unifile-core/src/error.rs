//! Error types for unifile

use std::path::PathBuf;
use thiserror::Error;

/// Unifile error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{}:{}: include \"{}\" does not resolve to a declared source file", .file.display(), .line, .target)]
    UnresolvedInclude {
        file: PathBuf,
        line: usize,
        target: String,
    },

    #[error("dependency cycle involving: {}", join_paths(.0))]
    DependencyCycle(Vec<PathBuf>),

    #[error("{}: unterminated {} at end of file", .file.display(), .construct)]
    Unterminated {
        file: PathBuf,
        construct: &'static str,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for unifile
pub type Result<T> = std::result::Result<T, Error>;
