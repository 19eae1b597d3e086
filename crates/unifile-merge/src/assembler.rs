//! Output assembly
//!
//! Concatenates the normalized texts in resolved order into one
//! document, with a single separator between consecutive files. The
//! document is built fully in memory and written in one step, so a
//! failing run never leaves partial output behind.

use std::path::Path;

use tracing::info;
use unifile_core::Result;

use crate::unit::SourceUnit;

/// Concatenate normalized texts following `order` (indices into `units`)
pub fn assemble(units: &[SourceUnit], order: &[usize]) -> String {
    let mut document = String::new();
    for (nth, &i) in order.iter().enumerate() {
        if nth > 0 {
            document.push('\n');
        }
        if let Some(normalized) = units[i].normalized() {
            document.push_str(&normalized.text);
        }
    }
    document
}

/// Write the assembled document to its destination
pub fn write_output(path: &Path, document: &str) -> Result<()> {
    std::fs::write(path, document)?;
    info!(output = %path.display(), bytes = document.len(), "wrote merged output");
    Ok(())
}
