//! Dependency ordering
//!
//! Converts the reliance lists of the declared files into a total
//! emission order: every file appears after all files it relies on.
//! Kahn's algorithm with a min-heap on declaration index, so mutually
//! independent files keep their declaration order and the main file
//! (declared last) sorts last among ties. Cycles are detected and
//! reported instead of looping.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;
use unifile_core::{Error, Result};

use crate::unit::SourceUnit;

/// Compute the emission order over `units` (declaration order, main file
/// last). Returns indices into `units`.
///
/// Every unit must already be normalized so its reliance list is
/// available; reliances naming paths outside `units` are ignored here
/// (normalization already validated them against the declared set).
pub fn resolve_order(units: &[SourceUnit]) -> Result<Vec<usize>> {
    let index_of: HashMap<_, _> = units
        .iter()
        .enumerate()
        .map(|(i, unit)| (unit.path(), i))
        .collect();

    let mut indegree = vec![0usize; units.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); units.len()];

    for (i, unit) in units.iter().enumerate() {
        // Duplicate reliance entries stay on the record but count once
        let mut seen = Vec::new();
        for reliance in unit.reliances() {
            if let Some(&dep) = index_of.get(reliance.as_path()) {
                if !seen.contains(&dep) {
                    seen.push(dep);
                    dependents[dep].push(i);
                    indegree[i] += 1;
                }
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &deg)| deg == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(units.len());
    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        for &dependent in &dependents[i] {
            indegree[dependent] -= 1;
            if indegree[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    if order.len() < units.len() {
        let mut stuck: Vec<_> = (0..units.len())
            .filter(|i| !order.contains(i))
            .map(|i| units[i].path().to_path_buf())
            .collect();
        stuck.sort();
        return Err(Error::DependencyCycle(stuck));
    }

    debug!(files = order.len(), "resolved emission order");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::DeclaredFiles;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use unifile_core::HeaderRegistry;

    /// Build normalized units from (name, source) pairs inside one
    /// directory, declared in the given order.
    fn build_units(files: &[(&str, &str)]) -> (TempDir, Vec<SourceUnit>) {
        let temp = TempDir::new().unwrap();
        for (name, source) in files {
            fs::write(temp.path().join(name), source).unwrap();
        }

        let paths: Vec<PathBuf> = files
            .iter()
            .map(|(name, _)| temp.path().join(name).canonicalize().unwrap())
            .collect();
        let declared = DeclaredFiles::new(paths.clone());

        let mut registry = HeaderRegistry::new();
        let mut units = Vec::new();
        for path in &paths {
            let mut unit = SourceUnit::load(path).unwrap();
            unit.normalize(&declared, &mut registry, true).unwrap();
            units.push(unit);
        }
        (temp, units)
    }

    fn names(units: &[SourceUnit], order: &[usize]) -> Vec<String> {
        order
            .iter()
            .map(|&i| {
                units[i]
                    .path()
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn test_reliance_emitted_first() {
        // A relies on B; main includes A; expected order B, A, main
        let (_temp, units) = build_units(&[
            ("a.h", "#include \"b.h\"\nint a();"),
            ("b.h", "int b();"),
            ("main.cpp", "#include \"a.h\"\nint main() {}"),
        ]);
        let order = resolve_order(&units).unwrap();
        assert_eq!(names(&units, &order), vec!["b.h", "a.h", "main.cpp"]);
    }

    #[test]
    fn test_independent_files_keep_declaration_order() {
        let (_temp, units) = build_units(&[
            ("x.h", "int x();"),
            ("y.h", "int y();"),
            ("main.cpp", "int main() {}"),
        ]);
        let order = resolve_order(&units).unwrap();
        assert_eq!(names(&units, &order), vec!["x.h", "y.h", "main.cpp"]);
    }

    #[test]
    fn test_deep_chain() {
        let (_temp, units) = build_units(&[
            ("c.h", "#include \"b.h\""),
            ("b.h", "#include \"a.h\""),
            ("a.h", "int a();"),
            ("main.cpp", "#include \"c.h\"\nint main() {}"),
        ]);
        let order = resolve_order(&units).unwrap();
        assert_eq!(names(&units, &order), vec!["a.h", "b.h", "c.h", "main.cpp"]);
    }

    #[test]
    fn test_cycle_is_detected() {
        let (_temp, units) = build_units(&[
            ("a.h", "#include \"b.h\""),
            ("b.h", "#include \"a.h\""),
            ("main.cpp", "int main() {}"),
        ]);
        let err = resolve_order(&units).unwrap_err();
        match err {
            Error::DependencyCycle(paths) => {
                assert_eq!(paths.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_reliances_count_once() {
        let (_temp, units) = build_units(&[
            ("a.h", "#include \"b.h\"\n#include \"b.h\""),
            ("b.h", "int b();"),
            ("main.cpp", "int main() {}"),
        ]);
        assert_eq!(units[0].reliances().len(), 2);
        let order = resolve_order(&units).unwrap();
        assert_eq!(names(&units, &order), vec!["b.h", "a.h", "main.cpp"]);
    }

    #[test]
    fn test_extra_may_rely_on_main() {
        // The main file participates in the graph; an extra including it
        // is ordered after it.
        let (_temp, units) = build_units(&[
            ("tail.cpp", "#include \"main.cpp\""),
            ("main.cpp", "int main() {}"),
        ]);
        let order = resolve_order(&units).unwrap();
        assert_eq!(names(&units, &order), vec!["main.cpp", "tail.cpp"]);
    }
}
