//! End-to-end merge tests over a temporary source tree
//!
//! Builds small multi-file C++ projects on disk, runs the full pipeline
//! through `Merger`, and checks the merged document byte for byte.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use unifile_core::{Config, Error};
use unifile_merge::Merger;

fn write_project(temp: &TempDir, files: &[(&str, &str)]) {
    for (name, source) in files {
        fs::write(temp.path().join(name), source).unwrap();
    }
}

fn config(temp: &TempDir, main: &str, extras: &[&str]) -> Config {
    let mut config = Config::new(main);
    config.work_dir = Some(temp.path().to_path_buf());
    config.extra_files = extras.iter().map(PathBuf::from).collect();
    config
}

#[test]
fn test_merge_orders_and_compacts() {
    let temp = TempDir::new().unwrap();
    write_project(
        &temp,
        &[
            (
                "main.cpp",
                "#include <iostream>\n#include \"a.h\"\n\nint main() {\n    greet(); // say hi\n    return 0;\n}\n",
            ),
            (
                "a.cpp",
                "#include \"a.h\"\n\nvoid greet() {\n    std::cout << msg() << std::endl;\n}\n",
            ),
            (
                "a.h",
                "#include <iostream>\n#include \"b.h\"\nvoid greet();\n",
            ),
            ("b.h", "#include <string>\nstd::string msg();\n"),
        ],
    );

    let job = config(&temp, "main.cpp", &["a.cpp", "a.h", "b.h"])
        .resolve()
        .unwrap();
    let report = Merger::new(job.clone()).run().unwrap();

    let document = fs::read_to_string(&job.output).unwrap();
    assert_eq!(
        document,
        "#include <string>\nstd::string msg();\n\
         #include \"b.h\"\nvoid greet();\n\
         #include \"a.h\"\nvoid greet() {std::cout << msg() << std::endl;}\n\
         #include <iostream>\n#include \"a.h\"\nint main() {greet();return 0;}"
    );

    // The main file's <iostream> won deduplication; a.h's copy is gone
    assert_eq!(document.matches("#include <iostream>").count(), 1);

    let emitted: Vec<_> = report
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(emitted, vec!["b.h", "a.h", "a.cpp", "main.cpp"]);
    assert_eq!(report.bytes_written, document.len());
}

#[test]
fn test_standard_header_appears_once_globally() {
    let temp = TempDir::new().unwrap();
    write_project(
        &temp,
        &[
            ("main.cpp", "#include <vector>\nint main() { return 0; }\n"),
            ("a.h", "#include <vector>\nint a();\n"),
            ("b.h", "#include <vector>\nint b();\n"),
        ],
    );

    let job = config(&temp, "main.cpp", &["a.h", "b.h"]).resolve().unwrap();
    Merger::new(job.clone()).run().unwrap();

    let document = fs::read_to_string(&job.output).unwrap();
    assert_eq!(document.matches("#include <vector>").count(), 1);
}

#[test]
fn test_unresolved_include_fails_without_output() {
    let temp = TempDir::new().unwrap();
    write_project(
        &temp,
        &[("main.cpp", "#include \"missing.h\"\nint main() {}\n")],
    );

    let job = config(&temp, "main.cpp", &[]).resolve().unwrap();
    let err = Merger::new(job.clone()).run().unwrap_err();

    match err {
        Error::UnresolvedInclude { line, target, .. } => {
            assert_eq!(line, 1);
            assert_eq!(target, "missing.h");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!job.output.exists());
}

#[test]
fn test_cycle_fails_without_output() {
    let temp = TempDir::new().unwrap();
    write_project(
        &temp,
        &[
            ("main.cpp", "int main() {}\n"),
            ("a.h", "#include \"b.h\"\n"),
            ("b.h", "#include \"a.h\"\n"),
        ],
    );

    let job = config(&temp, "main.cpp", &["a.h", "b.h"]).resolve().unwrap();
    let err = Merger::new(job.clone()).run().unwrap_err();
    assert!(matches!(err, Error::DependencyCycle(_)));
    assert!(!job.output.exists());
}

#[test]
fn test_no_compress_keeps_text_and_still_orders() {
    let temp = TempDir::new().unwrap();
    write_project(
        &temp,
        &[
            (
                "main.cpp",
                "#include <vector>\n#include \"a.h\"\n// main comment\nint main() { return 0; }\n",
            ),
            ("a.h", "#include <vector>\nint a(); // helper\n"),
        ],
    );

    let mut config = config(&temp, "main.cpp", &["a.h"]);
    config.compress = false;
    let job = config.resolve().unwrap();
    Merger::new(job.clone()).run().unwrap();

    let document = fs::read_to_string(&job.output).unwrap();
    // Comments survive, the duplicate <vector> does not
    assert!(document.contains("// main comment"));
    assert!(document.contains("// helper"));
    assert_eq!(document.matches("#include <vector>").count(), 1);
    // a.h is emitted before main.cpp
    let a_pos = document.find("int a();").unwrap();
    let main_pos = document.find("int main()").unwrap();
    assert!(a_pos < main_pos);
}

#[test]
fn test_default_output_beside_working_directory() {
    let temp = TempDir::new().unwrap();
    write_project(&temp, &[("solve.cpp", "int main() { return 0; }\n")]);

    let job = config(&temp, "solve.cpp", &[]).resolve().unwrap();
    Merger::new(job.clone()).run().unwrap();

    assert_eq!(
        job.output.file_name().unwrap().to_string_lossy(),
        "solve.output.cpp"
    );
    assert!(job.output.exists());
}

#[test]
fn test_single_file_merge_is_minimal() {
    let temp = TempDir::new().unwrap();
    write_project(
        &temp,
        &[("main.cpp", "#include <cstdio>\nint main() { return 0; }\n")],
    );

    let job = config(&temp, "main.cpp", &[]).resolve().unwrap();
    Merger::new(job.clone()).run().unwrap();

    let document = fs::read_to_string(&job.output).unwrap();
    assert_eq!(document, "#include <cstdio>\nint main() { return 0; }");
}
