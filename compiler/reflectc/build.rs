//! Build script for reflectc.
//!
//! Generates one `#[test]` per `tests/fixtures/**/*_test.kt`, written to
//! `$OUT_DIR/fixture_tests.rs` and included by `tests/box_fixtures.rs`.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const FIXTURE_DIR: &str = "tests/fixtures";

fn main() -> io::Result<()> {
    let out_dir = std::env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR is not set"))?;

    // Sorted for deterministic output
    let mut fixtures = BTreeSet::new();
    collect_fixtures(Path::new(FIXTURE_DIR), Path::new(FIXTURE_DIR), &mut fixtures);

    let mut generated = String::new();
    for relative in &fixtures {
        let _ = writeln!(generated, "#[test]");
        let _ = writeln!(generated, "fn {}() {{", test_name(relative));
        let _ = writeln!(generated, "    check_fixture({relative:?});");
        let _ = writeln!(generated, "}}");
        let _ = writeln!(generated);
    }
    fs::write(out_dir.join("fixture_tests.rs"), generated)?;

    println!("cargo:rerun-if-changed={FIXTURE_DIR}");
    for relative in &fixtures {
        println!("cargo:rerun-if-changed={FIXTURE_DIR}/{relative}");
    }
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}

/// Recursively collect `*_test.kt` paths relative to `root`, `/`-separated.
fn collect_fixtures(root: &Path, dir: &Path, fixtures: &mut BTreeSet<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            // Directories change when fixtures are added or removed
            println!("cargo:rerun-if-changed={}", path.display());
            collect_fixtures(root, &path, fixtures);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("_test.kt"))
        {
            if let Ok(relative) = path.strip_prefix(root) {
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                fixtures.insert(parts.join("/"));
            }
        }
    }
}

/// `optics_iterable/optics_iterable_test.kt` → `optics_iterable__optics_iterable_test`.
fn test_name(relative: &str) -> String {
    let stem = relative.strip_suffix(".kt").unwrap_or(relative);
    stem.split('/')
        .map(|part| {
            part.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("__")
}
