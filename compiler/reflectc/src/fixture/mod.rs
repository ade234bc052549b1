//! Fixture discovery.
//!
//! A fixture is a `X_test.kt` file, optionally paired with a sibling
//! `X_test_expected.kt` that lists what the pass should synthesize.

mod harness;

pub use harness::{run_fixture, run_fixtures, run_source, FixtureError, FixtureReport};

use std::fs;
use std::path::{Path, PathBuf};

const INPUT_SUFFIX: &str = "_test.kt";
const EXPECTED_SUFFIX: &str = "_test_expected.kt";

/// A discovered fixture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fixture {
    /// Path of the input, relative to the discovery root when known.
    pub name: String,
    pub input: PathBuf,
    pub expected: Option<PathBuf>,
}

impl Fixture {
    /// The fixture for `input`, picking up its expected file if present.
    pub fn at(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let name = input.display().to_string();
        let expected = expected_path(&input).filter(|path| path.is_file());
        Fixture {
            name,
            input,
            expected,
        }
    }
}

/// `foo_test.kt` → `foo_test_expected.kt`.
fn expected_path(input: &Path) -> Option<PathBuf> {
    let file = input.file_name()?.to_str()?;
    let stem = file.strip_suffix(INPUT_SUFFIX)?;
    Some(input.with_file_name(format!("{stem}{EXPECTED_SUFFIX}")))
}

fn is_input(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(INPUT_SUFFIX))
}

/// Every fixture under `root`, sorted by path.
///
/// A single input file is accepted as well.
pub fn discover_fixtures(root: &Path) -> Vec<Fixture> {
    if root.is_file() {
        return if is_input(root) {
            vec![Fixture::at(root)]
        } else {
            Vec::new()
        };
    }

    let mut inputs = Vec::new();
    discover_recursive(root, &mut inputs);
    inputs.sort();
    inputs
        .into_iter()
        .map(|input| {
            let mut fixture = Fixture::at(&input);
            if let Ok(relative) = input.strip_prefix(root) {
                fixture.name = relative.display().to_string();
            }
            fixture
        })
        .collect()
}

fn discover_recursive(dir: &Path, inputs: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'))
        {
            continue;
        }
        if path.is_dir() {
            discover_recursive(&path, inputs);
        } else if is_input(&path) {
            inputs.push(path);
        }
    }
}
