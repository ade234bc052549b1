//! One test per `tests/fixtures/**/*_test.kt`, generated by `build.rs`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use reflectc::fixture::{discover_fixtures, run_fixture, Fixture};
use reflectc::PluginConfig;

fn fixture_root() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
}

fn check_fixture(relative: &str) {
    let fixture = Fixture::at(fixture_root().join(relative));
    if let Err(err) = run_fixture(&fixture, &PluginConfig::default()) {
        let details: Vec<String> = err.diagnostics().iter().map(|d| d.to_string()).collect();
        panic!("{relative}: {err}\n{}", details.join("\n"));
    }
}

include!(concat!(env!("OUT_DIR"), "/fixture_tests.rs"));

#[test]
fn every_fixture_directory_has_fixtures() {
    let fixtures = discover_fixtures(fixture_root());
    for dir in ["decorator", "optics", "optics_iterable", "product", "reflect", "sample"] {
        assert!(
            fixtures.iter().any(|f| f.input.starts_with(fixture_root().join(dir))),
            "no fixtures under {dir}"
        );
    }
}

#[test]
fn most_fixtures_carry_expected_output() {
    let fixtures = discover_fixtures(fixture_root());
    let with_expected = fixtures.iter().filter(|f| f.expected.is_some()).count();
    assert!(with_expected * 2 > fixtures.len());
}
