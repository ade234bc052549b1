//! The `fixtures` command: run every fixture under a directory.

use std::path::Path;
use std::time::Instant;

use crate::config::PluginConfig;
use crate::fixture::{discover_fixtures, run_fixtures};

#[derive(Clone, Debug, Default)]
pub struct FixtureSuiteOptions {
    /// Only run fixtures whose name contains this.
    pub filter: Option<String>,
    /// Print what each passing fixture synthesized.
    pub verbose: bool,
}

/// Run the fixtures under `path`, exiting with 1 if any fail.
pub fn run_fixture_suite(path: &str, config: &PluginConfig, options: &FixtureSuiteOptions) {
    let mut fixtures = discover_fixtures(Path::new(path));
    if let Some(filter) = &options.filter {
        fixtures.retain(|fixture| fixture.name.contains(filter.as_str()));
    }
    if fixtures.is_empty() {
        eprintln!("No fixtures found under {path}");
        std::process::exit(1);
    }

    let start = Instant::now();
    let results = run_fixtures(&fixtures, config);
    let mut failures = Vec::new();

    for (fixture, result) in &results {
        match result {
            Ok(report) => {
                println!("fixture {} ... ok", fixture.name);
                if options.verbose {
                    for rendered in &report.synthesized {
                        println!("    {rendered}");
                    }
                }
            }
            Err(err) => {
                println!("fixture {} ... FAILED", fixture.name);
                failures.push((fixture, err));
            }
        }
    }

    if !failures.is_empty() {
        println!();
        println!("failures:");
        for (fixture, err) in &failures {
            println!();
            println!("---- {} ----", fixture.name);
            println!("{err}");
            for diagnostic in err.diagnostics() {
                println!("{diagnostic}");
            }
        }
    }

    let passed = results.len() - failures.len();
    println!();
    println!(
        "fixtures: {passed} passed; {} failed; finished in {:.2}s",
        failures.len(),
        start.elapsed().as_secs_f64()
    );
    if !failures.is_empty() {
        std::process::exit(1);
    }
}
