//! Running fixtures through the pass and the evaluator.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, instrument};

use reflect_diagnostic::Diagnostic;
use reflect_eval::{EvalError, Interpreter};
use reflect_ir::{CompilationUnit, Name, Renderer, StringInterner};

use super::Fixture;
use crate::config::PluginConfig;
use crate::driver::PluginDriver;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{name}` does not parse: {}", first_message(diagnostics))]
    Parse {
        name: String,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("the pass reported errors for `{name}`: {}", first_message(diagnostics))]
    Pass {
        name: String,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("box() failed: {0}")]
    Eval(#[from] EvalError),

    #[error("box() returned `{0}` instead of `OK`")]
    NotOk(String),

    #[error("`{name}` was synthesized but the expected fixture does not declare it\n  actual: {actual}")]
    Unexpected { name: String, actual: String },

    #[error("the expected fixture declares `{name}` but it was not synthesized\n  expected: {expected}")]
    Missing { name: String, expected: String },

    #[error("`{name}` differs from the expected fixture\n  expected: {expected}\n    actual: {actual}")]
    Mismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

impl FixtureError {
    /// Compiler diagnostics behind the failure, if any.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            FixtureError::Parse { diagnostics, .. } | FixtureError::Pass { diagnostics, .. } => {
                diagnostics.clone()
            }
            FixtureError::Eval(err) => vec![err.to_diagnostic()],
            _ => Vec::new(),
        }
    }
}

fn first_message(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "no diagnostics".to_owned(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

/// What a passing fixture did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixtureReport {
    pub name: String,
    /// Rendered synthesized declarations, in generation order.
    pub synthesized: Vec<String>,
    /// How many of them were checked against an expected fixture.
    pub matched: usize,
    /// What `box()` returned, when the fixture has one.
    pub box_result: Option<String>,
    /// Interceptor trace recorded while running `box()`.
    pub trace: Vec<String>,
}

/// Read and run one fixture.
#[instrument(level = "debug", skip_all, fields(fixture = %fixture.name))]
pub fn run_fixture(fixture: &Fixture, config: &PluginConfig) -> Result<FixtureReport, FixtureError> {
    let source = read(&fixture.input)?;
    let expected = fixture.expected.as_deref().map(read).transpose()?;
    run_source(&fixture.name, &source, expected.as_deref(), config)
}

/// Run every fixture, in parallel, keeping discovery order.
pub fn run_fixtures<'f>(
    fixtures: &'f [Fixture],
    config: &PluginConfig,
) -> Vec<(&'f Fixture, Result<FixtureReport, FixtureError>)> {
    fixtures
        .par_iter()
        .map(|fixture| (fixture, run_fixture(fixture, config)))
        .collect()
}

fn read(path: &Path) -> Result<String, FixtureError> {
    fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Run a fixture given as text.
///
/// The pass must succeed without errors. Every synthesized declaration
/// must render exactly like the same-named declaration of `expected`,
/// every top-level declaration of `expected` that the source lacks must
/// have been synthesized, and `box()`, when present, must return `"OK"`.
pub fn run_source(
    name: &str,
    source: &str,
    expected: Option<&str>,
    config: &PluginConfig,
) -> Result<FixtureReport, FixtureError> {
    let interner = StringInterner::new();
    let mut unit = parse(name, source, &interner)?;

    let output = PluginDriver::new(&interner, config.clone()).run(&mut unit);
    if output.has_errors().is_some() {
        return Err(FixtureError::Pass {
            name: name.to_owned(),
            diagnostics: output.diagnostics,
        });
    }

    let source_names: FxHashSet<Name> = unit.decls.top_level().map(|decl| decl.name).collect();
    let renderer = Renderer::new(&interner, &unit.arena);
    let synthesized: Vec<(Name, String)> = output
        .synthesized
        .iter()
        .map(|s| (s.name(), renderer.decl(&s.decl)))
        .collect();

    let mut report = FixtureReport {
        name: name.to_owned(),
        synthesized: synthesized.iter().map(|(_, text)| text.clone()).collect(),
        ..FixtureReport::default()
    };

    if let Some(expected) = expected {
        let expected_unit = parse(&format!("{name} (expected)"), expected, &interner)?;
        report.matched = compare(&synthesized, &source_names, &expected_unit, &interner)?;
    }

    if has_box(&unit) {
        let mut interpreter = Interpreter::new(&unit, &interner);
        let result = interpreter.run_box()?;
        report.trace = interpreter.trace().to_vec();
        debug!(result = %result, "box() returned");
        if result != "OK" {
            return Err(FixtureError::NotOk(result));
        }
        report.box_result = Some(result);
    }
    Ok(report)
}

fn parse(
    name: &str,
    source: &str,
    interner: &StringInterner,
) -> Result<CompilationUnit, FixtureError> {
    let output = reflect_parse::parse(name, source, interner);
    if output.has_errors() {
        return Err(FixtureError::Parse {
            name: name.to_owned(),
            diagnostics: output.diagnostics,
        });
    }
    Ok(output.unit)
}

fn has_box(unit: &CompilationUnit) -> bool {
    unit.decls
        .top_level()
        .any(|decl| decl.is_function() && decl.name == Name::BOX && decl.params.is_empty())
}

/// Match each synthesized declaration against the expected unit by name
/// and rendering, then check that nothing the expected unit adds over the
/// source went missing. Returns how many were matched.
fn compare(
    synthesized: &[(Name, String)],
    source_names: &FxHashSet<Name>,
    expected: &CompilationUnit,
    interner: &StringInterner,
) -> Result<usize, FixtureError> {
    let renderer = Renderer::new(interner, &expected.arena);
    let mut by_name: FxHashMap<Name, Vec<String>> = FxHashMap::default();
    for decl in expected.decls.top_level() {
        by_name.entry(decl.name).or_default().push(renderer.decl(decl));
    }

    for (name, actual) in synthesized {
        match by_name.get(name) {
            None => {
                return Err(FixtureError::Unexpected {
                    name: interner.lookup(*name).to_owned(),
                    actual: actual.clone(),
                })
            }
            Some(candidates) if !candidates.contains(actual) => {
                return Err(FixtureError::Mismatch {
                    name: interner.lookup(*name).to_owned(),
                    expected: candidates.join("\n"),
                    actual: actual.clone(),
                })
            }
            Some(_) => {}
        }
    }

    let synthesized_names: FxHashSet<Name> = synthesized.iter().map(|(name, _)| *name).collect();
    if let Some(missing) = expected.decls.top_level().find(|decl| {
        !source_names.contains(&decl.name) && !synthesized_names.contains(&decl.name)
    }) {
        return Err(FixtureError::Missing {
            name: interner.lookup(missing.name).to_owned(),
            expected: renderer.decl(missing),
        });
    }
    Ok(synthesized.len())
}
