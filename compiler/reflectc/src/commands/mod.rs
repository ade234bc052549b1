//! Command handlers for the `reflectc` CLI.
//!
//! Each submodule implements one command. File loading, the shared
//! parse-and-expand step and diagnostic reporting live here.

use std::io::IsTerminal;

use reflect_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use reflect_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, Severity};
use reflect_ir::{CompilationUnit, Renderer, StringInterner};

use crate::config::PluginConfig;
use crate::driver::{PassOutput, PluginDriver};

mod check;
mod expand;
mod explain;
mod fixtures;
mod run;

pub use check::check_file;
pub use expand::expand_file;
pub use explain::explain_error;
pub use fixtures::{run_fixture_suite, FixtureSuiteOptions};
pub use run::run_box_file;

/// A source file after parsing and one pass.
pub struct Expansion {
    pub interner: StringInterner,
    pub unit: CompilationUnit,
    pub parse_diagnostics: Vec<Diagnostic>,
    /// `None` when parsing failed and the pass was skipped.
    pub output: Option<PassOutput>,
}

impl Expansion {
    pub fn new(path: &str, source: &str, config: &PluginConfig) -> Self {
        let interner = StringInterner::new();
        let parsed = reflect_parse::parse(path, source, &interner);
        let has_errors = parsed.has_errors();
        let mut unit = parsed.unit;
        let output =
            (!has_errors).then(|| PluginDriver::new(&interner, config.clone()).run(&mut unit));
        Expansion {
            interner,
            unit,
            parse_diagnostics: parsed.diagnostics,
            output,
        }
    }

    /// Parse and pass diagnostics, in discovery order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.parse_diagnostics.clone();
        if let Some(output) = &self.output {
            all.extend(output.diagnostics.iter().cloned());
        }
        all
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics().iter().any(Diagnostic::is_error)
    }

    /// Each synthesized declaration as `(header comment, rendering)`.
    pub fn rendered(&self) -> Vec<(String, String)> {
        let Some(output) = &self.output else {
            return Vec::new();
        };
        let renderer = Renderer::new(&self.interner, &self.unit.arena);
        output
            .synthesized
            .iter()
            .map(|synth| {
                let source = self.unit.qualified_name(synth.source, &self.interner);
                (
                    format!("// {} for {source}", synth.origin.as_str()),
                    renderer.decl(&synth.decl),
                )
            })
            .collect()
    }
}

/// Read a file, exiting with an error message if it cannot be read.
pub(crate) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("error: cannot read '{path}': {e}");
            std::process::exit(1);
        }
    }
}

/// Sort, limit and print diagnostics for one file. Returns the error count.
pub(crate) fn report_diagnostics(
    path: &str,
    source: &str,
    diagnostics: Vec<Diagnostic>,
    config: &DiagnosticConfig,
) -> usize {
    if diagnostics.is_empty() {
        return 0;
    }
    let mut queue = DiagnosticQueue::with_config(config.clone());
    queue.extend_with_source(diagnostics, source);
    let sorted = queue.flush();

    let errors = sorted.iter().filter(|d| d.is_error()).count();
    let warnings = sorted
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    let is_tty = std::io::stderr().is_terminal();
    let mut emitter =
        TerminalEmitter::stderr(ColorMode::Auto, is_tty).with_source(path, source);
    emitter.emit_all(&sorted);
    emitter.emit_summary(errors, warnings);
    emitter.flush();
    errors
}

#[cfg(test)]
mod tests;
