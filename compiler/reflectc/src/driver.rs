//! One synthesis pass over a compilation unit.
//!
//! The driver walks declarations in source order, asks the generators for
//! whatever each declaration's annotations request, and inserts everything
//! at the end. Failures scoped to one declaration are rolled back and
//! reported; naming exhaustion and cancellation abort the whole pass with
//! nothing inserted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, instrument, trace, warn};

use reflect_diagnostic::{Diagnostic, ErrorCode, ErrorGuaranteed};
use reflect_ir::{CompilationUnit, DeclTable, Declaration, StringInterner, SynthesizedDecl};
use reflect_synth::{DecoratorSpec, Request, SynthContext, SynthError};

use crate::config::PluginConfig;

/// Shared cancellation flag, checked between declarations.
#[derive(Debug, Default)]
pub struct PassControl {
    cancelled: AtomicBool,
}

impl PassControl {
    pub fn new() -> Arc<Self> {
        Arc::new(PassControl::default())
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// What one pass produced.
#[derive(Clone, Debug, Default)]
pub struct PassOutput {
    /// Declarations inserted into the unit, in generation order. Empty
    /// when the pass was aborted.
    pub synthesized: Vec<SynthesizedDecl>,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the pass was aborted and the unit left untouched.
    pub aborted: bool,
}

impl PassOutput {
    /// Proof that the pass reported at least one error.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(
            self.diagnostics.iter().filter(|d| d.is_error()).count(),
        )
    }
}

/// Why a pass stopped early.
enum Abort {
    Fatal(SynthError),
    Cancelled,
}

impl Abort {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Abort::Fatal(err) => err.to_diagnostic(),
            Abort::Cancelled => Diagnostic::error(ErrorCode::E9001)
                .with_message("synthesis pass cancelled")
                .with_note("no declaration of this pass was inserted"),
        }
    }
}

/// Runs passes with one configuration over units sharing an interner.
pub struct PluginDriver<'a> {
    interner: &'a StringInterner,
    config: PluginConfig,
    control: Option<Arc<PassControl>>,
}

impl<'a> PluginDriver<'a> {
    pub fn new(interner: &'a StringInterner, config: PluginConfig) -> Self {
        PluginDriver {
            interner,
            config,
            control: None,
        }
    }

    #[must_use]
    pub fn with_control(mut self, control: Arc<PassControl>) -> Self {
        self.control = Some(control);
        self
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Run one pass over `unit`, inserting the results unless it aborts.
    #[instrument(level = "debug", skip_all, fields(unit = %unit.source_name))]
    pub fn run(&self, unit: &mut CompilationUnit) -> PassOutput {
        let start = unit.arena.checkpoint();
        let mut diagnostics = Vec::new();
        let result = self.expand_unit(unit, &mut diagnostics);

        match result {
            Ok(synthesized) => {
                debug!(
                    synthesized = synthesized.len(),
                    errors = diagnostics.len(),
                    "pass finished"
                );
                unit.insert_synthesized(synthesized.iter().cloned());
                PassOutput {
                    synthesized,
                    diagnostics,
                    aborted: false,
                }
            }
            Err(abort) => {
                unit.arena.rollback(start);
                let diagnostic = abort.to_diagnostic();
                warn!(message = %diagnostic.message, "pass aborted");
                diagnostics.push(diagnostic);
                PassOutput {
                    synthesized: Vec::new(),
                    diagnostics,
                    aborted: true,
                }
            }
        }
    }

    /// One pass per unit, in parallel. Naming state is never shared.
    #[instrument(level = "debug", skip_all, fields(units = units.len()))]
    pub fn run_units(&self, units: &mut [CompilationUnit]) -> Vec<PassOutput> {
        units.par_iter_mut().map(|unit| self.run(unit)).collect()
    }

    fn expand_unit(
        &self,
        unit: &mut CompilationUnit,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<SynthesizedDecl>, Abort> {
        let decls = &unit.decls;
        let mut cx = SynthContext::new(
            decls,
            &unit.synthesized,
            &mut unit.arena,
            self.interner,
            self.config.synth(),
        );
        let mut synthesized = Vec::new();

        for decl in decls.iter() {
            if self.control.as_ref().is_some_and(|c| c.is_cancelled()) {
                return Err(Abort::Cancelled);
            }
            let mark = cx.arena().checkpoint();
            match expand_decl(&mut cx, decls, decl) {
                Ok(out) => {
                    trace!(decl = self.interner.lookup(decl.name), count = out.len(), "expanded");
                    synthesized.extend(out);
                }
                Err(err) if err.is_fatal() => return Err(Abort::Fatal(err)),
                Err(err) => {
                    debug!(decl = self.interner.lookup(decl.name), %err, "declaration rolled back");
                    cx.arena().rollback(mark);
                    diagnostics.push(err.to_diagnostic());
                }
            }
        }
        Ok(synthesized)
    }
}

/// Every generator `decl` asks for, all or nothing.
fn expand_decl(
    cx: &mut SynthContext<'_>,
    decls: &DeclTable,
    decl: &Declaration,
) -> Result<Vec<SynthesizedDecl>, SynthError> {
    let mut out = Vec::new();
    if decl.is_class_like() {
        let request = Request::from_annotations(decl);
        out.extend(cx.synthesize(decl.id, request)?);
        if request.contains(Request::SAMPLE) {
            out.push(cx.install_sample(decl.id)?);
        }
    }
    if let Some(spec) = DecoratorSpec::from_decl(decls, decl) {
        out.push(cx.rewrite_decorated(decl.id, &spec)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests;
