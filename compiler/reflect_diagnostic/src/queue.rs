//! Ordering and limiting of what a run reports.
//!
//! Parse and pass diagnostics arrive in discovery order. The queue puts
//! them in source order, drops repeats on one line and stops accepting
//! errors past the configured limit.

use reflect_ir::Span;

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// How much of a run gets reported.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Errors accepted before the rest are dropped; 0 keeps all.
    pub error_limit: usize,
    /// Drop errors with the same code and message on the same line.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 10,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Keep everything, repeats included.
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct QueuedDiagnostic {
    diagnostic: Diagnostic,
    line: u32,
    column: u32,
}

/// Diagnostics of one file, positioned by line and column.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    diagnostics: Vec<QueuedDiagnostic>,
    error_count: usize,
    /// Set once a diagnostic was dropped because of the error limit.
    truncated: bool,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic at a known position.
    ///
    /// `false` when the limit or deduplication filtered it out.
    pub fn add(&mut self, diag: Diagnostic, line: u32, column: u32) -> bool {
        let is_error = diag.is_error();
        if is_error && self.limit_reached() {
            self.truncated = true;
            return false;
        }
        if self.config.deduplicate && self.is_duplicate(&diag, line) {
            return false;
        }
        self.diagnostics.push(QueuedDiagnostic {
            diagnostic: diag,
            line,
            column,
        });
        if is_error {
            self.error_count += 1;
        }
        true
    }

    /// Add a diagnostic with its position computed from `source`.
    pub fn add_with_source(&mut self, diag: Diagnostic, source: &str) -> bool {
        let (line, column) = position(&LineOffsetTable::build(source), source, &diag);
        self.add(diag, line, column)
    }

    /// Add every diagnostic, positioned against `source`.
    pub fn extend_with_source(
        &mut self,
        diags: impl IntoIterator<Item = Diagnostic>,
        source: &str,
    ) {
        let table = LineOffsetTable::build(source);
        for diag in diags {
            let (line, column) = position(&table, source, &diag);
            self.add(diag, line, column);
        }
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Proof that at least one error was queued.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Sort diagnostics by position and return them, clearing the queue.
    ///
    /// When errors were dropped because of the limit, a trailing
    /// "too many errors" diagnostic is appended.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        // Stable, so one position keeps discovery order
        self.diagnostics.sort_by_key(|queued| (queued.line, queued.column));
        let mut result: Vec<Diagnostic> = self
            .diagnostics
            .drain(..)
            .map(|queued| queued.diagnostic)
            .collect();
        if self.truncated {
            let span = result
                .last()
                .and_then(Diagnostic::primary_span)
                .unwrap_or(Span::DUMMY);
            result.push(too_many_errors(self.config.error_limit, span));
        }
        self.error_count = 0;
        self.truncated = false;
        result
    }

    fn is_duplicate(&self, diag: &Diagnostic, line: u32) -> bool {
        self.diagnostics.iter().any(|queued| {
            queued.line == line
                && queued.diagnostic.code == diag.code
                && queued.diagnostic.message == diag.message
        })
    }
}

fn position(table: &LineOffsetTable, source: &str, diag: &Diagnostic) -> (u32, u32) {
    diag.primary_span()
        .map_or((1, 1), |span| table.offset_to_line_col(source, span.start))
}

/// Trailing note that errors past `limit` were dropped.
#[cold]
pub fn too_many_errors(limit: usize, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting after {limit} errors"))
        .with_label(span, "last reported error")
        .with_note("pass --error-limit=0 to see every error")
}

#[cfg(test)]
mod tests;
