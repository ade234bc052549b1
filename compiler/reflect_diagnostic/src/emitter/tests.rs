#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use reflect_ir::Span;

use super::*;
use crate::ErrorCode;

fn sample_diagnostic() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message("cannot synthesize optics for `Shape`")
        .with_label(Span::new(19, 24), "open hierarchy")
        .with_note("only sealed hierarchies have a closed set of variants")
}

fn render(emitter: TerminalEmitter<Vec<u8>>, diags: &[Diagnostic]) -> String {
    let mut emitter = emitter;
    emitter.emit_all(diags);
    emitter.flush();
    String::from_utf8(emitter.into_inner()).unwrap()
}

#[test]
fn plain_output_with_source_location() {
    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false)
        .with_source("shape_test.kt", "@Optics\nopen class Shape\n");
    let text = render(emitter, &[sample_diagnostic()]);
    assert_eq!(
        text,
        "error[E2001]: cannot synthesize optics for `Shape`\n  \
         --> shape_test.kt:2:12: open hierarchy\n  \
         = note: only sealed hierarchies have a closed set of variants\n\n"
    );
}

#[test]
fn without_source_spans_are_raw() {
    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    let text = render(emitter, &[sample_diagnostic()]);
    assert!(text.contains("--> 19..24: open hierarchy"));
}

#[test]
fn colors_follow_mode() {
    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Auto, true);
    let text = render(emitter, &[sample_diagnostic()]);
    assert!(text.contains("\x1b["));
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
}

#[test]
fn summary_counts() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(2, 1);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert_eq!(text, "error: 2 errors and 1 warning reported\n");

    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(1, 0);
    emitter.emit_summary(0, 3);
    emitter.emit_summary(0, 0);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert_eq!(text, "error: 1 error reported\nwarning: 3 warnings reported\n");
}
