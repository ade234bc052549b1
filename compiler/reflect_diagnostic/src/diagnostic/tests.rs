use pretty_assertions::assert_eq;

use super::*;

#[test]
fn builder_collects_everything() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_message("cannot reflect `Shape`")
        .with_label(Span::new(4, 9), "open hierarchy")
        .with_secondary_label(Span::new(0, 3), "declared here")
        .with_note("only sealed hierarchies are closed")
        .with_suggestion("mark the class `sealed`");

    assert!(diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(4, 9)));
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.notes, vec!["only sealed hierarchies are closed".to_string()]);
    assert_eq!(diag.suggestions.len(), 1);
}

#[test]
fn primary_span_skips_secondary_labels() {
    let diag = Diagnostic::warning(ErrorCode::E5001)
        .with_secondary_label(Span::new(0, 1), "context")
        .with_label(Span::new(5, 6), "here");
    assert!(!diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(5, 6)));
    assert_eq!(Diagnostic::error(ErrorCode::E9001).primary_span(), None);
}

#[test]
fn display_header() {
    let diag = Diagnostic::error(ErrorCode::E3001).with_message("conflicting decorators");
    assert_eq!(diag.to_string(), "error[E3001]: conflicting decorators");
}
