use pretty_assertions::assert_eq;

use super::*;

fn error_at(code: ErrorCode, message: &str, start: u32) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(message)
        .with_label(Span::new(start, start + 1), "here")
}

#[test]
fn flush_sorts_by_position() {
    let source = "class A\nclass B\nclass C\n";
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add_with_source(error_at(ErrorCode::E2001, "third", 16), source);
    queue.add_with_source(error_at(ErrorCode::E2001, "first", 0), source);
    queue.add_with_source(error_at(ErrorCode::E3001, "second", 8), source);

    let messages: Vec<_> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn duplicates_on_one_line_are_dropped() {
    let source = "class A(val x: Int, val x: Int)";
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add_with_source(error_at(ErrorCode::E2001, "dup", 8), source));
    assert!(!queue.add_with_source(error_at(ErrorCode::E2001, "dup", 20), source));
    assert!(queue.add_with_source(error_at(ErrorCode::E2001, "other", 20), source));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn error_limit_appends_summary() {
    let config = DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    };
    let mut queue = DiagnosticQueue::with_config(config);
    for i in 0..4 {
        queue.add(error_at(ErrorCode::E5001, "no default", i), 1, i + 1);
    }
    assert!(queue.limit_reached());

    let flushed = queue.flush();
    assert_eq!(flushed.len(), 3);
    assert_eq!(flushed[2].code, ErrorCode::E9002);
}

#[test]
fn warnings_do_not_count_against_the_limit() {
    let config = DiagnosticConfig {
        error_limit: 1,
        deduplicate: false,
    };
    let mut queue = DiagnosticQueue::with_config(config);
    queue.add(error_at(ErrorCode::E2001, "e", 0), 1, 1);
    assert!(queue.add(Diagnostic::warning(ErrorCode::E2001).with_message("w"), 2, 1));
    assert!(queue.has_errors().is_some());
}
