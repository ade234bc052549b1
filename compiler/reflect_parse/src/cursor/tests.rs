#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::lexer::lex;

#[test]
fn advance_stops_at_eof() {
    let interner = StringInterner::new();
    let lexed = lex("a", &interner);
    let mut cursor = Cursor::new(&lexed.tokens, &interner);
    assert!(cursor.check_ident());
    cursor.advance();
    assert!(cursor.is_at_end());
    cursor.advance();
    assert!(cursor.is_at_end());
}

#[test]
fn peek_past_newlines_finds_continuation() {
    let interner = StringInterner::new();
    let lexed = lex("x\n\n  .y", &interner);
    let mut cursor = Cursor::new(&lexed.tokens, &interner);
    cursor.advance();
    assert_eq!(cursor.current_kind(), TokenKind::Newline);
    assert_eq!(cursor.peek_past_newlines(), TokenKind::Dot);
    cursor.skip_newlines();
    assert!(cursor.check(TokenKind::Dot));
}

#[test]
fn expect_reports_unclosed_delimiters() {
    let interner = StringInterner::new();
    let lexed = lex("(a", &interner);
    let mut cursor = Cursor::new(&lexed.tokens, &interner);
    cursor.expect(TokenKind::LParen).unwrap();
    assert_eq!(cursor.expect_ident().unwrap(), interner.intern("a"));
    let err = cursor.expect(TokenKind::RParen).unwrap_err();
    assert_eq!(err.code, ErrorCode::E1003);
    assert_eq!(err.message, "expected `)`, found end of file");
}

#[test]
fn check_ignores_payload() {
    let interner = StringInterner::new();
    let lexed = lex("42", &interner);
    let cursor = Cursor::new(&lexed.tokens, &interner);
    assert!(cursor.check(TokenKind::Int(0)));
}
