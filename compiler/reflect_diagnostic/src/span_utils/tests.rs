use super::*;

#[test]
fn first_line_and_column() {
    assert_eq!(offset_to_line_col("abc", 0), (1, 1));
    assert_eq!(offset_to_line_col("abc", 2), (1, 3));
}

#[test]
fn offsets_after_newlines() {
    let source = "class A\n\ndata class B(val x: Int)\n";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.line_count(), 4);
    assert_eq!(table.offset_to_line_col(source, 8), (2, 1));
    assert_eq!(table.offset_to_line_col(source, 9), (3, 1));
    assert_eq!(table.offset_to_line_col(source, 14), (3, 6));
}

#[test]
fn columns_count_characters() {
    let source = "val é = 1";
    // 'é' is two bytes; '=' starts at byte 7.
    assert_eq!(offset_to_line_col(source, 7), (1, 7));
}

#[test]
fn offset_past_end_is_clamped() {
    assert_eq!(offset_to_line_col("ab", 99), (1, 3));
}
