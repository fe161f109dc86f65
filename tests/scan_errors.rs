// Format-error taxonomy: every scanner failure kind with its exact position.
use tablite::{scan_str, ErrorKind};

fn fail(input: &str) -> tablite::Error {
    scan_str(input).expect_err("scan should fail")
}

#[test]
fn unterminated_quoted_field_reports_end_of_input() {
    let err = fail("a,\"b\r\n");
    assert_eq!(err.kind(), ErrorKind::UnterminatedQuotedField);
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.column(), Some(1));
}

#[test]
fn quote_inside_an_unquoted_field_is_positioned_at_the_quote() {
    let err = fail("ab\"c");
    assert_eq!(err.kind(), ErrorKind::UnexpectedQuoteInField);
    assert_eq!(err.line(), Some(1));
    assert_eq!(err.column(), Some(3));
}

#[test]
fn carriage_return_without_line_feed_fails() {
    let err = fail("a\rx");
    assert_eq!(err.kind(), ErrorKind::ExpectingLineFeed);
    assert_eq!(err.line(), Some(1));
    assert_eq!(err.column(), Some(3));
}

#[test]
fn carriage_return_at_end_of_input_fails() {
    let err = fail("\r");
    assert_eq!(err.kind(), ErrorKind::ExpectingLineFeed);
    assert_eq!(err.line(), Some(1));
    assert_eq!(err.column(), Some(1));
}

#[test]
fn a_second_value_in_one_slot_needs_a_separator() {
    let err = fail("\"a\"b");
    assert_eq!(err.kind(), ErrorKind::MissingFieldSeparator);
    assert_eq!(err.line(), Some(1));
    assert_eq!(err.column(), Some(5));
}

#[test]
fn short_second_row_is_a_length_mismatch() {
    let err = fail("a,b\r\nc\r\n");
    assert_eq!(err.kind(), ErrorKind::RowLengthMismatch);
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.column(), Some(2));
}

#[test]
fn long_second_row_is_a_length_mismatch_too() {
    let err = fail("a\r\nb,c\r\n");
    assert_eq!(err.kind(), ErrorKind::RowLengthMismatch);
    assert_eq!(err.line(), Some(2));
}

#[test]
fn mismatch_at_end_of_input_with_a_trailing_comma() {
    // The open slot after a trailing comma is dropped at end-of-input, so the
    // final row comes up short against the established column count.
    let err = fail("a,b\r\nc,");
    assert_eq!(err.kind(), ErrorKind::RowLengthMismatch);
    assert_eq!(err.line(), Some(2));
}

#[test]
fn error_display_names_the_kind_and_position() {
    let err = fail("a\rx");
    let text = err.to_string();
    assert!(text.starts_with("ExpectingLineFeed"));
    assert!(text.contains("(line: 1)"));
    assert!(text.contains("(column: 3)"));
}
