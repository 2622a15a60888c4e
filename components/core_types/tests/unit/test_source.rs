//! Unit tests for source position types

use core_types::{SourcePosition, Span};

#[test]
fn test_position_fields_and_display() {
    let pos = SourcePosition::new(12, 34);
    assert_eq!(pos.line, 12);
    assert_eq!(pos.column, 34);
    assert_eq!(format!("{}", pos), "12:34");
}

#[test]
fn test_position_is_copy() {
    let pos = SourcePosition::new(1, 2);
    let copy = pos;
    assert_eq!(pos, copy);
}

#[test]
fn test_origin() {
    let origin = SourcePosition::origin();
    assert_eq!(origin.line, 1);
    assert_eq!(origin.column, 1);
}

#[test]
fn test_span_new_and_point() {
    let span = Span::new(SourcePosition::new(4, 1), SourcePosition::new(4, 6));
    assert_eq!(span.start.column, 1);
    assert_eq!(span.end.column, 6);

    let point = Span::point(SourcePosition::new(9, 9));
    assert_eq!(point.start, point.end);
}

#[test]
fn test_span_equality() {
    let a = Span::new(SourcePosition::new(1, 1), SourcePosition::new(1, 2));
    let b = Span::new(SourcePosition::new(1, 1), SourcePosition::new(1, 2));
    assert_eq!(a, b);
}
