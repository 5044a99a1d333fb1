//! Replay cursor tests: monotonic forward-only progress within bounds.

use kairos::replay::cursor::{CursorError, ReplayCursor};
use kairos::replay::sequencer::ReplaySequence;

fn sequence_of(n: usize) -> ReplaySequence {
    ReplaySequence::new((0..n).map(|i| format!("http://example.org/obs/{}", i)).collect())
}

#[test]
fn test_new_cursor_starts_at_zero() {
    let cursor = ReplayCursor::new(5);
    assert_eq!(cursor.position(), 0);
    assert_eq!(cursor.length(), 5);
    assert_eq!(cursor.remaining(), 5);
    assert!(!cursor.is_exhausted());
}

#[test]
fn test_advance_moves_forward_and_reports_new_position() {
    let mut cursor = ReplayCursor::new(5);
    assert_eq!(cursor.advance(2).unwrap(), 2);
    assert_eq!(cursor.advance(3).unwrap(), 5);
    assert!(cursor.is_exhausted());
}

#[test]
fn test_position_is_non_decreasing_across_advances() {
    let mut cursor = ReplayCursor::new(10);
    let mut last = cursor.position();
    for step in [1, 2, 3, 4] {
        let position = cursor.advance(step).unwrap();
        assert!(position > last);
        last = position;
    }
    assert_eq!(last, 10);
}

#[test]
fn test_advance_past_end_is_invalid() {
    let mut cursor = ReplayCursor::new(3);
    cursor.advance(2).unwrap();
    let err = cursor.advance(2).unwrap_err();
    assert_eq!(
        err,
        CursorError::InvalidAdvance { position: 2, requested: 2, length: 3 }
    );
    // The failed advance must not have moved the cursor.
    assert_eq!(cursor.position(), 2);
}

#[test]
fn test_advance_requires_at_least_one() {
    let mut cursor = ReplayCursor::new(3);
    assert!(matches!(
        cursor.advance(0),
        Err(CursorError::InvalidAdvance { requested: 0, .. })
    ));
}

#[test]
fn test_peek_returns_subject_then_exhausts() {
    let sequence = sequence_of(2);
    let mut cursor = ReplayCursor::new(sequence.len());
    assert_eq!(cursor.peek(&sequence).unwrap(), "http://example.org/obs/0");
    cursor.advance(1).unwrap();
    assert_eq!(cursor.peek(&sequence).unwrap(), "http://example.org/obs/1");
    cursor.advance(1).unwrap();
    assert!(cursor.peek(&sequence).is_none());
}

#[test]
fn test_reset_returns_to_start() {
    let mut cursor = ReplayCursor::new(4);
    cursor.advance(4).unwrap();
    cursor.reset();
    assert_eq!(cursor.position(), 0);
    assert_eq!(cursor.remaining(), 4);
}

#[test]
fn test_empty_sequence_is_immediately_exhausted() {
    let cursor = ReplayCursor::new(0);
    assert!(cursor.is_exhausted());
    assert!(cursor.peek(&sequence_of(0)).is_none());
}
