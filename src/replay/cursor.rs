//! Replay progress tracking.
//!
//! The cursor is a single non-negative index into the replay sequence. It is
//! forward-only, matching one-pass replay semantics: there is no decrement
//! operation, and `0 <= position <= length` holds at all times.

use crate::core::SubjectId;
use crate::replay::sequencer::ReplaySequence;
use thiserror::Error;

/// Errors raised by cursor operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    /// The requested step would move the cursor past the sequence end, or
    /// was not at least 1. A programming error on the caller side, not
    /// retried.
    #[error(
        "cannot advance by {requested} from position {position}: sequence length is {length}"
    )]
    InvalidAdvance { position: usize, requested: usize, length: usize },
}

/// Marker of replay progress through a [`ReplaySequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayCursor {
    position: usize,
    length: usize,
}

impl ReplayCursor {
    /// A fresh cursor at position 0 for a sequence of the given length.
    pub fn new(length: usize) -> Self {
        Self { position: 0, length }
    }

    /// Move back to the start. Called whenever a new dataset is loaded and
    /// sequenced; never during a run.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Observations not yet replayed.
    pub fn remaining(&self) -> usize {
        self.length - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position == self.length
    }

    /// The subject at the current position, or `None` once the cursor has
    /// reached the end of the sequence.
    pub fn peek<'s>(&self, sequence: &'s ReplaySequence) -> Option<&'s SubjectId> {
        sequence.get(self.position)
    }

    /// Advance the cursor by `n >= 1` positions and return the new position.
    pub fn advance(&mut self, n: usize) -> Result<usize, CursorError> {
        if n == 0 || self.position + n > self.length {
            return Err(CursorError::InvalidAdvance {
                position: self.position,
                requested: n,
                length: self.length,
            });
        }
        self.position += n;
        Ok(self.position)
    }
}
