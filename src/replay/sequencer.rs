//! Timestamp sequencing of observation subjects.
//!
//! The sequencer total-orders the candidate subjects ascending by the value
//! of their timestamp attribute, using a classic divide-and-conquer merge
//! sort. Timestamps are compared as raw lexical values, not parsed as
//! calendar time: the datasets use ISO-8601 timestamps, for which lexical
//! order equals chronological order. See [`crate::replay::timestamp`] for
//! why the two orderings are kept as separate operations.

use crate::core::SubjectId;
use crate::replay::timestamp::lexical_cmp;
use crate::store::{StoreError, TripleStore};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::debug;

/// Errors raised while building a replay sequence.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// An observation lacks the ordering attribute. Fatal to the sequencer
    /// run: silently skipping the subject would corrupt the ordering
    /// guarantees downstream consumers rely on, so no partial sequence is
    /// published.
    #[error("observation <{subject}> has no value for the timestamp attribute")]
    MissingTimestamp { subject: SubjectId },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The canonical timestamp-ordered list of observation subjects for one
/// loaded dataset. Its length is fixed once computed; a dataset reload
/// replaces the sequence wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySequence {
    subjects: Vec<SubjectId>,
}

impl ReplaySequence {
    pub fn new(subjects: Vec<SubjectId>) -> Self {
        Self { subjects }
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SubjectId> {
        self.subjects.get(index)
    }

    pub fn subjects(&self) -> &[SubjectId] {
        &self.subjects
    }
}

/// Stable merge sort of observation subjects by timestamp attribute value.
///
/// Each comparison resolves both timestamps through the triple store at
/// comparison time. That is acceptable at the dataset sizes this tool
/// replays; for much larger datasets, precompute a subject-to-timestamp map
/// once and sort against it: same output, O(1) per comparison.
pub struct Sequencer<'a> {
    store: &'a TripleStore,
    timestamp_attribute: &'a str,
}

impl<'a> Sequencer<'a> {
    pub fn new(store: &'a TripleStore, timestamp_attribute: &'a str) -> Self {
        Self { store, timestamp_attribute }
    }

    /// Sort the candidate subjects into a replay sequence.
    ///
    /// The sort is stable: two observations with equal timestamps keep their
    /// relative order from the candidate list. Re-running on an unchanged
    /// store yields an identical sequence.
    pub fn sequence(
        &self,
        candidates: Vec<SubjectId>,
    ) -> Result<ReplaySequence, SequencerError> {
        debug!(candidates = candidates.len(), "sorting observation subjects by timestamp");
        let sorted = self.merge_sort(candidates)?;
        Ok(ReplaySequence::new(sorted))
    }

    /// Recursively split at the midpoint until sublists have length <= 1,
    /// then merge pairs back together in timestamp order.
    fn merge_sort(&self, mut list: Vec<SubjectId>) -> Result<Vec<SubjectId>, SequencerError> {
        if list.len() <= 1 {
            return Ok(list);
        }
        let mid = list.len() / 2;
        let right = list.split_off(mid);
        let left = self.merge_sort(list)?;
        let right = self.merge_sort(right)?;
        self.merge(&left, &right)
    }

    fn merge(
        &self,
        list1: &[SubjectId],
        list2: &[SubjectId],
    ) -> Result<Vec<SubjectId>, SequencerError> {
        let mut merged = Vec::with_capacity(list1.len() + list2.len());
        let mut i = 0;
        let mut j = 0;
        while i < list1.len() && j < list2.len() {
            let timestamp1 = self.timestamp(&list1[i])?;
            let timestamp2 = self.timestamp(&list2[j])?;
            // The left element wins ties, which is what makes the sort stable.
            if lexical_cmp(&timestamp1, &timestamp2) == Ordering::Greater {
                merged.push(list2[j].clone());
                j += 1;
            } else {
                merged.push(list1[i].clone());
                i += 1;
            }
        }
        merged.extend_from_slice(&list1[i..]);
        merged.extend_from_slice(&list2[j..]);
        Ok(merged)
    }

    fn timestamp(&self, subject: &SubjectId) -> Result<String, SequencerError> {
        self.store
            .attribute(subject, self.timestamp_attribute)?
            .ok_or_else(|| SequencerError::MissingTimestamp { subject: subject.clone() })
    }
}
