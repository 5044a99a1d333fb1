//! Observation extraction.
//!
//! An observation is any subject bound by the configured "made-by" relation,
//! e.g. `saref:measurementMadeBy` linking a measurement to its sensor. The
//! extractor scans the triple store for those subjects and produces the
//! candidate set handed to the sequencer.

use crate::core::SubjectId;
use crate::store::{StoreError, TripleStore};
use tracing::info;

/// Scan the store for every subject that is the subject of at least one fact
/// using the given relation.
///
/// The output carries no ordering guarantee beyond being deterministic for an
/// unchanged store; duplicates collapse. An empty result is valid (a dataset
/// with zero observations), not an error.
pub fn extract_observation_subjects(
    store: &TripleStore,
    made_by_relation: &str,
) -> Result<Vec<SubjectId>, StoreError> {
    let subjects = store.find_subjects_by_relation(made_by_relation)?;
    info!(count = subjects.len(), "extracted observation subjects from the store");
    Ok(subjects)
}

/// Number of observations in the store, as opposed to its raw quad count.
pub fn count_observations(
    store: &TripleStore,
    made_by_relation: &str,
) -> Result<usize, StoreError> {
    Ok(store.find_subjects_by_relation(made_by_relation)?.len())
}
