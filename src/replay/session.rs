//! Replay session state.
//!
//! One `ReplaySession` owns everything the engine needs for one loaded
//! dataset: the triple store, the canonical replay sequence, the cursor, and
//! the configuration. The transport layer owns the session and passes it by
//! reference into every engine operation, which keeps single-flight
//! discipline enforceable in one place and leaves the door open for
//! multi-session support later.

use crate::config::ReplayConfig;
use crate::replay::cursor::ReplayCursor;
use crate::replay::extractor;
use crate::replay::sequencer::{ReplaySequence, Sequencer, SequencerError};
use crate::sink::SinkAdapter;
use crate::store::{StoreError, TripleStore};
use oxigraph::io::RdfFormat;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Current replay progress: cursor position and sequence length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayProgress {
    pub position: usize,
    pub length: usize,
}

/// State for one loaded dataset and its replay run.
pub struct ReplaySession {
    config: ReplayConfig,
    store: TripleStore,
    sequence: Option<ReplaySequence>,
    cursor: ReplayCursor,
    sink: Arc<dyn SinkAdapter>,
}

impl ReplaySession {
    /// Create a session with an empty store.
    pub fn new(
        config: ReplayConfig,
        sink: Arc<dyn SinkAdapter>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            store: TripleStore::new()?,
            sequence: None,
            cursor: ReplayCursor::new(0),
            config,
            sink,
        })
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn store(&self) -> &TripleStore {
        &self.store
    }

    pub fn sink(&self) -> &dyn SinkAdapter {
        self.sink.as_ref()
    }

    /// The canonical replay sequence, once built.
    pub fn sequence(&self) -> Option<&ReplaySequence> {
        self.sequence.as_ref()
    }

    pub fn cursor(&self) -> &ReplayCursor {
        &self.cursor
    }

    // The cursor is advanced only by the driver; nothing outside the crate
    // can move it.
    pub(crate) fn cursor_mut(&mut self) -> &mut ReplayCursor {
        &mut self.cursor
    }

    /// Load a dataset file, replacing the store wholesale and resetting all
    /// replay progress. Returns the number of quads loaded.
    pub fn load_dataset(&mut self, path: &Path) -> Result<usize, StoreError> {
        let store = TripleStore::new()?;
        let loaded = store.load_file(path)?;
        self.replace_store(store);
        info!(dataset = %path.display(), quads = loaded, "dataset loaded");
        Ok(loaded)
    }

    /// Load a dataset from a reader. Same reset semantics as
    /// [`Self::load_dataset`].
    pub fn load_dataset_reader(
        &mut self,
        format: RdfFormat,
        reader: impl Read,
    ) -> Result<usize, StoreError> {
        let store = TripleStore::new()?;
        let loaded = store.load_reader(format, reader)?;
        self.replace_store(store);
        info!(quads = loaded, "dataset loaded");
        Ok(loaded)
    }

    fn replace_store(&mut self, store: TripleStore) {
        self.store = store;
        self.sequence = None;
        self.cursor = ReplayCursor::new(0);
    }

    /// Number of observations in the loaded dataset.
    pub fn observation_count(&self) -> Result<usize, StoreError> {
        extractor::count_observations(&self.store, &self.config.made_by_relation)
    }

    /// Extract the observation subjects and sort them into the canonical
    /// replay sequence. Resets the cursor. Returns the sequence length.
    pub fn build_sequence(&mut self) -> Result<usize, SequencerError> {
        let candidates =
            extractor::extract_observation_subjects(&self.store, &self.config.made_by_relation)?;
        let sequencer = Sequencer::new(&self.store, &self.config.timestamp_attribute);
        let sequence = sequencer.sequence(candidates)?;
        let length = sequence.len();
        self.cursor = ReplayCursor::new(length);
        self.sequence = Some(sequence);
        info!(length, "replay sequence built");
        Ok(length)
    }

    pub fn progress(&self) -> ReplayProgress {
        ReplayProgress { position: self.cursor.position(), length: self.cursor.length() }
    }

    /// A short preview of the sequence for visualisation: the first and last
    /// `chunk_size` subjects with an ellipsis in between.
    pub fn sequence_preview(&self) -> Vec<String> {
        let Some(sequence) = &self.sequence else {
            return Vec::new();
        };
        let chunk = self.config.chunk_size;
        let subjects = sequence.subjects();
        if subjects.len() <= 2 * chunk {
            return subjects.to_vec();
        }
        let mut preview = subjects[..chunk].to_vec();
        preview.push("...".to_string());
        preview.extend_from_slice(&subjects[subjects.len() - chunk..]);
        preview
    }
}
