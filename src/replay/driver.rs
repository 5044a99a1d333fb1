//! Replay driving: single-step and drain-to-end orchestration.
//!
//! The driver pulls the next subject(s) from the cursor, fetches their facts
//! from the triple store, groups them into size-bounded resources, and hands
//! the groups to the sink, always in sequence order, so the facts for
//! observation k reach the sink before those for observation k+1.

use crate::core::{Observation, ResourceGroup};
use crate::replay::cursor::CursorError;
use crate::replay::grouper;
use crate::replay::sequencer::SequencerError;
use crate::replay::session::ReplaySession;
use crate::replay::timestamp::TimestampError;
use crate::sink::SinkError;
use crate::store::StoreError;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by replay driving.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("no replay sequence has been built; load and sort a dataset first")]
    SequenceNotBuilt,
    #[error("invalid drain batch size: {0}; batch size must be at least 1")]
    InvalidBatchSize(usize),
    #[error(transparent)]
    Cursor(#[from] CursorError),
    #[error(transparent)]
    Sequencer(#[from] SequencerError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
    #[error("sink write failed: {0}")]
    SinkWrite(#[source] SinkError),
}

/// Outcome of a single replay step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One observation was handed to the sink; the cursor now stands at the
    /// contained position.
    Advanced(usize),
    /// The cursor had already reached the sequence end; nothing was done.
    /// A normal terminal signal, not an error.
    NoMoreObservations,
}

/// Orchestrates replay steps against one [`ReplaySession`].
pub struct ReplayDriver<'a> {
    session: &'a mut ReplaySession,
}

impl<'a> ReplayDriver<'a> {
    pub fn new(session: &'a mut ReplaySession) -> Self {
        Self { session }
    }

    /// Replay the observation at the cursor and advance by one.
    ///
    /// Returns [`StepOutcome::NoMoreObservations`] without side effects when
    /// the cursor is exhausted.
    pub async fn advance_one(&mut self) -> Result<StepOutcome, ReplayError> {
        let sequence = self.session.sequence().ok_or(ReplayError::SequenceNotBuilt)?;
        let Some(subject) = self.session.cursor().peek(sequence) else {
            info!("cursor exhausted; no observation to replay");
            return Ok(StepOutcome::NoMoreObservations);
        };
        let subject = subject.clone();
        info!(
            position = self.session.cursor().position(),
            subject = %subject,
            "replaying one observation"
        );

        self.probe_destination().await;

        let observation = self.fetch_observation(&subject)?;
        let groups = grouper::group_observations(
            vec![observation],
            self.session.config().target_resource_size,
        );
        self.write_groups(&groups).await?;

        let position = self.session.cursor_mut().advance(1)?;
        Ok(StepOutcome::Advanced(position))
    }

    /// Replay every remaining observation, at most `batch_size` per sink
    /// handoff, until the cursor is exhausted.
    ///
    /// Returns the cursor position reached after each iteration, for
    /// progress reporting.
    pub async fn drain_to_end(
        &mut self,
        batch_size: usize,
    ) -> Result<Vec<usize>, ReplayError> {
        if batch_size == 0 {
            return Err(ReplayError::InvalidBatchSize(batch_size));
        }
        if self.session.sequence().is_none() {
            return Err(ReplayError::SequenceNotBuilt);
        }
        info!(
            position = self.session.cursor().position(),
            remaining = self.session.cursor().remaining(),
            batch_size,
            "draining remaining observations to the sink"
        );

        // One probe per invocation; its result holds for the whole drain.
        self.probe_destination().await;

        let mut positions = Vec::new();
        let mut batch_nr = 0usize;
        while !self.session.cursor().is_exhausted() {
            let take = batch_size.min(self.session.cursor().remaining());
            let start = self.session.cursor().position();
            let sequence = self.session.sequence().ok_or(ReplayError::SequenceNotBuilt)?;
            let subjects = sequence.subjects()[start..start + take].to_vec();

            let mut observations = Vec::with_capacity(take);
            for subject in &subjects {
                observations.push(self.fetch_observation(subject)?);
            }
            let groups = grouper::group_observations(
                observations,
                self.session.config().target_resource_size,
            );
            self.write_groups(&groups).await?;

            let position = self.session.cursor_mut().advance(take)?;
            positions.push(position);
            debug!(batch = batch_nr, position, "drain iteration complete");
            batch_nr += 1;
        }
        info!(iterations = positions.len(), "drain finished; sequence exhausted");
        Ok(positions)
    }

    /// Retrieve all facts currently related to one observation subject.
    fn fetch_observation(&self, subject: &str) -> Result<Observation, ReplayError> {
        let facts = self.session.store().all_facts(subject)?;
        Ok(Observation::new(subject, facts))
    }

    /// One metadata probe against the destination collection. Absence of a
    /// stream (including a failed probe) is not an error: it signals
    /// "create on first write" and is only logged.
    async fn probe_destination(&self) {
        let destination = &self.session.config().destination_url;
        match self.session.sink().probe_existing_stream(destination).await {
            Ok(Some(metadata)) => {
                info!(stream = %metadata.event_stream_uri, "existing event stream found at destination");
            }
            Ok(None) => {
                info!(%destination, "no event stream at the destination yet; it will be created on first write");
            }
            Err(error) => {
                info!(%destination, %error, "destination probe failed; treating the stream as absent");
            }
        }
    }

    async fn write_groups(&self, groups: &[ResourceGroup]) -> Result<(), ReplayError> {
        let config = self.session.config();
        self.session
            .sink()
            .write_batch(&config.destination_url, groups, &config.tree_path, config.bucket_size)
            .await
            .map_err(ReplayError::SinkWrite)
    }
}
