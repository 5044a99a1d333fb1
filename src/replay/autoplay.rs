//! Self-paced automatic replay.
//!
//! The autoplay scheduler is a cooperative, self-rescheduling timer loop: a
//! single spawned task that replays one observation per wake, computes the
//! real wall-clock delay until the next observation's timestamp, and sleeps
//! until then. Each wake is an independent await, not call-stack recursion.
//!
//! The whole state is one `enabled` flag plus the spawned task as the
//! opaque pending-wake handle. A stop request flips the flag; the pending
//! wake still fires once, finds the flag cleared at the top of the loop,
//! and exits, so stop takes effect within one pending interval, not
//! instantaneously. The loop also disables itself on sequence exhaustion
//! and on any step error, surfacing failures via logs since no synchronous
//! caller exists.

use crate::replay::driver::{ReplayDriver, ReplayError, StepOutcome};
use crate::replay::session::ReplaySession;
use crate::replay::timestamp;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Handle controlling the automatic replay loop.
#[derive(Clone)]
pub struct Autoplay {
    enabled: Arc<AtomicBool>,
}

impl Autoplay {
    pub fn new() -> Self {
        Self { enabled: Arc::new(AtomicBool::new(false)) }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Enable autoplay and schedule an immediate first wake.
    ///
    /// Idempotent: starting while already enabled is a no-op returning
    /// `false`. The compare-exchange guarantees at most one loop, so a
    /// second start request can never double-schedule wakes.
    pub fn start(&self, session: Arc<Mutex<ReplaySession>>) -> bool {
        if self
            .enabled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("autoplay already running; start request ignored");
            return false;
        }
        info!("autoplay started");
        let enabled = Arc::clone(&self.enabled);
        tokio::spawn(run_loop(enabled, session));
        true
    }

    /// Request the loop to stop. The already-scheduled wake, if any, fires
    /// once more and exits without replaying.
    pub fn stop(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        info!("autoplay stop requested; the loop exits at its next wake");
    }
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_loop(enabled: Arc<AtomicBool>, session: Arc<Mutex<ReplaySession>>) {
    loop {
        if !enabled.load(Ordering::SeqCst) {
            debug!("autoplay disabled; loop exiting");
            break;
        }

        let delay = {
            let mut session = session.lock().await;
            let outcome = ReplayDriver::new(&mut session).advance_one().await;
            match outcome {
                Ok(StepOutcome::Advanced(position)) => {
                    match next_wake_delay(&session, position) {
                        Ok(Some(delay)) => Some(delay),
                        Ok(None) => {
                            info!("no further observation to pace against; autoplay finished");
                            None
                        }
                        Err(error) => {
                            error!(%error, "autoplay cannot compute the next wake; stopping");
                            None
                        }
                    }
                }
                Ok(StepOutcome::NoMoreObservations) => {
                    info!("sequence exhausted; autoplay finished");
                    None
                }
                Err(error) => {
                    error!(%error, "autoplay step failed; disabling autoplay");
                    None
                }
            }
        };

        match delay {
            Some(delay) => {
                debug!(delay_ms = delay.as_millis() as u64, "scheduling next autoplay wake");
                sleep(delay).await;
            }
            None => break,
        }
    }
    enabled.store(false, Ordering::SeqCst);
}

/// Wall-clock delay between the observation now at the cursor and the one
/// after it. `None` when no next observation exists: the loop then stops
/// without rescheduling.
fn next_wake_delay(
    session: &ReplaySession,
    position: usize,
) -> Result<Option<Duration>, ReplayError> {
    let sequence = session.sequence().ok_or(ReplayError::SequenceNotBuilt)?;
    let (Some(current), Some(next)) = (sequence.get(position), sequence.get(position + 1))
    else {
        return Ok(None);
    };
    let current_ts = observation_timestamp(session, current)?;
    let next_ts = observation_timestamp(session, next)?;
    Ok(Some(timestamp::wall_clock_gap(&current_ts, &next_ts)?))
}

fn observation_timestamp(
    session: &ReplaySession,
    subject: &str,
) -> Result<String, ReplayError> {
    let value =
        session.store().attribute(subject, &session.config().timestamp_attribute)?;
    value.ok_or_else(|| {
        ReplayError::Sequencer(crate::replay::sequencer::SequencerError::MissingTimestamp {
            subject: subject.to_string(),
        })
    })
}
