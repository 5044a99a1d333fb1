//! The ordered replay engine.
//!
//! The engine imposes a deterministic total order on a loaded observation
//! dataset, tracks replay progress with a single advancing cursor, groups
//! pending observations into size-bounded batches, and drives a self-pacing
//! automatic replay loop that reproduces the original inter-observation
//! timing.

pub mod autoplay;
pub mod cursor;
pub mod driver;
pub mod extractor;
pub mod grouper;
pub mod sequencer;
pub mod session;
pub mod timestamp;

pub use autoplay::Autoplay;
pub use cursor::{CursorError, ReplayCursor};
pub use driver::{ReplayDriver, ReplayError, StepOutcome};
pub use grouper::group_observations;
pub use sequencer::{ReplaySequence, Sequencer, SequencerError};
pub use session::ReplaySession;
