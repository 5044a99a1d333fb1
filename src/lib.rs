//! # Kairos
//!
//! Kairos is an ordered replay engine for timestamped RDF observation
//! datasets, targeting LDES in LDP sinks such as Solid pods.
//!
//! The name "Kairos" is inspired by the Greek personification of the
//! opportune moment. Where chronos is time as a measured quantity, kairos is
//! the right instant to act, which is exactly what this engine computes:
//! it imposes a total order on a loaded observation dataset and hands each
//! observation to an append-only sink either on explicit request or at the
//! pace implied by the original timestamps.
//!
//! ## Features
//!
//! - Loading RDF observation datasets into an in-memory triple store
//! - Deterministic, stable timestamp ordering of observations
//! - Single-step, batched drain-to-end, and self-paced automatic replay
//! - Size-budgeted resource grouping before sink handoff
//!
//! ## Example
//!
//! ```rust
//! use kairos::replay::cursor::ReplayCursor;
//!
//! let mut cursor = ReplayCursor::new(3);
//! assert_eq!(cursor.advance(2).unwrap(), 2);
//! assert!(!cursor.is_exhausted());
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

/// Core data structures shared across the engine
pub mod core;

/// Configuration loading and dataset discovery
pub mod config;

/// Triple store wrapper used by every engine operation
pub mod store;

/// The ordered replay engine: extractor, sequencer, cursor, grouper,
/// driver, and autoplay scheduler
pub mod replay;

/// Sink adapter trait and the LDP/Solid implementation
pub mod sink;

/// HTTP transport layer
pub mod http;

// Re-export commonly used types
pub use crate::core::{Observation, ResourceGroup, SubjectId};
pub use crate::replay::driver::{ReplayDriver, StepOutcome};
pub use crate::replay::session::ReplaySession;
