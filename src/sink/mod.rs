//! Sink adapter interface.
//!
//! The sink is the external component performing the real append to the
//! remote event store. The engine only decides what to hand off and when:
//! it probes the destination once per driver invocation to learn whether a
//! stream already exists, then hands over ordered resource groups. Bucket
//! rebalancing and any retry policy live behind this interface, not in the
//! engine.

use crate::core::ResourceGroup;
use async_trait::async_trait;
use thiserror::Error;

pub mod ldp_sink;

pub use ldp_sink::LdpSink;

/// Errors raised by sink operations.
///
/// Probe failures are recovered by the driver (absence of a destination
/// stream is the expected steady state before the first write); write
/// failures bubble up unmodified and are fatal for the current step.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("destination probe failed: {0}")]
    Probe(String),
    #[error("sink write rejected with status {status}: {body}")]
    Write { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Metadata describing an event stream that already exists at the
/// destination.
#[derive(Debug, Clone)]
pub struct StreamMetadata {
    pub event_stream_uri: String,
}

/// The engine-facing contract of the external sink.
#[async_trait]
pub trait SinkAdapter: Send + Sync {
    /// Check whether a destination stream already exists. `Ok(None)` means
    /// "create on first write" and is not an error.
    async fn probe_existing_stream(
        &self,
        destination: &str,
    ) -> Result<Option<StreamMetadata>, SinkError>;

    /// Append the given resource groups, in order, to the destination.
    ///
    /// `ordering_attribute` is the tree path the destination organizes its
    /// buckets by; `bucket_size` is a hint for the sink's rebalancing, not a
    /// constraint the engine enforces.
    async fn write_batch(
        &self,
        destination: &str,
        groups: &[ResourceGroup],
        ordering_attribute: &str,
        bucket_size: usize,
    ) -> Result<(), SinkError>;
}
