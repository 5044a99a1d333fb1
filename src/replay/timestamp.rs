//! Dual timestamp semantics.
//!
//! Timestamps are handled two different ways, deliberately kept as separate
//! typed operations:
//!
//! - [`lexical_cmp`] compares raw string values. The replay ordering relies
//!   on ISO-8601 timestamps, for which lexical order equals chronological
//!   order as long as all values share the same formatting and offset. The
//!   sequencer depends on that property and must not be "fixed" into
//!   calendar parsing.
//! - [`wall_clock_gap`] parses two timestamps as calendar time and returns
//!   the real duration between them. The autoplay scheduler is the only
//!   consumer; it is the one place timestamps are parsed rather than
//!   compared.

use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;
use std::time::Duration;
use thiserror::Error;

/// A timestamp value that could not be parsed as calendar time.
#[derive(Debug, Error)]
#[error("cannot parse timestamp {value:?} as calendar time: {source}")]
pub struct TimestampError {
    pub value: String,
    #[source]
    source: chrono::ParseError,
}

/// Raw lexical comparison of two timestamp values.
pub fn lexical_cmp(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Wall-clock duration from `current` to `next`.
///
/// A non-increasing pair (equal timestamps, or out-of-order values) yields a
/// zero duration rather than an error: the autoplay loop then fires its next
/// wake immediately.
pub fn wall_clock_gap(current: &str, next: &str) -> Result<Duration, TimestampError> {
    let current = parse(current)?;
    let next = parse(next)?;
    Ok(next.signed_duration_since(current).to_std().unwrap_or(Duration::ZERO))
}

fn parse(value: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|source| TimestampError { value: value.to_string(), source })
}
