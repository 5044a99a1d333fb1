//! Size-budgeted grouping of observations into sink resources.
//!
//! Observations are packed into contiguous groups whose serialized size
//! approximates the configured target resource size. The estimate uses a
//! single sample (the first observation of the slice) rather than measuring
//! every observation: O(1) estimation cost, at the price that heterogeneous
//! observation sizes can make the real serialized size deviate from the
//! target. An accepted trade-off, not a guarantee.

use crate::core::{Observation, ResourceGroup};
use tracing::debug;

/// Number of observations packed per group for a given target resource size
/// and sample serialized size.
pub fn observations_per_group(target_resource_size: usize, sample_size: usize) -> usize {
    1 + target_resource_size / sample_size.max(1)
}

/// Partition an ordered slice of observations into contiguous groups sized
/// to approximate `target_resource_size` bytes each.
///
/// The partition is lossless and order-preserving: concatenating the groups
/// reproduces the input exactly. The last group may be shorter, and the
/// first group may exceed the budget when a single observation alone does.
pub fn group_observations(
    observations: Vec<Observation>,
    target_resource_size: usize,
) -> Vec<ResourceGroup> {
    // Empty input returns an empty partition without touching the sample.
    if observations.is_empty() {
        return Vec::new();
    }
    let sample_size = observations[0].serialized_len();
    let per_group = observations_per_group(target_resource_size, sample_size);
    debug!(
        sample_size,
        target_resource_size, per_group, "grouping observations into sink resources"
    );

    let mut groups = Vec::with_capacity(observations.len().div_ceil(per_group));
    let mut members = observations.into_iter();
    loop {
        let group: Vec<Observation> = members.by_ref().take(per_group).collect();
        if group.is_empty() {
            break;
        }
        groups.push(ResourceGroup::new(group));
    }
    groups
}
