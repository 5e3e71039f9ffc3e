//! Conditional Delivery Decision
//!
//! Decides whether a device gets new bytes or a "not modified" signal.

use crate::server::artifacts::ArtifactRecord;
use crate::server::version::VersionDescriptor;
use chrono::TimeDelta;

/// Minimum lead of the stored artifact over the device's build stamp before
/// it counts as newer. The band absorbs clock skew and timestamp rounding
/// between the device toolchain and the server filesystem, so devices near
/// the boundary don't flap between "update" and "current".
pub const FRESHNESS_TOLERANCE_SECS: i64 = 60;

/// Outcome of a version negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Deliver,
    NotModified,
}

/// Pure freshness comparison: deliver iff the artifact's mtime leads the
/// device's build stamp by at least [`FRESHNESS_TOLERANCE_SECS`].
pub fn negotiate(descriptor: &VersionDescriptor, record: &ArtifactRecord) -> Decision {
    let delta = record.modified_at - descriptor.built_at;
    if delta >= TimeDelta::seconds(FRESHNESS_TOLERANCE_SECS) {
        Decision::Deliver
    } else {
        Decision::NotModified
    }
}
