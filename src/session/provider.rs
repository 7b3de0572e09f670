//! Interfaces consumed from the spatial runtime.
//!
//! The runtime owns the actual tracking: it mints reference spaces and
//! hit-test sources on request, and each tracking cycle exposes a frame that
//! can be queried for hit results against a source.

use crate::geometry::Pose;

use super::pending::Pending;
use super::types::{HitTestSource, ReferenceSpace, ReferenceSpaceKind};

/// Request side of an active tracking session.
///
/// Both requests are asynchronous: implementations return immediately and
/// answer through the [`Pending`] later (or right away).
pub trait TrackingSessionProvider {
    fn request_reference_space(&mut self, kind: ReferenceSpaceKind) -> Pending<ReferenceSpace>;

    fn request_hit_test_source(&mut self, space: ReferenceSpace) -> Pending<HitTestSource>;
}

/// One surface intersection reported for a cycle.
pub trait HitResult {
    /// Pose of the intersection in `space`, or `None` when it cannot be
    /// expressed there.
    fn pose(&self, space: &ReferenceSpace) -> Option<Pose>;
}

/// Per-cycle view of the runtime.
pub trait CycleFrame {
    type Hit: HitResult;

    /// Ordered hit results for `source` in this cycle.
    ///
    /// Errors when the runtime rejects the query, e.g. because the source has
    /// been invalidated internally.
    fn hit_test_results(&self, source: &HitTestSource) -> anyhow::Result<Vec<Self::Hit>>;
}
