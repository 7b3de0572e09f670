//! Per-cycle pose resolution.
//!
//! Queries the cycle for hit results against the stored hit-test source and
//! turns them into at most one pose in the session's base reference space.
//!
//! Which result wins is an explicit policy ([`HitSelection`]). The default
//! takes the first result, relying on the runtime ranking results by
//! confidence/proximity. [`HitSelection::NearestToOrigin`] ignores that
//! ordering and prefers hits close to where the base space is anchored.

use serde::{Deserialize, Serialize};

use crate::error::TrackingError;
use crate::geometry::Pose;
use crate::session::{CycleFrame, HitResult, HitTestSource, ReferenceSpace};

/// Rule for choosing one hit out of a cycle's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HitSelection {
    /// First result in runtime order. If its pose cannot be expressed in the
    /// reference space the cycle has no pose; later results are not consulted.
    #[default]
    First,
    /// Result closest to the base reference space origin, among those with
    /// a defined pose. For a `local` space that origin is where the session
    /// started, not the current viewer position.
    NearestToOrigin,
}

#[derive(Debug, Clone, Default)]
pub struct PoseResolver {
    selection: HitSelection,
}

impl PoseResolver {
    pub fn new(selection: HitSelection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> HitSelection {
        self.selection
    }

    /// Resolve this cycle's pose.
    ///
    /// `Ok(None)` means no surface this cycle. `Err` means the query itself
    /// failed; callers treat that as no pose and invalidate `source`.
    pub fn resolve<F>(
        &self,
        source: &HitTestSource,
        space: &ReferenceSpace,
        frame: &F,
    ) -> Result<Option<Pose>, TrackingError>
    where
        F: CycleFrame + ?Sized,
    {
        let hits = frame
            .hit_test_results(source)
            .map_err(|err| TrackingError::query(&err))?;

        let pose = match self.selection {
            HitSelection::First => hits.first().and_then(|hit| hit.pose(space)),
            HitSelection::NearestToOrigin => hits
                .iter()
                .filter_map(|hit| hit.pose(space))
                .min_by(|a, b| {
                    a.position()
                        .norm_squared()
                        .total_cmp(&b.position().norm_squared())
                }),
        };
        Ok(pose)
    }
}
