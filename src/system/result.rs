//! Per-cycle summary returned to the host.

use crate::geometry::Pose;
use crate::measure::{MeasurementState, Status, Transition};

/// What the tracking half of a cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingOutcome {
    /// No active session: tracking skipped.
    SessionAbsent,
    /// Session active, hit-test source not available yet.
    Acquiring,
    /// No usable surface this cycle, or the host supplied no frame.
    NoSurface,
    /// Query produced a pose; the reticle shows it.
    Surface,
    /// Query failed; the source was invalidated for re-acquisition.
    QueryFailed,
}

/// Summary of one tracking cycle.
#[derive(Debug, Clone)]
pub struct CycleResult {
    /// Running cycle counter (1-based).
    pub cycle: u64,
    pub tracking: TrackingOutcome,
    pub pose: Option<Pose>,
    pub reticle_visible: bool,
    /// Transitions caused by select events drained at the start of the cycle.
    pub transitions: Vec<Transition>,
    pub state: MeasurementState,
    pub status: Status,
}
