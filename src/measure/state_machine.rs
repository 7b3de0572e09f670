//! Measurement State Machine.
//!
//! A strict two-point cycle driven by select events:
//!
//! ```text
//!  AwaitingFirstPoint --tap--> AwaitingSecondPoint --tap--> Completed
//!          ^                                                    |
//!          +---------------------- tap (reset) -----------------+
//! ```
//!
//! Every tap first checks the reticle. Without a visible reticle nothing is
//! placed and the state is unchanged. Points are read from the reticle at the
//! moment of the tap, never from an earlier cycle.

use nalgebra::Vector3;
use tracing::{debug, info};

use crate::tracking::Reticle;

use super::markers::{EntityHandle, MarkerRegistry};
use super::scene::Scene;
use super::status::{format_distance, Status};

/// Workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementState {
    #[default]
    AwaitingFirstPoint,
    AwaitingSecondPoint,
    Completed,
}

/// Recorded points and the derived distance.
///
/// The point count is tied to the state by construction: 0, 1, and 2 points
/// for the three states, and a distance only when completed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Measurement {
    #[default]
    AwaitingFirstPoint,
    AwaitingSecondPoint { points: [Vector3<f64>; 1] },
    Completed {
        points: [Vector3<f64>; 2],
        distance: f64,
    },
}

impl Measurement {
    pub fn state(&self) -> MeasurementState {
        match self {
            Self::AwaitingFirstPoint => MeasurementState::AwaitingFirstPoint,
            Self::AwaitingSecondPoint { .. } => MeasurementState::AwaitingSecondPoint,
            Self::Completed { .. } => MeasurementState::Completed,
        }
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        match self {
            Self::AwaitingFirstPoint => &[],
            Self::AwaitingSecondPoint { points } => points,
            Self::Completed { points, .. } => points,
        }
    }

    /// Distance in meters, once both points are recorded.
    pub fn distance(&self) -> Option<f64> {
        match self {
            Self::Completed { distance, .. } => Some(*distance),
            _ => None,
        }
    }
}

/// What a select event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// No surface under the reticle; nothing changed.
    NoSurface,
    /// First point recorded.
    FirstPoint,
    /// Second point recorded and distance computed.
    Completed { distance: f64 },
    /// Previous measurement cleared.
    Reset,
}

impl Transition {
    /// Status line that follows this transition.
    pub fn status(&self) -> Status {
        match self {
            Self::NoSurface => Status::NoSurfaceDetected,
            Self::FirstPoint => Status::TapSecondPoint,
            Self::Completed { distance } => Status::Distance(*distance),
            Self::Reset => Status::Reset,
        }
    }
}

/// Euclidean distance between two points.
pub fn distance_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (b - a).norm()
}

/// Drives the two-point workflow and owns the handles of what it placed.
#[derive(Debug, Default)]
pub struct MeasurementStateMachine {
    measurement: Measurement,
    markers: Vec<EntityHandle>,
    segment: Option<EntityHandle>,
}

impl MeasurementStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measurement(&self) -> &Measurement {
        &self.measurement
    }

    pub fn state(&self) -> MeasurementState {
        self.measurement.state()
    }

    /// Handles of the markers placed for the current measurement.
    pub fn markers(&self) -> &[EntityHandle] {
        &self.markers
    }

    pub fn segment(&self) -> Option<EntityHandle> {
        self.segment
    }

    /// Handle a select event against the reticle as it is right now.
    pub fn on_select<S: Scene>(
        &mut self,
        reticle: &Reticle,
        registry: &mut MarkerRegistry<S>,
    ) -> Transition {
        let Some(position) = reticle.position() else {
            debug!(state = ?self.state(), "Select ignored: no surface under reticle");
            return Transition::NoSurface;
        };

        match self.measurement {
            Measurement::AwaitingFirstPoint => {
                self.markers.push(registry.create(position));
                self.measurement = Measurement::AwaitingSecondPoint { points: [position] };
                info!(
                    "First point at [{:.3}, {:.3}, {:.3}]",
                    position.x, position.y, position.z
                );
                Transition::FirstPoint
            }
            Measurement::AwaitingSecondPoint { points: [first] } => {
                self.markers.push(registry.create(position));
                let distance = distance_between(&first, &position);
                self.segment = Some(registry.create_segment(first, position));
                self.measurement = Measurement::Completed {
                    points: [first, position],
                    distance,
                };
                info!("Measurement completed: {} m", format_distance(distance));
                Transition::Completed { distance }
            }
            Measurement::Completed { .. } => {
                let released = self.clear(registry);
                info!(released, "Measurement reset");
                Transition::Reset
            }
        }
    }

    /// Dispose every marker and the segment, and return to the first state.
    ///
    /// Returns the number of entities released.
    pub fn clear<S: Scene>(&mut self, registry: &mut MarkerRegistry<S>) -> usize {
        let handles = self.markers.drain(..).chain(self.segment.take());
        let released = registry.dispose_all(handles);
        self.measurement = Measurement::AwaitingFirstPoint;
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Pose;
    use crate::measure::markers::{MarkerStyle, SegmentStyle};
    use crate::measure::scene::RecordingScene;
    use crate::tracking::ReticleController;
    use approx::assert_relative_eq;

    fn registry() -> MarkerRegistry<RecordingScene> {
        MarkerRegistry::new(
            RecordingScene::new(),
            MarkerStyle::default(),
            SegmentStyle::default(),
        )
    }

    fn reticle_at(x: f64, y: f64, z: f64) -> ReticleController {
        let mut controller = ReticleController::new();
        controller.update(Some(&Pose::from_position(Vector3::new(x, y, z))));
        controller
    }

    fn assert_invariants(sm: &MeasurementStateMachine, registry: &MarkerRegistry<RecordingScene>) {
        let m = sm.measurement();
        let expected_len = match sm.state() {
            MeasurementState::AwaitingFirstPoint => 0,
            MeasurementState::AwaitingSecondPoint => 1,
            MeasurementState::Completed => 2,
        };
        assert_eq!(m.points().len(), expected_len);
        assert_eq!(sm.markers().len(), expected_len);
        assert_eq!(m.distance().is_some(), sm.state() == MeasurementState::Completed);
        assert_eq!(
            registry.live_segment_count() == 1,
            sm.state() == MeasurementState::Completed
        );
        assert_eq!(registry.live_marker_count(), expected_len);
    }

    #[test]
    fn test_two_taps_complete() {
        let mut sm = MeasurementStateMachine::new();
        let mut registry = registry();

        assert_eq!(
            sm.on_select(reticle_at(0.0, 0.0, 0.0).reticle(), &mut registry),
            Transition::FirstPoint
        );
        assert_invariants(&sm, &registry);

        let t = sm.on_select(reticle_at(3.0, 4.0, 0.0).reticle(), &mut registry);
        assert_eq!(t, Transition::Completed { distance: 5.0 });
        assert_eq!(t.status().to_string(), "Distance: 5.00 m");
        assert_invariants(&sm, &registry);
        assert_eq!(
            sm.measurement().points(),
            &[Vector3::new(0.0, 0.0, 0.0), Vector3::new(3.0, 4.0, 0.0)]
        );
    }

    #[test]
    fn test_no_surface_changes_nothing() {
        let mut sm = MeasurementStateMachine::new();
        let mut registry = registry();
        let hidden = ReticleController::new();

        for _ in 0..3 {
            assert_eq!(sm.on_select(hidden.reticle(), &mut registry), Transition::NoSurface);
        }
        assert_eq!(sm.state(), MeasurementState::AwaitingFirstPoint);
        assert_eq!(registry.live_count(), 0);

        sm.on_select(reticle_at(1.0, 0.0, 0.0).reticle(), &mut registry);
        assert_eq!(sm.on_select(hidden.reticle(), &mut registry), Transition::NoSurface);
        assert_eq!(sm.state(), MeasurementState::AwaitingSecondPoint);
        assert_invariants(&sm, &registry);
    }

    #[test]
    fn test_tap_after_completion_resets() {
        let mut sm = MeasurementStateMachine::new();
        let mut registry = registry();

        sm.on_select(reticle_at(0.0, 0.0, 0.0).reticle(), &mut registry);
        sm.on_select(reticle_at(1.0, 0.0, 0.0).reticle(), &mut registry);
        let placed: Vec<_> = sm.markers().iter().copied().chain(sm.segment()).collect();

        let t = sm.on_select(reticle_at(5.0, 5.0, 5.0).reticle(), &mut registry);
        assert_eq!(t, Transition::Reset);
        assert_eq!(t.status(), Status::Reset);
        assert_eq!(sm.state(), MeasurementState::AwaitingFirstPoint);
        assert!(sm.measurement().points().is_empty());
        assert!(sm.segment().is_none());
        assert_eq!(registry.live_count(), 0);
        assert!(placed.iter().all(|h| !registry.is_live(*h)));
        assert_eq!(registry.scene().allocated_count(), 0);
        assert_invariants(&sm, &registry);
    }

    #[test]
    fn test_reset_tap_needs_surface() {
        let mut sm = MeasurementStateMachine::new();
        let mut registry = registry();

        sm.on_select(reticle_at(0.0, 0.0, 0.0).reticle(), &mut registry);
        sm.on_select(reticle_at(1.0, 0.0, 0.0).reticle(), &mut registry);

        let hidden = ReticleController::new();
        assert_eq!(sm.on_select(hidden.reticle(), &mut registry), Transition::NoSurface);
        assert_eq!(sm.state(), MeasurementState::Completed);
        assert_eq!(registry.live_count(), 3);
    }

    #[test]
    fn test_repeated_cycles_do_not_leak() {
        let mut sm = MeasurementStateMachine::new();
        let mut registry = registry();

        for i in 0..4 {
            let x = i as f64;
            sm.on_select(reticle_at(x, 0.0, 0.0).reticle(), &mut registry);
            sm.on_select(reticle_at(x, 0.0, 2.0).reticle(), &mut registry);
            assert_relative_eq!(sm.measurement().distance().unwrap(), 2.0);
            sm.on_select(reticle_at(x, 0.0, 0.0).reticle(), &mut registry);
            assert_invariants(&sm, &registry);
        }
        assert_eq!(registry.scene().allocated_count(), 0);
        assert_eq!(registry.scene().disposed().len(), 12);
    }

    #[test]
    fn test_clear_is_safe_when_empty() {
        let mut sm = MeasurementStateMachine::new();
        let mut registry = registry();

        assert_eq!(sm.clear(&mut registry), 0);
        sm.on_select(reticle_at(0.0, 0.0, 0.0).reticle(), &mut registry);
        assert_eq!(sm.clear(&mut registry), 1);
        assert_invariants(&sm, &registry);
    }

    #[test]
    fn test_distance_examples() {
        assert_relative_eq!(
            distance_between(&Vector3::zeros(), &Vector3::new(1.0, 0.0, 0.0)),
            1.0
        );
        assert_relative_eq!(
            distance_between(&Vector3::zeros(), &Vector3::new(3.0, 4.0, 0.0)),
            5.0
        );
        assert_eq!(format_distance(1.0), "1.00");
        assert_eq!(format_distance(5.0), "5.00");
    }
}
