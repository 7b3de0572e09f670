//! Two-point measurement: the state machine, the registry that owns the
//! markers it places, the scene those markers live in, and the status line.

pub mod markers;
pub mod scene;
pub mod state_machine;
pub mod status;

pub use markers::{EntityHandle, MarkerRegistry, MarkerStyle, SegmentStyle};
pub use scene::{Entity, EntityId, RecordingScene, Scene};
pub use state_machine::{
    distance_between, Measurement, MeasurementState, MeasurementStateMachine, Transition,
};
pub use status::{format_distance, Status};
