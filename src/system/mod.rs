//! System orchestration.
//!
//! This module contains the top-level `MeasureSystem` that owns the tracking
//! and measurement components, along with the per-cycle result type it hands
//! back to the host loop.

mod measure_system;
pub mod result;

pub use measure_system::{ActiveSession, MeasureSystem};
pub use result::{CycleResult, TrackingOutcome};
