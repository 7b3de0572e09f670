//! Surface tracking: hit-test source acquisition, per-cycle pose resolution,
//! and the reticle that shows the result.
//!
//! Per cycle the pieces run in order: the source manager makes sure a
//! hit-test source exists, the resolver turns the cycle's hits into at most
//! one pose, and the reticle controller shows or hides the indicator.

pub mod pose_resolver;
pub mod reticle;
pub mod source_manager;

pub use pose_resolver::{HitSelection, PoseResolver};
pub use reticle::{Reticle, ReticleController};
pub use source_manager::{SourceManagerStats, TrackingSourceManager};
