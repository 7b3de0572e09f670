//! Geometry utilities: SE3 transforms and runtime-delivered poses.

pub mod pose;
pub mod se3;

pub use pose::{Pose, position_of};
pub use se3::SE3;
