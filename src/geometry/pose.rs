//! Poses as delivered by a spatial runtime.
//!
//! A runtime hands out a homogeneous 4x4 transform per hit result, usually as
//! a flat column-major array of 16 floats. [`Pose`] keeps that raw matrix
//! untouched so the reticle can take it over verbatim; helpers extract the
//! translation for measurement.

use nalgebra::{Matrix4, Vector3};

use super::SE3;

/// Homogeneous transform expressed in some reference space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    matrix: Matrix4<f64>,
}

impl Pose {
    /// Wrap a homogeneous matrix.
    ///
    /// Returns `None` when any entry is non-finite: such a transform cannot be
    /// expressed in the frame and is treated as an undefined pose.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Option<Self> {
        if matrix.iter().all(|v| v.is_finite()) {
            Some(Self { matrix })
        } else {
            None
        }
    }

    /// Build from a flat column-major array (the layout spatial runtimes use).
    pub fn from_column_major(values: &[f64; 16]) -> Option<Self> {
        Self::from_matrix(Matrix4::from_column_slice(values))
    }

    /// Pose at a position with identity orientation.
    pub fn from_position(position: Vector3<f64>) -> Self {
        Self {
            matrix: SE3::from_translation(position).to_matrix(),
        }
    }

    /// Pose from a rigid transform.
    pub fn from_se3(t: &SE3) -> Self {
        Self {
            matrix: t.to_matrix(),
        }
    }

    /// Raw homogeneous matrix.
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Translation part (last column).
    pub fn position(&self) -> Vector3<f64> {
        position_of(&self.matrix)
    }

    /// Flat column-major copy of the matrix.
    pub fn to_column_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.matrix.as_slice());
        out
    }
}

/// Translation column of a homogeneous matrix.
pub fn position_of(matrix: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
}
