//! Surface indicator state.

use nalgebra::{Matrix4, Vector3};

use crate::geometry::{position_of, Pose};

/// The indicator that shows the current surface estimate.
///
/// Its transform is absolute: it is overwritten from the resolved pose each
/// cycle and is never composed with a parent or smoothed.
#[derive(Debug, Clone, PartialEq)]
pub struct Reticle {
    visible: bool,
    transform: Matrix4<f64>,
}

impl Reticle {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn transform(&self) -> &Matrix4<f64> {
        &self.transform
    }

    /// Current surface position, if the reticle is showing one.
    pub fn position(&self) -> Option<Vector3<f64>> {
        self.visible.then(|| position_of(&self.transform))
    }
}

impl Default for Reticle {
    fn default() -> Self {
        Self {
            visible: false,
            transform: Matrix4::identity(),
        }
    }
}

/// Sole writer of the [`Reticle`].
#[derive(Debug, Clone, Default)]
pub struct ReticleController {
    reticle: Reticle,
}

impl ReticleController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this cycle's pose. A missing pose hides the reticle immediately;
    /// the last transform is kept but no longer reported.
    pub fn update(&mut self, pose: Option<&Pose>) {
        match pose {
            Some(pose) => {
                self.reticle.visible = true;
                self.reticle.transform = *pose.matrix();
            }
            None => self.reticle.visible = false,
        }
    }

    pub fn reticle(&self) -> &Reticle {
        &self.reticle
    }
}
