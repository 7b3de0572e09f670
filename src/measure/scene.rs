//! Scene collaborator.
//!
//! The renderer itself lives outside this crate. The core only needs to add
//! visual entities, take them out again, and release their graphics
//! resources; [`Scene`] is that surface. [`RecordingScene`] keeps everything
//! in memory and is what the demo and the tests render into.

use std::collections::HashMap;

use nalgebra::Vector3;

/// Identifier of an entity placed in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Visual entities created by the measurement workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// Small sphere at a recorded point.
    Marker {
        position: Vector3<f64>,
        radius: f64,
        color: u32,
    },
    /// Straight line between two recorded points.
    Segment {
        start: Vector3<f64>,
        end: Vector3<f64>,
        color: u32,
    },
}

impl Entity {
    pub fn is_segment(&self) -> bool {
        matches!(self, Self::Segment { .. })
    }
}

/// Operations consumed from the renderer.
pub trait Scene {
    /// Allocate graphics resources for `entity` and show it.
    fn add(&mut self, id: EntityId, entity: &Entity);

    /// Take the entity out of the rendered scene.
    fn remove(&mut self, id: EntityId);

    /// Release the entity's geometry and material.
    fn dispose(&mut self, id: EntityId);
}

/// In-memory scene that tracks what is shown and what was released.
#[derive(Debug, Default)]
pub struct RecordingScene {
    shown: HashMap<EntityId, Entity>,
    allocated: HashMap<EntityId, Entity>,
    disposed: Vec<EntityId>,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities currently in the rendered scene.
    pub fn shown(&self) -> impl Iterator<Item = (&EntityId, &Entity)> {
        self.shown.iter()
    }

    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }

    /// Entities holding graphics resources (shown or not).
    pub fn allocated_count(&self) -> usize {
        self.allocated.len()
    }

    /// Every dispose call received, in order.
    pub fn disposed(&self) -> &[EntityId] {
        &self.disposed
    }

    pub fn is_shown(&self, id: EntityId) -> bool {
        self.shown.contains_key(&id)
    }
}

impl Scene for RecordingScene {
    fn add(&mut self, id: EntityId, entity: &Entity) {
        self.allocated.insert(id, entity.clone());
        self.shown.insert(id, entity.clone());
    }

    fn remove(&mut self, id: EntityId) {
        self.shown.remove(&id);
    }

    fn dispose(&mut self, id: EntityId) {
        self.allocated.remove(&id);
        self.disposed.push(id);
    }
}
