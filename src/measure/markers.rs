//! Marker Registry - owner of every marker and segment in the scene.
//!
//! Entities are referred to by lightweight [`EntityHandle`]s. The registry
//! keeps the authoritative set of live entities, so releasing a handle twice
//! (or a handle from a previous measurement) is a harmless no-op rather than a
//! double free in the renderer.

use std::collections::HashMap;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::scene::{Entity, EntityId, Scene};

/// Appearance of point markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    /// Sphere radius in meters.
    pub radius: f64,
    /// 0xRRGGBB.
    pub color: u32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 0.01,
            color: 0xff0000,
        }
    }
}

/// Appearance of the connecting segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentStyle {
    pub color: u32,
}

impl Default for SegmentStyle {
    fn default() -> Self {
        Self { color: 0x00ff00 }
    }
}

/// Handle to an entity created through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(EntityId);

impl EntityHandle {
    pub fn id(&self) -> EntityId {
        self.0
    }
}

/// Creates and disposes marker/segment entities on a [`Scene`].
#[derive(Debug)]
pub struct MarkerRegistry<S: Scene> {
    scene: S,
    live: HashMap<EntityId, Entity>,
    next_id: u64,
    marker_style: MarkerStyle,
    segment_style: SegmentStyle,
}

impl<S: Scene> MarkerRegistry<S> {
    pub fn new(scene: S, marker_style: MarkerStyle, segment_style: SegmentStyle) -> Self {
        Self {
            scene,
            live: HashMap::new(),
            next_id: 0,
            marker_style,
            segment_style,
        }
    }

    /// Place a marker at a world position.
    pub fn create(&mut self, position: Vector3<f64>) -> EntityHandle {
        let entity = Entity::Marker {
            position,
            radius: self.marker_style.radius,
            color: self.marker_style.color,
        };
        self.insert(entity)
    }

    /// Place a segment between two world positions.
    pub fn create_segment(&mut self, start: Vector3<f64>, end: Vector3<f64>) -> EntityHandle {
        let entity = Entity::Segment {
            start,
            end,
            color: self.segment_style.color,
        };
        self.insert(entity)
    }

    fn insert(&mut self, entity: Entity) -> EntityHandle {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.scene.add(id, &entity);
        debug!(entity = %id, segment = entity.is_segment(), "Entity created");
        self.live.insert(id, entity);
        EntityHandle(id)
    }

    /// Remove the entity from the scene and release its resources.
    ///
    /// Returns false if the handle was already disposed.
    pub fn dispose(&mut self, handle: EntityHandle) -> bool {
        match self.live.remove(&handle.0) {
            Some(_) => {
                self.scene.remove(handle.0);
                self.scene.dispose(handle.0);
                true
            }
            None => false,
        }
    }

    /// Dispose every handle. Returns how many were still live.
    pub fn dispose_all<I>(&mut self, handles: I) -> usize
    where
        I: IntoIterator<Item = EntityHandle>,
    {
        handles
            .into_iter()
            .filter(|handle| self.dispose(*handle))
            .count()
    }

    pub fn is_live(&self, handle: EntityHandle) -> bool {
        self.live.contains_key(&handle.0)
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.live.get(&handle.0)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_segment_count(&self) -> usize {
        self.live.values().filter(|e| e.is_segment()).count()
    }

    pub fn live_marker_count(&self) -> usize {
        self.live_count() - self.live_segment_count()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::scene::RecordingScene;

    fn registry() -> MarkerRegistry<RecordingScene> {
        MarkerRegistry::new(
            RecordingScene::new(),
            MarkerStyle::default(),
            SegmentStyle::default(),
        )
    }

    #[test]
    fn test_create_marker_and_segment() {
        let mut registry = registry();
        let a = registry.create(Vector3::new(0.0, 0.0, 0.0));
        let b = registry.create(Vector3::new(1.0, 0.0, 0.0));
        let s = registry.create_segment(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));

        assert_ne!(a, b);
        assert_eq!(registry.live_marker_count(), 2);
        assert_eq!(registry.live_segment_count(), 1);
        assert_eq!(registry.scene().shown_count(), 3);
        assert_eq!(
            registry.get(a),
            Some(&Entity::Marker {
                position: Vector3::zeros(),
                radius: 0.01,
                color: 0xff0000
            })
        );
        assert!(registry.get(s).unwrap().is_segment());
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut registry = registry();
        let a = registry.create(Vector3::new(0.0, 1.0, 0.0));

        assert!(registry.dispose(a));
        assert!(!registry.dispose(a));
        assert!(!registry.is_live(a));
        assert_eq!(registry.scene().disposed().len(), 1);
        assert_eq!(registry.scene().allocated_count(), 0);
    }

    #[test]
    fn test_dispose_all_releases_everything() {
        let mut registry = registry();
        let a = registry.create(Vector3::zeros());
        let b = registry.create(Vector3::x());
        let s = registry.create_segment(Vector3::zeros(), Vector3::x());
        registry.dispose(b);

        assert_eq!(registry.dispose_all([a, b, s]), 2);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.scene().shown_count(), 0);
        assert_eq!(registry.scene().allocated_count(), 0);
    }

    #[test]
    fn test_styles_applied() {
        let mut registry = MarkerRegistry::new(
            RecordingScene::new(),
            MarkerStyle {
                radius: 0.02,
                color: 0x0000ff,
            },
            SegmentStyle { color: 0xffffff },
        );
        let s = registry.create_segment(Vector3::zeros(), Vector3::y());

        match registry.get(s) {
            Some(Entity::Segment { color, .. }) => assert_eq!(*color, 0xffffff),
            other => panic!("expected segment, got {:?}", other),
        }
    }
}
