//! Fixtures shared by the runtime tests.

use crate::{
    AnimationHandle, AnimationLibrary, AnimationSource, AnimationTrack, Channel, EntityHandle,
    Interpolation, Keyframe, SceneGraph,
};
use glam::{Quat, Vec3};
use std::collections::HashMap;

pub(crate) fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-4,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

pub(crate) fn entity(index: u32) -> EntityHandle {
    EntityHandle::from_raw_parts(index, 1)
}

/// Track holding joint `node_index` at `position` for `duration` seconds.
pub(crate) fn hold_position(node_index: u16, position: Vec3, duration: f32) -> AnimationTrack {
    AnimationTrack::new(format!("hold {node_index}"), duration).with_channel(Channel::position(
        node_index,
        Interpolation::Linear,
        vec![
            Keyframe::new(0.0, position),
            Keyframe::new(duration, position),
        ],
    ))
}

/// Track moving joint `node_index` from the origin to `to` over `duration` seconds.
pub(crate) fn slide(node_index: u16, to: Vec3, duration: f32) -> AnimationTrack {
    AnimationTrack::new("slide", duration).with_channel(Channel::position(
        node_index,
        Interpolation::Linear,
        vec![Keyframe::new(0.0, Vec3::ZERO), Keyframe::new(duration, to)],
    ))
}

/// Animation library plus a scene graph recording every write.
#[derive(Debug)]
pub(crate) struct TestWorld {
    pub(crate) library: AnimationLibrary,
    pub(crate) positions: HashMap<EntityHandle, Vec3>,
    pub(crate) rotations: HashMap<EntityHandle, Quat>,
    pub(crate) scales: HashMap<EntityHandle, Vec3>,
    pub(crate) writes: usize,
}

impl TestWorld {
    pub(crate) fn new() -> Self {
        Self {
            library: AnimationLibrary::new(32),
            positions: HashMap::new(),
            rotations: HashMap::new(),
            scales: HashMap::new(),
            writes: 0,
        }
    }

    pub(crate) fn add(&mut self, track: AnimationTrack) -> AnimationHandle {
        self.library.add(track).unwrap()
    }

    pub(crate) fn position(&self, entity: EntityHandle) -> Vec3 {
        *self
            .positions
            .get(&entity)
            .unwrap_or_else(|| panic!("no position written for {entity}"))
    }
}

impl AnimationSource for TestWorld {
    fn animation(&self, handle: AnimationHandle) -> Option<&AnimationTrack> {
        self.library.animation(handle)
    }
}

impl SceneGraph for TestWorld {
    fn set_entity_position(&mut self, entity: EntityHandle, position: Vec3) {
        self.positions.insert(entity, position);
        self.writes += 1;
    }

    fn set_entity_rotation(&mut self, entity: EntityHandle, rotation: Quat) {
        self.rotations.insert(entity, rotation);
        self.writes += 1;
    }

    fn set_entity_scale(&mut self, entity: EntityHandle, scale: Vec3) {
        self.scales.insert(entity, scale);
        self.writes += 1;
    }
}
