use crate::Handle;
use glam::{Quat, Vec3};

/// Marker for entities owned by the scene graph.
pub enum Entity {}

pub type EntityHandle = Handle<Entity>;

/// Receiver of the final joint transforms produced by a graph tick.
pub trait SceneGraph {
    fn set_entity_position(&mut self, entity: EntityHandle, position: Vec3);
    fn set_entity_rotation(&mut self, entity: EntityHandle, rotation: Quat);
    fn set_entity_scale(&mut self, entity: EntityHandle, scale: Vec3);
}
