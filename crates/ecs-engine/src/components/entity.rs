use crate::api::types::{ComponentId, EntityId, TransformId};

/// A named container that owns one transform and a list of components.
/// Entities carry no behaviour of their own; everything an entity does comes
/// from its components.
#[derive(Debug, Clone)]
pub struct Entity {
    pub(crate) id: EntityId,
    /// Name for lookup and diagnostics. Not required to be unique.
    pub name: String,
    pub(crate) transform: TransformId,
    pub(crate) components: Vec<ComponentId>,
    pub(crate) active: bool,
    /// Whether the entity is registered in a scene.
    pub(crate) attached: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: impl Into<String>, transform: TransformId) -> Self {
        Self {
            id,
            name: name.into(),
            transform,
            components: Vec::new(),
            active: true,
            attached: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn transform(&self) -> TransformId {
        self.transform
    }

    /// Components in attachment order.
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}
