use std::fmt;

/// Unique identifier for an entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Unique identifier for a component in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

/// Identifier of a transform node. Every entity owns exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformId(pub u32);

/// Identifier of an object pool registered with a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(pub u32);

/// Identifier handed out when registering an action listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// Monotonic id source owned by a scene.
/// Entities, components and transforms draw from the same counter, so an id
/// value is never reused within one scene.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_raw(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn entity(&mut self) -> EntityId {
        EntityId(self.next_raw())
    }

    pub fn component(&mut self) -> ComponentId {
        ComponentId(self.next_raw())
    }

    pub fn transform(&mut self) -> TransformId {
        TransformId(self.next_raw())
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
