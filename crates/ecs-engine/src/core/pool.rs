//! Entity object pool.
//!
//! Pooled entities stay in the scene; releasing one just deactivates it and
//! parks it in the free list. `instantiate` reuses a parked entity when there
//! is one and only calls the factory when the free list is empty.

use glam::Vec2;

use crate::api::types::EntityId;
use crate::core::scene::Scene;
use crate::error::{EngineError, Result};

/// Builds a fresh pooled entity at a position and rotation. The factory is
/// responsible for adding the entity to the scene.
pub type EntityFactory = Box<dyn FnMut(&mut Scene, Vec2, f32) -> EntityId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    entity: EntityId,
    live: bool,
}

pub struct ObjectPool {
    factory: EntityFactory,
    slots: Vec<Option<Slot>>,
    /// Slots holding a released entity, ready for reuse.
    free: Vec<usize>,
    /// Empty slots left behind by forgotten entities.
    vacant: Vec<usize>,
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub live: usize,
    pub free: usize,
}

impl ObjectPool {
    pub fn new(factory: EntityFactory) -> Self {
        Self {
            factory,
            slots: Vec::new(),
            free: Vec::new(),
            vacant: Vec::new(),
        }
    }

    fn store(&mut self, slot: Slot) -> usize {
        match self.vacant.pop() {
            Some(index) => {
                self.slots[index] = Some(slot);
                index
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        }
    }

    /// Build `count` entities up front and park them, deactivated.
    pub fn prefill(&mut self, scene: &mut Scene, count: usize) {
        for _ in 0..count {
            let entity = (self.factory)(scene, Vec2::ZERO, 0.0);
            scene.set_entity_active(entity, false);
            let index = self.store(Slot { entity, live: false });
            self.free.push(index);
        }
    }

    /// Hand out an entity placed at `position` with `rotation`. Only position
    /// and rotation are reset; any other state the entity carried when it was
    /// released is kept.
    pub fn instantiate(&mut self, scene: &mut Scene, position: Vec2, rotation: f32) -> EntityId {
        while let Some(index) = self.free.pop() {
            let Some(entity) = self.slots[index].map(|s| s.entity) else { continue };
            if !scene.contains_entity(entity) {
                // Destroyed behind our back.
                self.slots[index] = None;
                self.vacant.push(index);
                continue;
            }
            if let Some(slot) = self.slots[index].as_mut() {
                slot.live = true;
            }
            if let Some(t) = scene.transform_mut(entity) {
                t.position = position;
                t.rotation = rotation;
            }
            scene.set_entity_active(entity, true);
            return entity;
        }

        let entity = (self.factory)(scene, position, rotation);
        self.store(Slot { entity, live: true });
        scene.set_entity_active(entity, true);
        entity
    }

    /// Return a live entity to the pool and deactivate it.
    pub fn release(&mut self, scene: &mut Scene, entity: EntityId) -> Result<()> {
        let index = self
            .slots
            .iter()
            .position(|s| s.is_some_and(|s| s.entity == entity))
            .ok_or(EngineError::NotPooled(entity))?;
        let slot = self.slots[index].as_mut().ok_or(EngineError::NotPooled(entity))?;
        if !slot.live {
            return Err(EngineError::AlreadyReleased(entity));
        }
        slot.live = false;
        self.free.push(index);
        scene.set_entity_active(entity, false);
        Ok(())
    }

    /// Drop an entity from the pool without touching the scene. Used when the
    /// entity is destroyed.
    pub fn forget(&mut self, entity: EntityId) -> bool {
        let Some(index) = self.slots.iter().position(|s| s.is_some_and(|s| s.entity == entity)) else {
            return false;
        };
        self.slots[index] = None;
        self.free.retain(|&i| i != index);
        self.vacant.push(index);
        true
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.slots.iter().flatten().any(|s| s.entity == entity)
    }

    pub fn stats(&self) -> PoolStats {
        let live = self.slots.iter().flatten().filter(|s| s.live).count();
        PoolStats {
            live,
            free: self.free.len(),
        }
    }
}
