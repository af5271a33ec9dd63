use std::collections::HashMap;

use glam::{Affine2, Vec2};

use crate::api::game::EngineConfig;
use crate::api::types::{ComponentId, EntityId, IdAllocator, ListenerId, PoolId};
use crate::components::component::{
    Capabilities, Component, ComponentDesc, ComponentRef, LifecycleEvent, Payload,
};
use crate::components::entity::Entity;
use crate::components::tilemap::HexTileMap;
use crate::core::pool::{ObjectPool, PoolStats};
use crate::core::transform::{Transform, Transforms};
use crate::error::{EngineError, Result};
use crate::input::bindings::{InputMap, InputResponse, KeyBinding, KeyEdge, KeyEvent};
use crate::renderer::camera::{Camera, Viewport};
use crate::renderer::traits::Surface;
use crate::systems::collision::{resolve_collisions, CollisionMatrix, CollisionStats};
use crate::systems::render::draw_scene;

/// Owns every entity, component and transform, plus the registries that
/// decide which of them take part in a frame.
///
/// Storage is keyed arenas plus flat `Vec` registries kept in insertion
/// order. Designed for small-to-medium counts (hundreds, not millions).
///
/// Hooks receive `&mut Scene`. While a hook runs it is taken out of its
/// component and put back afterwards, so hooks may freely add, remove and
/// destroy objects, including their own.
pub struct Scene {
    config: EngineConfig,
    viewport: Viewport,
    ids: IdAllocator,
    entities: HashMap<EntityId, Entity>,
    components: HashMap<ComponentId, Component>,
    transforms: Transforms,
    attached_entities: Vec<EntityId>,
    attached_components: Vec<ComponentId>,
    updatables: Vec<ComponentId>,
    late_updatables: Vec<ComponentId>,
    renderables: Vec<ComponentId>,
    gizmo_drawables: Vec<ComponentId>,
    collidables: Vec<ComponentId>,
    camera: Option<ComponentId>,
    input: InputMap,
    pools: Vec<Option<ObjectPool>>,
    collision_stats: CollisionStats,
    elapsed: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Scene {
    pub fn new(config: EngineConfig) -> Self {
        log::info!(
            "scene created: virtual {}x{}, debug={}",
            config.virtual_width,
            config.virtual_height,
            config.debug
        );
        Self {
            viewport: Viewport::new(config.virtual_width, config.virtual_height),
            config,
            ids: IdAllocator::new(),
            entities: HashMap::with_capacity(256),
            components: HashMap::with_capacity(256),
            transforms: Transforms::new(),
            attached_entities: Vec::with_capacity(256),
            attached_components: Vec::with_capacity(256),
            updatables: Vec::new(),
            late_updatables: Vec::new(),
            renderables: Vec::new(),
            gizmo_drawables: Vec::new(),
            collidables: Vec::new(),
            camera: None,
            input: InputMap::new(),
            pools: Vec::new(),
            collision_stats: CollisionStats::default(),
            elapsed: 0.0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Seconds of simulated time accumulated by `update`.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    // -- Entities --

    /// Create an unattached entity with a fresh transform at the origin.
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        let id = self.ids.entity();
        let transform = self.ids.transform();
        self.transforms.insert(transform, Transform::new());
        self.entities.insert(id, Entity::new(id, name, transform));
        id
    }

    /// `create_entity` followed by `add_entity`.
    pub fn spawn_entity(&mut self, name: impl Into<String>) -> EntityId {
        let id = self.create_entity(name);
        self.register_entity(id);
        id
    }

    /// Attach an entity and all of its components. Re-adding is a no-op.
    pub fn add_entity(&mut self, id: EntityId) -> Result<()> {
        if !self.entities.contains_key(&id) {
            return Err(EngineError::UnknownEntity(id));
        }
        self.register_entity(id);
        Ok(())
    }

    fn register_entity(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(&id) else { return };
        if entity.attached {
            return;
        }
        entity.attached = true;
        let components = entity.components.clone();
        self.attached_entities.push(id);
        log::debug!("{id} added to scene");
        for cid in components {
            self.register_component(cid);
        }
    }

    /// Detach an entity and its components from the registries. The entity
    /// and its components survive and can be re-added. Returns `false` if the
    /// entity was not attached.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else { return false };
        if !entity.attached {
            return false;
        }
        entity.attached = false;
        let components = entity.components.clone();
        self.attached_entities.retain(|&e| e != id);
        log::debug!("{id} removed from scene");
        for cid in components {
            self.unregister_component(cid);
        }
        true
    }

    /// Remove the entity for good: its components get `Destroy` and are
    /// deleted, its transform is destroyed (children are orphaned, not
    /// destroyed) and any pool forgets it.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.entities.contains_key(&id) {
            return false;
        }
        self.remove_entity(id);
        let components = self.components_of(id).to_vec();
        for cid in components {
            self.destroy_component(cid);
        }
        // A destroy hook may already have taken the entity down.
        let Some(entity) = self.entities.remove(&id) else { return true };
        self.transforms.destroy(entity.transform);
        for pool in self.pools.iter_mut().flatten() {
            pool.forget(id);
        }
        log::debug!("{id} destroyed");
        true
    }

    /// Toggle an entity and cascade the flag to each of its components.
    pub fn set_entity_active(&mut self, id: EntityId, active: bool) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else { return false };
        entity.active = active;
        let components = entity.components.clone();
        for cid in components {
            self.set_component_active(cid, active);
        }
        true
    }

    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Attached entities in the order they were added.
    pub fn entities(&self) -> &[EntityId] {
        &self.attached_entities
    }

    /// First attached entity with this name.
    pub fn find_entity(&self, name: &str) -> Option<EntityId> {
        self.attached_entities
            .iter()
            .copied()
            .find(|id| self.entities.get(id).is_some_and(|e| e.name == name))
    }

    pub fn components_of(&self, entity: EntityId) -> &[ComponentId] {
        self.entities.get(&entity).map(|e| e.components()).unwrap_or(&[])
    }

    /// First component of `entity` matching `pred`.
    pub fn find_component(&self, entity: EntityId, pred: impl Fn(&Component) -> bool) -> Option<ComponentId> {
        self.components_of(entity)
            .iter()
            .copied()
            .find(|cid| self.components.get(cid).is_some_and(&pred))
    }

    // -- Transforms --

    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    pub fn transforms_mut(&mut self) -> &mut Transforms {
        &mut self.transforms
    }

    pub fn transform(&self, entity: EntityId) -> Option<&Transform> {
        self.transforms.get(self.entities.get(&entity)?.transform)
    }

    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        let id = self.entities.get(&entity)?.transform;
        self.transforms.get_mut(id)
    }

    pub fn world_matrix(&self, entity: EntityId) -> Option<Affine2> {
        self.transforms.world_matrix(self.entities.get(&entity)?.transform)
    }

    pub fn world_position(&self, entity: EntityId) -> Option<Vec2> {
        self.world_matrix(entity).map(|m| m.translation)
    }

    /// Parent one entity's transform to another's (or to nothing).
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> bool {
        let Some(child) = self.entities.get(&child).map(|e| e.transform) else { return false };
        let parent = match parent {
            Some(p) => match self.entities.get(&p) {
                Some(e) => Some(e.transform),
                None => return false,
            },
            None => None,
        };
        self.transforms.set_parent(child, parent)
    }

    // -- Components --

    /// Create a standalone, unattached component.
    pub fn create_component(&mut self, desc: ComponentDesc) -> ComponentId {
        let id = self.ids.component();
        self.components.insert(id, Component::from_desc(id, desc));
        id
    }

    /// `create_component` + `attach_component`.
    pub fn add_component_to(&mut self, entity: EntityId, desc: ComponentDesc) -> Result<ComponentId> {
        if !self.entities.contains_key(&entity) {
            return Err(EngineError::UnknownEntity(entity));
        }
        let cid = self.create_component(desc);
        self.attach_component(entity, cid)?;
        Ok(cid)
    }

    /// Register a component (standalone or not) with the scene. Re-adding is
    /// a no-op.
    pub fn add_component(&mut self, id: ComponentId) -> Result<()> {
        if !self.components.contains_key(&id) {
            return Err(EngineError::UnknownComponent(id));
        }
        self.register_component(id);
        Ok(())
    }

    /// Returns `false` if the component was not attached.
    pub fn remove_component(&mut self, id: ComponentId) -> bool {
        self.unregister_component(id)
    }

    /// Give a component to an entity. The component shares the entity's
    /// transform and is attached to the scene if the entity is. A component
    /// already owned by another entity is detached from it first.
    pub fn attach_component(&mut self, entity: EntityId, id: ComponentId) -> Result<()> {
        let (transform, entity_attached) = match self.entities.get(&entity) {
            Some(e) => (e.transform, e.attached),
            None => return Err(EngineError::UnknownEntity(entity)),
        };
        let owner = self
            .components
            .get(&id)
            .ok_or(EngineError::UnknownComponent(id))?
            .entity;
        if owner == Some(entity) {
            return Ok(());
        }
        if owner.is_some() {
            self.detach_component(id)?;
        }

        // A hook run by the detach may have destroyed either side.
        let component = self.components.get_mut(&id).ok_or(EngineError::UnknownComponent(id))?;
        component.entity = Some(entity);
        component.transform = Some(transform);
        self.entities
            .get_mut(&entity)
            .ok_or(EngineError::UnknownEntity(entity))?
            .components
            .push(id);

        if entity_attached {
            self.register_component(id);
        }
        self.fire(id, LifecycleEvent::AddedToEntity);
        Ok(())
    }

    /// Take a component off its entity. It also leaves the scene and becomes
    /// standalone. Detaching a standalone component is a no-op.
    pub fn detach_component(&mut self, id: ComponentId) -> Result<()> {
        let entity = self
            .components
            .get(&id)
            .ok_or(EngineError::UnknownComponent(id))?
            .entity;
        let Some(entity) = entity else { return Ok(()) };
        if let Some(e) = self.entities.get_mut(&entity) {
            e.components.retain(|&c| c != id);
        }
        self.unregister_component(id);
        self.fire(id, LifecycleEvent::RemovedFromEntity);
        if let Some(component) = self.components.get_mut(&id) {
            component.entity = None;
            component.transform = None;
        }
        Ok(())
    }

    /// Remove a component for good. `Destroy` fires exactly once.
    pub fn destroy_component(&mut self, id: ComponentId) -> bool {
        if !self.components.contains_key(&id) {
            return false;
        }
        self.unregister_component(id);
        self.fire(id, LifecycleEvent::Destroy);
        let Some(component) = self.components.remove(&id) else { return true };
        if let Some(entity) = component.entity.and_then(|e| self.entities.get_mut(&e)) {
            entity.components.retain(|&c| c != id);
        }
        if self.camera == Some(id) {
            self.camera = None;
        }
        log::debug!("{id} destroyed");
        true
    }

    /// Toggle a single component. Fires `Activate`/`Deactivate` only when the
    /// flag actually changes.
    pub fn set_component_active(&mut self, id: ComponentId, active: bool) -> bool {
        let Some(component) = self.components.get_mut(&id) else { return false };
        if component.active == active {
            return true;
        }
        component.active = active;
        let event = if active {
            LifecycleEvent::Activate
        } else {
            LifecycleEvent::Deactivate
        };
        self.fire(id, event);
        true
    }

    pub fn contains_component(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(&id)
    }

    /// Attached, active, and (if owned) on an active entity. Only live
    /// components are updated, collided and drawn.
    pub fn is_component_live(&self, id: ComponentId) -> bool {
        let Some(c) = self.components.get(&id) else { return false };
        c.attached
            && c.active
            && c.entity
                .map_or(true, |e| self.entities.get(&e).is_some_and(|e| e.active))
    }

    /// Attached components in the order they were added.
    pub fn components(&self) -> &[ComponentId] {
        &self.attached_components
    }

    pub fn updatables(&self) -> &[ComponentId] {
        &self.updatables
    }

    pub fn renderables(&self) -> &[ComponentId] {
        &self.renderables
    }

    pub fn gizmo_drawables(&self) -> &[ComponentId] {
        &self.gizmo_drawables
    }

    pub fn collidables(&self) -> &[ComponentId] {
        &self.collidables
    }

    fn register_component(&mut self, id: ComponentId) {
        let Some(component) = self.components.get_mut(&id) else { return };
        if component.attached {
            return;
        }
        component.attached = true;
        let caps = component.caps;
        self.attached_components.push(id);
        if caps.contains(Capabilities::UPDATE) {
            self.updatables.push(id);
        }
        if caps.contains(Capabilities::LATE_UPDATE) {
            self.late_updatables.push(id);
        }
        if caps.contains(Capabilities::RENDER) {
            self.renderables.push(id);
        }
        if caps.contains(Capabilities::GIZMOS) {
            self.gizmo_drawables.push(id);
        }
        if caps.contains(Capabilities::COLLIDE) {
            self.collidables.push(id);
        }
        self.fire(id, LifecycleEvent::AddedToScene);
    }

    fn unregister_component(&mut self, id: ComponentId) -> bool {
        let Some(component) = self.components.get_mut(&id) else { return false };
        if !component.attached {
            return false;
        }
        component.attached = false;
        for registry in [
            &mut self.attached_components,
            &mut self.updatables,
            &mut self.late_updatables,
            &mut self.renderables,
            &mut self.gizmo_drawables,
            &mut self.collidables,
        ] {
            registry.retain(|&c| c != id);
        }
        self.fire(id, LifecycleEvent::RemovedFromScene);
        true
    }

    // -- Hook dispatch --

    fn fire(&mut self, id: ComponentId, event: LifecycleEvent) {
        let Some(component) = self.components.get_mut(&id) else { return };
        let this = component.handle();
        let Some(mut hook) = component.hooks.lifecycle.take() else { return };
        log::trace!("{id} <- {event:?}");
        hook(self, this, event);
        if let Some(component) = self.components.get_mut(&id) {
            component.hooks.lifecycle.get_or_insert(hook);
        }
    }

    fn run_update(&mut self, id: ComponentId, dt: f32) {
        let Some(component) = self.components.get_mut(&id) else { return };
        let this = component.handle();
        let Some(mut hook) = component.hooks.update.take() else { return };
        hook(self, this, dt);
        if let Some(component) = self.components.get_mut(&id) {
            component.hooks.update.get_or_insert(hook);
        }
    }

    fn run_late_update(&mut self, id: ComponentId) {
        let Some(component) = self.components.get_mut(&id) else { return };
        let this = component.handle();
        let Some(mut hook) = component.hooks.late_update.take() else { return };
        hook(self, this);
        if let Some(component) = self.components.get_mut(&id) {
            component.hooks.late_update.get_or_insert(hook);
        }
    }

    pub(crate) fn notify_collision(&mut self, id: ComponentId, other: EntityId) {
        let Some(component) = self.components.get_mut(&id) else { return };
        let this = component.handle();
        let Some(mut hook) = component.hooks.collision.take() else { return };
        hook(self, this, other);
        if let Some(component) = self.components.get_mut(&id) {
            component.hooks.collision.get_or_insert(hook);
        }
    }

    // -- Frame --

    /// Run every live component's update hook, in registration order.
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        let ids = self.updatables.clone();
        for id in ids {
            if self.is_component_live(id) {
                self.run_update(id, dt);
            }
        }
    }

    /// Run late-update hooks, then resolve collisions.
    pub fn late_update(&mut self) {
        let ids = self.late_updatables.clone();
        for id in ids {
            if self.is_component_live(id) {
                self.run_late_update(id);
            }
        }
        self.collision_stats = resolve_collisions(self);
    }

    /// Draw the scene through the active camera. Without a camera nothing is
    /// drawn and `MissingCamera` is returned.
    pub fn render(&self, surface: &mut dyn Surface) -> Result<()> {
        let component = self
            .camera
            .and_then(|id| self.components.get(&id))
            .ok_or(EngineError::MissingCamera)?;
        let camera = component.camera().ok_or(EngineError::MissingCamera)?;
        let camera_world = component
            .transform
            .and_then(|t| self.transforms.world_matrix(t))
            .unwrap_or(Affine2::IDENTITY);
        let letterbox = self.viewport.fit(surface.size());
        let view = letterbox.matrix() * camera.view_matrix_for(self.viewport.origin(), camera_world);
        draw_scene(self, surface, view);
        Ok(())
    }

    pub fn collision_stats(&self) -> CollisionStats {
        self.collision_stats
    }

    pub fn collision_matrix(&self) -> &CollisionMatrix {
        &self.config.collision
    }

    pub fn collision_matrix_mut(&mut self) -> &mut CollisionMatrix {
        &mut self.config.collision
    }

    // -- Camera --

    /// Make a camera component on `entity` the active camera. A previous
    /// camera component is removed and destroyed.
    pub fn set_camera(&mut self, entity: EntityId, desc: impl Into<ComponentDesc>) -> Result<ComponentId> {
        let mut desc = desc.into();
        if !matches!(desc.payload, Payload::Camera(_)) {
            log::warn!("camera descriptor for {entity} has no camera; using defaults");
            desc.payload = Payload::Camera(Camera::new().with_min_zoom(self.config.min_zoom));
        }
        if !self.entities.contains_key(&entity) {
            return Err(EngineError::UnknownEntity(entity));
        }
        // The old camera goes first so its teardown hooks cannot undo
        // anything the new one sets up.
        if let Some(old) = self.camera.take() {
            self.destroy_component(old);
        }
        let id = self.add_component_to(entity, desc)?;
        self.camera = Some(id);
        Ok(id)
    }

    pub fn camera_component(&self) -> Option<ComponentId> {
        self.camera
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.components.get(&self.camera?)?.camera()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        let id = self.camera?;
        self.components.get_mut(&id)?.camera_mut()
    }

    // -- Input --

    pub fn input(&self) -> &InputMap {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputMap {
        &mut self.input
    }

    pub fn bind_key(&mut self, key: impl Into<String>, binding: KeyBinding) {
        self.input.bind(key, binding);
    }

    pub fn add_virtual_axis(&mut self, negative: &str, positive: &str, axis: &str, action: Option<&str>) {
        self.input.add_virtual_axis(negative, positive, axis, action);
    }

    /// Drop every key binding that drives `axis`. Returns how many were
    /// removed.
    pub fn remove_virtual_axis(&mut self, axis: &str) -> usize {
        self.input.remove_axis(axis)
    }

    pub fn axis_value(&self, axis: &str) -> f32 {
        self.input.axis_value(axis)
    }

    pub fn add_action_listener(
        &mut self,
        action: impl Into<String>,
        listener: impl FnMut(&mut Scene) + 'static,
    ) -> ListenerId {
        self.input.add_listener(action, listener)
    }

    pub fn remove_action_listener(&mut self, id: ListenerId) -> bool {
        self.input.remove_listener(id)
    }

    /// Feed one key edge from the host.
    pub fn handle_input(&mut self, event: &KeyEvent, edge: KeyEdge) -> InputResponse {
        let outcome = self.input.apply(&event.key, edge);
        for action in &outcome.actions {
            self.dispatch_action(action);
        }
        outcome.response
    }

    /// Invoke every listener of `action` synchronously, in registration
    /// order. A listener that is already running is skipped.
    pub fn dispatch_action(&mut self, action: &str) {
        for listener in self.input.listeners(action) {
            let Ok(mut f) = listener.try_borrow_mut() else {
                log::warn!("listener for {action:?} re-entered; skipped");
                continue;
            };
            (&mut *f)(self);
        }
    }

    // -- Pools --

    /// Register a pool and pre-build `initial_size` inactive instances.
    pub fn create_pool(
        &mut self,
        factory: impl FnMut(&mut Scene, Vec2, f32) -> EntityId + 'static,
        initial_size: usize,
    ) -> PoolId {
        let mut pool = ObjectPool::new(Box::new(factory));
        pool.prefill(self, initial_size);
        let id = PoolId(self.pools.len() as u32);
        self.pools.push(Some(pool));
        log::debug!("pool {id:?} created with {initial_size} instances");
        id
    }

    fn take_pool(&mut self, id: PoolId) -> Result<ObjectPool> {
        self.pools
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(EngineError::UnknownPool(id))
    }

    fn restore_pool(&mut self, id: PoolId, pool: ObjectPool) {
        if let Some(slot) = self.pools.get_mut(id.0 as usize) {
            *slot = Some(pool);
        }
    }

    /// Hand out a pooled entity at `position`/`rotation`, activated.
    pub fn instantiate(&mut self, pool: PoolId, position: Vec2, rotation: f32) -> Result<EntityId> {
        let mut p = self.take_pool(pool)?;
        let entity = p.instantiate(self, position, rotation);
        self.restore_pool(pool, p);
        Ok(entity)
    }

    /// Deactivate a pooled entity and return it to its pool.
    pub fn release(&mut self, pool: PoolId, entity: EntityId) -> Result<()> {
        let mut p = self.take_pool(pool)?;
        let result = p.release(self, entity);
        self.restore_pool(pool, p);
        if result.is_ok() {
            log::trace!("{entity} released to pool {pool:?}");
        }
        result
    }

    pub fn pool_stats(&self, pool: PoolId) -> Option<PoolStats> {
        self.pools.get(pool.0 as usize)?.as_ref().map(ObjectPool::stats)
    }

    // -- Tile maps --

    /// Put `map` on `entity`. The new map component is attached before the
    /// old one is destroyed, so the entity never renders without a map.
    pub fn apply_tile_map(&mut self, entity: EntityId, map: HexTileMap) -> Result<ComponentId> {
        let old = self.find_component(entity, |c| c.tile_map().is_some());
        let id = self.add_component_to(entity, ComponentDesc::tile_map(map))?;
        if let Some(old) = old {
            self.destroy_component(old);
        }
        Ok(id)
    }
}

impl ComponentRef {
    /// Convenience for hooks: the owning entity's transform.
    pub fn transform_mut<'a>(&self, scene: &'a mut Scene) -> Option<&'a mut Transform> {
        scene.transforms.get_mut(self.transform?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::collider::{Collider, Shape};
    use crate::renderer::recording::{DrawCommand, RecordingSurface};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(ComponentId, LifecycleEvent)>>>;

    fn recording(log: &Log) -> ComponentDesc {
        let log = log.clone();
        ComponentDesc::new().on_lifecycle(move |_, this, event| log.borrow_mut().push((this.id, event)))
    }

    fn counter(count: &Rc<Cell<u32>>) -> ComponentDesc {
        let count = count.clone();
        ComponentDesc::new().on_update(move |_, _, _| count.set(count.get() + 1))
    }

    #[test]
    fn ids_are_unique_across_kinds() {
        let mut scene = Scene::default();
        let e = scene.create_entity("a");
        let c = scene.create_component(ComponentDesc::new());
        assert_ne!(e.0, c.0);
    }

    #[test]
    fn adding_an_entity_attaches_its_components() {
        let mut scene = Scene::default();
        let log: Log = Rc::default();
        let e = scene.create_entity("player");
        let c = scene.add_component_to(e, recording(&log)).unwrap();
        assert_eq!(*log.borrow(), vec![(c, LifecycleEvent::AddedToEntity)]);
        assert!(!scene.component(c).unwrap().is_attached());

        scene.add_entity(e).unwrap();
        scene.add_entity(e).unwrap();
        assert!(scene.component(c).unwrap().is_attached());
        assert_eq!(scene.entities(), &[e]);
        assert_eq!(log.borrow().last(), Some(&(c, LifecycleEvent::AddedToScene)));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn attaching_to_an_attached_entity_fires_both_events() {
        let mut scene = Scene::default();
        let log: Log = Rc::default();
        let e = scene.spawn_entity("e");
        let c = scene.add_component_to(e, recording(&log)).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![(c, LifecycleEvent::AddedToScene), (c, LifecycleEvent::AddedToEntity)]
        );
    }

    #[test]
    fn removal_is_idempotent() {
        let mut scene = Scene::default();
        let log: Log = Rc::default();
        let e = scene.spawn_entity("e");
        let c = scene.add_component_to(e, recording(&log)).unwrap();
        assert!(scene.remove_entity(e));
        assert!(!scene.remove_entity(e));
        assert!(!scene.remove_component(c));
        let removed = log
            .borrow()
            .iter()
            .filter(|(_, ev)| *ev == LifecycleEvent::RemovedFromScene)
            .count();
        assert_eq!(removed, 1);
        assert!(scene.contains_entity(e));
    }

    #[test]
    fn destroy_fires_once_and_cleans_up() {
        let mut scene = Scene::default();
        let log: Log = Rc::default();
        let parent = scene.spawn_entity("parent");
        let e = scene.spawn_entity("e");
        let child = scene.spawn_entity("child");
        scene.set_parent(e, Some(parent));
        scene.set_parent(child, Some(e));
        let a = scene.add_component_to(e, recording(&log)).unwrap();
        let b = scene.add_component_to(e, recording(&log)).unwrap();

        assert!(scene.destroy_entity(e));
        assert!(!scene.destroy_entity(e));

        let destroys: Vec<ComponentId> = log
            .borrow()
            .iter()
            .filter(|(_, ev)| *ev == LifecycleEvent::Destroy)
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(destroys, vec![a, b]);
        assert!(!scene.contains_component(a));
        assert!(scene.components().is_empty());
        assert!(scene.transform(parent).unwrap().children().is_empty());
        assert_eq!(scene.transform(child).unwrap().parent(), None);
        assert!(scene.contains_entity(child));
    }

    #[test]
    fn updates_run_in_registration_order() {
        let mut scene = Scene::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        let e = scene.spawn_entity("e");
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            scene
                .add_component_to(e, ComponentDesc::new().on_update(move |_, _, _| order.borrow_mut().push(tag)))
                .unwrap();
        }
        scene.update(0.016);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
        assert!((scene.elapsed() - 0.016).abs() < 1e-6);
    }

    #[test]
    fn inactive_components_are_skipped() {
        let mut scene = Scene::default();
        let count = Rc::new(Cell::new(0));
        let e = scene.spawn_entity("e");
        let c = scene.add_component_to(e, counter(&count)).unwrap();

        scene.set_component_active(c, false);
        scene.update(0.1);
        assert_eq!(count.get(), 0);

        scene.set_component_active(c, true);
        scene.update(0.1);
        assert_eq!(count.get(), 1);

        scene.set_entity_active(e, false);
        scene.update(0.1);
        assert_eq!(count.get(), 1);
        assert!(!scene.component(c).unwrap().is_active());
    }

    #[test]
    fn activation_events_fire_on_change_only() {
        let mut scene = Scene::default();
        let log: Log = Rc::default();
        let e = scene.spawn_entity("e");
        let c = scene.add_component_to(e, recording(&log)).unwrap();
        log.borrow_mut().clear();
        scene.set_entity_active(e, false);
        scene.set_entity_active(e, false);
        scene.set_entity_active(e, true);
        assert_eq!(
            *log.borrow(),
            vec![(c, LifecycleEvent::Deactivate), (c, LifecycleEvent::Activate)]
        );
    }

    #[test]
    fn hooks_may_destroy_their_own_entity() {
        let mut scene = Scene::default();
        let count = Rc::new(Cell::new(0));
        let e = scene.spawn_entity("doomed");
        scene
            .add_component_to(
                e,
                ComponentDesc::new().on_update(|scene, this, _| {
                    if let Some(entity) = this.entity {
                        scene.destroy_entity(entity);
                    }
                }),
            )
            .unwrap();
        scene.add_component_to(e, counter(&count)).unwrap();

        scene.update(0.1);
        assert!(!scene.contains_entity(e));
        // The second component was destroyed before its turn came.
        assert_eq!(count.get(), 0);
        scene.update(0.1);
    }

    #[test]
    fn hooks_may_spawn_entities() {
        let mut scene = Scene::default();
        let e = scene.spawn_entity("spawner");
        scene
            .add_component_to(
                e,
                ComponentDesc::new().on_update(|scene, _, _| {
                    scene.spawn_entity("child");
                }),
            )
            .unwrap();
        scene.update(0.1);
        scene.update(0.1);
        assert_eq!(scene.entities().len(), 3);
    }

    #[test]
    fn detach_makes_component_standalone() {
        let mut scene = Scene::default();
        let log: Log = Rc::default();
        let e = scene.spawn_entity("e");
        let c = scene.add_component_to(e, recording(&log)).unwrap();
        scene.detach_component(c).unwrap();
        assert!(scene.components_of(e).is_empty());
        let component = scene.component(c).unwrap();
        assert_eq!(component.entity(), None);
        assert!(!component.is_attached());
        assert_eq!(log.borrow().last(), Some(&(c, LifecycleEvent::RemovedFromEntity)));

        scene.add_component(c).unwrap();
        assert_eq!(scene.components(), &[c]);
    }

    #[test]
    fn moving_a_component_between_entities() {
        let mut scene = Scene::default();
        let a = scene.spawn_entity("a");
        let b = scene.spawn_entity("b");
        let c = scene.add_component_to(a, ComponentDesc::new()).unwrap();
        scene.attach_component(b, c).unwrap();
        assert!(scene.components_of(a).is_empty());
        assert_eq!(scene.components_of(b), &[c]);
        assert_eq!(scene.component(c).unwrap().transform(), Some(scene.entity(b).unwrap().transform()));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut scene = Scene::default();
        assert!(matches!(scene.add_entity(EntityId(99)), Err(EngineError::UnknownEntity(_))));
        assert!(matches!(scene.add_component(ComponentId(99)), Err(EngineError::UnknownComponent(_))));
        assert!(matches!(
            scene.add_component_to(EntityId(99), ComponentDesc::new()),
            Err(EngineError::UnknownEntity(_))
        ));
        assert!(matches!(
            scene.instantiate(PoolId(3), Vec2::ZERO, 0.0),
            Err(EngineError::UnknownPool(_))
        ));
    }

    #[test]
    fn render_without_camera_draws_nothing() {
        let scene = Scene::default();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        assert!(matches!(scene.render(&mut surface), Err(EngineError::MissingCamera)));
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn new_camera_replaces_old() {
        let mut scene = Scene::default();
        let a = scene.spawn_entity("cam-a");
        let b = scene.spawn_entity("cam-b");
        let first = scene.set_camera(a, Camera::new()).unwrap();
        let second = scene.set_camera(b, Camera::new()).unwrap();
        assert!(!scene.contains_component(first));
        assert_eq!(scene.camera_component(), Some(second));
        assert!(scene.components_of(a).is_empty());
    }

    #[test]
    fn render_composes_letterbox_view_and_world() {
        let mut scene = Scene::default();
        let cam = scene.spawn_entity("camera");
        scene.set_camera(cam, Camera::new()).unwrap();
        scene.transform_mut(cam).unwrap().position = Vec2::new(100.0, 0.0);

        let e = scene.spawn_entity("box");
        scene.transform_mut(e).unwrap().position = Vec2::new(100.0, 0.0);
        scene
            .add_component_to(e, ComponentDesc::new().on_render(|s| s.fill_rect(Vec2::ZERO, Vec2::ONE)))
            .unwrap();

        // Twice the virtual size: scale 2, no bars.
        let mut surface = RecordingSurface::new(1600.0, 1200.0);
        scene.render(&mut surface).unwrap();
        let fills = surface.fill_transforms();
        assert_eq!(fills.len(), 1);
        // Camera sits on the box, so the box lands in the middle of the screen.
        let p = fills[0].transform_point2(Vec2::ZERO);
        assert!((p - Vec2::new(800.0, 600.0)).length() < 1e-3, "{p:?}");
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn gizmos_only_in_debug() {
        let collider = || ComponentDesc::collider(Collider::new(Shape::rectangle(10.0, 10.0), "a"));
        let strokes = |scene: &Scene| {
            let mut surface = RecordingSurface::new(800.0, 600.0);
            scene.render(&mut surface).unwrap();
            surface
                .commands()
                .iter()
                .filter(|c| matches!(c, DrawCommand::StrokeRect { .. }))
                .count()
        };

        let mut scene = Scene::default();
        let cam = scene.spawn_entity("camera");
        scene.set_camera(cam, Camera::new()).unwrap();
        let e = scene.spawn_entity("e");
        scene.add_component_to(e, collider()).unwrap();
        assert_eq!(strokes(&scene), 0);

        let mut scene = Scene::new(EngineConfig {
            debug: true,
            ..EngineConfig::default()
        });
        let cam = scene.spawn_entity("camera");
        scene.set_camera(cam, Camera::new()).unwrap();
        let e = scene.spawn_entity("e");
        scene.add_component_to(e, collider()).unwrap();
        assert_eq!(strokes(&scene), 1);
    }

    #[test]
    fn moving_into_contact_fires_both_collision_hooks_once() {
        let counting = |layer: &'static str, size: f32, hits: &Rc<Cell<u32>>, seen: &Rc<Cell<Option<EntityId>>>| {
            let (hits, seen) = (hits.clone(), seen.clone());
            ComponentDesc::collider(Collider::new(Shape::rectangle(size, size), layer)).on_collision(
                move |_, _, other| {
                    hits.set(hits.get() + 1);
                    seen.set(Some(other));
                },
            )
        };
        let (player_hits, enemy_hits) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));
        let (player_saw, enemy_saw) = (Rc::new(Cell::new(None)), Rc::new(Cell::new(None)));

        let mut scene = Scene::default();
        let enemy = scene.spawn_entity("enemy");
        scene.transform_mut(enemy).unwrap().position = Vec2::new(20.0, 0.0);
        scene.add_component_to(enemy, counting("enemy", 20.0, &enemy_hits, &enemy_saw)).unwrap();

        let player = scene.spawn_entity("player");
        scene.add_component_to(player, counting("player", 10.0, &player_hits, &player_saw)).unwrap();
        scene
            .add_component_to(
                player,
                ComponentDesc::new().on_update(|scene, this, _| {
                    if let Some(t) = this.transform_mut(scene) {
                        t.position.x = 25.0;
                    }
                }),
            )
            .unwrap();

        scene.late_update();
        assert_eq!((player_hits.get(), enemy_hits.get()), (0, 0));

        scene.update(0.016);
        scene.late_update();
        assert_eq!((player_hits.get(), enemy_hits.get()), (1, 1));
        assert_eq!(player_saw.get(), Some(enemy));
        assert_eq!(enemy_saw.get(), Some(player));
        assert_eq!(scene.collision_stats().hits, 1);
    }

    #[test]
    fn actions_dispatch_in_registration_order() {
        let mut scene = Scene::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        scene.add_virtual_axis("ArrowLeft", "ArrowRight", "AimX", Some("Shoot"));
        for n in 1..=2 {
            let order = order.clone();
            scene.add_action_listener("Shoot", move |_| order.borrow_mut().push(n));
        }
        let response = scene.handle_input(&KeyEvent::new("ArrowRight"), KeyEdge::Down);
        assert_eq!(response, InputResponse::Handled);
        assert_eq!(*order.borrow(), vec![1, 2]);
        assert_eq!(scene.axis_value("AimX"), 1.0);
        assert_eq!(
            scene.handle_input(&KeyEvent::new("x"), KeyEdge::Down),
            InputResponse::Ignored
        );
    }

    #[test]
    fn listeners_may_touch_listeners() {
        let mut scene = Scene::default();
        let hits = Rc::new(Cell::new(0));
        scene.bind_key(" ", KeyBinding::action("Jump"));
        let h = hits.clone();
        let id = Rc::new(Cell::new(None));
        let own = id.clone();
        let registered = scene.add_action_listener("Jump", move |scene| {
            h.set(h.get() + 1);
            // Re-entrant dispatch skips this listener instead of panicking.
            scene.dispatch_action("Jump");
            if let Some(me) = own.get() {
                scene.remove_action_listener(me);
            }
        });
        id.set(Some(registered));

        scene.handle_input(&KeyEvent::new(" "), KeyEdge::Down);
        scene.handle_input(&KeyEvent::new(" "), KeyEdge::Up);
        scene.handle_input(&KeyEvent::new(" "), KeyEdge::Down);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn pools_through_the_scene() {
        let mut scene = Scene::default();
        let pool = scene.create_pool(|scene, pos, _| {
            let e = scene.spawn_entity("bullet");
            if let Some(t) = scene.transform_mut(e) {
                t.position = pos;
            }
            e
        }, 2);
        assert_eq!(scene.pool_stats(pool), Some(PoolStats { live: 0, free: 2 }));
        let e = scene.instantiate(pool, Vec2::new(1.0, 2.0), 0.5).unwrap();
        assert_eq!(scene.transform(e).unwrap().position, Vec2::new(1.0, 2.0));
        scene.release(pool, e).unwrap();
        assert!(matches!(scene.release(pool, e), Err(EngineError::AlreadyReleased(_))));

        scene.destroy_entity(e);
        assert_eq!(scene.pool_stats(pool), Some(PoolStats { live: 0, free: 1 }));
    }

    #[test]
    fn tile_map_swap_is_atomic() {
        let mut scene = Scene::default();
        let e = scene.spawn_entity("map");
        let first = scene.apply_tile_map(e, HexTileMap::new(2, 2)).unwrap();
        let second = scene.apply_tile_map(e, HexTileMap::new(3, 3)).unwrap();
        assert!(!scene.contains_component(first));
        assert_eq!(scene.components_of(e), &[second]);
        assert_eq!(scene.renderables(), &[second]);
        assert_eq!(scene.component(second).unwrap().tile_map().unwrap().columns(), 3);
    }

    #[test]
    fn find_entity_by_name() {
        let mut scene = Scene::default();
        let a = scene.spawn_entity("enemy");
        scene.spawn_entity("enemy");
        assert_eq!(scene.find_entity("enemy"), Some(a));
        assert_eq!(scene.find_entity("nobody"), None);
    }
}
