//! The component record.
//!
//! There is one concrete component type. What a component *does* is described
//! by an explicit capability bitmask plus optional hook closures, and
//! optionally one built-in payload (collider, camera, tile map). The scene
//! files a component into its update/render/collision registries by testing
//! the capability bits once, when the component is attached.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::api::types::{ComponentId, EntityId, TransformId};
use crate::components::collider::Collider;
use crate::components::tilemap::HexTileMap;
use crate::core::scene::Scene;
use crate::renderer::camera::Camera;
use crate::renderer::traits::Surface;

/// Capability bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Self = Self(0);
    pub const UPDATE: Self = Self(1 << 0);
    pub const LATE_UPDATE: Self = Self(1 << 1);
    pub const RENDER: Self = Self(1 << 2);
    pub const GIZMOS: Self = Self(1 << 3);
    pub const COLLIDE: Self = Self(1 << 4);
    pub const LIFECYCLE: Self = Self(1 << 5);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Capabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 6] = ["update", "late_update", "render", "gizmos", "collide", "lifecycle"];
        let set: Vec<&str> = NAMES
            .iter()
            .enumerate()
            .filter(|(bit, _)| self.0 & (1 << bit) != 0)
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Capabilities({})", set.join("|"))
    }
}

/// Lifecycle notifications delivered to a component's lifecycle hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    AddedToScene,
    RemovedFromScene,
    AddedToEntity,
    RemovedFromEntity,
    Activate,
    Deactivate,
    Destroy,
}

/// Identity of the component a hook is running for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRef {
    pub id: ComponentId,
    pub entity: Option<EntityId>,
    pub transform: Option<TransformId>,
}

pub type UpdateFn = Box<dyn FnMut(&mut Scene, ComponentRef, f32)>;
pub type LateUpdateFn = Box<dyn FnMut(&mut Scene, ComponentRef)>;
pub type RenderFn = Box<dyn Fn(&mut dyn Surface)>;
/// Receives the entity owning the *other* collider.
pub type CollisionFn = Box<dyn FnMut(&mut Scene, ComponentRef, EntityId)>;
pub type LifecycleFn = Box<dyn FnMut(&mut Scene, ComponentRef, LifecycleEvent)>;

/// Built-in data a component may carry.
#[derive(Debug, Default)]
pub enum Payload {
    #[default]
    None,
    Collider(Collider),
    Camera(Camera),
    TileMap(HexTileMap),
}

#[derive(Default)]
pub(crate) struct Hooks {
    pub update: Option<UpdateFn>,
    pub late_update: Option<LateUpdateFn>,
    pub render: Option<RenderFn>,
    pub gizmos: Option<RenderFn>,
    pub collision: Option<CollisionFn>,
    pub lifecycle: Option<LifecycleFn>,
}

/// Builder describing a component before it is created in a scene.
#[derive(Default)]
pub struct ComponentDesc {
    pub(crate) caps: Capabilities,
    pub(crate) hooks: Hooks,
    pub(crate) payload: Payload,
}

impl ComponentDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collider. Collidable, and draws its outline as a gizmo.
    pub fn collider(collider: Collider) -> Self {
        Self {
            caps: Capabilities::COLLIDE | Capabilities::GIZMOS,
            payload: Payload::Collider(collider),
            ..Self::default()
        }
    }

    pub fn camera(camera: Camera) -> Self {
        Self {
            payload: Payload::Camera(camera),
            ..Self::default()
        }
    }

    pub fn tile_map(map: HexTileMap) -> Self {
        Self {
            caps: Capabilities::RENDER,
            payload: Payload::TileMap(map),
            ..Self::default()
        }
    }

    pub fn on_update(mut self, f: impl FnMut(&mut Scene, ComponentRef, f32) + 'static) -> Self {
        self.caps |= Capabilities::UPDATE;
        self.hooks.update = Some(Box::new(f));
        self
    }

    pub fn on_late_update(mut self, f: impl FnMut(&mut Scene, ComponentRef) + 'static) -> Self {
        self.caps |= Capabilities::LATE_UPDATE;
        self.hooks.late_update = Some(Box::new(f));
        self
    }

    pub fn on_render(mut self, f: impl Fn(&mut dyn Surface) + 'static) -> Self {
        self.caps |= Capabilities::RENDER;
        self.hooks.render = Some(Box::new(f));
        self
    }

    pub fn on_gizmos(mut self, f: impl Fn(&mut dyn Surface) + 'static) -> Self {
        self.caps |= Capabilities::GIZMOS;
        self.hooks.gizmos = Some(Box::new(f));
        self
    }

    pub fn on_collision(mut self, f: impl FnMut(&mut Scene, ComponentRef, EntityId) + 'static) -> Self {
        self.hooks.collision = Some(Box::new(f));
        self
    }

    pub fn on_lifecycle(
        mut self,
        f: impl FnMut(&mut Scene, ComponentRef, LifecycleEvent) + 'static,
    ) -> Self {
        self.caps |= Capabilities::LIFECYCLE;
        self.hooks.lifecycle = Some(Box::new(f));
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }
}

impl From<Camera> for ComponentDesc {
    fn from(camera: Camera) -> Self {
        Self::camera(camera)
    }
}

impl From<Collider> for ComponentDesc {
    fn from(collider: Collider) -> Self {
        Self::collider(collider)
    }
}

/// A component living in a scene's component arena.
pub struct Component {
    pub(crate) id: ComponentId,
    pub(crate) entity: Option<EntityId>,
    pub(crate) transform: Option<TransformId>,
    pub(crate) active: bool,
    pub(crate) attached: bool,
    pub(crate) caps: Capabilities,
    pub(crate) hooks: Hooks,
    pub(crate) payload: Payload,
}

impl Component {
    pub(crate) fn from_desc(id: ComponentId, desc: ComponentDesc) -> Self {
        Self {
            id,
            entity: None,
            transform: None,
            active: true,
            attached: false,
            caps: desc.caps,
            hooks: desc.hooks,
            payload: desc.payload,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub fn transform(&self) -> Option<TransformId> {
        self.transform
    }

    /// The component's own flag; see `Scene::is_component_live` for the
    /// effective state including the owning entity.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the component is filed in a scene's registries.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn has(&self, caps: Capabilities) -> bool {
        self.caps.contains(caps)
    }

    pub fn handle(&self) -> ComponentRef {
        ComponentRef {
            id: self.id,
            entity: self.entity,
            transform: self.transform,
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn collider(&self) -> Option<&Collider> {
        match &self.payload {
            Payload::Collider(c) => Some(c),
            _ => None,
        }
    }

    pub fn collider_mut(&mut self) -> Option<&mut Collider> {
        match &mut self.payload {
            Payload::Collider(c) => Some(c),
            _ => None,
        }
    }

    pub fn camera(&self) -> Option<&Camera> {
        match &self.payload {
            Payload::Camera(c) => Some(c),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.payload {
            Payload::Camera(c) => Some(c),
            _ => None,
        }
    }

    pub fn tile_map(&self) -> Option<&HexTileMap> {
        match &self.payload {
            Payload::TileMap(m) => Some(m),
            _ => None,
        }
    }

    /// Draw the component in its local space.
    pub(crate) fn render(&self, surface: &mut dyn Surface) {
        if let Payload::TileMap(map) = &self.payload {
            map.render(surface);
        }
        if let Some(render) = &self.hooks.render {
            render(surface);
        }
    }

    pub(crate) fn draw_gizmos(&self, surface: &mut dyn Surface) {
        if let Payload::Collider(collider) = &self.payload {
            crate::systems::debug::draw_collider_gizmo(collider, surface);
        }
        if let Some(gizmos) = &self.hooks.gizmos {
            gizmos(surface);
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("entity", &self.entity)
            .field("active", &self.active)
            .field("attached", &self.attached)
            .field("caps", &self.caps)
            .field("payload", &self.payload)
            .finish()
    }
}
