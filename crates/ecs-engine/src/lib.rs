pub mod api;
pub mod core;
pub mod components;
pub mod error;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::game::{EngineConfig, Game};
pub use api::types::{ComponentId, EntityId, IdAllocator, ListenerId, PoolId, TransformId};
pub use error::{EngineError, Result};
pub use components::collider::{Collider, Projection, Shape};
pub use components::component::{
    Capabilities, Component, ComponentDesc, ComponentRef, LifecycleEvent, Payload,
};
pub use components::entity::Entity;
pub use components::tilemap::{AxialCoord, HexTile, HexTileMap, TileFeature, TileTerrain};
pub use core::pool::PoolStats;
pub use core::scene::Scene;
pub use core::time::FrameTimer;
pub use core::transform::{Transform, Transforms};
pub use input::bindings::{InputMap, InputResponse, KeyBinding, KeyEdge, KeyEvent};
pub use input::queue::{InputEvent, InputQueue};
pub use renderer::camera::{Camera, Letterbox, Viewport};
pub use renderer::recording::{DrawCommand, RecordingSurface};
pub use renderer::traits::Surface;
pub use systems::collision::{CollisionMatrix, CollisionStats};
pub use systems::debug::debug_grid;

// Extensions: decoupled optional helpers
pub use extensions::{
    banded_hex_map, controllable_camera, generate_tile_map, MapAlgorithm, MapGenerationError,
    MapGenerationRequest, MapGenerationResponse, NoiseParameters,
};
