use serde::{Deserialize, Serialize};

use crate::core::scene::Scene;
use crate::core::time::DEFAULT_MAX_FRAME_DT;
use crate::error::Result;
use crate::renderer::camera::DEFAULT_MIN_ZOOM;
use crate::systems::collision::CollisionMatrix;

/// Wheel delta that changes zoom by 1.0.
pub const WHEEL_ZOOM_DIVISOR: f32 = 100.0;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Width of the virtual resolution gameplay runs in (default: 800).
    pub virtual_width: f32,
    /// Height of the virtual resolution (default: 600).
    pub virtual_height: f32,
    /// Zoom floor for cameras created from this config (default: 1.0).
    pub min_zoom: f32,
    /// Longest frame delta handed to `update`, in seconds (default: 0.1).
    pub max_frame_dt: f32,
    /// Draw gizmos such as collider outlines.
    pub debug: bool,
    /// Which collider layers may collide.
    pub collision: CollisionMatrix,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            virtual_width: 800.0,
            virtual_height: 600.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_frame_dt: DEFAULT_MAX_FRAME_DT,
            debug: false,
            collision: CollisionMatrix::default(),
        }
    }
}

impl EngineConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> EngineConfig {
        EngineConfig::default()
    }

    /// Setup initial state: spawn entities, bind keys, assign a camera.
    fn init(&mut self, scene: &mut Scene);

    /// Per-frame game logic, run before component updates.
    fn update(&mut self, _scene: &mut Scene, _dt: f32) {}

    /// Mouse wheel. By default zooms the active camera; positive deltas
    /// (scrolling down) zoom out.
    fn on_wheel(&mut self, scene: &mut Scene, delta: f32) {
        if let Some(camera) = scene.camera_mut() {
            camera.zoom_by(-delta / WHEEL_ZOOM_DIVISOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::camera::Camera;

    struct Empty;

    impl Game for Empty {
        fn init(&mut self, _scene: &mut Scene) {}
    }

    #[test]
    fn config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.virtual_width, 800.0);
        assert_eq!(config.virtual_height, 600.0);
        assert_eq!(config.min_zoom, 1.0);
        assert!(!config.debug);
        assert!(config.collision.default_allow);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{"debug": true, "collision": {"rules": [{"a": "p", "b": "p", "collide": false}]}}"#,
        )
        .unwrap();
        assert!(config.debug);
        assert_eq!(config.virtual_width, 800.0);
        assert!(!config.collision.allows("p", "p"));
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = EngineConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, crate::error::EngineError::Config(_)));
    }

    #[test]
    fn default_wheel_zooms_and_clamps() {
        let mut scene = Scene::default();
        let cam = scene.spawn_entity("camera");
        scene.set_camera(cam, Camera::new()).unwrap();

        let mut game = Empty;
        game.on_wheel(&mut scene, -100.0);
        assert_eq!(scene.camera().unwrap().zoom(), 2.0);
        game.on_wheel(&mut scene, 500.0);
        assert_eq!(scene.camera().unwrap().zoom(), 1.0);
    }
}
