//! Shooting game - move with WASD, aim and fire with the arrow keys.
//! Projectiles come from an object pool; enemies patrol left and right and
//! are worth one point each.

use std::cell::Cell;
use std::rc::Rc;

use ecs_engine::{debug_grid, Camera, ComponentDesc, EngineConfig, Game, Scene};
use glam::Vec2;

use crate::projectile::PoolSlot;
use crate::{enemy, player, projectile};

pub const PLAYER: &str = "Player";
pub const ENEMY: &str = "Enemy";
pub const PROJECTILE: &str = "Projectile";

pub const PLAYER_LAYER: &str = "player";
pub const ENEMY_LAYER: &str = "enemy";
pub const PROJECTILE_LAYER: &str = "projectile";

/// Projectiles built up front.
const PROJECTILE_POOL_SIZE: usize = 16;

const GRID_INTERVAL: f32 = 100.0;
const GRID_LINES: i32 = 10;

pub mod axes {
    pub const MOVE_X: &str = "MoveX";
    pub const MOVE_Y: &str = "MoveY";
    pub const AIM_X: &str = "AimX";
    pub const AIM_Y: &str = "AimY";
}

pub mod actions {
    pub const SHOOT: &str = "Shoot";
}

/// Whether `entity` exists and carries `name`.
pub fn is_named(scene: &Scene, entity: ecs_engine::EntityId, name: &str) -> bool {
    scene.entity(entity).is_some_and(|e| e.name == name)
}

pub struct ShootingGame {
    score: Rc<Cell<u32>>,
    projectiles: PoolSlot,
}

impl ShootingGame {
    pub fn new() -> Self {
        Self {
            score: Rc::new(Cell::new(0)),
            projectiles: Rc::new(Cell::new(None)),
        }
    }

    fn setup(&mut self, scene: &mut Scene) -> ecs_engine::Result<()> {
        let camera = scene.spawn_entity("Main Camera");
        scene.set_camera(camera, Camera::new().with_min_zoom(scene.config().min_zoom))?;
        scene.add_component_to(camera, debug_grid(GRID_INTERVAL, GRID_LINES))?;

        scene.add_virtual_axis("w", "s", axes::MOVE_Y, None);
        scene.add_virtual_axis("a", "d", axes::MOVE_X, None);
        scene.add_virtual_axis("ArrowUp", "ArrowDown", axes::AIM_Y, Some(actions::SHOOT));
        scene.add_virtual_axis("ArrowLeft", "ArrowRight", axes::AIM_X, Some(actions::SHOOT));

        let slot = self.projectiles.clone();
        let pool = scene.create_pool(
            move |scene, position, rotation| projectile::spawn(scene, position, rotation, &slot),
            PROJECTILE_POOL_SIZE,
        );
        self.projectiles.set(Some(pool));

        player::spawn(scene, self.projectiles.clone())?;
        enemy::spawn(scene, Vec2::new(100.0, 100.0), self.score.clone())?;
        enemy::spawn(scene, Vec2::new(-100.0, -100.0), self.score.clone())?;

        // Pinned to the top-left corner of the initial view.
        let score = scene.spawn_entity("Score");
        let corner = -scene.viewport().origin();
        if let Some(t) = scene.transform_mut(score) {
            t.position = corner;
        }
        let points = self.score.clone();
        scene.add_component_to(
            score,
            ComponentDesc::new().on_render(move |s| {
                s.set_fill_style("white");
                s.set_font("24px Arial");
                s.fill_text(&format!("Score: {}", points.get()), Vec2::new(10.0, 30.0));
            }),
        )?;
        Ok(())
    }
}

impl Game for ShootingGame {
    fn config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            debug: true,
            ..EngineConfig::default()
        };
        config.collision.block(PROJECTILE_LAYER, PROJECTILE_LAYER);
        config.collision.block(PLAYER_LAYER, PROJECTILE_LAYER);
        config
    }

    fn init(&mut self, scene: &mut Scene) {
        if let Err(e) = self.setup(scene) {
            log::error!("shooting game setup failed: {e}");
        }
    }
}
