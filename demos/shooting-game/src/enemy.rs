use std::cell::Cell;
use std::rc::Rc;

use ecs_engine::{Collider, ComponentDesc, EntityId, Scene, Shape};
use glam::Vec2;

use crate::game::{is_named, ENEMY, ENEMY_LAYER, PROJECTILE};

const SPEED: f32 = 50.0;
/// Enemies turn around once they pass this distance from x = 0.
const PATROL_EXTENT: f32 = 200.0;
const SIZE: f32 = 20.0;

/// Spawn an enemy patrolling along x. Being hit by a projectile removes it
/// from the scene and bumps `score`.
pub fn spawn(scene: &mut Scene, position: Vec2, score: Rc<Cell<u32>>) -> ecs_engine::Result<EntityId> {
    let id = scene.spawn_entity(ENEMY);
    if let Some(t) = scene.transform_mut(id) {
        t.position = position;
    }

    scene.add_component_to(
        id,
        ComponentDesc::new().on_render(|s| {
            s.set_fill_style("green");
            s.fill_rect(Vec2::splat(-SIZE / 2.0), Vec2::splat(SIZE));
        }),
    )?;

    let mut direction = 1.0;
    scene.add_component_to(
        id,
        ComponentDesc::new().on_update(move |scene, this, dt| {
            let Some(t) = this.transform_mut(scene) else { return };
            t.position.x += SPEED * direction * dt;
            if t.position.x > PATROL_EXTENT {
                direction = -1.0;
            } else if t.position.x < -PATROL_EXTENT {
                direction = 1.0;
            }
        }),
    )?;

    scene.add_component_to(
        id,
        ComponentDesc::collider(Collider::new(Shape::rectangle(SIZE, SIZE), ENEMY_LAYER)).on_collision(
            move |scene, this, other| {
                if !is_named(scene, other, PROJECTILE) {
                    return;
                }
                if let Some(me) = this.entity {
                    if scene.remove_entity(me) {
                        score.set(score.get() + 1);
                        log::info!("enemy down, score {}", score.get());
                    }
                }
            },
        ),
    )?;
    Ok(id)
}
