use std::cell::Cell;
use std::rc::Rc;

use ecs_engine::{Collider, ComponentDesc, EntityId, LifecycleEvent, ListenerId, Scene, Shape};
use glam::Vec2;

use crate::game::{actions, axes, is_named, ENEMY, PLAYER, PLAYER_LAYER};
use crate::projectile::PoolSlot;

const MOVE_SPEED: f32 = 150.0;
const SIZE: f32 = 20.0;

pub fn spawn(scene: &mut Scene, projectiles: PoolSlot) -> ecs_engine::Result<EntityId> {
    let id = scene.spawn_entity(PLAYER);

    scene.add_component_to(
        id,
        ComponentDesc::new().on_render(|s| {
            s.set_fill_style("white");
            s.begin_path();
            s.move_to(Vec2::new(10.0, 0.0));
            s.line_to(Vec2::new(-10.0, -10.0));
            s.line_to(Vec2::new(-10.0, 10.0));
            s.close_path();
            s.fill();
        }),
    )?;

    let listener: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
    scene.add_component_to(
        id,
        ComponentDesc::new()
            .on_update(|scene, this, dt| {
                let input = Vec2::new(scene.axis_value(axes::MOVE_X), scene.axis_value(axes::MOVE_Y));
                if let Some(t) = this.transform_mut(scene) {
                    t.position += input.normalize_or_zero() * MOVE_SPEED * dt;
                }
            })
            .on_lifecycle(move |scene, this, event| match event {
                LifecycleEvent::AddedToScene => {
                    let Some(player) = this.entity else { return };
                    let pool = projectiles.clone();
                    let id = scene.add_action_listener(actions::SHOOT, move |scene| shoot(scene, player, &pool));
                    listener.set(Some(id));
                }
                LifecycleEvent::RemovedFromScene => {
                    if let Some(id) = listener.take() {
                        scene.remove_action_listener(id);
                    }
                }
                _ => {}
            }),
    )?;

    scene.add_component_to(
        id,
        ComponentDesc::collider(Collider::new(Shape::rectangle(SIZE, SIZE), PLAYER_LAYER)).on_collision(
            |scene, this, other| {
                if !is_named(scene, other, ENEMY) {
                    return;
                }
                if let Some(me) = this.entity {
                    if scene.remove_entity(me) {
                        log::info!("player down");
                    }
                }
            },
        ),
    )?;
    Ok(id)
}

/// Fire one projectile from `player` in the aim direction. Does nothing
/// while no aim key is held.
fn shoot(scene: &mut Scene, player: EntityId, pool: &PoolSlot) {
    let aim = Vec2::new(scene.axis_value(axes::AIM_X), scene.axis_value(axes::AIM_Y));
    if aim == Vec2::ZERO {
        return;
    }
    let (Some(pool), Some(position)) = (pool.get(), scene.world_position(player)) else { return };
    if let Err(e) = scene.instantiate(pool, position, aim.y.atan2(aim.x)) {
        log::warn!("cannot fire: {e}");
    }
}
