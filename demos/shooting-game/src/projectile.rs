//! Pooled projectiles. They fly along their forward vector and go back to
//! the pool when they hit an enemy or run out of lifetime.

use std::cell::Cell;
use std::rc::Rc;

use ecs_engine::{Collider, ComponentDesc, EntityId, LifecycleEvent, PoolId, Scene, Shape};
use glam::Vec2;

use crate::game::{is_named, ENEMY, PROJECTILE, PROJECTILE_LAYER};

const SPEED: f32 = 200.0;
const RADIUS: f32 = 2.0;
const SIZE: f32 = 4.0;
/// Seconds before an unspent projectile returns to the pool.
const LIFETIME: f32 = 3.0;

/// Pool id shared with the projectile hooks. It is only known after the
/// pool has been created, which is after the first projectiles were built.
pub type PoolSlot = Rc<Cell<Option<PoolId>>>;

/// Pool factory: build one projectile entity.
pub fn spawn(scene: &mut Scene, position: Vec2, rotation: f32, pool: &PoolSlot) -> EntityId {
    let id = scene.spawn_entity(PROJECTILE);
    if let Some(t) = scene.transform_mut(id) {
        t.position = position;
        t.rotation = rotation;
    }
    if let Err(e) = build(scene, id, pool) {
        log::error!("projectile setup failed: {e}");
    }
    id
}

fn build(scene: &mut Scene, id: EntityId, pool: &PoolSlot) -> ecs_engine::Result<()> {
    let age = Rc::new(Cell::new(0.0f32));

    scene.add_component_to(
        id,
        ComponentDesc::new().on_render(|s| {
            s.set_fill_style("red");
            s.begin_path();
            s.arc(Vec2::ZERO, RADIUS, 0.0, std::f32::consts::TAU);
            s.fill();
        }),
    )?;

    let (ticking, reset) = (age.clone(), age);
    let expire = pool.clone();
    scene.add_component_to(
        id,
        ComponentDesc::new()
            .on_update(move |scene, this, dt| {
                if let Some(t) = this.transform_mut(scene) {
                    t.position += t.forward() * SPEED * dt;
                }
                ticking.set(ticking.get() + dt);
                if ticking.get() >= LIFETIME {
                    release(scene, &expire, this.entity);
                }
            })
            .on_lifecycle(move |_, _, event| {
                if event == LifecycleEvent::Activate {
                    reset.set(0.0);
                }
            }),
    )?;

    let hit = pool.clone();
    scene.add_component_to(
        id,
        ComponentDesc::collider(Collider::new(Shape::rectangle(SIZE, SIZE), PROJECTILE_LAYER)).on_collision(
            move |scene, this, other| {
                if is_named(scene, other, ENEMY) {
                    release(scene, &hit, this.entity);
                }
            },
        ),
    )?;
    Ok(())
}

fn release(scene: &mut Scene, pool: &PoolSlot, entity: Option<EntityId>) {
    let (Some(pool), Some(entity)) = (pool.get(), entity) else { return };
    if let Err(e) = scene.release(pool, entity) {
        log::debug!("projectile release skipped: {e}");
    }
}
