//! Collision detection.
//!
//! Broad phase: sort-and-sweep on the world x-extent of every active collider.
//! Narrow phase: separating-axis test on the candidate pairs that the layer
//! matrix allows. Hits are collected first and dispatched afterwards, so the
//! pair set of a frame does not depend on what the callbacks do.

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

use crate::api::types::{ComponentId, EntityId};
use crate::components::collider::Shape;
use crate::core::scene::Scene;

/// One pairwise rule of the collision matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRule {
    pub a: String,
    pub b: String,
    pub collide: bool,
}

/// Which collider layers may collide. Symmetric; pairs without a rule use
/// `default_allow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionMatrix {
    pub default_allow: bool,
    pub rules: Vec<LayerRule>,
}

impl Default for CollisionMatrix {
    fn default() -> Self {
        Self {
            default_allow: true,
            rules: Vec::new(),
        }
    }
}

impl CollisionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, a: &str, b: &str) -> Option<usize> {
        self.rules
            .iter()
            .position(|r| (r.a == a && r.b == b) || (r.a == b && r.b == a))
    }

    /// Set the rule for a layer pair, replacing any existing one.
    pub fn set(&mut self, a: &str, b: &str, collide: bool) {
        match self.find(a, b) {
            Some(i) => self.rules[i].collide = collide,
            None => self.rules.push(LayerRule {
                a: a.to_owned(),
                b: b.to_owned(),
                collide,
            }),
        }
    }

    pub fn allow(&mut self, a: &str, b: &str) {
        self.set(a, b, true);
    }

    pub fn block(&mut self, a: &str, b: &str) {
        self.set(a, b, false);
    }

    pub fn allows(&self, a: &str, b: &str) -> bool {
        self.find(a, b)
            .map_or(self.default_allow, |i| self.rules[i].collide)
    }
}

/// Counters from the last collision pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Colliders that took part.
    pub bodies: usize,
    /// Pairs produced by the broad phase.
    pub candidates: usize,
    /// Pairs that passed the layer matrix and were tested with SAT.
    pub narrow_tests: usize,
    pub hits: usize,
}

/// Broad-phase entry: an index into the caller's body list plus its x-extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proxy {
    pub index: usize,
    pub min: f32,
    pub max: f32,
}

/// Sort-and-sweep. Returns every pair whose x-extents overlap or touch,
/// as `(lower index, higher index)`.
pub fn sweep_pairs(proxies: &mut [Proxy]) -> Vec<(usize, usize)> {
    proxies.sort_by(|a, b| a.min.total_cmp(&b.min));
    let mut open: Vec<Proxy> = Vec::new();
    let mut pairs = Vec::new();
    for p in proxies.iter() {
        open.retain(|o| o.max >= p.min);
        for o in &open {
            pairs.push((o.index.min(p.index), o.index.max(p.index)));
        }
        open.push(*p);
    }
    pairs
}

/// Separating-axis test for two shapes placed by their world matrices.
/// Shapes collapsed by a zero scale have no axes of their own; if neither
/// shape has one, the world axes are tested instead.
pub fn intersects(a: &Shape, a_world: &Affine2, b: &Shape, b_world: &Affine2) -> bool {
    let mut axes: Vec<Vec2> = a
        .axes(a_world)
        .into_iter()
        .chain(b.axes(b_world))
        .filter(|axis| *axis != Vec2::ZERO)
        .collect();
    if axes.is_empty() {
        axes = vec![Vec2::X, Vec2::Y];
    }
    axes.into_iter()
        .all(|axis| a.project(axis, a_world).overlaps(&b.project(axis, b_world)))
}

struct Body {
    component: ComponentId,
    entity: EntityId,
    layer: String,
    shape: Shape,
    world: Affine2,
}

/// Run one collision pass over the scene and dispatch collision hooks.
///
/// Each colliding pair is dispatched at most once, to both sides. A pair is
/// skipped if either collider stopped being live during an earlier pair's
/// callbacks; within a pair both sides are notified even if the first
/// callback removes the second collider.
pub fn resolve_collisions(scene: &mut Scene) -> CollisionStats {
    let bodies: Vec<Body> = scene
        .collidables()
        .iter()
        .filter(|&&cid| scene.is_component_live(cid))
        .filter_map(|&cid| {
            let component = scene.component(cid)?;
            let collider = component.collider()?;
            let entity = component.entity()?;
            let world = scene.transforms().world_matrix(component.transform()?)?;
            Some(Body {
                component: cid,
                entity,
                layer: collider.layer.clone(),
                shape: collider.shape.clone(),
                world,
            })
        })
        .collect();

    let mut proxies: Vec<Proxy> = bodies
        .iter()
        .enumerate()
        .map(|(index, body)| {
            let extent = body.shape.project(Vec2::X, &body.world);
            Proxy {
                index,
                min: extent.min,
                max: extent.max,
            }
        })
        .collect();

    let candidates = sweep_pairs(&mut proxies);
    let mut stats = CollisionStats {
        bodies: bodies.len(),
        candidates: candidates.len(),
        ..CollisionStats::default()
    };

    let mut hits = Vec::new();
    for (i, j) in candidates {
        let (a, b) = (&bodies[i], &bodies[j]);
        if a.entity == b.entity || !scene.collision_matrix().allows(&a.layer, &b.layer) {
            continue;
        }
        stats.narrow_tests += 1;
        if intersects(&a.shape, &a.world, &b.shape, &b.world) {
            hits.push((i, j));
        }
    }
    stats.hits = hits.len();

    for (i, j) in hits {
        let (a, b) = (&bodies[i], &bodies[j]);
        if !scene.is_component_live(a.component) || !scene.is_component_live(b.component) {
            log::trace!("skipping stale collision {} <-> {}", a.entity, b.entity);
            continue;
        }
        scene.notify_collision(a.component, b.entity);
        scene.notify_collision(b.component, a.entity);
    }

    stats
}
