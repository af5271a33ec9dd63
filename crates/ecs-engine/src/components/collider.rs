//! Collision shapes.
//!
//! Shapes are described in the local space of the owning entity. Every query
//! takes the entity's world matrix, so rotation and uniform scale inherited
//! through the transform hierarchy are respected, and `offset` rotates and
//! scales with the entity.

use glam::{Affine2, Vec2};

/// Interval of a shape projected onto an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub min: f32,
    pub max: f32,
}

impl Projection {
    /// Touching intervals count as overlapping.
    pub fn overlaps(&self, other: &Projection) -> bool {
        !(self.max < other.min || other.max < self.min)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned in local space, centred on `offset`.
    Rectangle { width: f32, height: f32, offset: Vec2 },
}

impl Shape {
    pub fn rectangle(width: f32, height: f32) -> Self {
        Shape::Rectangle {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    pub fn with_offset(self, offset: Vec2) -> Self {
        match self {
            Shape::Rectangle { width, height, .. } => Shape::Rectangle { width, height, offset },
        }
    }

    /// Local-space bounding box as (min corner, size).
    pub fn local_rect(&self) -> (Vec2, Vec2) {
        match *self {
            Shape::Rectangle { width, height, offset } => {
                let size = Vec2::new(width, height);
                (offset - size / 2.0, size)
            }
        }
    }

    /// Corners in world space.
    pub fn vertices(&self, world: &Affine2) -> [Vec2; 4] {
        let (min, size) = self.local_rect();
        [
            min,
            min + Vec2::new(size.x, 0.0),
            min + size,
            min + Vec2::new(0.0, size.y),
        ]
        .map(|corner| world.transform_point2(corner))
    }

    /// Separating-axis candidates in world space, normalized. A degenerate
    /// (zero-scale) world matrix yields zero axes, which `intersects` skips,
    /// testing the world axes when no others remain.
    pub fn axes(&self, world: &Affine2) -> [Vec2; 2] {
        match self {
            Shape::Rectangle { .. } => [
                world.matrix2.x_axis.normalize_or_zero(),
                world.matrix2.y_axis.normalize_or_zero(),
            ],
        }
    }

    pub fn project(&self, axis: Vec2, world: &Affine2) -> Projection {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for v in self.vertices(world) {
            let d = v.dot(axis);
            min = min.min(d);
            max = max.max(d);
        }
        Projection { min, max }
    }
}

/// Shape plus the layer name used by the collision matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub shape: Shape,
    pub layer: String,
}

impl Collider {
    pub fn new(shape: Shape, layer: impl Into<String>) -> Self {
        Self {
            shape,
            layer: layer.into(),
        }
    }
}
