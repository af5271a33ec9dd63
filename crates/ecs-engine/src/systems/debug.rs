//! Debug drawing: collider outlines and a reference grid.
//!
//! Collider outlines are gizmos and only appear when the engine config has
//! `debug` set. The grid is an ordinary renderable you add yourself.

use glam::Vec2;

use crate::components::collider::{Collider, Shape};
use crate::components::component::ComponentDesc;
use crate::renderer::traits::Surface;

/// Outline colour for collider gizmos.
pub const COLLIDER_GIZMO_STYLE: &str = "red";

const GRID_STYLE: &str = "rgba(0, 160, 0, 0.5)";
const GRID_AXIS_STYLE: &str = "white";

/// Stroke a collider's shape in the entity's local space.
pub fn draw_collider_gizmo(collider: &Collider, surface: &mut dyn Surface) {
    match collider.shape {
        Shape::Rectangle { .. } => {
            let (origin, size) = collider.shape.local_rect();
            surface.set_stroke_style(COLLIDER_GIZMO_STYLE);
            surface.set_line_width(1.0);
            surface.stroke_rect(origin, size);
        }
    }
}

/// A renderable grid of `2 * lines + 1` lines each way, `interval` world
/// units apart, centred on the owning transform. The two axes are drawn in a
/// brighter colour.
pub fn debug_grid(interval: f32, lines: i32) -> ComponentDesc {
    ComponentDesc::new().on_render(move |surface| draw_grid(surface, interval, lines))
}

fn draw_grid(surface: &mut dyn Surface, interval: f32, lines: i32) {
    let extent = lines as f32 * interval;
    surface.set_line_width(1.0);
    for i in -lines..=lines {
        let at = i as f32 * interval;
        let style = if i == 0 { GRID_AXIS_STYLE } else { GRID_STYLE };

        surface.set_stroke_style(style);
        surface.begin_path();
        surface.move_to(Vec2::new(at, -extent));
        surface.line_to(Vec2::new(at, extent));
        surface.stroke();

        surface.begin_path();
        surface.move_to(Vec2::new(-extent, at));
        surface.line_to(Vec2::new(extent, at));
        surface.stroke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::{DrawCommand, RecordingSurface};

    #[test]
    fn gizmo_outlines_offset_rectangle() {
        let collider = Collider::new(Shape::rectangle(10.0, 4.0).with_offset(Vec2::new(5.0, 0.0)), "a");
        let mut surface = RecordingSurface::new(10.0, 10.0);
        draw_collider_gizmo(&collider, &mut surface);
        assert!(surface.commands().contains(&DrawCommand::StrokeRect {
            origin: Vec2::new(0.0, -2.0),
            size: Vec2::new(10.0, 4.0),
        }));
        assert!(surface
            .commands()
            .contains(&DrawCommand::StrokeStyle(COLLIDER_GIZMO_STYLE.into())));
    }

    #[test]
    fn grid_draws_both_directions() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        draw_grid(&mut surface, 100.0, 2);
        let strokes = surface.commands().iter().filter(|c| **c == DrawCommand::Stroke).count();
        assert_eq!(strokes, 10);
        assert!(surface.commands().contains(&DrawCommand::MoveTo(Vec2::new(-200.0, -200.0))));
    }
}
