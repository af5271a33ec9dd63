//! Drawing surface contract.
//!
//! The engine never talks to a concrete backend. Hosts hand it something that
//! implements [`Surface`]: a Canvas2D context in the browser (see `ecs-web`),
//! or a [`RecordingSurface`](super::recording::RecordingSurface) for headless
//! runs and tests. The contract mirrors the subset of Canvas2D the engine
//! needs: an affine transform with save/restore, paths, fill/stroke and text.

use glam::{Affine2, Vec2};

/// A 2D affine-transformable drawing target.
pub trait Surface {
    /// Size of the drawable area in device pixels.
    fn size(&self) -> Vec2;

    /// Push the current drawing state (transform, styles).
    fn save(&mut self);

    /// Pop the drawing state pushed by the matching `save`.
    fn restore(&mut self);

    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine2);

    /// Clear the whole surface, ignoring the current transform.
    fn clear(&mut self);

    fn begin_path(&mut self);
    fn move_to(&mut self, point: Vec2);
    fn line_to(&mut self, point: Vec2);
    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);

    fn fill_rect(&mut self, origin: Vec2, size: Vec2);
    fn stroke_rect(&mut self, origin: Vec2, size: Vec2);

    /// CSS-style colour string, e.g. `"red"` or `"#1f3b70"`.
    fn set_fill_style(&mut self, style: &str);
    fn set_stroke_style(&mut self, style: &str);
    fn set_line_width(&mut self, width: f32);

    /// CSS font shorthand, e.g. `"24px Arial"`.
    fn set_font(&mut self, font: &str);
    fn fill_text(&mut self, text: &str, at: Vec2);
}

/// Fill a closed polygon translated by `offset`.
pub fn fill_polygon(surface: &mut dyn Surface, points: &[Vec2], offset: Vec2, style: &str) {
    let Some((first, rest)) = points.split_first() else { return };
    surface.set_fill_style(style);
    surface.begin_path();
    surface.move_to(*first + offset);
    for p in rest {
        surface.line_to(*p + offset);
    }
    surface.close_path();
    surface.fill();
}
