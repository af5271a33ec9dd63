use glam::{Affine2, Vec2};

use super::traits::Surface;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    SetTransform(Affine2),
    Clear,
    BeginPath,
    MoveTo(Vec2),
    LineTo(Vec2),
    Arc { center: Vec2, radius: f32, start: f32, end: f32 },
    ClosePath,
    Fill,
    Stroke,
    FillRect { origin: Vec2, size: Vec2 },
    StrokeRect { origin: Vec2, size: Vec2 },
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f32),
    Font(String),
    FillText { text: String, at: Vec2 },
}

/// A surface that records every call instead of rasterizing.
/// Used by headless hosts and by the engine's own tests.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
    transform: Affine2,
    stack: Vec<Affine2>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::with_capacity(256),
            transform: Affine2::IDENTITY,
            stack: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take all recorded commands and reset the recording.
    pub fn drain(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Transform currently in effect.
    pub fn current_transform(&self) -> Affine2 {
        self.transform
    }

    /// Number of unmatched `save` calls.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Transforms that were in effect at each `fill`/`fill_rect`/`fill_text`,
    /// in order. Handy for asserting where things ended up on screen.
    pub fn fill_transforms(&self) -> Vec<Affine2> {
        let mut current = Affine2::IDENTITY;
        let mut stack = Vec::new();
        let mut out = Vec::new();
        for cmd in &self.commands {
            match cmd {
                DrawCommand::Save => stack.push(current),
                DrawCommand::Restore => current = stack.pop().unwrap_or(Affine2::IDENTITY),
                DrawCommand::SetTransform(m) => current = *m,
                DrawCommand::Fill | DrawCommand::FillRect { .. } | DrawCommand::FillText { .. } => {
                    out.push(current)
                }
                _ => {}
            }
        }
        out
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        // Canvas ignores unbalanced restores; so do we.
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.transform = transform;
        self.commands.push(DrawCommand::SetTransform(transform));
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, point: Vec2) {
        self.commands.push(DrawCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: Vec2) {
        self.commands.push(DrawCommand::LineTo(point));
    }

    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start: start_angle,
            end: end_angle,
        });
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::FillRect { origin, size });
    }

    fn stroke_rect(&mut self, origin: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::StrokeRect { origin, size });
    }

    fn set_fill_style(&mut self, style: &str) {
        self.commands.push(DrawCommand::FillStyle(style.to_owned()));
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.commands.push(DrawCommand::StrokeStyle(style.to_owned()));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::Font(font.to_owned()));
    }

    fn fill_text(&mut self, text: &str, at: Vec2) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_owned(),
            at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_restore_tracks_transform() {
        let mut s = RecordingSurface::new(800.0, 600.0);
        let moved = Affine2::from_translation(Vec2::new(5.0, 5.0));
        s.save();
        s.set_transform(moved);
        assert_eq!(s.current_transform(), moved);
        assert_eq!(s.save_depth(), 1);
        s.restore();
        assert_eq!(s.current_transform(), Affine2::IDENTITY);
        assert_eq!(s.save_depth(), 0);
    }

    #[test]
    fn fill_transforms_replays_state() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        let a = Affine2::from_translation(Vec2::new(1.0, 0.0));
        s.save();
        s.set_transform(a);
        s.fill_rect(Vec2::ZERO, Vec2::ONE);
        s.restore();
        s.fill();
        assert_eq!(s.fill_transforms(), vec![a, Affine2::IDENTITY]);
    }

    #[test]
    fn drain_empties_recording() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        s.clear();
        assert_eq!(s.drain(), vec![DrawCommand::Clear]);
        assert!(s.commands().is_empty());
    }
}
