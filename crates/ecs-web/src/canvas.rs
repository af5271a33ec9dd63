use ecs_engine::Surface;
use glam::{Affine2, Vec2};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// [`Surface`] over a browser Canvas2D context.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    size: Vec2,
}

impl CanvasSurface {
    /// Wrap `ctx`. Without an explicit `size` the backing canvas's pixel
    /// size is used.
    pub fn new(ctx: CanvasRenderingContext2d, size: Option<Vec2>) -> Self {
        let size = size.unwrap_or_else(|| canvas_size(&ctx));
        Self { ctx, size }
    }
}

fn canvas_size(ctx: &CanvasRenderingContext2d) -> Vec2 {
    ctx.canvas()
        .map(|c| Vec2::new(c.width() as f32, c.height() as f32))
        .unwrap_or(Vec2::ZERO)
}

fn report(op: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("canvas {op} failed: {e:?}");
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_transform(&mut self, transform: Affine2) {
        let m = transform.matrix2;
        let t = transform.translation;
        report(
            "setTransform",
            self.ctx.set_transform(
                m.x_axis.x as f64,
                m.x_axis.y as f64,
                m.y_axis.x as f64,
                m.y_axis.y as f64,
                t.x as f64,
                t.y as f64,
            ),
        );
    }

    fn clear(&mut self) {
        self.ctx.save();
        report("setTransform", self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
        self.ctx.clear_rect(0.0, 0.0, self.size.x as f64, self.size.y as f64);
        self.ctx.restore();
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, point: Vec2) {
        self.ctx.move_to(point.x as f64, point.y as f64);
    }

    fn line_to(&mut self, point: Vec2) {
        self.ctx.line_to(point.x as f64, point.y as f64);
    }

    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32) {
        report(
            "arc",
            self.ctx.arc(
                center.x as f64,
                center.y as f64,
                radius.max(0.0) as f64,
                start_angle as f64,
                end_angle as f64,
            ),
        );
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2) {
        self.ctx.fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn stroke_rect(&mut self, origin: Vec2, size: Vec2) {
        self.ctx.stroke_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ctx.set_fill_style_str(style);
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.ctx.set_stroke_style_str(style);
    }

    fn set_line_width(&mut self, width: f32) {
        self.ctx.set_line_width(width as f64);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn fill_text(&mut self, text: &str, at: Vec2) {
        report("fillText", self.ctx.fill_text(text, at.x as f64, at.y as f64));
    }
}
