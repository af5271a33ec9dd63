use glam::{Affine2, Vec2};

/// Default lower bound for camera zoom.
pub const DEFAULT_MIN_ZOOM: f32 = 1.0;

/// `min_zoom` itself is never allowed below this.
const ZOOM_EPSILON: f32 = 1e-3;

/// 2D camera. Position and rotation come from the transform of the entity the
/// camera component is attached to; the camera itself only holds zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    zoom: f32,
    min_zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            zoom: DEFAULT_MIN_ZOOM,
            min_zoom: DEFAULT_MIN_ZOOM,
        }
    }

    /// Set the zoom floor. Non-finite or non-positive floors are replaced so
    /// the view matrix can never degenerate.
    pub fn with_min_zoom(mut self, min_zoom: f32) -> Self {
        self.min_zoom = if min_zoom.is_finite() {
            min_zoom.max(ZOOM_EPSILON)
        } else {
            DEFAULT_MIN_ZOOM
        };
        self.zoom = self.zoom.max(self.min_zoom);
        self
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    /// Set zoom, clamped to the floor. NaN collapses to the floor.
    pub fn set_zoom(&mut self, zoom: f32) {
        let zoom = if zoom.is_infinite() { self.zoom } else { zoom };
        self.zoom = zoom.max(self.min_zoom);
    }

    pub fn update_zoom(&mut self, f: impl FnOnce(f32) -> f32) {
        self.set_zoom(f(self.zoom));
    }

    pub fn zoom_by(&mut self, delta: f32) {
        self.set_zoom(self.zoom + delta);
    }

    /// Build the view matrix:
    /// translate(origin) · scale(zoom) · translate(−position) · rotate(−rotation).
    pub fn view_matrix(&self, origin: Vec2, position: Vec2, rotation: f32) -> Affine2 {
        Affine2::from_translation(origin)
            * Affine2::from_scale(Vec2::splat(self.zoom))
            * Affine2::from_translation(-position)
            * Affine2::from_angle(-rotation)
    }

    /// View matrix for a camera whose transform has the given world matrix.
    /// Camera scale is ignored; only position and rotation matter.
    pub fn view_matrix_for(&self, origin: Vec2, camera_world: Affine2) -> Affine2 {
        let rotation = camera_world.matrix2.x_axis.y.atan2(camera_world.matrix2.x_axis.x);
        self.view_matrix(origin, camera_world.translation, rotation)
    }
}

/// Fixed virtual resolution that gameplay works in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub virtual_width: f32,
    pub virtual_height: f32,
}

/// Uniform scale-to-fit plus centering offset, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub offset: Vec2,
}

impl Letterbox {
    pub fn matrix(&self) -> Affine2 {
        Affine2::from_translation(self.offset) * Affine2::from_scale(Vec2::splat(self.scale))
    }

    /// Map a device-pixel position back into virtual coordinates.
    pub fn to_virtual(&self, device: Vec2) -> Vec2 {
        (device - self.offset) / self.scale
    }
}

impl Viewport {
    pub fn new(virtual_width: f32, virtual_height: f32) -> Self {
        Self {
            virtual_width,
            virtual_height,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.virtual_width, self.virtual_height)
    }

    /// Center of the virtual area; the camera looks at this point.
    pub fn origin(&self) -> Vec2 {
        self.size() / 2.0
    }

    /// Fit the virtual area into a surface of `surface` pixels, keeping the
    /// aspect ratio. Bars appear on the long axis.
    pub fn fit(&self, surface: Vec2) -> Letterbox {
        if self.virtual_width <= 0.0 || self.virtual_height <= 0.0 || surface.x <= 0.0 || surface.y <= 0.0 {
            return Letterbox {
                scale: 1.0,
                offset: Vec2::ZERO,
            };
        }
        let horiz_ratio = surface.x / self.virtual_width;
        let vert_ratio = surface.y / self.virtual_height;
        let scale = horiz_ratio.min(vert_ratio);
        let offset = (surface - self.size() * scale) / 2.0;
        Letterbox { scale, offset }
    }
}
