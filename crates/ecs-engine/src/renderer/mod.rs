pub mod camera;
pub mod recording;
pub mod traits;

pub use camera::{Camera, Letterbox, Viewport};
pub use recording::{DrawCommand, RecordingSurface};
pub use traits::{fill_polygon, Surface};
