pub mod pool;
pub mod scene;
pub mod time;
pub mod transform;
