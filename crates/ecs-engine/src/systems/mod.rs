pub mod collision;
pub mod debug;
pub mod render;
