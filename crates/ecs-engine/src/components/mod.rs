pub mod collider;
pub mod component;
pub mod entity;
pub mod tilemap;
