// extensions/mod.rs
//
// Optional extension modules. Nothing in the core depends on these; games opt
// in by adding the components or calling the functions they provide.

pub mod camera_controller;
pub mod map_generation;

pub use camera_controller::controllable_camera;
pub use map_generation::{
    banded_hex_map, generate_tile_map, MapAlgorithm, MapGenerationError, MapGenerationRequest,
    MapGenerationResponse, NoiseParameters,
};
