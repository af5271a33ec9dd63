use wasm_bindgen::prelude::*;

mod game;

use game::UnitTasking;

ecs_web::export_game!(UnitTasking, "unit-tasking");
