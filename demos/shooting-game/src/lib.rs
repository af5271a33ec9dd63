use wasm_bindgen::prelude::*;

mod enemy;
mod game;
mod player;
mod projectile;

use game::ShootingGame;

ecs_web::export_game!(ShootingGame, "shooting-game");
