pub mod canvas;
pub mod runner;

pub use canvas::CanvasSurface;
pub use runner::GameRunner;

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Generates `thread_local!` storage for the GameRunner, a `with_runner()`
/// helper and the exports the page calls: `game_init`, `game_tick`,
/// `game_key_down`, `game_key_up`, `game_blur`, `game_wheel`, `game_resize`
/// and `game_draw`.
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod game;
/// use game::MyGame;
///
/// ecs_web::export_game!(MyGame, "my-game");
/// ```
///
/// The game type needs a `new()` constructor. The calling crate must depend
/// on `wasm-bindgen`, `web-sys` (with `CanvasRenderingContext2d`), `log`,
/// `console_log` and `console_error_panic_hook`.
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        /// Runs `f` against the runner, or returns `None` before `game_init`.
        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> Option<R> {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                match borrow.as_mut() {
                    Some(runner) => Some(f(runner)),
                    None => {
                        log::warn!("{}: game_init() has not been called", $game_name);
                        None
                    }
                }
            })
        }

        #[wasm_bindgen]
        pub fn game_init() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let game = <$game_type>::new();
            let runner = $crate::GameRunner::new(game);

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init());
            log::info!("{}: initialized", $game_name);
        }

        /// `timestamp` is the `requestAnimationFrame` time in milliseconds.
        #[wasm_bindgen]
        pub fn game_tick(timestamp: f64) {
            with_runner(|r| r.tick(timestamp));
        }

        /// Returns true when the key is bound and its default action should
        /// be prevented.
        #[wasm_bindgen]
        pub fn game_key_down(key: &str) -> bool {
            with_runner(|r| r.key_down(key)).unwrap_or(false)
        }

        #[wasm_bindgen]
        pub fn game_key_up(key: &str) -> bool {
            with_runner(|r| r.key_up(key)).unwrap_or(false)
        }

        #[wasm_bindgen]
        pub fn game_blur() {
            with_runner(|r| r.release_keys());
        }

        #[wasm_bindgen]
        pub fn game_wheel(delta: f32) {
            with_runner(|r| r.wheel(delta));
        }

        #[wasm_bindgen]
        pub fn game_resize(width: f32, height: f32) {
            with_runner(|r| r.resize(width, height));
        }

        #[wasm_bindgen]
        pub fn game_draw(ctx: &web_sys::CanvasRenderingContext2d) -> bool {
            with_runner(|r| {
                let mut surface = $crate::CanvasSurface::new(ctx.clone(), r.surface_size());
                r.draw(&mut surface)
            })
            .unwrap_or(false)
        }
    };
}
