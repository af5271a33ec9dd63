use glam::Vec2;
use ecs_engine::{
    EngineError, FrameTimer, Game, InputEvent, InputQueue, InputResponse, KeyEdge, KeyEvent, Scene,
    Surface,
};

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game (e.g., `shooting-game`) creates a `thread_local!`
/// GameRunner and exports free functions via `#[wasm_bindgen]`, because
/// wasm-bindgen cannot export generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    scene: Scene,
    input: InputQueue,
    timer: FrameTimer,
    initialized: bool,
    /// Last size reported by the host, in device pixels.
    surface_size: Option<Vec2>,
    missing_camera_reported: bool,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let timer = FrameTimer::new(config.max_frame_dt);
        Self {
            game,
            scene: Scene::new(config),
            input: InputQueue::new(),
            timer,
            initialized: false,
            surface_size: None,
            missing_camera_reported: false,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        if self.initialized {
            log::warn!("game already initialized");
            return;
        }
        self.game.init(&mut self.scene);
        self.initialized = true;
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Queue a key press. Returns whether the key is bound, so the host can
    /// suppress the browser's default action for it.
    pub fn key_down(&mut self, key: &str) -> bool {
        self.push_input(InputEvent::KeyDown { key: key.to_owned() });
        self.scene.input().is_bound(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.push_input(InputEvent::KeyUp { key: key.to_owned() });
        self.scene.input().is_bound(key)
    }

    pub fn wheel(&mut self, delta: f32) {
        self.push_input(InputEvent::Wheel { delta });
    }

    /// Release every held key, e.g. when the page loses focus. Events still
    /// queued are dropped with them.
    pub fn release_keys(&mut self) {
        self.input.drain();
        self.scene.input_mut().release_all();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.surface_size = Some(Vec2::new(width, height));
    }

    pub fn surface_size(&self) -> Option<Vec2> {
        self.surface_size
    }

    /// Run one frame: dispatch queued input, then game logic, component
    /// updates and collision resolution.
    pub fn tick(&mut self, timestamp_ms: f64) {
        if !self.initialized {
            return;
        }
        let dt = self.timer.tick(timestamp_ms);

        for event in self.input.drain() {
            match event {
                InputEvent::KeyDown { key } => {
                    self.handle_key(&key, KeyEdge::Down);
                }
                InputEvent::KeyUp { key } => {
                    self.handle_key(&key, KeyEdge::Up);
                }
                InputEvent::Wheel { delta } => self.game.on_wheel(&mut self.scene, delta),
            }
        }

        self.game.update(&mut self.scene, dt);
        self.scene.update(dt);
        self.scene.late_update();
    }

    fn handle_key(&mut self, key: &str, edge: KeyEdge) -> InputResponse {
        self.scene.handle_input(&KeyEvent::new(key), edge)
    }

    /// Draw the scene. Returns false if nothing was drawn.
    pub fn draw(&mut self, surface: &mut dyn Surface) -> bool {
        if !self.initialized {
            return false;
        }
        match self.scene.render(surface) {
            Ok(()) => {
                self.missing_camera_reported = false;
                true
            }
            Err(EngineError::MissingCamera) => {
                if !self.missing_camera_reported {
                    log::warn!("no camera set; skipping draw");
                    self.missing_camera_reported = true;
                }
                false
            }
            Err(e) => {
                log::error!("draw failed: {e}");
                false
            }
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn game(&self) -> &G {
        &self.game
    }
}
