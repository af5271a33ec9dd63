//! Unit tasking sandbox - a pannable, zoomable view over a generated hex map
//! with a single vessel on it.

use std::cell::RefCell;
use std::rc::Rc;

use ecs_engine::{
    banded_hex_map, controllable_camera, generate_tile_map, Camera, ComponentDesc, EntityId, Game,
    MapGenerationRequest, MapGenerationResponse, Scene,
};
use glam::Vec2;

/// World units per second at zoom 1.
const PAN_SPEED: f32 = 500.0;

const MAP_COLUMNS: u32 = 40;
const MAP_COLUMN_HEIGHT: u32 = 24;
const WATER_PERCENTAGE: f32 = 0.4;

const VESSEL_LENGTH: f32 = 12.0;

/// Finished generation results waiting to be applied on the next frame.
type Mailbox = Rc<RefCell<Option<MapGenerationResponse>>>;

pub struct UnitTasking {
    pending: Mailbox,
    map: Option<EntityId>,
}

impl UnitTasking {
    pub fn new() -> Self {
        Self {
            pending: Rc::new(RefCell::new(None)),
            map: None,
        }
    }

    /// Ask for a new map. The result is applied by the next `update`.
    pub fn regenerate(&self) {
        let mailbox = self.pending.clone();
        let request = MapGenerationRequest::new(MAP_COLUMNS, MAP_COLUMN_HEIGHT, move |response| {
            *mailbox.borrow_mut() = Some(response);
        })
        .with_water_percentage(WATER_PERCENTAGE)
        .on_error(|e| log::error!("map generation: {e}"))
        .on_status_change(|status| log::debug!("map generation: {status}"));
        generate_tile_map(&banded_hex_map, request);
    }

    fn setup(&mut self, scene: &mut Scene) -> ecs_engine::Result<()> {
        let map = scene.spawn_entity("Map");
        self.map = Some(map);

        let camera = scene.spawn_entity("Main Camera");
        let lens = Camera::new().with_min_zoom(scene.config().min_zoom);
        scene.set_camera(camera, controllable_camera(lens, PAN_SPEED))?;

        let vessel = scene.spawn_entity("Vessel");
        scene.add_component_to(
            vessel,
            ComponentDesc::new().on_render(|s| {
                s.set_fill_style("white");
                s.begin_path();
                s.move_to(Vec2::new(VESSEL_LENGTH / 2.0, 0.0));
                s.line_to(Vec2::new(-VESSEL_LENGTH / 2.0, -VESSEL_LENGTH / 3.0));
                s.line_to(Vec2::new(-VESSEL_LENGTH / 2.0, VESSEL_LENGTH / 3.0));
                s.close_path();
                s.fill();
            }),
        )?;

        self.regenerate();
        Ok(())
    }
}

impl Game for UnitTasking {
    fn init(&mut self, scene: &mut Scene) {
        if let Err(e) = self.setup(scene) {
            log::error!("unit tasking setup failed: {e}");
        }
    }

    fn update(&mut self, scene: &mut Scene, _dt: f32) {
        let Some(response) = self.pending.borrow_mut().take() else { return };
        let Some(map) = self.map else { return };
        match scene.apply_tile_map(map, response.tile_map) {
            Ok(_) => log::info!("map {}x{} applied", response.columns, response.column_height),
            Err(e) => log::error!("cannot apply map: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecs_engine::{DrawCommand, KeyEdge, KeyEvent, RecordingSurface};

    fn start() -> (UnitTasking, Scene) {
        let mut game = UnitTasking::new();
        let mut scene = Scene::new(game.config());
        game.init(&mut scene);
        (game, scene)
    }

    fn tile_maps(scene: &Scene, entity: EntityId) -> usize {
        scene
            .components_of(entity)
            .iter()
            .filter(|&&c| scene.component(c).is_some_and(|c| c.tile_map().is_some()))
            .count()
    }

    #[test]
    fn generated_map_is_applied_on_update() {
        let (mut game, mut scene) = start();
        let map = game.map.unwrap();
        assert_eq!(tile_maps(&scene, map), 0);
        assert!(game.pending.borrow().is_some());

        game.update(&mut scene, 0.016);
        assert_eq!(tile_maps(&scene, map), 1);
        let id = scene.find_component(map, |c| c.tile_map().is_some()).unwrap();
        let tiles = scene.component(id).unwrap().tile_map().unwrap().tiles().len();
        assert_eq!(tiles, (MAP_COLUMNS * MAP_COLUMN_HEIGHT) as usize);
    }

    #[test]
    fn regenerating_replaces_the_map() {
        let (mut game, mut scene) = start();
        let map = game.map.unwrap();
        game.update(&mut scene, 0.016);
        let first = scene.find_component(map, |c| c.tile_map().is_some()).unwrap();

        game.regenerate();
        game.update(&mut scene, 0.016);
        let second = scene.find_component(map, |c| c.tile_map().is_some()).unwrap();
        assert_ne!(first, second);
        assert_eq!(tile_maps(&scene, map), 1);
        assert!(!scene.contains_component(first));
    }

    #[test]
    fn camera_pans_and_zooms() {
        let (mut game, mut scene) = start();
        let camera = scene.find_entity("Main Camera").unwrap();
        scene.handle_input(&KeyEvent::new("s"), KeyEdge::Down);
        scene.update(0.1);
        assert!((scene.transform(camera).unwrap().position.y - 50.0).abs() < 1e-3);

        game.on_wheel(&mut scene, -200.0);
        assert_eq!(scene.camera().unwrap().zoom(), 3.0);
    }

    #[test]
    fn map_and_vessel_render() {
        let (mut game, mut scene) = start();
        game.update(&mut scene, 0.0);
        let mut surface = RecordingSurface::new(1024.0, 768.0);
        scene.render(&mut surface).unwrap();
        let fills = surface.commands().iter().filter(|c| **c == DrawCommand::Fill).count();
        assert_eq!(fills, (MAP_COLUMNS * MAP_COLUMN_HEIGHT) as usize + 1);
    }
}
