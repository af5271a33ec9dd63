// extensions/map_generation.rs
//
// Contract between the engine and tile-map generators. The engine does not
// generate terrain itself; a generator receives a request, reports progress,
// and finishes it exactly once with either a map or an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::tilemap::{AxialCoord, HexTile, HexTileMap, TileTerrain};
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// `None` lets the generator pick one.
    pub seed: Option<u32>,
    pub octaves: u32,
    pub frequency: f32,
    pub persistence: f32,
    pub lacunarity: f32,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            seed: None,
            octaves: 4,
            frequency: 1.0,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum MapGenerationError {
    #[error("map generation failed: {0}")]
    Failed(String),

    #[error("generated map rejected: {0}")]
    InvalidMap(#[from] EngineError),

    /// The request was dropped before the generator finished it.
    #[error("map generation request was abandoned")]
    Abandoned,
}

#[derive(Debug)]
pub struct MapGenerationResponse {
    pub columns: u32,
    pub column_height: u32,
    pub tile_map: HexTileMap,
}

type CompleteFn = Box<dyn FnOnce(MapGenerationResponse)>;
type ErrorFn = Box<dyn FnOnce(MapGenerationError)>;
type StatusFn = Box<dyn FnMut(&str)>;

/// A pending generation job.
///
/// Consumed by exactly one of [`complete`](Self::complete) or
/// [`fail`](Self::fail). Dropping it unfinished reports
/// [`MapGenerationError::Abandoned`], so one outcome callback always fires.
pub struct MapGenerationRequest {
    pub columns: u32,
    pub column_height: u32,
    pub noise: NoiseParameters,
    /// Share of tiles that should end up as water, in `[0, 1]`.
    pub water_percentage: f32,
    on_complete: Option<CompleteFn>,
    on_error: Option<ErrorFn>,
    on_status_change: Option<StatusFn>,
}

impl MapGenerationRequest {
    pub fn new(
        columns: u32,
        column_height: u32,
        on_complete: impl FnOnce(MapGenerationResponse) + 'static,
    ) -> Self {
        Self {
            columns,
            column_height,
            noise: NoiseParameters::default(),
            water_percentage: 0.5,
            on_complete: Some(Box::new(on_complete)),
            on_error: None,
            on_status_change: None,
        }
    }

    pub fn with_noise(mut self, noise: NoiseParameters) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_water_percentage(mut self, water_percentage: f32) -> Self {
        self.water_percentage = water_percentage.clamp(0.0, 1.0);
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(MapGenerationError) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_status_change(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_status_change = Some(Box::new(f));
        self
    }

    /// Report progress. May be called any number of times.
    pub fn report_status(&mut self, status: &str) {
        log::debug!("map generation: {status}");
        if let Some(f) = self.on_status_change.as_mut() {
            f(status);
        }
    }

    /// Finish with a map. A map whose dimensions differ from the request, or
    /// whose tiles were never filled in, is rejected through `on_error`
    /// instead.
    pub fn complete(mut self, tile_map: HexTileMap) {
        if tile_map.columns() != self.columns || tile_map.column_height() != self.column_height {
            let err = EngineError::InvalidArgument {
                expected: self.columns as usize * self.column_height as usize,
                actual: tile_map.num_tiles(),
            };
            self.fail(err.into());
            return;
        }
        if tile_map.tiles().len() != tile_map.num_tiles() {
            let err = EngineError::InvalidArgument {
                expected: tile_map.num_tiles(),
                actual: tile_map.tiles().len(),
            };
            self.fail(err.into());
            return;
        }
        self.on_error = None;
        if let Some(f) = self.on_complete.take() {
            f(MapGenerationResponse {
                columns: self.columns,
                column_height: self.column_height,
                tile_map,
            });
        }
    }

    /// Finish with an error.
    pub fn fail(mut self, error: MapGenerationError) {
        self.on_complete = None;
        log::warn!("{error}");
        if let Some(f) = self.on_error.take() {
            f(error);
        }
    }
}

impl Drop for MapGenerationRequest {
    fn drop(&mut self) {
        if self.on_complete.take().is_none() {
            return;
        }
        log::warn!(
            "map generation request {}x{} dropped without an outcome",
            self.columns,
            self.column_height
        );
        if let Some(f) = self.on_error.take() {
            f(MapGenerationError::Abandoned);
        }
    }
}

/// Something that can fulfil a [`MapGenerationRequest`], now or later.
pub trait MapAlgorithm {
    fn generate(&self, request: MapGenerationRequest);
}

impl<F: Fn(MapGenerationRequest)> MapAlgorithm for F {
    fn generate(&self, request: MapGenerationRequest) {
        self(request)
    }
}

/// Hand a request to an algorithm.
pub fn generate_tile_map(algorithm: &dyn MapAlgorithm, request: MapGenerationRequest) {
    log::debug!("generating {}x{} tile map", request.columns, request.column_height);
    algorithm.generate(request);
}

/// Land terrains the banded generator cycles through.
const LAND_BANDS: [TileTerrain; 4] = [
    TileTerrain::Shore,
    TileTerrain::Grass,
    TileTerrain::Tundra,
    TileTerrain::Arctic,
];

/// Deterministic placeholder generator: diagonal land bands, with the
/// requested share of tiles flooded starting from the top-left diagonal.
/// Each column's `r` range is shifted up half a row per column so the map
/// comes out rectangular on screen.
pub fn banded_hex_map(mut request: MapGenerationRequest) {
    request.report_status("Initializing");
    let mut map = HexTileMap::new(request.columns, request.column_height);

    request.report_status("Generating Tiles");
    let mut tiles = Vec::with_capacity(map.num_tiles());
    for q in 0..request.columns {
        let offset = -(q as f32 / 2.0);
        for step in 0..request.column_height {
            let r = offset + step as f32;
            let band = (r + q as f32).abs().ceil() as usize % LAND_BANDS.len();
            tiles.push(HexTile::new(AxialCoord::new(q as i32, r.floor() as i32), LAND_BANDS[band]));
        }
    }

    request.report_status("Placing Water");
    let water = (tiles.len() as f32 * request.water_percentage).round() as usize;
    // The last column's worth of water borders land and becomes shelf.
    let shelf_from = water.saturating_sub(request.column_height as usize);
    let mut order: Vec<usize> = (0..tiles.len()).collect();
    order.sort_by_key(|&i| {
        let p = tiles[i].position;
        (p.q + p.r, p.q)
    });
    for (n, &i) in order.iter().take(water).enumerate() {
        tiles[i].terrain = if n >= shelf_from {
            TileTerrain::OceanShelf
        } else {
            TileTerrain::Ocean
        };
    }
    request.report_status(&format!("Generated {} tiles, {} water", tiles.len(), water));

    if let Err(e) = map.set_tiles(tiles) {
        request.fail(e.into());
        return;
    }
    request.report_status("Done");
    request.complete(map);
}
