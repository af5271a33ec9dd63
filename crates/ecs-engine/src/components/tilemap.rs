//! Hex tile map component.
//!
//! Tiles live on an axial hex grid (`q` columns, `r` rows slanted by half a
//! row per column). The map is drawn as filled hexagons centred on the
//! entity's transform.

use std::collections::HashMap;
use std::ops::{Add, Sub};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::renderer::traits::{fill_polygon, Surface};

/// On-screen width of one hex, in world units.
pub const HEX_WIDTH: f32 = 20.0;
/// On-screen height of one hex: `floor(HEX_WIDTH * 13 / 15)`.
pub const HEX_HEIGHT: f32 = 17.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileTerrain {
    Void,
    Test,
    Ocean,
    OceanShelf,
    Shore,
    Grass,
    Tundra,
    Arctic,
}

impl TileTerrain {
    pub const ALL: [TileTerrain; 8] = [
        TileTerrain::Void,
        TileTerrain::Test,
        TileTerrain::Ocean,
        TileTerrain::OceanShelf,
        TileTerrain::Shore,
        TileTerrain::Grass,
        TileTerrain::Tundra,
        TileTerrain::Arctic,
    ];

    pub fn fill_style(self) -> &'static str {
        match self {
            TileTerrain::Void => "#000000",
            TileTerrain::Test => "#ff00ff",
            TileTerrain::Ocean => "#1f3b70",
            TileTerrain::OceanShelf => "#2f5f9e",
            TileTerrain::Shore => "#d8c68a",
            TileTerrain::Grass => "#4f8a3a",
            TileTerrain::Tundra => "#8c9a86",
            TileTerrain::Arctic => "#eef4f7",
        }
    }

    pub fn is_water(self) -> bool {
        matches!(self, TileTerrain::Ocean | TileTerrain::OceanShelf)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileFeature {
    #[default]
    None,
    Hill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

impl AxialCoord {
    pub const NEIGHBOR_OFFSETS: [AxialCoord; 6] = [
        AxialCoord { q: 1, r: 0 },
        AxialCoord { q: 1, r: -1 },
        AxialCoord { q: 0, r: -1 },
        AxialCoord { q: -1, r: 0 },
        AxialCoord { q: -1, r: 1 },
        AxialCoord { q: 0, r: 1 },
    ];

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn neighbors(self) -> [AxialCoord; 6] {
        Self::NEIGHBOR_OFFSETS.map(|o| self + o)
    }

    /// Hex distance in steps.
    pub fn distance(self, other: AxialCoord) -> i32 {
        let d = self - other;
        (d.q.abs() + d.r.abs() + (d.q + d.r).abs()) / 2
    }
}

impl Add for AxialCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for AxialCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

/// World position of a (possibly fractional) axial coordinate. With
/// `center`, the result is the middle of the hex rather than its corner.
pub fn axial_to_world(q: f32, r: f32, center: bool) -> Vec2 {
    let (q, r) = if center { (q - 2.0 / 3.0, r + 1.0 / 3.0) } else { (q, r) };
    Vec2::new(q * HEX_WIDTH / 2.0 * 1.5, q * HEX_HEIGHT / 2.0 + r * HEX_HEIGHT)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexTile {
    pub position: AxialCoord,
    pub terrain: TileTerrain,
    #[serde(default)]
    pub feature: TileFeature,
    pub is_passable: bool,
    pub speed_modifier: f32,
}

impl HexTile {
    pub fn new(position: AxialCoord, terrain: TileTerrain) -> Self {
        Self {
            position,
            terrain,
            feature: TileFeature::None,
            is_passable: true,
            speed_modifier: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HexTileMap {
    columns: u32,
    column_height: u32,
    tiles: Vec<HexTile>,
    lookup: HashMap<AxialCoord, usize>,
    polygon: [Vec2; 6],
}

impl HexTileMap {
    /// An empty map sized for `columns * column_height` tiles.
    pub fn new(columns: u32, column_height: u32) -> Self {
        let radius = HEX_WIDTH / 2.0;
        let step = std::f32::consts::TAU / 6.0;
        let polygon = std::array::from_fn(|i| Vec2::from_angle(step * i as f32) * radius);
        Self {
            columns,
            column_height,
            tiles: Vec::new(),
            lookup: HashMap::new(),
            polygon,
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn column_height(&self) -> u32 {
        self.column_height
    }

    /// Number of tiles a full map holds.
    pub fn num_tiles(&self) -> usize {
        self.columns as usize * self.column_height as usize
    }

    /// Replace all tiles. The set must be exactly `num_tiles` long; on a
    /// mismatch the current tiles are kept.
    pub fn set_tiles(&mut self, tiles: Vec<HexTile>) -> Result<()> {
        if tiles.len() != self.num_tiles() {
            return Err(EngineError::InvalidArgument {
                expected: self.num_tiles(),
                actual: tiles.len(),
            });
        }
        self.lookup = tiles.iter().enumerate().map(|(i, t)| (t.position, i)).collect();
        self.tiles = tiles;
        Ok(())
    }

    pub fn tile_at(&self, coord: AxialCoord) -> Option<&HexTile> {
        self.lookup.get(&coord).map(|&i| &self.tiles[i])
    }

    pub fn tiles(&self) -> &[HexTile] {
        &self.tiles
    }

    /// Offset that centres the map on its transform's origin.
    fn local_offset(&self) -> (f32, f32) {
        (
            2.0 / 3.0 - self.columns as f32 / 2.0,
            2.0 / 3.0 - self.column_height as f32 / 2.0,
        )
    }

    /// Local-space centre of a tile.
    pub fn tile_center(&self, coord: AxialCoord) -> Vec2 {
        let (dq, dr) = self.local_offset();
        axial_to_world(coord.q as f32 + dq, coord.r as f32 + dr, true)
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        for tile in &self.tiles {
            let at = self.tile_center(tile.position);
            fill_polygon(surface, &self.polygon, at, tile.terrain.fill_style());
        }
    }
}
