use serde::{Deserialize, Serialize};

use crate::{CollisionShape, TileGrid, TileKind};

/// Identifier of an enemy archetype stored alongside a spawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyTypeId(u8);

impl EnemyTypeId {
    /// Creates a new enemy type identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the raw byte value.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Sparse entry describing one non-empty tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRecord {
    /// Column of the tile.
    pub x: u16,
    /// Row of the tile, zero at the top.
    pub y: u16,
    /// Material of the tile.
    pub kind: TileKind,
    /// Collision shape of the tile.
    pub shape: CollisionShape,
}

/// Spawn position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Tile column.
    pub x: i32,
    /// Tile row, zero at the top.
    pub y: i32,
}

impl SpawnPoint {
    /// Creates a spawn point at the tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Enemy placement stored in a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemySpawn {
    /// Tile coordinate the enemy starts on.
    pub at: SpawnPoint,
    /// Archetype of the enemy.
    pub enemy_type: EnemyTypeId,
}

/// Everything persisted for a level: grid shape, sparse tiles and spawns.
///
/// Decoding always produces a fresh value, so a failed load never leaves a
/// half-written level behind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    /// Length of a tile edge in world units.
    pub tile_edge: u16,
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Non-empty tiles in row-major order.
    pub tiles: Vec<TileRecord>,
    /// Where the player starts, if authored.
    pub player_spawn: Option<SpawnPoint>,
    /// Enemy placements.
    pub enemy_spawns: Vec<EnemySpawn>,
}

impl LevelData {
    /// Captures the non-empty tiles of a grid together with spawn metadata.
    ///
    /// Cells whose coordinates do not fit the file's 16-bit tile indices are
    /// not captured.
    #[must_use]
    pub fn from_grid(
        grid: &TileGrid,
        player_spawn: Option<SpawnPoint>,
        enemy_spawns: Vec<EnemySpawn>,
    ) -> Self {
        let tiles = grid
            .iter_non_empty()
            .filter_map(|(x, y, cell)| {
                Some(TileRecord {
                    x: u16::try_from(x).ok()?,
                    y: u16::try_from(y).ok()?,
                    kind: cell.kind(),
                    shape: cell.shape(),
                })
            })
            .collect();

        Self {
            tile_edge: grid.tile_edge(),
            columns: grid.columns(),
            rows: grid.rows(),
            tiles,
            player_spawn,
            enemy_spawns,
        }
    }

    /// Expands the sparse tile list into a dense grid.
    #[must_use]
    pub fn to_grid(&self) -> TileGrid {
        let mut grid = TileGrid::new(self.columns, self.rows, self.tile_edge);
        for tile in &self.tiles {
            grid.set_cell(
                i32::from(tile.x),
                i32::from(tile.y),
                tile.kind,
                tile.shape,
            );
        }
        grid
    }
}
