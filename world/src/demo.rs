use tilestep_core::{LevelData, TileGrid, TileKind};

const COLUMNS: u32 = 60;
const ROWS: u32 = 33;
const TILE_EDGE: u16 = 32;

/// Builds the fixed layout used when no level file is available.
///
/// A two-row floor spans the bottom of the level. Above it sit three solid
/// ledges of rising height, a run of one-way platforms and a short wall.
/// The layout carries no spawns, so the world falls back to its default
/// player and enemy positions.
#[must_use]
pub fn demo_level() -> LevelData {
    let mut grid = TileGrid::new(COLUMNS, ROWS, TILE_EDGE);
    let bottom = ROWS as i32;
    let width = COLUMNS as i32;

    for column in 0..width {
        grid.set(column, bottom - 1, TileKind::Solid);
        grid.set(column, bottom - 2, TileKind::Solid);
    }
    for column in 3..8 {
        grid.set(column, bottom - 5, TileKind::Solid);
    }
    for column in 12..18 {
        grid.set(column, bottom - 7, TileKind::Solid);
    }
    for column in 22..28 {
        grid.set(column, bottom - 9, TileKind::Solid);
    }
    for column in 8..12 {
        grid.set(column, bottom - 4, TileKind::Platform);
    }
    for row in (bottom - 6)..(bottom - 2) {
        grid.set(30, row, TileKind::Solid);
    }

    LevelData::from_grid(&grid, None, Vec::new())
}
