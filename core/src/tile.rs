use serde::{Deserialize, Serialize};

/// Material occupying a single tile of the level grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Open air that never obstructs motion.
    #[default]
    Empty,
    /// Impassable terrain.
    Solid,
    /// One-way ledge that only blocks actors landing on it from above.
    Platform,
}

impl TileKind {
    /// Byte value used by the level file format.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Solid => 1,
            Self::Platform => 2,
        }
    }

    /// Parses a tile kind from its level file byte.
    #[must_use]
    pub const fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Empty),
            1 => Some(Self::Solid),
            2 => Some(Self::Platform),
            _ => None,
        }
    }

    /// Collision shape assigned to freshly painted tiles of this kind.
    #[must_use]
    pub const fn default_shape(self) -> CollisionShape {
        match self {
            Self::Empty => CollisionShape::None,
            Self::Solid => CollisionShape::Full,
            Self::Platform => CollisionShape::Platform,
        }
    }
}

/// Geometry drawn by the collision overlay for a tile.
///
/// Motion resolution only distinguishes solid from platform tiles. Slopes and
/// half shapes are authored data that currently drive the overlay and
/// [`TileGrid::slope_surface_y`] but not actor movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionShape {
    /// No collision geometry. Only valid on empty tiles.
    #[default]
    None,
    /// The whole tile collides.
    Full,
    /// Diagonal rising from the bottom-left corner to the top-right corner.
    SlopeUpLeft,
    /// Diagonal falling from the top-left corner to the bottom-right corner.
    SlopeUpRight,
    /// Upper half of the tile.
    HalfTop,
    /// Lower half of the tile.
    HalfBottom,
    /// Left half of the tile.
    HalfLeft,
    /// Right half of the tile.
    HalfRight,
    /// Thin one-way surface along the top edge.
    Platform,
}

impl CollisionShape {
    /// Every shape in file byte order.
    pub const ALL: [Self; 9] = [
        Self::None,
        Self::Full,
        Self::SlopeUpLeft,
        Self::SlopeUpRight,
        Self::HalfTop,
        Self::HalfBottom,
        Self::HalfLeft,
        Self::HalfRight,
        Self::Platform,
    ];

    /// Byte value used by the level file format.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Full => 1,
            Self::SlopeUpLeft => 2,
            Self::SlopeUpRight => 3,
            Self::HalfTop => 4,
            Self::HalfBottom => 5,
            Self::HalfLeft => 6,
            Self::HalfRight => 7,
            Self::Platform => 8,
        }
    }

    /// Parses a collision shape from its level file byte.
    #[must_use]
    pub const fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Full),
            2 => Some(Self::SlopeUpLeft),
            3 => Some(Self::SlopeUpRight),
            4 => Some(Self::HalfTop),
            5 => Some(Self::HalfBottom),
            6 => Some(Self::HalfLeft),
            7 => Some(Self::HalfRight),
            8 => Some(Self::Platform),
            _ => None,
        }
    }

    /// Reports whether the shape is one of the two diagonals.
    #[must_use]
    pub const fn is_slope(self) -> bool {
        matches!(self, Self::SlopeUpLeft | Self::SlopeUpRight)
    }
}

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCell {
    kind: TileKind,
    shape: CollisionShape,
}

impl TileCell {
    /// Cell holding nothing.
    pub const EMPTY: Self = Self {
        kind: TileKind::Empty,
        shape: CollisionShape::None,
    };

    /// Value reported for every coordinate outside the grid.
    pub const OUT_OF_BOUNDS: Self = Self {
        kind: TileKind::Solid,
        shape: CollisionShape::Full,
    };

    /// Builds a cell, repairing the shape so the kind/shape pairing stays valid.
    ///
    /// Empty cells always carry [`CollisionShape::None`] and platforms always
    /// carry [`CollisionShape::Platform`]. Solid cells keep any explicit shape
    /// except `None` and `Platform`, which fall back to [`CollisionShape::Full`].
    #[must_use]
    pub const fn normalized(kind: TileKind, shape: CollisionShape) -> Self {
        let shape = match kind {
            TileKind::Empty => CollisionShape::None,
            TileKind::Platform => CollisionShape::Platform,
            TileKind::Solid => match shape {
                CollisionShape::None | CollisionShape::Platform => CollisionShape::Full,
                other => other,
            },
        };
        Self { kind, shape }
    }

    /// Material stored in the cell.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Collision shape stored in the cell.
    #[must_use]
    pub const fn shape(&self) -> CollisionShape {
        self.shape
    }

    /// Reports whether the cell holds no tile.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.kind, TileKind::Empty)
    }
}

/// Dense rectangular tile map addressed by column and row.
///
/// Row zero is the top of the level. Every query outside the grid resolves to
/// a solid, fully colliding tile so the level boundary behaves like a wall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_edge: u16,
    cells: Vec<TileCell>,
}

impl TileGrid {
    /// Creates an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32, tile_edge: u16) -> Self {
        Self {
            columns,
            rows,
            tile_edge,
            cells: vec![TileCell::EMPTY; cell_count(columns, rows)],
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Length of a tile edge in world units, as stored in level files.
    #[must_use]
    pub const fn tile_edge(&self) -> u16 {
        self.tile_edge
    }

    /// Length of a tile edge in world units as a float.
    #[must_use]
    pub fn tile_size(&self) -> f32 {
        f32::from(self.tile_edge)
    }

    /// Total width of the grid in world units.
    #[must_use]
    pub fn world_width(&self) -> f32 {
        self.columns as f32 * self.tile_size()
    }

    /// Total height of the grid in world units.
    #[must_use]
    pub fn world_height(&self) -> f32 {
        self.rows as f32 * self.tile_size()
    }

    /// Reports whether the coordinate addresses a cell inside the grid.
    #[must_use]
    pub fn contains(&self, column: i32, row: i32) -> bool {
        self.index(column, row).is_some()
    }

    /// Returns the cell at the coordinate, or a solid cell outside the grid.
    #[must_use]
    pub fn get(&self, column: i32, row: i32) -> TileCell {
        self.cell(column, row).unwrap_or(TileCell::OUT_OF_BOUNDS)
    }

    /// Returns the cell at the coordinate when it lies inside the grid.
    #[must_use]
    pub fn cell(&self, column: i32, row: i32) -> Option<TileCell> {
        self.index(column, row)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the tile blocks motion from every direction.
    #[must_use]
    pub fn is_solid(&self, column: i32, row: i32) -> bool {
        self.get(column, row).kind() == TileKind::Solid
    }

    /// Reports whether the tile is a one-way platform.
    #[must_use]
    pub fn is_platform(&self, column: i32, row: i32) -> bool {
        self.get(column, row).kind() == TileKind::Platform
    }

    /// Paints a tile kind, deriving its collision shape.
    ///
    /// Repainting a solid tile keeps a previously assigned slope or half
    /// shape. Coordinates outside the grid are ignored.
    pub fn set(&mut self, column: i32, row: i32, kind: TileKind) {
        if let Some(slot) = self.slot_mut(column, row) {
            *slot = TileCell::normalized(kind, slot.shape());
        }
    }

    /// Overrides the collision shape of an existing solid tile.
    ///
    /// Empty and platform tiles are left untouched, as are shapes that would
    /// not be valid on a solid tile.
    pub fn set_shape(&mut self, column: i32, row: i32, shape: CollisionShape) {
        if let Some(slot) = self.slot_mut(column, row) {
            if slot.kind() != TileKind::Solid {
                return;
            }
            if matches!(shape, CollisionShape::None | CollisionShape::Platform) {
                return;
            }
            *slot = TileCell::normalized(TileKind::Solid, shape);
        }
    }

    /// Stores a kind and shape pair after normalising it.
    pub fn set_cell(&mut self, column: i32, row: i32, kind: TileKind, shape: CollisionShape) {
        if let Some(slot) = self.slot_mut(column, row) {
            *slot = TileCell::normalized(kind, shape);
        }
    }

    /// Empties every cell while keeping the dimensions.
    pub fn clear(&mut self) {
        self.cells.fill(TileCell::EMPTY);
    }

    /// Changes the grid dimensions, keeping cells in the overlapping region.
    pub fn resize(&mut self, columns: u32, rows: u32) {
        let mut cells = vec![TileCell::EMPTY; cell_count(columns, rows)];
        let keep_columns = columns.min(self.columns) as usize;
        let keep_rows = rows.min(self.rows) as usize;
        for row in 0..keep_rows {
            let from = row * self.columns as usize;
            let to = row * columns as usize;
            cells[to..to + keep_columns].copy_from_slice(&self.cells[from..from + keep_columns]);
        }
        self.columns = columns;
        self.rows = rows;
        self.cells = cells;
    }

    /// Converts a world coordinate into the index of the tile containing it.
    #[must_use]
    pub fn tile_index(&self, world: f32) -> i32 {
        (world / self.tile_size()).floor() as i32
    }

    /// Iterates over every non-empty cell in row-major order.
    pub fn iter_non_empty(&self) -> impl Iterator<Item = (u32, u32, TileCell)> + '_ {
        let columns = self.columns.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty())
            .map(move |(index, cell)| ((index % columns) as u32, (index / columns) as u32, *cell))
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// Height of the tile's top surface at `world_x`.
    ///
    /// Slopes interpolate linearly between their corner heights and the lower
    /// half shape reports its mid-height. Half-width shapes only report a
    /// surface above the half they cover. Empty tiles have no surface.
    #[must_use]
    pub fn slope_surface_y(&self, column: i32, row: i32, world_x: f32) -> Option<f32> {
        let size = self.tile_size();
        let left = column as f32 * size;
        let top = row as f32 * size;
        let t = ((world_x - left) / size).clamp(0.0, 1.0);

        match self.get(column, row).shape() {
            CollisionShape::None => None,
            CollisionShape::Full | CollisionShape::HalfTop | CollisionShape::Platform => Some(top),
            CollisionShape::HalfBottom => Some(top + size * 0.5),
            CollisionShape::SlopeUpLeft => Some(top + size * (1.0 - t)),
            CollisionShape::SlopeUpRight => Some(top + size * t),
            CollisionShape::HalfLeft => (t <= 0.5).then_some(top),
            CollisionShape::HalfRight => (t >= 0.5).then_some(top),
        }
    }

    fn slot_mut(&mut self, column: i32, row: i32) -> Option<&mut TileCell> {
        let index = self.index(column, row)?;
        self.cells.get_mut(index)
    }

    fn index(&self, column: i32, row: i32) -> Option<usize> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        if column < self.columns && row < self.rows {
            Some(row as usize * self.columns as usize + column as usize)
        } else {
            None
        }
    }
}

fn cell_count(columns: u32, rows: u32) -> usize {
    columns as usize * rows as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn painting_derives_default_shapes() {
        let mut grid = TileGrid::new(4, 4, 32);
        grid.set(1, 1, TileKind::Solid);
        grid.set(2, 1, TileKind::Platform);

        assert_eq!(grid.get(1, 1).shape(), CollisionShape::Full);
        assert_eq!(grid.get(2, 1).shape(), CollisionShape::Platform);
        assert_eq!(grid.get(0, 0).shape(), CollisionShape::None);
    }

    #[test]
    fn repainting_solid_keeps_explicit_shape() {
        let mut grid = TileGrid::new(4, 4, 32);
        grid.set(1, 1, TileKind::Solid);
        grid.set_shape(1, 1, CollisionShape::SlopeUpLeft);
        grid.set(1, 1, TileKind::Solid);
        assert_eq!(grid.get(1, 1).shape(), CollisionShape::SlopeUpLeft);

        grid.set(1, 1, TileKind::Empty);
        assert_eq!(grid.get(1, 1), TileCell::EMPTY);
    }

    #[test]
    fn shape_edits_ignore_empty_and_platform_tiles() {
        let mut grid = TileGrid::new(4, 4, 32);
        grid.set_shape(0, 0, CollisionShape::HalfTop);
        assert_eq!(grid.get(0, 0), TileCell::EMPTY);

        grid.set(1, 0, TileKind::Platform);
        grid.set_shape(1, 0, CollisionShape::Full);
        assert_eq!(grid.get(1, 0).shape(), CollisionShape::Platform);
    }

    #[test]
    fn out_of_bounds_is_solid_wall() {
        let grid = TileGrid::new(3, 2, 16);
        for (column, row) in [(-1, 0), (0, -1), (3, 0), (0, 2), (i32::MIN, i32::MAX)] {
            assert!(grid.is_solid(column, row), "({column}, {row}) should be solid");
            assert_eq!(grid.get(column, row), TileCell::OUT_OF_BOUNDS);
            assert!(grid.cell(column, row).is_none());
        }
    }

    #[test]
    fn resize_preserves_overlap() {
        let mut grid = TileGrid::new(4, 3, 32);
        grid.set(0, 0, TileKind::Solid);
        grid.set(3, 2, TileKind::Platform);
        grid.set(1, 2, TileKind::Solid);

        grid.resize(2, 5);

        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.rows(), 5);
        assert!(grid.is_solid(0, 0));
        assert!(grid.is_solid(1, 2));
        assert_eq!(grid.get(1, 4), TileCell::EMPTY);
        assert_eq!(grid.non_empty_count(), 2);
    }

    #[test]
    fn world_coordinates_floor_into_tiles() {
        let grid = TileGrid::new(4, 4, 32);
        assert_eq!(grid.tile_index(0.0), 0);
        assert_eq!(grid.tile_index(31.9), 0);
        assert_eq!(grid.tile_index(32.0), 1);
        assert_eq!(grid.tile_index(-0.5), -1);
    }

    #[test]
    fn slope_surfaces_interpolate_across_the_tile() {
        let mut grid = TileGrid::new(4, 4, 32);
        grid.set(1, 2, TileKind::Solid);
        grid.set_shape(1, 2, CollisionShape::SlopeUpLeft);
        grid.set(2, 2, TileKind::Solid);
        grid.set_shape(2, 2, CollisionShape::SlopeUpRight);

        assert_eq!(grid.slope_surface_y(1, 2, 32.0), Some(96.0));
        assert_eq!(grid.slope_surface_y(1, 2, 48.0), Some(80.0));
        assert_eq!(grid.slope_surface_y(1, 2, 64.0), Some(64.0));
        assert_eq!(grid.slope_surface_y(2, 2, 64.0), Some(64.0));
        assert_eq!(grid.slope_surface_y(2, 2, 96.0), Some(96.0));
        assert_eq!(grid.slope_surface_y(0, 0, 8.0), None);
    }

    #[test]
    fn iter_non_empty_reports_coordinates() {
        let mut grid = TileGrid::new(3, 3, 32);
        grid.set(2, 0, TileKind::Solid);
        grid.set(0, 2, TileKind::Platform);

        let cells: Vec<_> = grid.iter_non_empty().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(cells, vec![(2, 0), (0, 2)]);
    }
}
