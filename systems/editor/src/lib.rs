#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level editing document for Tilestep.
//!
//! An [`EditorDocument`] holds a stack of equally sized tile layers, the
//! spawn markers and the active tool. Pointer handling, panels and file
//! dialogs live in the adapters; this crate only turns tile-space actions
//! into edits and converts the document to and from [`LevelData`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use tilestep_core::{
    CollisionShape, EnemySpawn, EnemyTypeId, LevelData, SpawnPoint, TileGrid, TileKind,
};
use tilestep_level::LevelCodecError;
use tracing::{debug, info};

/// Columns in a freshly created map.
pub const DEFAULT_COLUMNS: u32 = 60;
/// Rows in a freshly created map.
pub const DEFAULT_ROWS: u32 = 33;
/// Tile edge of a freshly created map.
pub const DEFAULT_TILE_EDGE: u16 = 32;
/// Name given to the layer every new map starts with.
pub const BASE_LAYER_NAME: &str = "Ground";

/// Failures raised while saving or loading a document.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The level file could not be encoded, decoded or accessed.
    #[error(transparent)]
    Codec(#[from] LevelCodecError),
    /// A save to the current path was requested before one was chosen.
    #[error("the document has not been saved or loaded yet")]
    NoDocumentPath,
}

/// Tool applied by the primary action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditorTool {
    /// Paints the selected brush kind.
    #[default]
    Brush,
    /// Clears tiles and the spawns on them.
    Eraser,
    /// Moves the player spawn.
    PlayerSpawn,
    /// Adds an enemy spawn.
    EnemySpawn,
    /// Overrides the collision shape of solid tiles.
    CollisionShape,
}

/// Named tile layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorLayer {
    name: String,
    visible: bool,
    grid: TileGrid,
}

impl EditorLayer {
    fn new(name: impl Into<String>, columns: u32, rows: u32, tile_edge: u16) -> Self {
        Self {
            name: name.into(),
            visible: true,
            grid: TileGrid::new(columns, rows, tile_edge),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the layer contributes to the saved level.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Tiles painted on this layer.
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }
}

/// Level being edited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorDocument {
    columns: u32,
    rows: u32,
    tile_edge: u16,
    layers: Vec<EditorLayer>,
    current_layer: usize,
    tool: EditorTool,
    brush: TileKind,
    collision_shape: CollisionShape,
    enemy_type: EnemyTypeId,
    player_spawn: Option<SpawnPoint>,
    enemy_spawns: Vec<EnemySpawn>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl EditorDocument {
    /// Creates an empty map with the default dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimensions(DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_TILE_EDGE)
    }

    /// Creates an empty map of the given size.
    #[must_use]
    pub fn with_dimensions(columns: u32, rows: u32, tile_edge: u16) -> Self {
        Self {
            columns,
            rows,
            tile_edge,
            layers: vec![EditorLayer::new(BASE_LAYER_NAME, columns, rows, tile_edge)],
            current_layer: 0,
            tool: EditorTool::default(),
            brush: TileKind::Solid,
            collision_shape: CollisionShape::Full,
            enemy_type: EnemyTypeId::default(),
            player_spawn: None,
            enemy_spawns: Vec::new(),
            path: None,
            dirty: false,
        }
    }

    /// Discards every layer and spawn, keeping the current dimensions.
    ///
    /// Tool selections survive. The document forgets its path and is clean.
    pub fn new_map(&mut self) {
        self.layers = vec![EditorLayer::new(
            BASE_LAYER_NAME,
            self.columns,
            self.rows,
            self.tile_edge,
        )];
        self.current_layer = 0;
        self.player_spawn = None;
        self.enemy_spawns.clear();
        self.path = None;
        self.dirty = false;
    }

    /// Paints `kind` on the current layer.
    pub fn set_tile(&mut self, column: i32, row: i32, kind: TileKind) {
        self.edit_cell(column, row, |grid| grid.set(column, row, kind));
    }

    /// Overrides the shape of a solid tile on the current layer.
    pub fn set_tile_shape(&mut self, column: i32, row: i32, shape: CollisionShape) {
        self.edit_cell(column, row, |grid| grid.set_shape(column, row, shape));
    }

    /// Tile kind on the current layer. Outside the map this is `Empty`.
    #[must_use]
    pub fn tile(&self, column: i32, row: i32) -> TileKind {
        self.current_grid()
            .cell(column, row)
            .map_or(TileKind::Empty, |cell| cell.kind())
    }

    /// Collision shape on the current layer. Outside the map this is `None`.
    #[must_use]
    pub fn tile_shape(&self, column: i32, row: i32) -> CollisionShape {
        self.current_grid()
            .cell(column, row)
            .map_or(CollisionShape::None, |cell| cell.shape())
    }

    /// Resizes every layer, keeping the overlapping cells.
    ///
    /// Spawns that fall outside the new bounds are dropped.
    pub fn resize(&mut self, columns: u32, rows: u32) {
        if columns == self.columns && rows == self.rows {
            return;
        }
        for layer in &mut self.layers {
            layer.grid.resize(columns, rows);
        }
        self.columns = columns;
        self.rows = rows;

        if let Some(spawn) = self.player_spawn {
            if !self.contains(spawn.x, spawn.y) {
                self.player_spawn = None;
            }
        }
        let (columns, rows) = (columns as i32, rows as i32);
        self.enemy_spawns
            .retain(|spawn| (0..columns).contains(&spawn.at.x) && (0..rows).contains(&spawn.at.y));
        self.dirty = true;
        debug!(columns = self.columns, rows = self.rows, "map resized");
    }

    /// Appends an empty layer and makes it current.
    pub fn add_layer(&mut self, name: impl Into<String>) {
        self.layers.push(EditorLayer::new(
            name,
            self.columns,
            self.rows,
            self.tile_edge,
        ));
        self.current_layer = self.layers.len() - 1;
        self.dirty = true;
    }

    /// Removes a layer. The last remaining layer is never removed.
    pub fn remove_layer(&mut self, index: usize) -> bool {
        if index >= self.layers.len() || self.layers.len() == 1 {
            return false;
        }
        let _ = self.layers.remove(index);
        if self.current_layer >= self.layers.len() {
            self.current_layer = self.layers.len() - 1;
        }
        self.dirty = true;
        true
    }

    /// Makes `index` the layer edits apply to.
    pub fn select_layer(&mut self, index: usize) -> bool {
        if index >= self.layers.len() {
            return false;
        }
        self.current_layer = index;
        true
    }

    /// Shows or hides a layer. Hidden layers are left out of saved levels.
    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> bool {
        let Some(layer) = self.layers.get_mut(index) else {
            return false;
        };
        if layer.visible != visible {
            layer.visible = visible;
            self.dirty = true;
        }
        true
    }

    /// Selects the tool used by [`EditorDocument::apply_primary`].
    pub fn select_tool(&mut self, tool: EditorTool) {
        self.tool = tool;
    }

    /// Selects the kind painted by the brush.
    pub fn select_brush(&mut self, kind: TileKind) {
        self.brush = kind;
    }

    /// Selects the shape applied by the shape tool and switches to it.
    pub fn select_collision_shape(&mut self, shape: CollisionShape) {
        self.collision_shape = shape;
        self.tool = EditorTool::CollisionShape;
    }

    /// Selects the archetype recorded by new enemy spawns.
    pub fn select_enemy_type(&mut self, enemy_type: EnemyTypeId) {
        self.enemy_type = enemy_type;
    }

    /// Applies the current tool at a tile. Returns `false` outside the map.
    pub fn apply_primary(&mut self, column: i32, row: i32) -> bool {
        if !self.contains(column, row) {
            return false;
        }
        match self.tool {
            EditorTool::Brush => self.set_tile(column, row, self.brush),
            EditorTool::Eraser => self.erase(column, row),
            EditorTool::PlayerSpawn => {
                let spawn = Some(SpawnPoint::new(column, row));
                if self.player_spawn != spawn {
                    self.player_spawn = spawn;
                    self.dirty = true;
                }
            }
            EditorTool::EnemySpawn => {
                self.enemy_spawns.push(EnemySpawn {
                    at: SpawnPoint::new(column, row),
                    enemy_type: self.enemy_type,
                });
                self.dirty = true;
            }
            EditorTool::CollisionShape => {
                self.set_tile_shape(column, row, self.collision_shape);
            }
        }
        true
    }

    /// Erases the tile and any spawn at a tile, whatever the current tool.
    pub fn apply_secondary(&mut self, column: i32, row: i32) -> bool {
        if !self.contains(column, row) {
            return false;
        }
        self.erase(column, row);
        true
    }

    /// Flattens the visible layers into a level, later layers winning.
    #[must_use]
    pub fn to_level_data(&self) -> LevelData {
        let mut flattened = TileGrid::new(self.columns, self.rows, self.tile_edge);
        for layer in self.layers.iter().filter(|layer| layer.visible) {
            for (column, row, cell) in layer.grid.iter_non_empty() {
                flattened.set_cell(column as i32, row as i32, cell.kind(), cell.shape());
            }
        }
        LevelData::from_grid(&flattened, self.player_spawn, self.enemy_spawns.clone())
    }

    /// Replaces the document with a single-layer copy of `level`.
    ///
    /// Spawns are kept even when they lie outside the map, as they were
    /// stored. The path is left unchanged and the document is clean.
    pub fn load_level_data(&mut self, level: &LevelData) {
        let layer = EditorLayer {
            name: BASE_LAYER_NAME.to_owned(),
            visible: true,
            grid: level.to_grid(),
        };
        self.columns = level.columns;
        self.rows = level.rows;
        self.tile_edge = level.tile_edge;
        self.layers = vec![layer];
        self.current_layer = 0;
        self.player_spawn = level.player_spawn;
        self.enemy_spawns = level.enemy_spawns.clone();
        self.dirty = false;
    }

    /// Writes the flattened level to `path` and remembers it.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let path = path.as_ref();
        tilestep_level::save_file(path, &self.to_level_data())?;
        info!(path = %path.display(), "level saved");
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// Writes the level back to the file it was last saved to or loaded from.
    pub fn save_current(&mut self) -> Result<(), EditorError> {
        let path = self.path.clone().ok_or(EditorError::NoDocumentPath)?;
        self.save(path)
    }

    /// Reads a level file into the document.
    ///
    /// The document is untouched when the file cannot be read or decoded.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let path = path.as_ref();
        let level = tilestep_level::load_file(path)?;
        self.load_level_data(&level);
        self.path = Some(path.to_path_buf());
        info!(path = %path.display(), tiles = level.tiles.len(), "level loaded");
        Ok(())
    }

    /// Map width in tiles.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Map height in tiles.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile edge length in world units.
    #[must_use]
    pub const fn tile_edge(&self) -> u16 {
        self.tile_edge
    }

    /// Layers from bottom to top.
    #[must_use]
    pub fn layers(&self) -> &[EditorLayer] {
        &self.layers
    }

    /// Index of the layer edits apply to.
    #[must_use]
    pub const fn current_layer(&self) -> usize {
        self.current_layer
    }

    /// Active tool.
    #[must_use]
    pub const fn tool(&self) -> EditorTool {
        self.tool
    }

    /// Kind painted by the brush.
    #[must_use]
    pub const fn brush(&self) -> TileKind {
        self.brush
    }

    /// Shape applied by the shape tool.
    #[must_use]
    pub const fn collision_shape(&self) -> CollisionShape {
        self.collision_shape
    }

    /// Player spawn, if placed.
    #[must_use]
    pub const fn player_spawn(&self) -> Option<SpawnPoint> {
        self.player_spawn
    }

    /// Enemy spawns in placement order.
    #[must_use]
    pub fn enemy_spawns(&self) -> &[EnemySpawn] {
        &self.enemy_spawns
    }

    /// File the document was last saved to or loaded from.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether there are edits since the last save, load or new map.
    #[must_use]
    pub const fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    fn current_grid(&self) -> &TileGrid {
        &self.layers[self.current_layer].grid
    }

    fn contains(&self, column: i32, row: i32) -> bool {
        column >= 0 && row >= 0 && (column as u32) < self.columns && (row as u32) < self.rows
    }

    /// Applies `edit` to the current layer, marking the document changed
    /// only when the cell actually differs afterwards.
    fn edit_cell(&mut self, column: i32, row: i32, edit: impl FnOnce(&mut TileGrid)) {
        let grid = &mut self.layers[self.current_layer].grid;
        let Some(before) = grid.cell(column, row) else {
            return;
        };
        edit(grid);
        if grid.cell(column, row) != Some(before) {
            self.dirty = true;
        }
    }

    fn erase(&mut self, column: i32, row: i32) {
        self.set_tile(column, row, TileKind::Empty);
        let here = SpawnPoint::new(column, row);
        if self.player_spawn == Some(here) {
            self.player_spawn = None;
            self.dirty = true;
        }
        let spawns = self.enemy_spawns.len();
        self.enemy_spawns.retain(|spawn| spawn.at != here);
        if self.enemy_spawns.len() != spawns {
            self.dirty = true;
        }
    }
}

impl Default for EditorDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_matches_defaults() {
        let document = EditorDocument::new();

        assert_eq!((document.columns(), document.rows()), (60, 33));
        assert_eq!(document.tile_edge(), 32);
        assert_eq!(document.layers().len(), 1);
        assert_eq!(document.layers()[0].name(), BASE_LAYER_NAME);
        assert_eq!(document.tool(), EditorTool::Brush);
        assert_eq!(document.brush(), TileKind::Solid);
        assert_eq!(document.collision_shape(), CollisionShape::Full);
        assert!(!document.has_unsaved_changes());
    }

    #[test]
    fn painting_keeps_shapes_consistent() {
        let mut document = EditorDocument::with_dimensions(8, 8, 32);

        document.set_tile(1, 1, TileKind::Solid);
        assert_eq!(document.tile_shape(1, 1), CollisionShape::Full);

        document.set_tile_shape(1, 1, CollisionShape::SlopeUpRight);
        document.set_tile(1, 1, TileKind::Solid);
        assert_eq!(document.tile_shape(1, 1), CollisionShape::SlopeUpRight);

        document.set_tile(1, 1, TileKind::Platform);
        assert_eq!(document.tile_shape(1, 1), CollisionShape::Platform);

        document.set_tile(1, 1, TileKind::Empty);
        assert_eq!(document.tile_shape(1, 1), CollisionShape::None);

        document.set_tile_shape(1, 1, CollisionShape::HalfTop);
        assert_eq!(document.tile(1, 1), TileKind::Empty);
        assert_eq!(document.tile_shape(1, 1), CollisionShape::None);
        assert!(document.has_unsaved_changes());
    }

    #[test]
    fn edits_outside_the_map_are_ignored() {
        let mut document = EditorDocument::with_dimensions(4, 4, 32);

        document.set_tile(-1, 0, TileKind::Solid);
        document.set_tile(4, 0, TileKind::Solid);
        assert!(!document.apply_primary(0, 4));
        assert!(!document.apply_secondary(0, -1));

        assert_eq!(document.tile(-1, 0), TileKind::Empty);
        assert!(!document.has_unsaved_changes());
    }

    #[test]
    fn shape_tool_only_touches_painted_tiles() {
        let mut document = EditorDocument::with_dimensions(8, 8, 32);
        document.set_tile(2, 2, TileKind::Solid);
        document.select_collision_shape(CollisionShape::HalfLeft);
        assert_eq!(document.tool(), EditorTool::CollisionShape);

        assert!(document.apply_primary(2, 2));
        assert!(document.apply_primary(3, 2));

        assert_eq!(document.tile_shape(2, 2), CollisionShape::HalfLeft);
        assert_eq!(document.tile(3, 2), TileKind::Empty);
        assert_eq!(document.tile_shape(3, 2), CollisionShape::None);
    }

    #[test]
    fn erasing_a_tile_removes_its_spawns() {
        let mut document = EditorDocument::with_dimensions(8, 8, 32);
        document.select_tool(EditorTool::PlayerSpawn);
        assert!(document.apply_primary(3, 5));
        document.select_tool(EditorTool::EnemySpawn);
        document.select_enemy_type(EnemyTypeId::new(2));
        assert!(document.apply_primary(3, 5));
        assert!(document.apply_primary(6, 5));
        document.select_tool(EditorTool::Brush);
        assert!(document.apply_primary(3, 5));

        assert!(document.apply_secondary(3, 5));

        assert_eq!(document.tile(3, 5), TileKind::Empty);
        assert_eq!(document.player_spawn(), None);
        assert_eq!(
            document.enemy_spawns(),
            &[EnemySpawn {
                at: SpawnPoint::new(6, 5),
                enemy_type: EnemyTypeId::new(2),
            }]
        );
    }

    #[test]
    fn eraser_tool_behaves_like_secondary_action() {
        let mut document = EditorDocument::with_dimensions(8, 8, 32);
        document.select_brush(TileKind::Platform);
        assert!(document.apply_primary(1, 1));
        document.select_tool(EditorTool::PlayerSpawn);
        assert!(document.apply_primary(1, 1));

        document.select_tool(EditorTool::Eraser);
        assert!(document.apply_primary(1, 1));

        assert_eq!(document.tile(1, 1), TileKind::Empty);
        assert_eq!(document.player_spawn(), None);
    }

    #[test]
    fn edits_that_change_nothing_keep_the_document_clean() {
        let mut document = EditorDocument::with_dimensions(6, 6, 32);

        document.select_collision_shape(CollisionShape::SlopeUpLeft);
        assert!(document.apply_primary(2, 2));
        assert!(document.apply_secondary(3, 3));
        document.select_brush(TileKind::Empty);
        document.select_tool(EditorTool::Brush);
        assert!(document.apply_primary(4, 4));
        assert!(!document.has_unsaved_changes());

        document.select_brush(TileKind::Solid);
        assert!(document.apply_primary(2, 2));
        assert!(document.has_unsaved_changes());
    }

    #[test]
    fn repeating_an_edit_after_saving_does_not_dirty_the_document() {
        let directory = tempfile::tempdir().expect("temporary directory");
        let mut document = EditorDocument::with_dimensions(6, 6, 32);
        document.set_tile(1, 5, TileKind::Solid);
        document.select_tool(EditorTool::PlayerSpawn);
        assert!(document.apply_primary(1, 4));
        document
            .save(directory.path().join("room.tmap"))
            .expect("document saves");

        assert!(document.apply_primary(1, 4));
        document.set_tile(1, 5, TileKind::Solid);
        document.select_collision_shape(CollisionShape::Full);
        assert!(document.apply_primary(1, 5));
        assert!(!document.has_unsaved_changes());

        document.select_collision_shape(CollisionShape::HalfTop);
        assert!(document.apply_primary(1, 5));
        assert!(document.has_unsaved_changes());
    }

    #[test]
    fn layers_flatten_in_order_and_skip_hidden_ones() {
        let mut document = EditorDocument::with_dimensions(4, 4, 32);
        document.set_tile(0, 3, TileKind::Solid);
        document.set_tile(1, 3, TileKind::Solid);
        document.add_layer("Decor");
        assert_eq!(document.current_layer(), 1);
        document.set_tile(1, 3, TileKind::Platform);
        document.set_tile(2, 0, TileKind::Solid);

        let level = document.to_level_data();
        let grid = level.to_grid();
        assert!(grid.is_solid(0, 3));
        assert!(grid.is_platform(1, 3));
        assert!(grid.is_solid(2, 0));

        assert!(document.set_layer_visible(1, false));
        let grid = document.to_level_data().to_grid();
        assert!(grid.is_solid(1, 3));
        assert!(!grid.is_solid(2, 0));
    }

    #[test]
    fn the_last_layer_cannot_be_removed() {
        let mut document = EditorDocument::with_dimensions(4, 4, 32);
        assert!(!document.remove_layer(0));

        document.add_layer("Top");
        assert!(document.remove_layer(1));
        assert_eq!(document.current_layer(), 0);
        assert!(!document.remove_layer(3));
        assert!(!document.select_layer(1));
        assert_eq!(document.layers().len(), 1);
    }

    #[test]
    fn resize_applies_to_every_layer() {
        let mut document = EditorDocument::with_dimensions(6, 6, 32);
        document.set_tile(1, 1, TileKind::Solid);
        document.add_layer("Top");
        document.set_tile(5, 5, TileKind::Solid);
        document.select_tool(EditorTool::EnemySpawn);
        assert!(document.apply_primary(5, 4));

        document.resize(4, 8);

        for layer in document.layers() {
            assert_eq!((layer.grid().columns(), layer.grid().rows()), (4, 8));
        }
        assert!(document.layers()[0].grid().is_solid(1, 1));
        assert_eq!(document.layers()[1].grid().non_empty_count(), 0);
        assert!(document.enemy_spawns().is_empty());
    }

    #[test]
    fn loading_level_data_resets_layers_and_cleans_the_document() {
        let mut source = EditorDocument::with_dimensions(5, 3, 16);
        source.set_tile(4, 2, TileKind::Solid);
        source.set_tile_shape(4, 2, CollisionShape::HalfBottom);
        source.select_tool(EditorTool::PlayerSpawn);
        assert!(source.apply_primary(0, 1));
        let level = source.to_level_data();

        let mut document = EditorDocument::new();
        document.add_layer("Extra");
        document.load_level_data(&level);

        assert_eq!(document.layers().len(), 1);
        assert_eq!((document.columns(), document.rows(), document.tile_edge()), (5, 3, 16));
        assert_eq!(document.tile_shape(4, 2), CollisionShape::HalfBottom);
        assert_eq!(document.player_spawn(), Some(SpawnPoint::new(0, 1)));
        assert!(!document.has_unsaved_changes());
        assert_eq!(document.to_level_data(), level);
    }

    #[test]
    fn new_map_clears_content_but_keeps_tools() {
        let mut document = EditorDocument::with_dimensions(4, 4, 32);
        document.select_brush(TileKind::Platform);
        assert!(document.apply_primary(0, 0));
        document.add_layer("Top");

        document.new_map();

        assert_eq!(document.layers().len(), 1);
        assert_eq!(document.tile(0, 0), TileKind::Empty);
        assert_eq!(document.brush(), TileKind::Platform);
        assert!(!document.has_unsaved_changes());
        assert!(document.path().is_none());
    }

    #[test]
    fn saving_without_a_path_is_an_error() {
        let mut document = EditorDocument::new();
        assert!(matches!(
            document.save_current(),
            Err(EditorError::NoDocumentPath)
        ));
    }
}
