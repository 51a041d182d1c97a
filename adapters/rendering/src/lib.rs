#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tilestep adapters.
//!
//! Nothing here draws. Backends receive a [`Presentation`], a borrowed
//! [`SpriteRegistry`] and a closure that refreshes the [`Scene`] each frame.

use std::{collections::HashMap, time::Duration};

use anyhow::Result as AnyResult;
use glam::Vec2;
use tilestep_core::{
    ActionInput, AttackType, CollisionShape, EnemyId, Facing, TileKind, WeaponId, WorldRect,
};
use tilestep_system_actors::{player, WeaponState};
use tilestep_system_editor::EditorDocument;
use tilestep_world::{query, World};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba_u8(red, green, blue, 255)
    }

    /// Creates a color from byte RGBA values.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }

    /// Returns the same color with its alpha replaced.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Fixed colors shared by every backend.
pub mod palette {
    use super::Color;

    /// Frame clear color.
    pub const BACKGROUND: Color = Color::from_rgb_u8(30, 30, 30);
    /// Solid tile fill.
    pub const SOLID_TILE: Color = Color::from_rgb_u8(80, 60, 40);
    /// Solid tile outline.
    pub const SOLID_OUTLINE: Color = Color::from_rgb_u8(100, 80, 60);
    /// Platform tile fill.
    pub const PLATFORM_TILE: Color = Color::from_rgb_u8(60, 100, 60);
    /// Platform tile outline.
    pub const PLATFORM_OUTLINE: Color = Color::from_rgb_u8(80, 120, 80);
    /// Player body.
    pub const PLAYER: Color = Color::from_rgb_u8(100, 150, 255);
    /// Enemy body while patrolling.
    pub const ENEMY: Color = Color::from_rgb_u8(255, 80, 80);
    /// Enemy body while knocked back.
    pub const ENEMY_HIT: Color = Color::from_rgb_u8(255, 200, 200);
    /// Editor marker for the player spawn.
    pub const PLAYER_SPAWN_MARKER: Color = Color::from_rgb_u8(100, 200, 100);
    /// Editor marker for enemy spawns.
    pub const ENEMY_SPAWN_MARKER: Color = Color::from_rgb_u8(200, 100, 100);
}

/// Opacity of a weapon lying on the ground.
pub const DROPPED_WEAPON_ALPHA: f32 = 200.0 / 255.0;

/// Translucent overlay color for a collision shape.
#[must_use]
pub const fn overlay_color(shape: CollisionShape) -> Color {
    match shape {
        CollisionShape::None => Color::TRANSPARENT,
        CollisionShape::Full => Color::from_rgba_u8(255, 0, 0, 80),
        CollisionShape::SlopeUpLeft => Color::from_rgba_u8(0, 255, 255, 100),
        CollisionShape::SlopeUpRight => Color::from_rgba_u8(255, 255, 0, 100),
        CollisionShape::HalfTop => Color::from_rgba_u8(255, 128, 0, 80),
        CollisionShape::HalfBottom => Color::from_rgba_u8(128, 0, 255, 80),
        CollisionShape::HalfLeft => Color::from_rgba_u8(0, 128, 255, 80),
        CollisionShape::HalfRight => Color::from_rgba_u8(255, 0, 128, 80),
        CollisionShape::Platform => Color::from_rgba_u8(0, 255, 0, 100),
    }
}

/// Outline of a collision shape for a tile whose top-left corner is `origin`.
///
/// Rectangles are returned clockwise from their top-left corner and slopes
/// as triangles. [`CollisionShape::None`] has no outline.
#[must_use]
pub fn overlay_polygon(shape: CollisionShape, origin: Vec2, size: f32) -> Vec<Vec2> {
    let rect = |x: f32, y: f32, width: f32, height: f32| {
        let corner = origin + Vec2::new(x, y);
        vec![
            corner,
            corner + Vec2::new(width, 0.0),
            corner + Vec2::new(width, height),
            corner + Vec2::new(0.0, height),
        ]
    };
    let half = size / 2.0;

    match shape {
        CollisionShape::None => Vec::new(),
        CollisionShape::Full => rect(0.0, 0.0, size, size),
        CollisionShape::SlopeUpLeft => vec![
            origin + Vec2::new(0.0, size),
            origin + Vec2::new(size, 0.0),
            origin + Vec2::new(size, size),
        ],
        CollisionShape::SlopeUpRight => vec![
            origin,
            origin + Vec2::new(size, size),
            origin + Vec2::new(0.0, size),
        ],
        CollisionShape::HalfTop => rect(0.0, 0.0, size, half),
        CollisionShape::HalfBottom => rect(0.0, half, size, half),
        CollisionShape::HalfLeft => rect(0.0, 0.0, half, size),
        CollisionShape::HalfRight => rect(half, 0.0, half, size),
        CollisionShape::Platform => rect(0.0, 0.0, size, size / 4.0),
    }
}

/// Non-empty tile to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePresentation {
    /// Column of the tile.
    pub column: u32,
    /// Row of the tile, zero at the top.
    pub row: u32,
    /// Material stored in the tile.
    pub kind: TileKind,
    /// Collision shape stored in the tile.
    pub shape: CollisionShape,
}

impl TilePresentation {
    /// Fill and outline colors for the tile material.
    #[must_use]
    pub const fn colors(&self) -> (Color, Color) {
        match self.kind {
            TileKind::Platform => (palette::PLATFORM_TILE, palette::PLATFORM_OUTLINE),
            TileKind::Solid | TileKind::Empty => (palette::SOLID_TILE, palette::SOLID_OUTLINE),
        }
    }
}

/// Fading copy of the player left behind by a dash.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AfterimagePresentation {
    /// Box covered by the echo.
    pub bounds: WorldRect,
    /// Direction the echo faces.
    pub facing: Facing,
    /// Opacity between zero and one.
    pub alpha: f32,
}

/// Swing currently performed by the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackPresentation {
    /// Swing kind.
    pub kind: AttackType,
    /// Sweep angle in radians, mirrored when facing left.
    pub angle: f32,
    /// Area that damages enemies this frame.
    pub hitbox: WorldRect,
}

/// Player snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Collision box.
    pub bounds: WorldRect,
    /// Body color.
    pub color: Color,
    /// Whether the body is drawn this frame; false during invincibility blinks.
    pub visible: bool,
    /// Facing direction.
    pub facing: Facing,
    /// Remaining health.
    pub health: u32,
    /// Whether the player still holds the throwable weapon.
    pub carrying_weapon: bool,
    /// Dash echoes, oldest first.
    pub afterimages: Vec<AfterimagePresentation>,
    /// Active swing.
    pub attack: Option<AttackPresentation>,
}

/// Enemy snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Identifier assigned by the world.
    pub id: EnemyId,
    /// Collision box.
    pub bounds: WorldRect,
    /// Body color, tinted while knocked back.
    pub color: Color,
}

/// Thrown weapon snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponPresentation {
    /// Identifier assigned by the world.
    pub id: WeaponId,
    /// Centre of the sprite.
    pub center: Vec2,
    /// Sprite rotation in degrees.
    pub rotation_degrees: f32,
    /// Sprite opacity.
    pub alpha: f32,
}

/// Scene description captured from the world once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile edge length in world units.
    pub tile_edge: f32,
    /// Level width in tiles.
    pub columns: u32,
    /// Level height in tiles.
    pub rows: u32,
    /// Non-empty tiles in row-major order.
    pub tiles: Vec<TilePresentation>,
    /// Player snapshot.
    pub player: PlayerPresentation,
    /// Enemies still in play.
    pub enemies: Vec<EnemyPresentation>,
    /// Thrown weapons not yet collected.
    pub weapons: Vec<WeaponPresentation>,
}

impl Scene {
    /// Captures everything a backend needs to draw the world.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let grid = query::tile_grid(world);
        let tiles = grid
            .iter_non_empty()
            .map(|(column, row, cell)| TilePresentation {
                column,
                row,
                kind: cell.kind(),
                shape: cell.shape(),
            })
            .collect();

        let hero = query::player(world);
        let size = Vec2::new(player::WIDTH, player::HEIGHT);
        let player = PlayerPresentation {
            bounds: hero.bounds(),
            color: palette::PLAYER,
            visible: hero.is_visible(),
            facing: hero.facing(),
            health: hero.health(),
            carrying_weapon: hero.is_carrying_weapon(),
            afterimages: hero
                .afterimages()
                .map(|image| AfterimagePresentation {
                    bounds: WorldRect::new(image.position, size),
                    facing: image.facing,
                    alpha: image.alpha(),
                })
                .collect(),
            attack: hero.attack().zip(hero.attack_hitbox()).map(|(attack, hitbox)| {
                AttackPresentation {
                    kind: attack.kind(),
                    angle: attack.angle() * hero.facing().sign(),
                    hitbox,
                }
            }),
        };

        let enemies = query::enemies(world)
            .iter()
            .map(|enemy| EnemyPresentation {
                id: enemy.id(),
                bounds: enemy.bounds(),
                color: if enemy.is_knocked_back() {
                    palette::ENEMY_HIT
                } else {
                    palette::ENEMY
                },
            })
            .collect();

        let weapons = query::weapons(world)
            .iter()
            .map(|tracked| WeaponPresentation {
                id: tracked.id,
                center: tracked.weapon.position(),
                rotation_degrees: tracked.weapon.rotation(),
                alpha: match tracked.weapon.state() {
                    WeaponState::Flying => 1.0,
                    WeaponState::Dropped => DROPPED_WEAPON_ALPHA,
                },
            })
            .collect();

        Self {
            tile_edge: grid.tile_size(),
            columns: grid.columns(),
            rows: grid.rows(),
            tiles,
            player,
            enemies,
            weapons,
        }
    }

    /// Width of the level in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_edge
    }

    /// Height of the level in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_edge
    }
}

/// Filled polygon drawn over a tile in the editor.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayPolygon {
    /// Polygon corners in world units.
    pub points: Vec<Vec2>,
    /// Fill color.
    pub color: Color,
}

/// Marker drawn over a spawn tile in the editor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnMarker {
    /// Centre of the spawn tile in world units.
    pub center: Vec2,
    /// Marker fill.
    pub color: Color,
}

/// Editor view of the visible layers and spawn markers.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorOverlay {
    /// Collision overlay for every visible non-empty tile, bottom layer first.
    pub shapes: Vec<OverlayPolygon>,
    /// Player spawn marker, if a spawn is placed.
    pub player_spawn: Option<SpawnMarker>,
    /// Enemy spawn markers in placement order.
    pub enemy_spawns: Vec<SpawnMarker>,
}

impl EditorOverlay {
    /// Builds the overlay for a document.
    #[must_use]
    pub fn capture(document: &EditorDocument) -> Self {
        let size = f32::from(document.tile_edge());
        let marker = |column: i32, row: i32, color: Color| SpawnMarker {
            center: Vec2::new(column as f32 + 0.5, row as f32 + 0.5) * size,
            color,
        };

        let shapes = document
            .layers()
            .iter()
            .filter(|layer| layer.is_visible())
            .flat_map(|layer| layer.grid().iter_non_empty())
            .map(|(column, row, cell)| OverlayPolygon {
                points: overlay_polygon(
                    cell.shape(),
                    Vec2::new(column as f32, row as f32) * size,
                    size,
                ),
                color: overlay_color(cell.shape()),
            })
            .collect();

        Self {
            shapes,
            player_spawn: document
                .player_spawn()
                .map(|spawn| marker(spawn.x, spawn.y, palette::PLAYER_SPAWN_MARKER)),
            enemy_spawns: document
                .enemy_spawns()
                .iter()
                .map(|spawn| marker(spawn.at.x, spawn.at.y, palette::ENEMY_SPAWN_MARKER))
                .collect(),
        }
    }
}

/// Identifier of a sprite sheet held by a [`SpriteRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(u32);

impl SpriteId {
    /// Returns the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Sprite sheets owned by the host application.
///
/// `T` is the backend's texture handle. Components that draw borrow the
/// registry; the simulation never holds textures.
#[derive(Debug)]
pub struct SpriteRegistry<T> {
    sheets: Vec<T>,
    names: HashMap<String, SpriteId>,
}

impl<T> SpriteRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            names: HashMap::new(),
        }
    }

    /// Stores a sheet under `name`, replacing any sheet already registered
    /// with that name.
    pub fn register(&mut self, name: impl Into<String>, sheet: T) -> SpriteId {
        let name = name.into();
        if let Some(&id) = self.names.get(&name) {
            self.sheets[id.get() as usize] = sheet;
            return id;
        }
        let id = SpriteId(self.sheets.len() as u32);
        self.sheets.push(sheet);
        let _ = self.names.insert(name, id);
        id
    }

    /// Looks up a sheet by identifier.
    #[must_use]
    pub fn get(&self, id: SpriteId) -> Option<&T> {
        self.sheets.get(id.get() as usize)
    }

    /// Looks up the identifier registered for `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<SpriteId> {
        self.names.get(name).copied()
    }

    /// Number of registered sheets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Whether no sheet has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl<T> Default for SpriteRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Gameplay actions held this frame.
    pub actions: ActionInput,
    /// Cursor position in world units, if over the level.
    pub cursor_world_space: Option<Vec2>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }

    /// Presents the current state of `world` over the default background.
    #[must_use]
    pub fn for_world<T>(window_title: T, world: &World) -> Self
    where
        T: Into<String>,
    {
        Self::new(window_title, palette::BACKGROUND, Scene::capture(world))
    }
}

/// Rendering backend capable of presenting Tilestep scenes.
pub trait RenderingBackend {
    /// Texture handle stored in the sprite registry.
    type Texture;

    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and refreshes the scene before it is
    /// drawn.
    fn run<F>(
        self,
        presentation: Presentation,
        sprites: &SpriteRegistry<Self::Texture>,
        update_scene: F,
    ) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}
