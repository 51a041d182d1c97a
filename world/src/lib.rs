#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Tilestep.
//!
//! The world owns the active tile grid and every actor. Each
//! [`Command::Tick`] runs one simulation step in a fixed order: the player
//! moves, then each enemy, then combat overlaps are resolved, then thrown
//! weapons fly and may be collected, and finally defeated enemies are
//! removed. The grid is only replaced wholesale, by a level load.

mod demo;

use std::{path::Path, time::Duration};

use tilestep_core::{
    ActionInput, Command, EnemyId, Event, LevelData, SpawnPoint, TileGrid, Vec2, WeaponId,
};
use tilestep_system_actors::{enemy, player, Enemy, Player};
use tilestep_system_combat::{Combat, TrackedWeapon};
use tracing::{debug, info, warn};

pub use demo::demo_level;

/// Player start used when a level has no player spawn.
pub const DEFAULT_PLAYER_POSITION: Vec2 = Vec2::new(100.0, 100.0);

/// Enemy starts used when a level has no enemy spawns.
pub const DEFAULT_ENEMY_POSITIONS: [Vec2; 3] = [
    Vec2::new(400.0, 100.0),
    Vec2::new(700.0, 100.0),
    Vec2::new(1000.0, 100.0),
];

/// Represents the authoritative Tilestep world state.
#[derive(Debug)]
pub struct World {
    grid: TileGrid,
    player: Player,
    enemies: Vec<Enemy>,
    weapons: Vec<TrackedWeapon>,
    combat: Combat,
    next_enemy_id: u32,
    next_weapon_id: u32,
    tick_index: u64,
}

impl World {
    /// Creates a world running the demo layout.
    #[must_use]
    pub fn new() -> Self {
        Self::from_level(&demo_level())
    }

    /// Creates a world running the provided level.
    #[must_use]
    pub fn from_level(level: &LevelData) -> Self {
        let mut world = Self {
            grid: TileGrid::new(0, 0, level.tile_edge),
            player: Player::new(DEFAULT_PLAYER_POSITION),
            enemies: Vec::new(),
            weapons: Vec::new(),
            combat: Combat::new(),
            next_enemy_id: 0,
            next_weapon_id: 0,
            tick_index: 0,
        };
        world.install_level(level);
        world
    }

    /// Loads a level file, falling back to the demo layout when it cannot be
    /// read or decoded.
    #[must_use]
    pub fn load_level_or_demo(path: &Path) -> Self {
        match tilestep_level::load_file(path) {
            Ok(level) => {
                info!(path = %path.display(), "loaded level");
                Self::from_level(&level)
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "level failed to load, using demo layout");
                Self::new()
            }
        }
    }

    fn install_level(&mut self, level: &LevelData) {
        self.grid = level.to_grid();
        let player_start = level.player_spawn.map_or(DEFAULT_PLAYER_POSITION, |spawn| {
            spawn_position(&self.grid, spawn, player::HEIGHT)
        });
        self.player = Player::new(player_start);

        self.enemies.clear();
        self.weapons.clear();
        if level.enemy_spawns.is_empty() {
            for position in DEFAULT_ENEMY_POSITIONS {
                let id = self.allocate_enemy_id();
                self.enemies.push(Enemy::new(id, Default::default(), position));
            }
        } else {
            for spawn in &level.enemy_spawns {
                let id = self.allocate_enemy_id();
                let position = spawn_position(&self.grid, spawn.at, enemy::HEIGHT);
                self.enemies.push(Enemy::new(id, spawn.enemy_type, position));
            }
        }

        info!(
            columns = self.grid.columns(),
            rows = self.grid.rows(),
            enemies = self.enemies.len(),
            "level installed"
        );
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn allocate_weapon_id(&mut self) -> WeaponId {
        let id = WeaponId::new(self.next_weapon_id);
        self.next_weapon_id = self.next_weapon_id.wrapping_add(1);
        id
    }

    fn tick(&mut self, dt: Duration, input: ActionInput, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        let step = self.player.update(&input, dt, &self.grid);
        if step.dash_started {
            out_events.push(Event::DashStarted);
        }
        if let Some(attack) = step.attack_started {
            out_events.push(Event::AttackStarted { attack });
        }
        if let Some(weapon) = step.thrown {
            let id = self.allocate_weapon_id();
            self.weapons.push(TrackedWeapon { id, weapon });
            out_events.push(Event::WeaponThrown { weapon: id });
        }

        for enemy in &mut self.enemies {
            let _ = enemy.update(dt, &self.grid);
        }

        self.combat.resolve(
            &mut self.player,
            &mut self.enemies,
            &mut self.weapons,
            out_events,
        );

        for tracked in &mut self.weapons {
            if tracked.weapon.update(dt, &self.grid) {
                out_events.push(Event::WeaponDropped { weapon: tracked.id });
            }
        }

        if input.interact && !self.player.is_carrying_weapon() {
            let center = self.player.center();
            if let Some(index) = self
                .weapons
                .iter()
                .position(|tracked| tracked.weapon.can_pickup(center))
            {
                let tracked = self.weapons.remove(index);
                let _ = self.player.collect_weapon();
                out_events.push(Event::WeaponPickedUp { weapon: tracked.id });
            }
        }

        self.enemies.retain(|enemy| {
            if enemy.is_alive() {
                return true;
            }
            debug!(enemy = enemy.id().get(), "enemy defeated");
            out_events.push(Event::EnemyDefeated { enemy: enemy.id() });
            false
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a tile-space spawn into the top-left corner of an actor whose
/// feet rest on the bottom edge of the spawn tile.
#[must_use]
pub fn spawn_position(grid: &TileGrid, spawn: SpawnPoint, actor_height: f32) -> Vec2 {
    let size = grid.tile_size();
    Vec2::new(
        spawn.x as f32 * size,
        (spawn.y + 1) as f32 * size - actor_height,
    )
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt, input } => world.tick(dt, input, out_events),
        Command::LoadLevel { level } => {
            world.install_level(&level);
            out_events.push(level_loaded(world));
        }
        Command::LoadDemoLevel => {
            world.install_level(&demo_level());
            out_events.push(level_loaded(world));
        }
    }
}

fn level_loaded(world: &World) -> Event {
    Event::LevelLoaded {
        columns: world.grid.columns(),
        rows: world.grid.rows(),
        enemies: world.enemies.len(),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use tilestep_core::TileGrid;
    use tilestep_system_actors::{Enemy, Player};
    use tilestep_system_combat::TrackedWeapon;

    /// Provides read-only access to the active tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.grid
    }

    /// Provides read-only access to the player.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Enemies still in play, in spawn order.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.enemies
    }

    /// Thrown weapons that have not been collected.
    #[must_use]
    pub fn weapons(world: &World) -> &[TrackedWeapon] {
        &world.weapons
    }

    /// Number of simulation steps executed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
