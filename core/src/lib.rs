#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tilestep platformer runtime.
//!
//! This crate owns the tile grid that every actor collides against, the
//! persisted level model, and the message surface between adapters and the
//! authoritative world. Adapters submit [`Command`] values carrying a
//! per-step [`ActionInput`] snapshot, the world executes them via its `apply`
//! entry point, and reports what happened through [`Event`] values.

mod geometry;
mod level;
mod tile;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use geometry::WorldRect;
pub use level::{EnemySpawn, EnemyTypeId, LevelData, SpawnPoint, TileRecord};
pub use tile::{CollisionShape, TileCell, TileGrid, TileKind};

/// Re-exported vector type used for every world-space position and velocity.
pub use glam::Vec2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one step using the sampled input.
    Tick {
        /// Simulated time covered by the step.
        dt: Duration,
        /// Logical actions held during the step.
        input: ActionInput,
    },
    /// Replaces the active level wholesale with a decoded level.
    LoadLevel {
        /// Fully decoded level to activate.
        level: LevelData,
    },
    /// Replaces the active level with the built-in demo layout.
    LoadDemoLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the step.
        dt: Duration,
    },
    /// Confirms that a new level became active.
    LevelLoaded {
        /// Number of tile columns in the new level.
        columns: u32,
        /// Number of tile rows in the new level.
        rows: u32,
        /// Number of enemies spawned for the level.
        enemies: usize,
    },
    /// The player started a dash.
    DashStarted,
    /// The player started an attack swing.
    AttackStarted {
        /// Swing that was started.
        attack: AttackType,
    },
    /// The player accepted a hit.
    PlayerHit {
        /// Damage that was applied.
        damage: u32,
        /// Health left after the hit.
        remaining_health: u32,
    },
    /// An enemy accepted a hit from the player or a thrown weapon.
    EnemyHit {
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Damage that was applied.
        damage: u32,
        /// Health left after the hit.
        remaining_health: u32,
    },
    /// An enemy ran out of health and was removed.
    EnemyDefeated {
        /// Enemy that was removed.
        enemy: EnemyId,
    },
    /// The player threw their weapon.
    WeaponThrown {
        /// Identifier assigned to the projectile.
        weapon: WeaponId,
    },
    /// A thrown weapon came to rest.
    WeaponDropped {
        /// Projectile that stopped.
        weapon: WeaponId,
    },
    /// The player picked a resting weapon back up.
    WeaponPickedUp {
        /// Projectile that was collected.
        weapon: WeaponId,
    },
}

/// Snapshot of the logical actions held during one simulation step.
///
/// Adapters translate raw device state into this value once per step; the
/// simulation never polls devices itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionInput {
    /// Walk toward decreasing x.
    pub move_left: bool,
    /// Walk toward increasing x.
    pub move_right: bool,
    /// Jump when standing on ground.
    pub jump: bool,
    /// Dash in the facing direction.
    pub dash: bool,
    /// Horizontal sweep attack.
    pub slash: bool,
    /// Straight stab attack.
    pub thrust: bool,
    /// Rising sweep attack.
    pub uppercut: bool,
    /// Throw the carried weapon.
    pub throw_weapon: bool,
    /// Pick up a nearby resting weapon.
    pub interact: bool,
}

impl ActionInput {
    /// Attack requested by the held inputs, preferring slash, then thrust.
    #[must_use]
    pub const fn attack_request(&self) -> Option<AttackType> {
        if self.slash {
            Some(AttackType::Slash)
        } else if self.thrust {
            Some(AttackType::Thrust)
        } else if self.uppercut {
            Some(AttackType::Uppercut)
        } else {
            None
        }
    }

    /// Horizontal direction requested by the held inputs. Right wins ties.
    #[must_use]
    pub const fn horizontal(&self) -> Option<Facing> {
        if self.move_right {
            Some(Facing::Right)
        } else if self.move_left {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

/// Horizontal direction an actor faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Toward decreasing x.
    Left,
    /// Toward increasing x.
    #[default]
    Right,
}

impl Facing {
    /// Unit sign of the direction along the x axis.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Melee swings available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    /// Downward-to-upward arc in front of the player.
    Slash,
    /// Straight jab along the facing direction.
    Thrust,
    /// Arc sweeping from below to above.
    Uppercut,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a thrown weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeaponId(u32);

impl WeaponId {
    /// Creates a new weapon identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn level_data_round_trips_through_bincode() {
        let level = LevelData {
            tile_edge: 32,
            columns: 8,
            rows: 4,
            tiles: vec![TileRecord {
                x: 2,
                y: 3,
                kind: TileKind::Solid,
                shape: CollisionShape::SlopeUpRight,
            }],
            player_spawn: Some(SpawnPoint::new(1, 2)),
            enemy_spawns: vec![EnemySpawn {
                at: SpawnPoint::new(5, 2),
                enemy_type: EnemyTypeId::new(3),
            }],
        };
        assert_round_trip(&level);
    }

    #[test]
    fn action_input_round_trips_through_bincode() {
        let input = ActionInput {
            move_left: true,
            thrust: true,
            ..ActionInput::default()
        };
        assert_round_trip(&input);
    }

    #[test]
    fn collision_shape_bytes_are_stable() {
        for (byte, shape) in CollisionShape::ALL.iter().enumerate() {
            assert_eq!(usize::from(shape.to_byte()), byte);
            assert_eq!(CollisionShape::from_byte(shape.to_byte()), Some(*shape));
        }
        assert_eq!(CollisionShape::from_byte(9), None);
        assert_eq!(TileKind::from_byte(3), None);
    }

    #[test]
    fn attack_priority_prefers_slash() {
        let input = ActionInput {
            slash: true,
            uppercut: true,
            ..ActionInput::default()
        };
        assert_eq!(input.attack_request(), Some(AttackType::Slash));
        assert_eq!(ActionInput::default().attack_request(), None);
    }

    #[test]
    fn right_wins_when_both_directions_are_held() {
        let input = ActionInput {
            move_left: true,
            move_right: true,
            ..ActionInput::default()
        };
        assert_eq!(input.horizontal(), Some(Facing::Right));
    }
}
