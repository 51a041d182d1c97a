#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-actor state machines for the player, patrolling enemies and thrown
//! weapons.
//!
//! Every actor owns its timers outright and advances them only from its own
//! `update` call. Actors never read each other's state; cross-actor effects
//! arrive through `take_hit`/`take_damage` calls made by the combat pass.

pub mod enemy;
pub mod player;
pub mod thrown_weapon;

pub use enemy::Enemy;
pub use player::{Afterimage, Attack, Player, PlayerStep};
pub use thrown_weapon::{ThrownWeapon, WeaponState};
