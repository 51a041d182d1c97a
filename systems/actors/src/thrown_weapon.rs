//! Ballistic thrown weapon that comes to rest on terrain.

use std::time::Duration;

use tilestep_core::{Facing, TileGrid, Vec2, WorldRect};
use tilestep_system_motion::MotionResolver;

/// Horizontal launch speed.
pub const THROW_SPEED: f32 = 600.0;
/// Vertical launch velocity.
pub const THROW_LIFT: f32 = -200.0;
/// Downward acceleration while flying.
pub const GRAVITY: f32 = 800.0;
/// Spin rate in degrees per second.
pub const ROTATION_SPEED: f32 = 720.0;
/// Damage dealt to the first enemy struck.
pub const DAMAGE: u32 = 25;
/// Knockback force dealt to the first enemy struck.
pub const KNOCKBACK: f32 = 400.0;
/// Distance from which a resting weapon can be collected.
pub const PICKUP_RANGE: f32 = 40.0;
/// Edge length of the square collision box.
pub const SIZE: f32 = 32.0;
/// Angle in degrees of a weapon lying on the ground.
pub const RESTING_ROTATION: f32 = 90.0;
/// Depth past which a falling weapon is treated as dropped.
pub const FALL_LIMIT: f32 = 2000.0;

/// Lifecycle of a thrown weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponState {
    /// In the air, spinning and falling.
    Flying,
    /// At rest and waiting to be collected.
    Dropped,
}

/// Weapon released by the player.
#[derive(Clone, Debug, PartialEq)]
pub struct ThrownWeapon {
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    facing: Facing,
    state: WeaponState,
    has_hit_enemy: bool,
}

impl ThrownWeapon {
    /// Launches a weapon from `origin` toward `facing`.
    #[must_use]
    pub fn launch(origin: Vec2, facing: Facing) -> Self {
        Self {
            position: origin,
            velocity: Vec2::new(THROW_SPEED * facing.sign(), THROW_LIFT),
            rotation: 0.0,
            facing,
            state: WeaponState::Flying,
            has_hit_enemy: false,
        }
    }

    /// Advances the flight. Returns `true` on the step the weapon comes to rest.
    pub fn update(&mut self, dt: Duration, grid: &TileGrid) -> bool {
        if self.state == WeaponState::Dropped {
            return false;
        }

        let seconds = dt.as_secs_f32();
        self.velocity.y += GRAVITY * seconds;
        self.position += self.velocity * seconds;
        self.rotation += ROTATION_SPEED * self.facing.sign() * seconds;

        let landed = MotionResolver::new(grid).point_is_solid(self.position);
        if landed || self.position.y > FALL_LIMIT {
            self.state = WeaponState::Dropped;
            self.velocity = Vec2::ZERO;
            self.rotation = RESTING_ROTATION;
            return true;
        }
        false
    }

    /// Claims the weapon's single hit. Only a flying weapon can hit.
    pub fn register_hit(&mut self) -> bool {
        if self.state != WeaponState::Flying || self.has_hit_enemy {
            return false;
        }
        self.has_hit_enemy = true;
        true
    }

    /// Whether an actor centred at `center` can collect the weapon.
    #[must_use]
    pub fn can_pickup(&self, center: Vec2) -> bool {
        self.state == WeaponState::Dropped && self.position.distance(center) < PICKUP_RANGE
    }

    /// Centre point of the weapon.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Spin angle in degrees.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> WeaponState {
        self.state
    }

    /// Whether the single hit has been used.
    #[must_use]
    pub const fn has_hit_enemy(&self) -> bool {
        self.has_hit_enemy
    }

    /// Square collision box centred on the weapon.
    #[must_use]
    pub fn bounds(&self) -> WorldRect {
        WorldRect::centered(self.position, SIZE)
    }
}
