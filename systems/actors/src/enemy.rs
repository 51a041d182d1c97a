//! Patrolling enemy state machine.

use std::time::Duration;

use tilestep_core::{EnemyId, EnemyTypeId, Facing, TileGrid, Vec2, WorldRect};
use tilestep_system_motion::{Body, Contacts, MotionResolver};

/// Width of an enemy's collision box.
pub const WIDTH: f32 = 40.0;
/// Height of an enemy's collision box.
pub const HEIGHT: f32 = 40.0;
/// Patrol speed.
pub const PATROL_SPEED: f32 = 100.0;
/// Downward acceleration.
pub const GRAVITY: f32 = 1200.0;
/// Terminal falling speed.
pub const MAX_FALL_SPEED: f32 = 800.0;
/// Damage dealt to the player on contact.
pub const CONTACT_DAMAGE: u32 = 10;
/// Knockback force dealt to the player on contact.
pub const CONTACT_KNOCKBACK: f32 = 400.0;
/// Time patrol is suspended after taking damage.
pub const KNOCKBACK_DURATION: Duration = Duration::from_millis(200);
/// Share of the knockback force applied upward.
pub const KNOCKBACK_LIFT: f32 = 0.3;
/// Health on spawn.
pub const MAX_HEALTH: u32 = 30;
/// Depth below the feet at which the ledge probe samples the ground.
pub const LEDGE_PROBE_DEPTH: f32 = 5.0;
/// Minimum time between a turn and the next ledge-driven turn.
pub const TURN_COOLDOWN: Duration = Duration::from_millis(500);

/// Enemy that walks back and forth, turning at walls and ledges.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    enemy_type: EnemyTypeId,
    body: Body,
    moving_right: bool,
    grounded: bool,
    health: u32,
    knockback: Duration,
    turn_cooldown: Duration,
    alive: bool,
}

impl Enemy {
    /// Spawns an enemy with its top-left corner at `position`, walking right.
    #[must_use]
    pub fn new(id: EnemyId, enemy_type: EnemyTypeId, position: Vec2) -> Self {
        Self {
            id,
            enemy_type,
            body: Body::new(position, Vec2::new(WIDTH, HEIGHT)),
            moving_right: true,
            grounded: false,
            health: MAX_HEALTH,
            knockback: Duration::ZERO,
            turn_cooldown: Duration::ZERO,
            alive: true,
        }
    }

    /// Advances the patrol by one step. Defeated enemies do not move.
    ///
    /// Walls always reverse the patrol. A missing floor ahead reverses it
    /// only once the turn cooldown has run out; until then the enemy waits
    /// at the edge.
    pub fn update(&mut self, dt: Duration, grid: &TileGrid) -> Contacts {
        if !self.alive {
            return Contacts::default();
        }

        let seconds = dt.as_secs_f32();
        self.knockback = self.knockback.saturating_sub(dt);
        self.turn_cooldown = self.turn_cooldown.saturating_sub(dt);
        if self.knockback.is_zero() {
            self.body.velocity.x = PATROL_SPEED * self.heading().sign();
        }
        self.body.velocity.y = (self.body.velocity.y + GRAVITY * seconds).min(MAX_FALL_SPEED);

        let resolver = MotionResolver::new(grid);
        let start_x = self.body.position.x;
        let horizontal = resolver.step_horizontal(&mut self.body, seconds);

        let walked_into_wall = (self.moving_right && horizontal.wall_right)
            || (!self.moving_right && horizontal.wall_left);
        if walked_into_wall {
            self.turn();
        } else if self.grounded && self.knockback.is_zero() && !self.ground_ahead(grid, &resolver) {
            self.body.position.x = start_x;
            if self.turn_cooldown.is_zero() {
                self.turn();
            }
        }

        let moving_vertically = self.body.velocity.y != 0.0;
        let vertical = resolver.step_vertical(&mut self.body, seconds);
        if moving_vertically {
            self.grounded = vertical.grounded;
        }

        Contacts {
            grounded: vertical.grounded,
            ceiling: vertical.ceiling,
            wall_left: horizontal.wall_left,
            wall_right: horizontal.wall_right,
        }
    }

    /// Applies damage from an attacker centred at `source`.
    ///
    /// Dropping to zero health defeats the enemy for good. Surviving hits
    /// push the enemy away from the attacker and suspend its patrol. Returns
    /// whether the hit landed.
    pub fn take_damage(&mut self, damage: u32, force: f32, source: Vec2) -> bool {
        if !self.alive {
            return false;
        }

        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            self.alive = false;
            return true;
        }

        let direction = if self.center().x > source.x { 1.0 } else { -1.0 };
        self.body.velocity = Vec2::new(force * direction, -force * KNOCKBACK_LIFT);
        self.knockback = KNOCKBACK_DURATION;
        self.grounded = false;
        true
    }

    /// Identifier assigned by the world.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Archetype recorded in the level file.
    #[must_use]
    pub const fn enemy_type(&self) -> EnemyTypeId {
        self.enemy_type
    }

    /// Top-left corner of the collision box.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    /// Collision box.
    #[must_use]
    pub fn bounds(&self) -> WorldRect {
        self.body.bounds()
    }

    /// Centre of the collision box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    /// Whether the patrol heads toward increasing x.
    #[must_use]
    pub const fn is_moving_right(&self) -> bool {
        self.moving_right
    }

    /// Whether the enemy stood on a surface after the last step.
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Whether a recent hit is still pushing the enemy.
    #[must_use]
    pub fn is_knocked_back(&self) -> bool {
        !self.knockback.is_zero()
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Whether the enemy is still part of the simulation.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    fn heading(&self) -> Facing {
        if self.moving_right {
            Facing::Right
        } else {
            Facing::Left
        }
    }

    fn turn(&mut self) {
        self.moving_right = !self.moving_right;
        self.turn_cooldown = TURN_COOLDOWN;
    }

    fn ground_ahead(&self, grid: &TileGrid, resolver: &MotionResolver<'_>) -> bool {
        let bounds = self.body.bounds();
        let reach = grid.tile_size();
        let x = if self.moving_right {
            bounds.right() + reach
        } else {
            bounds.left() - reach
        };
        resolver.point_is_supported(Vec2::new(x, bounds.bottom() + LEDGE_PROBE_DEPTH))
    }
}
