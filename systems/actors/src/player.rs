//! Player state machine.
//!
//! The player layers several independent timers over a walk/jump/gravity
//! loop. Dash, knockback, invincibility and attack can overlap, so each keeps
//! its own countdown instead of sharing a single state tag.

use std::{collections::VecDeque, f32::consts::PI, time::Duration};

use tilestep_core::{ActionInput, AttackType, EnemyId, Facing, TileGrid, Vec2, WorldRect};
use tilestep_system_motion::{Body, Contacts, MotionResolver};

use crate::thrown_weapon::ThrownWeapon;

/// Width of the player's collision box.
pub const WIDTH: f32 = 32.0;
/// Height of the player's collision box.
pub const HEIGHT: f32 = 48.0;
/// Horizontal walking speed.
pub const WALK_SPEED: f32 = 200.0;
/// Vertical velocity applied by a jump.
pub const JUMP_VELOCITY: f32 = -400.0;
/// Downward acceleration.
pub const GRAVITY: f32 = 980.0;
/// Terminal falling speed.
pub const MAX_FALL_SPEED: f32 = 600.0;
/// Health on spawn.
pub const MAX_HEALTH: u32 = 100;

/// Horizontal speed while dashing.
pub const DASH_SPEED: f32 = 600.0;
/// Length of a dash.
pub const DASH_DURATION: Duration = Duration::from_millis(200);
/// Delay after a dash ends before another can start.
pub const DASH_COOLDOWN: Duration = Duration::from_millis(500);
/// Time between afterimages emitted during a dash.
pub const AFTERIMAGE_INTERVAL: Duration = Duration::from_millis(30);
/// Maximum number of afterimages kept at once.
pub const AFTERIMAGE_CAPACITY: usize = 8;
/// Time an afterimage takes to fade out.
pub const AFTERIMAGE_LIFETIME: Duration = Duration::from_millis(200);

/// Time directional input stays locked after a hit.
pub const KNOCKBACK_DURATION: Duration = Duration::from_millis(300);
/// Share of the knockback force applied upward.
pub const KNOCKBACK_LIFT: f32 = 0.3;
/// Time hits are ignored after a hit lands.
pub const INVINCIBILITY_DURATION: Duration = Duration::from_secs(1);
/// Blink cycles per second while invincible.
pub const BLINK_FREQUENCY: f32 = 10.0;

/// Length of an attack swing.
pub const ATTACK_DURATION: Duration = Duration::from_millis(250);
/// Delay from the start of one swing to the next.
pub const ATTACK_COOLDOWN: Duration = Duration::from_millis(400);
/// Distance from the player centre to the weapon tip.
pub const ATTACK_RANGE: f32 = 40.0;
/// Edge length of the square attack hitbox.
pub const ATTACK_HITBOX: f32 = 32.0;
/// Damage dealt by a swing.
pub const ATTACK_DAMAGE: u32 = 10;
/// Knockback force dealt by a swing.
pub const ATTACK_KNOCKBACK: f32 = 300.0;

/// In-progress melee swing.
#[derive(Clone, Debug, PartialEq)]
pub struct Attack {
    kind: AttackType,
    elapsed: Duration,
    hit: Vec<EnemyId>,
}

impl Attack {
    fn new(kind: AttackType) -> Self {
        Self {
            kind,
            elapsed: Duration::ZERO,
            hit: Vec::new(),
        }
    }

    /// Swing being performed.
    #[must_use]
    pub const fn kind(&self) -> AttackType {
        self.kind
    }

    /// Time since the swing started.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Current sweep angle in radians, y axis pointing down, before mirroring.
    #[must_use]
    pub fn angle(&self) -> f32 {
        let (start, end) = sweep_degrees(self.kind);
        let t = (self.elapsed.as_secs_f32() / ATTACK_DURATION.as_secs_f32()).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        (start + (end - start) * eased) * PI / 180.0
    }
}

fn sweep_degrees(kind: AttackType) -> (f32, f32) {
    match kind {
        AttackType::Slash => (-60.0, 60.0),
        AttackType::Thrust => (0.0, 0.0),
        AttackType::Uppercut => (60.0, -60.0),
    }
}

/// Fading echo of the player's position left behind by a dash.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Afterimage {
    /// Top-left corner of the echoed box.
    pub position: Vec2,
    /// Direction the player faced when the echo was left.
    pub facing: Facing,
    remaining: Duration,
}

impl Afterimage {
    /// Opacity between zero and one, fading linearly over the lifetime.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.remaining.as_secs_f32() / AFTERIMAGE_LIFETIME.as_secs_f32()
    }
}

/// What happened during one player update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerStep {
    /// Surfaces touched while moving.
    pub contacts: Contacts,
    /// A dash began this step.
    pub dash_started: bool,
    /// A swing began this step.
    pub attack_started: Option<AttackType>,
    /// Weapon released this step, ready to be added to the world.
    pub thrown: Option<ThrownWeapon>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct DashTimers {
    remaining: Duration,
    cooldown: Duration,
    since_afterimage: Duration,
}

/// The player-controlled actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    body: Body,
    facing: Facing,
    grounded: bool,
    health: u32,
    dash: DashTimers,
    knockback: Duration,
    invincibility: Duration,
    attack: Option<Attack>,
    attack_cooldown: Duration,
    afterimages: VecDeque<Afterimage>,
    carrying_weapon: bool,
}

impl Player {
    /// Spawns a player with its top-left corner at `position`.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            body: Body::new(position, Vec2::new(WIDTH, HEIGHT)),
            facing: Facing::Right,
            grounded: false,
            health: MAX_HEALTH,
            dash: DashTimers::default(),
            knockback: Duration::ZERO,
            invincibility: Duration::ZERO,
            attack: None,
            attack_cooldown: Duration::ZERO,
            afterimages: VecDeque::with_capacity(AFTERIMAGE_CAPACITY),
            carrying_weapon: true,
        }
    }

    /// Advances the player by one step.
    pub fn update(&mut self, input: &ActionInput, dt: Duration, grid: &TileGrid) -> PlayerStep {
        let seconds = dt.as_secs_f32();
        let mut step = PlayerStep::default();

        self.knockback = self.knockback.saturating_sub(dt);
        self.invincibility = self.invincibility.saturating_sub(dt);
        self.attack_cooldown = self.attack_cooldown.saturating_sub(dt);
        self.fade_afterimages(dt);
        self.advance_dash(dt);

        let dashing = self.is_dashing();
        if !dashing && self.knockback.is_zero() {
            if let Some(facing) = input.horizontal() {
                self.facing = facing;
            }
        }

        if !dashing && input.dash && self.dash.cooldown.is_zero() {
            self.dash.remaining = DASH_DURATION;
            self.dash.since_afterimage = AFTERIMAGE_INTERVAL;
            step.dash_started = true;
        }

        if let Some(attack) = self.attack.as_mut() {
            attack.elapsed += dt;
            if attack.elapsed >= ATTACK_DURATION {
                self.attack = None;
            }
        }

        let dashing = self.is_dashing();
        if !dashing && self.attack.is_none() && self.attack_cooldown.is_zero() {
            if let Some(kind) = input.attack_request() {
                self.attack = Some(Attack::new(kind));
                self.attack_cooldown = ATTACK_COOLDOWN;
                step.attack_started = Some(kind);
            }
        }

        if dashing {
            self.body.velocity = Vec2::new(DASH_SPEED * self.facing.sign(), 0.0);
        } else {
            if self.knockback.is_zero() {
                self.body.velocity.x = input
                    .horizontal()
                    .map_or(0.0, |facing| WALK_SPEED * facing.sign());
            }
            if input.jump && self.grounded {
                self.body.velocity.y = JUMP_VELOCITY;
                self.grounded = false;
            }
            self.body.velocity.y = (self.body.velocity.y + GRAVITY * seconds).min(MAX_FALL_SPEED);
        }

        // The vertical pass is skipped at zero vertical speed, as while dashing.
        let moving_vertically = self.body.velocity.y != 0.0;
        let start = self.body.position;
        step.contacts = MotionResolver::new(grid).step(&mut self.body, seconds);
        if moving_vertically {
            self.grounded = step.contacts.grounded;
        }

        if dashing {
            self.emit_afterimages(start, dt);
        }

        if input.throw_weapon && self.carrying_weapon && !dashing {
            self.carrying_weapon = false;
            step.thrown = Some(ThrownWeapon::launch(self.center(), self.facing));
        }

        step
    }

    /// Applies a hit from an enemy centred at `source`.
    ///
    /// Ignored while invincible or dashing. Returns whether the hit landed.
    pub fn take_hit(&mut self, damage: u32, force: f32, source: Vec2) -> bool {
        if !self.invincibility.is_zero() || self.is_dashing() {
            return false;
        }

        self.health = self.health.saturating_sub(damage);
        let direction = if self.center().x > source.x { 1.0 } else { -1.0 };
        self.body.velocity = Vec2::new(force * direction, -force * KNOCKBACK_LIFT);
        self.grounded = false;
        self.knockback = KNOCKBACK_DURATION;
        self.invincibility = INVINCIBILITY_DURATION;
        true
    }

    /// Records that the current swing struck `enemy`.
    ///
    /// Returns `false` when no swing is active or the enemy was already hit
    /// by it.
    pub fn register_attack_hit(&mut self, enemy: EnemyId) -> bool {
        match self.attack.as_mut() {
            Some(attack) if !attack.hit.contains(&enemy) => {
                attack.hit.push(enemy);
                true
            }
            _ => false,
        }
    }

    /// Returns the thrown weapon to the player's hands.
    ///
    /// Returns `false` when the player is already carrying one.
    pub fn collect_weapon(&mut self) -> bool {
        if self.carrying_weapon {
            return false;
        }
        self.carrying_weapon = true;
        true
    }

    /// Live hitbox of the current swing.
    #[must_use]
    pub fn attack_hitbox(&self) -> Option<WorldRect> {
        let attack = self.attack.as_ref()?;
        let angle = attack.angle();
        let offset = Vec2::new(angle.cos() * self.facing.sign(), angle.sin()) * ATTACK_RANGE;
        Some(WorldRect::centered(self.center() + offset, ATTACK_HITBOX))
    }

    /// Whether the player should be drawn this frame.
    ///
    /// While invincible the player blinks at [`BLINK_FREQUENCY`], except when
    /// dashing.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        if self.invincibility.is_zero() || self.is_dashing() {
            return true;
        }
        let phase = (self.invincibility.as_secs_f32() * BLINK_FREQUENCY * 2.0) as u32;
        phase % 2 == 0
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

    /// Direction the player faces.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Whether the player stood on a surface after the last step.
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Whether a dash is in progress.
    #[must_use]
    pub fn is_dashing(&self) -> bool {
        !self.dash.remaining.is_zero()
    }

    /// Whether knockback currently overrides directional input.
    #[must_use]
    pub fn is_knocked_back(&self) -> bool {
        !self.knockback.is_zero()
    }

    /// Whether hits are currently ignored.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        !self.invincibility.is_zero()
    }

    /// Swing in progress, if any.
    #[must_use]
    pub fn attack(&self) -> Option<&Attack> {
        self.attack.as_ref()
    }

    /// Afterimages from oldest to newest.
    pub fn afterimages(&self) -> impl Iterator<Item = &Afterimage> {
        self.afterimages.iter()
    }

    /// Whether the player holds the throwable weapon.
    #[must_use]
    pub const fn is_carrying_weapon(&self) -> bool {
        self.carrying_weapon
    }

    fn advance_dash(&mut self, dt: Duration) {
        if self.dash.remaining.is_zero() {
            self.dash.cooldown = self.dash.cooldown.saturating_sub(dt);
            return;
        }
        self.dash.remaining = self.dash.remaining.saturating_sub(dt);
        if self.dash.remaining.is_zero() {
            self.dash.cooldown = DASH_COOLDOWN;
        }
    }

    /// Leaves one afterimage per interval of dash time covered by this step.
    ///
    /// Each image sits where the player was when it fell due and has already
    /// faded by its age at the end of the step.
    fn emit_afterimages(&mut self, start: Vec2, dt: Duration) {
        self.dash.since_afterimage += dt;
        let end = self.body.position;
        while self.dash.since_afterimage >= AFTERIMAGE_INTERVAL {
            self.dash.since_afterimage -= AFTERIMAGE_INTERVAL;
            let age = self.dash.since_afterimage;
            let remaining = AFTERIMAGE_LIFETIME.saturating_sub(age);
            if remaining.is_zero() {
                continue;
            }
            let position = if dt.is_zero() {
                end
            } else {
                end - (end - start) * (age.as_secs_f32() / dt.as_secs_f32())
            };
            self.afterimages.push_back(Afterimage {
                position,
                facing: self.facing,
                remaining,
            });
        }
        while self.afterimages.len() > AFTERIMAGE_CAPACITY {
            let _ = self.afterimages.pop_front();
        }
    }

    fn fade_afterimages(&mut self, dt: Duration) {
        for image in &mut self.afterimages {
            image.remaining = image.remaining.saturating_sub(dt);
        }
        self.afterimages.retain(|image| !image.remaining.is_zero());
    }
}
