use std::{fmt, time::Duration};

use clap::ValueEnum;
use tilestep_core::{ActionInput, Command, Event, Vec2};
use tilestep_world::{self as world, query, World};

/// Action held down for every simulated step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum HeldAction {
    /// Walk left.
    Left,
    /// Walk right.
    Right,
    /// Jump when grounded.
    Jump,
    /// Dash in the facing direction.
    Dash,
    /// Downward sweeping swing.
    Slash,
    /// Straight swing.
    Thrust,
    /// Rising swing.
    Uppercut,
    /// Throw the carried weapon.
    Throw,
    /// Pick up a nearby weapon.
    Interact,
}

/// Builds the per-step input from the held actions.
pub(crate) fn input_from(held: &[HeldAction]) -> ActionInput {
    let mut input = ActionInput::default();
    for action in held {
        let flag = match action {
            HeldAction::Left => &mut input.move_left,
            HeldAction::Right => &mut input.move_right,
            HeldAction::Jump => &mut input.jump,
            HeldAction::Dash => &mut input.dash,
            HeldAction::Slash => &mut input.slash,
            HeldAction::Thrust => &mut input.thrust,
            HeldAction::Uppercut => &mut input.uppercut,
            HeldAction::Throw => &mut input.throw_weapon,
            HeldAction::Interact => &mut input.interact,
        };
        *flag = true;
    }
    input
}

/// Outcome of a headless run.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SimulationReport {
    pub(crate) steps: u32,
    pub(crate) dashes: usize,
    pub(crate) attacks: usize,
    pub(crate) player_hits: usize,
    pub(crate) enemy_hits: usize,
    pub(crate) enemies_defeated: usize,
    pub(crate) weapons_thrown: usize,
    pub(crate) weapons_collected: usize,
    pub(crate) player_position: Vec2,
    pub(crate) player_health: u32,
    pub(crate) enemies_remaining: usize,
}

impl SimulationReport {
    fn record(&mut self, event: &Event) {
        match event {
            Event::DashStarted => self.dashes += 1,
            Event::AttackStarted { .. } => self.attacks += 1,
            Event::PlayerHit { .. } => self.player_hits += 1,
            Event::EnemyHit { .. } => self.enemy_hits += 1,
            Event::EnemyDefeated { .. } => self.enemies_defeated += 1,
            Event::WeaponThrown { .. } => self.weapons_thrown += 1,
            Event::WeaponPickedUp { .. } => self.weapons_collected += 1,
            Event::TimeAdvanced { .. } | Event::LevelLoaded { .. } | Event::WeaponDropped { .. } => {}
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "steps simulated:   {}", self.steps)?;
        writeln!(
            f,
            "player:            ({:.1}, {:.1}) health {}",
            self.player_position.x, self.player_position.y, self.player_health
        )?;
        writeln!(f, "enemies remaining: {}", self.enemies_remaining)?;
        writeln!(
            f,
            "dashes {} / attacks {} / throws {} / pickups {}",
            self.dashes, self.attacks, self.weapons_thrown, self.weapons_collected
        )?;
        write!(
            f,
            "player hit {} times, enemies hit {} times, {} defeated",
            self.player_hits, self.enemy_hits, self.enemies_defeated
        )
    }
}

/// Advances the world `steps` times with a constant input.
pub(crate) fn run(
    world: &mut World,
    steps: u32,
    dt: Duration,
    input: ActionInput,
) -> SimulationReport {
    let mut report = SimulationReport::default();
    let mut events = Vec::new();

    for _ in 0..steps {
        events.clear();
        world::apply(world, Command::Tick { dt, input }, &mut events);
        for event in &events {
            report.record(event);
        }
    }

    let player = query::player(world);
    report.steps = steps;
    report.player_position = player.position();
    report.player_health = player.health();
    report.enemies_remaining = query::enemies(world).len();
    report
}
