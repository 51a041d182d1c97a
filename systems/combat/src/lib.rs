#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rectangle-overlap combat between the player, enemies and thrown weapons.
//!
//! The pass runs after every actor has moved for the step. It never reads an
//! actor's timers directly: each overlap turns into a `take_hit` or
//! `take_damage` call and the actor decides whether the hit lands.

use tilestep_core::{Event, WeaponId};
use tilestep_system_actors::{enemy, player, thrown_weapon, Enemy, Player, ThrownWeapon};

/// Thrown weapon paired with the identifier the world assigned to it.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedWeapon {
    /// Identifier assigned when the weapon was thrown.
    pub id: WeaponId,
    /// Weapon state.
    pub weapon: ThrownWeapon,
}

/// Combat system that resolves overlaps once per step.
#[derive(Debug, Default)]
pub struct Combat {
    scratch: Vec<Event>,
}

impl Combat {
    /// Creates a new combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies contact damage, melee hits and weapon hits for this step.
    ///
    /// Enemy contact is checked first, then the player's swing, then flying
    /// weapons. Defeated enemies stay in `enemies` for the caller to remove.
    pub fn resolve(
        &mut self,
        player: &mut Player,
        enemies: &mut [Enemy],
        weapons: &mut [TrackedWeapon],
        out: &mut Vec<Event>,
    ) {
        self.scratch.clear();

        self.enemy_contact(player, enemies);
        self.player_attack(player, enemies);
        self.weapon_hits(enemies, weapons);

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    fn enemy_contact(&mut self, player: &mut Player, enemies: &[Enemy]) {
        for enemy in enemies.iter().filter(|enemy| enemy.is_alive()) {
            if !enemy.bounds().intersects(&player.bounds()) {
                continue;
            }
            if player.take_hit(
                enemy::CONTACT_DAMAGE,
                enemy::CONTACT_KNOCKBACK,
                enemy.center(),
            ) {
                self.scratch.push(Event::PlayerHit {
                    damage: enemy::CONTACT_DAMAGE,
                    remaining_health: player.health(),
                });
            }
        }
    }

    fn player_attack(&mut self, player: &mut Player, enemies: &mut [Enemy]) {
        let Some(hitbox) = player.attack_hitbox() else {
            return;
        };
        let origin = player.center();

        for enemy in enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
            if !hitbox.intersects(&enemy.bounds()) {
                continue;
            }
            if !player.register_attack_hit(enemy.id()) {
                continue;
            }
            if enemy.take_damage(player::ATTACK_DAMAGE, player::ATTACK_KNOCKBACK, origin) {
                self.scratch.push(Event::EnemyHit {
                    enemy: enemy.id(),
                    damage: player::ATTACK_DAMAGE,
                    remaining_health: enemy.health(),
                });
            }
        }
    }

    fn weapon_hits(&mut self, enemies: &mut [Enemy], weapons: &mut [TrackedWeapon]) {
        for tracked in weapons.iter_mut() {
            let bounds = tracked.weapon.bounds();
            let target = enemies
                .iter_mut()
                .filter(|enemy| enemy.is_alive())
                .find(|enemy| bounds.intersects(&enemy.bounds()));
            let Some(enemy) = target else {
                continue;
            };
            if !tracked.weapon.register_hit() {
                continue;
            }
            if enemy.take_damage(
                thrown_weapon::DAMAGE,
                thrown_weapon::KNOCKBACK,
                tracked.weapon.position(),
            ) {
                self.scratch.push(Event::EnemyHit {
                    enemy: enemy.id(),
                    damage: thrown_weapon::DAMAGE,
                    remaining_health: enemy.health(),
                });
            }
        }
    }
}
