//! Health and attack values with the hit rule.

use serde::{Deserialize, Serialize};

/// Health and base attack of a combatant.
///
/// Health is floored at zero by [`CombatStats::hit`] and only ever grows
/// again through [`CombatStats::add_health`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    health: u32,
    max_health: u32,
    base_attack: u32,
}

impl CombatStats {
    /// Creates stats at full health.
    #[must_use]
    pub const fn new(health: u32, base_attack: u32) -> Self {
        Self {
            health,
            max_health: health,
            base_attack,
        }
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Health at spawn.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Damage dealt per successful hit.
    #[must_use]
    pub const fn base_attack(&self) -> u32 {
        self.base_attack
    }

    /// Sets the base attack.
    pub fn set_base_attack(&mut self, attack: u32) {
        self.base_attack = attack;
    }

    /// Applies an incoming attack and returns the damage actually taken.
    pub fn hit(&mut self, attack: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_sub(attack);
        before - self.health
    }

    /// Sets health directly, clamped to the maximum.
    pub fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
    }

    /// Heals up to the maximum.
    pub fn add_health(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    /// True once health reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Health as a fraction of maximum, `0.0` for zero-max stats.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        }
    }
}
