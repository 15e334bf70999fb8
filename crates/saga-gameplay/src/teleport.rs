//! Defensive teleport of a wounded boss.

use tracing::{debug, info};

use saga_common::{unit_from_deg, ActorId};

use crate::behavior::{priority, BehaviorTask};
use crate::context::TickContext;
use crate::cooldown::CooldownGate;
use crate::events::GameEvent;
use crate::physics::PhysicsLayer;

/// Candidate spots tried per teleport.
pub const TELEPORT_ATTEMPTS: u32 = 8;

/// Teleports the owner to a clear spot around its target after it takes
/// damage at low health.
#[derive(Debug, Clone)]
pub struct TeleportationTask {
    target: ActorId,
    cooldown: CooldownGate,
    health_threshold: f32,
    distance: f32,
    last_health: Option<u32>,
    pending: bool,
}

impl TeleportationTask {
    /// Creates a teleport task with the given cooldown.
    #[must_use]
    pub const fn new(target: ActorId, cooldown_ms: u64) -> Self {
        Self {
            target,
            cooldown: CooldownGate::new(cooldown_ms),
            health_threshold: 0.5,
            distance: 6.0,
            last_health: None,
            pending: false,
        }
    }

    /// Health fraction at or below which hits trigger a teleport.
    #[must_use]
    pub const fn with_health_threshold(mut self, threshold: f32) -> Self {
        self.health_threshold = threshold;
        self
    }

    /// Distance from the target to land at.
    #[must_use]
    pub const fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }
}

impl BehaviorTask for TeleportationTask {
    fn name(&self) -> &'static str {
        "teleport"
    }

    fn priority(&mut self, ctx: &mut TickContext<'_>) -> i32 {
        let Some(stats) = ctx.owner().and_then(|owner| owner.stats) else {
            return priority::INELIGIBLE;
        };
        if stats.is_dead() {
            return priority::INELIGIBLE;
        }
        let health = stats.health();
        let took_damage = self.last_health.is_some_and(|last| health < last);
        self.last_health = Some(health);
        if took_damage && stats.health_fraction() <= self.health_threshold {
            self.pending = true;
        }

        if self.pending && ctx.actors.contains(self.target) && self.cooldown.is_ready(ctx.now_ms()) {
            priority::TELEPORT
        } else {
            priority::INELIGIBLE
        }
    }

    fn start(&mut self, ctx: &mut TickContext<'_>) {
        self.pending = false;
        self.cooldown.trigger(ctx.now_ms());

        let (Some(from), Some(anchor)) = (
            ctx.owner().map(crate::actor::Actor::center),
            ctx.center_of(self.target),
        ) else {
            return;
        };
        let destination = (0..TELEPORT_ATTEMPTS)
            .map(|_| anchor + unit_from_deg(ctx.rng.f32() * 360.0) * self.distance)
            .find(|candidate| {
                ctx.physics
                    .raycast(anchor, *candidate, PhysicsLayer::OBSTACLE)
                    .is_none()
            });
        let Some(to) = destination else {
            debug!("{} found no clear teleport spot", ctx.owner);
            return;
        };

        ctx.halt_owner();
        if let Some(owner) = ctx.owner_mut() {
            owner.set_center(to);
        }
        info!("{} teleported to ({:.1}, {:.1})", ctx.owner, to.x, to.y);
        ctx.publish(GameEvent::Teleported {
            actor: ctx.owner,
            from,
            to,
        });
    }
}
