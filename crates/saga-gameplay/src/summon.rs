//! Health-gated summoning of minions and decoys.

use glam::Vec2;
use tracing::{info, warn};

use saga_common::{direction_between, unit_from_deg, ActorId};

use crate::actor::{Actor, SpawnFlags};
use crate::behavior::{priority, BehaviorTask};
use crate::context::TickContext;
use crate::events::{GameEvent, SummonKind};

/// Builds one summoned actor. Receives the summoner's target.
pub type ActorFactory = Box<dyn Fn(ActorId, &mut fastrand::Rng) -> Actor>;

/// Blast that accompanies a summon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    /// Reach from the summoner centre
    pub radius: f32,
    /// Impulse applied to the target
    pub force: f32,
}

/// Spawns `count` actors around the owner each time its health fraction
/// drops past the next threshold. One wave per activation: after firing the
/// task yields until it is stopped, so several thresholds crossed at once
/// fire on alternate ticks.
pub struct SummonTask {
    kind: SummonKind,
    target: ActorId,
    factory: ActorFactory,
    count: u32,
    thresholds: Vec<f32>,
    next: usize,
    ring_radius: f32,
    explosion: Option<Explosion>,
    fired: bool,
}

impl std::fmt::Debug for SummonTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummonTask")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("count", &self.count)
            .field("thresholds", &self.thresholds)
            .field("next", &self.next)
            .field("ring_radius", &self.ring_radius)
            .field("explosion", &self.explosion)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}

impl SummonTask {
    /// Minions at 75%, 50% and 25% health, each wave with a blast.
    #[must_use]
    pub fn minions(target: ActorId, factory: ActorFactory, count: u32) -> Self {
        Self {
            kind: SummonKind::Minions,
            target,
            factory,
            count,
            thresholds: vec![0.75, 0.5, 0.25],
            next: 0,
            ring_radius: 2.0,
            explosion: Some(Explosion {
                radius: 3.0,
                force: 6.0,
            }),
            fired: false,
        }
    }

    /// Decoys once, at half health.
    #[must_use]
    pub fn decoys(target: ActorId, factory: ActorFactory, count: u32) -> Self {
        Self {
            kind: SummonKind::Decoys,
            target,
            factory,
            count,
            thresholds: vec![0.5],
            next: 0,
            ring_radius: 3.0,
            explosion: None,
            fired: false,
        }
    }

    /// Replaces the health fractions; they are sorted highest first.
    #[must_use]
    pub fn with_thresholds(mut self, mut thresholds: Vec<f32>) -> Self {
        thresholds.sort_by(|a, b| b.total_cmp(a));
        self.thresholds = thresholds;
        self.next = 0;
        self
    }

    /// Distance from the owner centre to spawn at.
    #[must_use]
    pub fn with_ring_radius(mut self, radius: f32) -> Self {
        self.ring_radius = radius;
        self
    }

    /// Replaces or removes the accompanying blast.
    #[must_use]
    pub fn with_explosion(mut self, explosion: Option<Explosion>) -> Self {
        self.explosion = explosion;
        self
    }

    /// Thresholds not yet used.
    #[must_use]
    pub fn remaining_thresholds(&self) -> &[f32] {
        self.thresholds.get(self.next..).unwrap_or_default()
    }

    fn explode(&self, ctx: &mut TickContext<'_>, explosion: Explosion, center: Vec2) {
        ctx.publish(GameEvent::Explosion {
            actor: ctx.owner,
            center,
            radius: explosion.radius,
        });
        let Some(target_center) = ctx.center_of(self.target) else {
            return;
        };
        if center.distance(target_center) > explosion.radius || !ctx.physics.has_body(self.target) {
            return;
        }
        if let Some(direction) = direction_between(center, target_center) {
            ctx.physics.apply_impulse(self.target, direction * explosion.force);
        }
    }
}

impl BehaviorTask for SummonTask {
    fn name(&self) -> &'static str {
        match self.kind {
            SummonKind::Minions => "spawn_minions",
            SummonKind::Decoys => "spawn_decoys",
        }
    }

    fn priority(&mut self, ctx: &mut TickContext<'_>) -> i32 {
        let Some(stats) = ctx.owner().and_then(|owner| owner.stats) else {
            return priority::INELIGIBLE;
        };
        if self.fired || stats.is_dead() {
            return priority::INELIGIBLE;
        }
        match self.thresholds.get(self.next) {
            Some(threshold) if stats.health_fraction() <= *threshold => priority::SUMMON,
            _ => priority::INELIGIBLE,
        }
    }

    fn start(&mut self, ctx: &mut TickContext<'_>) {
        self.next += 1;
        self.fired = true;
        let Some(center) = ctx.owner().map(Actor::center) else {
            return;
        };

        let base = ctx.rng.f32() * 360.0;
        let step = 360.0 / self.count.max(1) as f32;
        let mut spawned = Vec::with_capacity(self.count as usize);
        for i in 0..self.count {
            let spot = center + unit_from_deg(base + step * i as f32) * self.ring_radius;
            let actor = (self.factory)(self.target, &mut *ctx.rng);
            match ctx.actors.spawn_at(actor, spot, SpawnFlags::CENTERED, ctx.events) {
                Ok(id) => spawned.push(id),
                Err(e) => warn!("{} could not summon: {}", ctx.owner, e),
            }
        }

        if let Some(explosion) = self.explosion {
            self.explode(ctx, explosion, center);
        }
        info!("{} summoned {} {:?}", ctx.owner, spawned.len(), self.kind);
        ctx.publish(GameEvent::Summoned {
            actor: ctx.owner,
            kind: self.kind,
            spawned,
        });
    }

    fn stop(&mut self, _ctx: &mut TickContext<'_>) {
        self.fired = false;
    }
}
