//! Idle wandering, free or inside an anchor region.

use glam::Vec2;

use crate::anchor::Anchor;
use crate::behavior::{priority, BehaviorTask};
use crate::context::TickContext;

/// Distance at which a wander leg counts as arrived.
pub const ARRIVAL_TOLERANCE: f32 = 0.25;

/// Longest time spent walking one leg before giving up on it.
pub const MAX_LEG_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Walking { destination: Vec2, give_up_at_ms: u64 },
    Waiting { until_ms: u64 },
}

/// Where wander destinations are drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WanderArea {
    /// Box of half-size `range` around where the task started
    AroundStart {
        /// Half extents of the box
        range: Vec2,
    },
    /// Inside an anchor region
    Anchored(Anchor),
}

/// Walks to random points and pauses between legs. Lowest-priority fallback.
#[derive(Debug, Clone)]
pub struct WanderTask {
    area: WanderArea,
    wait_ms: u64,
    origin: Vec2,
    phase: Phase,
}

impl WanderTask {
    /// Wanders inside `origin ± range`, waiting `wait_ms` between legs.
    #[must_use]
    pub fn new(range: Vec2, wait_ms: u64) -> Self {
        Self {
            area: WanderArea::AroundStart { range },
            wait_ms,
            origin: Vec2::ZERO,
            phase: Phase::Idle,
        }
    }

    /// Wanders inside an anchor region.
    #[must_use]
    pub fn anchored(anchor: Anchor, wait_ms: u64) -> Self {
        Self {
            area: WanderArea::Anchored(anchor),
            wait_ms,
            origin: Vec2::ZERO,
            phase: Phase::Idle,
        }
    }

    fn pick_destination(&self, ctx: &mut TickContext<'_>) -> Option<Vec2> {
        match self.area {
            WanderArea::AroundStart { range } => Some(
                self.origin
                    + Vec2::new(
                        (ctx.rng.f32() * 2.0 - 1.0) * range.x,
                        (ctx.rng.f32() * 2.0 - 1.0) * range.y,
                    ),
            ),
            WanderArea::Anchored(anchor) => {
                let center = anchor.center(ctx.actors)?;
                Some(anchor.region.random_point(center, ctx.rng))
            }
        }
    }

    fn begin_leg(&mut self, ctx: &mut TickContext<'_>) {
        let now = ctx.now_ms();
        self.phase = match self.pick_destination(ctx) {
            Some(destination) => {
                ctx.move_owner_to(destination);
                Phase::Walking {
                    destination,
                    give_up_at_ms: now + MAX_LEG_MS,
                }
            }
            None => Phase::Waiting {
                until_ms: now + self.wait_ms,
            },
        };
    }
}

impl BehaviorTask for WanderTask {
    fn name(&self) -> &'static str {
        match self.area {
            WanderArea::AroundStart { .. } => "wander",
            WanderArea::Anchored(_) => "anchored_wander",
        }
    }

    fn priority(&mut self, ctx: &mut TickContext<'_>) -> i32 {
        let available = match self.area {
            WanderArea::AroundStart { .. } => ctx.owner().is_some(),
            WanderArea::Anchored(anchor) => ctx.actors.contains(anchor.actor),
        };
        if available {
            priority::WANDER
        } else {
            priority::INELIGIBLE
        }
    }

    fn start(&mut self, ctx: &mut TickContext<'_>) {
        if let Some(owner) = ctx.owner() {
            self.origin = owner.center();
        }
        self.begin_leg(ctx);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        let now = ctx.now_ms();
        match self.phase {
            Phase::Idle => self.begin_leg(ctx),
            Phase::Walking {
                destination,
                give_up_at_ms,
            } => {
                let arrived = ctx
                    .owner()
                    .map_or(true, |owner| owner.center().distance(destination) <= ARRIVAL_TOLERANCE);
                if arrived || now >= give_up_at_ms {
                    ctx.halt_owner();
                    self.phase = Phase::Waiting {
                        until_ms: now + self.wait_ms,
                    };
                }
            }
            Phase::Waiting { until_ms } => {
                if now >= until_ms {
                    self.begin_leg(ctx);
                }
            }
        }
    }

    fn stop(&mut self, ctx: &mut TickContext<'_>) {
        self.phase = Phase::Idle;
        ctx.halt_owner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorArena, ActorKind};
    use crate::context::WorldFlags;
    use crate::events::EventBus;
    use crate::movement::Movement;
    use crate::physics::MockPhysics;
    use saga_common::{ActorId, ManualClock};

    fn run(
        task: &mut WanderTask,
        actors: &mut ActorArena,
        owner: ActorId,
        clock: &ManualClock,
        step: impl Fn(&mut WanderTask, &mut TickContext<'_>),
    ) {
        let mut physics = MockPhysics::new();
        let events = EventBus::default();
        let mut flags = WorldFlags::default();
        let mut rng = fastrand::Rng::with_seed(5);
        let mut ctx = TickContext {
            owner,
            actors,
            physics: &mut physics,
            clock,
            events: &events,
            flags: &mut flags,
            rng: &mut rng,
            frame_rate: 60.0,
        };
        step(task, &mut ctx);
    }

    #[test]
    fn test_destinations_stay_in_range() {
        let mut actors = ActorArena::new();
        let owner = actors
            .insert(
                Actor::new(ActorKind::Melee)
                    .with_position(Vec2::new(9.5, 9.5))
                    .with_movement(Movement::uniform(1.0)),
            )
            .expect("insert");
        let clock = ManualClock::new(0);
        let mut task = WanderTask::new(Vec2::new(2.0, 2.0), 2_000);

        run(&mut task, &mut actors, owner, &clock, |task, ctx| {
            task.start(ctx);
        });

        let target = actors
            .get(owner)
            .and_then(|a| a.movement)
            .and_then(|m| m.target())
            .expect("target");
        assert!((target - Vec2::new(10.0, 10.0)).abs().cmple(Vec2::splat(2.0)).all());
    }

    #[test]
    fn test_waits_after_arriving() {
        let mut actors = ActorArena::new();
        let owner = actors
            .insert(Actor::new(ActorKind::Melee).with_movement(Movement::uniform(1.0)))
            .expect("insert");
        let clock = ManualClock::new(0);
        let mut task = WanderTask::new(Vec2::ZERO, 1_000);

        run(&mut task, &mut actors, owner, &clock, |task, ctx| {
            task.start(ctx);
            task.update(ctx);
        });
        assert_eq!(task.phase, Phase::Waiting { until_ms: 1_000 });
        assert!(!actors.get(owner).and_then(|a| a.movement).expect("movement").is_moving());

        clock.advance(1_000);
        run(&mut task, &mut actors, owner, &clock, |task, ctx| task.update(ctx));
        assert!(matches!(task.phase, Phase::Walking { .. }));
    }

    #[test]
    fn test_anchored_wander_needs_anchor() {
        let mut actors = ActorArena::new();
        let anchor = actors.insert(Actor::new(ActorKind::Anchor)).expect("insert");
        let owner = actors.insert(Actor::new(ActorKind::Melee)).expect("insert");
        let clock = ManualClock::new(0);
        let mut task = WanderTask::anchored(Anchor::circle(anchor, 3.0), 500);

        assert_eq!(task.name(), "anchored_wander");
        run(&mut task, &mut actors, owner, &clock, |task, ctx| {
            assert_eq!(task.priority(ctx), priority::WANDER);
        });
        actors.remove(anchor).expect("remove");
        run(&mut task, &mut actors, owner, &clock, |task, ctx| {
            assert_eq!(task.priority(ctx), priority::INELIGIBLE);
        });
    }
}
