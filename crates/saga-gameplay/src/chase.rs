//! Pursuit of a target, parameterised by a [`ChaseProfile`].
//!
//! All chase variants share one algorithm with hysteresis: a chase begins
//! inside the view distance and is only abandoned beyond the (larger) max
//! chase distance, so an actor hovering near the edge does not flip-flop.

use glam::Vec2;
use tracing::info;

use saga_common::{direction_between, ActorId};

use crate::anchor::Anchor;
use crate::behavior::{priority, BehaviorTask};
use crate::context::TickContext;
use crate::events::GameEvent;

/// Visibility requirement of a chase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SightRule {
    /// Obstacles between the actors break the chase
    LineOfSight,
    /// Distance alone decides
    Unoccluded,
}

/// What allows a chase to begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaseTrigger {
    /// Seeing the target
    Sight,
    /// The world alarm being raised
    Alarm,
}

/// How the chaser closes in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gait {
    /// Straight at the target
    Direct,
    /// Side to side across the line to the target
    ZigZag {
        /// Sideways offset
        amplitude: f32,
        /// Time per swing
        period_ms: u64,
    },
    /// Hold a preferred distance, backing off when too close
    Kite {
        /// Distance to keep
        preferred_distance: f32,
    },
}

/// Parameters of a chase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseProfile {
    /// Log name
    pub name: &'static str,
    /// Priority while eligible
    pub priority: i32,
    /// Distance at which a chase may begin
    pub view_distance: f32,
    /// Distance beyond which an active chase ends
    pub max_chase_distance: f32,
    /// Visibility requirement
    pub sight: SightRule,
    /// Begin condition
    pub trigger: ChaseTrigger,
    /// Raise the world alarm when the chase begins
    pub raises_alarm: bool,
    /// Approach style
    pub gait: Gait,
    /// Region the chase is confined to
    pub anchor: Option<Anchor>,
}

impl ChaseProfile {
    /// Plain line-of-sight pursuit.
    #[must_use]
    pub const fn standard(priority: i32, view_distance: f32, max_chase_distance: f32) -> Self {
        Self {
            name: "chase",
            priority,
            view_distance,
            max_chase_distance,
            sight: SightRule::LineOfSight,
            trigger: ChaseTrigger::Sight,
            raises_alarm: false,
            gait: Gait::Direct,
            anchor: None,
        }
    }

    /// Weaving pursuit.
    #[must_use]
    pub const fn zigzag(priority: i32, view_distance: f32, max_chase_distance: f32, amplitude: f32) -> Self {
        Self {
            name: "zigzag_chase",
            gait: Gait::ZigZag {
                amplitude,
                period_ms: 600,
            },
            ..Self::standard(priority, view_distance, max_chase_distance)
        }
    }

    /// Pursuit that starts only once the alarm is raised, ignoring walls.
    #[must_use]
    pub const fn alertable(priority: i32, view_distance: f32, max_chase_distance: f32) -> Self {
        Self {
            name: "alertable_chase",
            sight: SightRule::Unoccluded,
            trigger: ChaseTrigger::Alarm,
            ..Self::standard(priority, view_distance, max_chase_distance)
        }
    }

    /// Guard pursuit that raises the alarm on sight.
    #[must_use]
    pub const fn alarm_raiser(priority: i32, view_distance: f32, max_chase_distance: f32) -> Self {
        Self {
            name: "alert_chase",
            raises_alarm: true,
            ..Self::standard(priority, view_distance, max_chase_distance)
        }
    }

    /// Long-range melee pursuit.
    #[must_use]
    pub const fn melee(priority: i32, view_distance: f32, max_chase_distance: f32) -> Self {
        Self {
            name: "melee_chase",
            ..Self::standard(priority, view_distance, max_chase_distance)
        }
    }

    /// Ranged pursuit that keeps its distance.
    #[must_use]
    pub const fn ranged(
        priority: i32,
        view_distance: f32,
        max_chase_distance: f32,
        preferred_distance: f32,
    ) -> Self {
        Self {
            name: "ranged_chase",
            gait: Gait::Kite { preferred_distance },
            ..Self::standard(priority, view_distance, max_chase_distance)
        }
    }

    /// Pursuit confined to an anchor region.
    #[must_use]
    pub const fn anchored(view_distance: f32, max_chase_distance: f32, anchor: Anchor) -> Self {
        Self {
            name: "anchored_chase",
            anchor: Some(anchor),
            ..Self::standard(priority::CHASE, view_distance, max_chase_distance)
        }
    }
}

/// Chases one target according to a profile.
#[derive(Debug, Clone)]
pub struct ChaseTask {
    target: ActorId,
    profile: ChaseProfile,
    active: bool,
    started_at_ms: u64,
}

impl ChaseTask {
    /// Creates a chase task.
    #[must_use]
    pub const fn new(target: ActorId, profile: ChaseProfile) -> Self {
        Self {
            target,
            profile,
            active: false,
            started_at_ms: 0,
        }
    }

    /// Profile in use.
    #[must_use]
    pub const fn profile(&self) -> &ChaseProfile {
        &self.profile
    }

    fn goal(&self, ctx: &TickContext<'_>, own: Vec2, target: Vec2) -> Vec2 {
        let Some(direction) = direction_between(own, target) else {
            return target;
        };
        match self.profile.gait {
            Gait::Direct => target,
            Gait::ZigZag {
                amplitude,
                period_ms,
            } => {
                let swing = ctx.now_ms().saturating_sub(self.started_at_ms) / period_ms.max(1);
                let side = if swing % 2 == 0 { 1.0 } else { -1.0 };
                target + direction.perp() * amplitude * side
            }
            Gait::Kite { preferred_distance } => target - direction * preferred_distance,
        }
    }
}

impl BehaviorTask for ChaseTask {
    fn name(&self) -> &'static str {
        self.profile.name
    }

    fn priority(&mut self, ctx: &mut TickContext<'_>) -> i32 {
        let Some(target) = ctx.actors.get(self.target) else {
            return priority::INELIGIBLE;
        };
        if !target.is_alive() {
            return priority::INELIGIBLE;
        }
        let target_center = target.center();
        let Some(distance) = ctx.distance_to(self.target) else {
            return priority::INELIGIBLE;
        };
        if let Some(anchor) = self.profile.anchor {
            if anchor.contains(ctx.actors, target_center) != Some(true) {
                return priority::INELIGIBLE;
            }
        }
        let sees = match self.profile.sight {
            SightRule::LineOfSight => ctx.can_see(ctx.owner, self.target),
            SightRule::Unoccluded => true,
        };

        let eligible = if self.active {
            sees && distance <= self.profile.max_chase_distance
        } else {
            let triggered = match self.profile.trigger {
                ChaseTrigger::Sight => true,
                ChaseTrigger::Alarm => ctx.flags.alarm_raised,
            };
            triggered && sees && distance < self.profile.view_distance
        };
        if eligible {
            self.profile.priority
        } else {
            priority::INELIGIBLE
        }
    }

    fn start(&mut self, ctx: &mut TickContext<'_>) {
        self.active = true;
        self.started_at_ms = ctx.now_ms();
        if self.profile.raises_alarm && !ctx.flags.alarm_raised {
            ctx.flags.alarm_raised = true;
            info!("{} raised the alarm", ctx.owner);
            ctx.publish(GameEvent::AlarmRaised { actor: ctx.owner });
        }
        ctx.resume_owner();
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        let (Some(own), Some(target)) = (
            ctx.owner().map(crate::actor::Actor::center),
            ctx.center_of(self.target),
        ) else {
            return;
        };
        let mut goal = self.goal(ctx, own, target);
        if let Some(anchor) = self.profile.anchor {
            if let Some(center) = anchor.center(ctx.actors) {
                goal = anchor.region.clamp(center, goal);
            }
        }
        ctx.move_owner_to(goal);
    }

    fn stop(&mut self, ctx: &mut TickContext<'_>) {
        self.active = false;
        ctx.halt_owner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorKind};
    use crate::combat_stats::CombatStats;
    use crate::movement::Movement;
    use crate::physics::{PhysicsLayer, AABB};
    use crate::test_support::TestWorld;

    fn setup(world: &mut TestWorld) -> (ActorId, ActorId) {
        let chaser = world.spawn(
            Actor::new(ActorKind::Melee)
                .with_stats(CombatStats::new(50, 5))
                .with_movement(Movement::uniform(2.0)),
        );
        let player = world.spawn(
            Actor::new(ActorKind::Player)
                .with_layer(PhysicsLayer::PLAYER)
                .with_stats(CombatStats::new(100, 10)),
        );
        world.move_center(chaser, Vec2::ZERO);
        (chaser, player)
    }

    #[test]
    fn test_hysteresis() {
        let mut world = TestWorld::new();
        let (chaser, player) = setup(&mut world);
        let mut task = ChaseTask::new(player, ChaseProfile::standard(priority::CHASE, 5.0, 8.0));

        world.move_center(player, Vec2::new(6.0, 0.0));
        assert_eq!(task.priority(&mut world.ctx(chaser)), priority::INELIGIBLE);

        world.move_center(player, Vec2::new(4.0, 0.0));
        assert_eq!(task.priority(&mut world.ctx(chaser)), priority::CHASE);
        task.start(&mut world.ctx(chaser));

        world.move_center(player, Vec2::new(7.5, 0.0));
        assert_eq!(task.priority(&mut world.ctx(chaser)), priority::CHASE);

        world.move_center(player, Vec2::new(8.5, 0.0));
        assert_eq!(task.priority(&mut world.ctx(chaser)), priority::INELIGIBLE);
    }

    #[test]
    fn test_wall_blocks_sight_chase() {
        let mut world = TestWorld::new();
        let (chaser, player) = setup(&mut world);
        world.move_center(player, Vec2::new(4.0, 0.0));
        world
            .physics
            .add_obstacle(AABB::new(Vec2::new(2.0, -3.0), Vec2::new(2.5, 3.0)));

        let mut seeing = ChaseTask::new(player, ChaseProfile::standard(priority::CHASE, 5.0, 8.0));
        assert_eq!(seeing.priority(&mut world.ctx(chaser)), priority::INELIGIBLE);

        world.flags.alarm_raised = true;
        let mut alerted = ChaseTask::new(player, ChaseProfile::alertable(priority::CHASE, 5.0, 8.0));
        assert_eq!(alerted.priority(&mut world.ctx(chaser)), priority::CHASE);
    }

    #[test]
    fn test_alertable_waits_for_alarm_and_guard_raises_it() {
        let mut world = TestWorld::new();
        let (chaser, player) = setup(&mut world);
        world.move_center(player, Vec2::new(3.0, 0.0));

        let mut alertable = ChaseTask::new(player, ChaseProfile::alertable(priority::CHASE, 5.0, 8.0));
        assert_eq!(alertable.priority(&mut world.ctx(chaser)), priority::INELIGIBLE);

        let mut guard = ChaseTask::new(player, ChaseProfile::alarm_raiser(priority::CHASE, 5.0, 8.0));
        assert_eq!(guard.priority(&mut world.ctx(chaser)), priority::CHASE);
        guard.start(&mut world.ctx(chaser));
        assert!(world.flags.alarm_raised);
        assert!(world
            .events
            .drain()
            .contains(&GameEvent::AlarmRaised { actor: chaser }));

        assert_eq!(alertable.priority(&mut world.ctx(chaser)), priority::CHASE);
    }

    #[test]
    fn test_dead_or_missing_target_is_ignored() {
        let mut world = TestWorld::new();
        let (chaser, player) = setup(&mut world);
        world.move_center(player, Vec2::new(1.0, 0.0));
        let mut task = ChaseTask::new(player, ChaseProfile::standard(priority::CHASE, 5.0, 8.0));

        if let Some(stats) = world.actors.get_mut(player).and_then(|a| a.stats.as_mut()) {
            stats.hit(1_000);
        }
        assert_eq!(task.priority(&mut world.ctx(chaser)), priority::INELIGIBLE);

        world.actors.remove(player).expect("remove");
        assert_eq!(task.priority(&mut world.ctx(chaser)), priority::INELIGIBLE);
    }

    #[test]
    fn test_anchored_chase_stays_in_region() {
        let mut world = TestWorld::new();
        let (chaser, player) = setup(&mut world);
        let post = world.spawn(Actor::new(ActorKind::Anchor));
        world.move_center(post, Vec2::ZERO);
        let anchor = Anchor::rect(post, Vec2::new(4.0, 4.0));
        let mut task = ChaseTask::new(player, ChaseProfile::anchored(6.0, 8.0, anchor));

        world.move_center(player, Vec2::new(3.0, 0.0));
        assert_eq!(task.priority(&mut world.ctx(chaser)), priority::INELIGIBLE);

        world.move_center(player, Vec2::new(1.5, 1.0));
        assert_eq!(task.priority(&mut world.ctx(chaser)), priority::CHASE);
        task.start(&mut world.ctx(chaser));
        task.update(&mut world.ctx(chaser));
        let goal = world
            .actors
            .get(chaser)
            .and_then(|a| a.movement)
            .and_then(|m| m.target())
            .expect("goal");
        assert_eq!(goal, Vec2::new(1.5, 1.0));
    }

    #[test]
    fn test_kite_keeps_distance() {
        let mut world = TestWorld::new();
        let (chaser, player) = setup(&mut world);
        world.move_center(player, Vec2::new(2.0, 0.0));
        let mut task = ChaseTask::new(player, ChaseProfile::ranged(priority::CHASE, 10.0, 12.0, 5.0));

        task.start(&mut world.ctx(chaser));
        task.update(&mut world.ctx(chaser));

        let goal = world
            .actors
            .get(chaser)
            .and_then(|a| a.movement)
            .and_then(|m| m.target())
            .expect("goal");
        assert!((goal - Vec2::new(-3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_zigzag_alternates_sides() {
        let mut world = TestWorld::new();
        let (chaser, player) = setup(&mut world);
        world.move_center(player, Vec2::new(4.0, 0.0));
        let mut task = ChaseTask::new(player, ChaseProfile::zigzag(priority::ZIGZAG_CHASE, 5.0, 8.0, 1.0));

        task.start(&mut world.ctx(chaser));
        task.update(&mut world.ctx(chaser));
        let first = world.actors.get(chaser).and_then(|a| a.movement).and_then(|m| m.target());
        world.clock.advance(600);
        task.update(&mut world.ctx(chaser));
        let second = world.actors.get(chaser).and_then(|a| a.movement).and_then(|m| m.target());

        assert_eq!(first, Some(Vec2::new(4.0, 1.0)));
        assert_eq!(second, Some(Vec2::new(4.0, -1.0)));
    }
}
