//! Tasks that freeze an actor: the world-wide enemy pause and the terminal
//! death pause.

use tracing::{info, trace};

use saga_common::{ActorId, Facing};

use crate::behavior::{priority, BehaviorTask};
use crate::context::TickContext;
use crate::events::GameEvent;

/// Holds the actor still while the world's `enemies_paused` flag is set.
#[derive(Debug, Clone, Default)]
pub struct PauseTask;

impl PauseTask {
    /// Creates a pause task.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl BehaviorTask for PauseTask {
    fn name(&self) -> &'static str {
        "pause"
    }

    fn priority(&mut self, ctx: &mut TickContext<'_>) -> i32 {
        if ctx.flags.enemies_paused {
            priority::PAUSE
        } else {
            priority::INELIGIBLE
        }
    }

    fn start(&mut self, ctx: &mut TickContext<'_>) {
        ctx.halt_owner();
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        ctx.halt_owner();
    }

    fn stop(&mut self, ctx: &mut TickContext<'_>) {
        ctx.resume_owner();
    }
}

/// Plays out an actor's death and schedules its removal.
///
/// Once health reaches zero this task wins every arbitration for the rest of
/// the actor's life.
#[derive(Debug, Clone)]
pub struct DeathPauseTask {
    target: Option<ActorId>,
    animation_ms: u64,
    dying: bool,
}

impl DeathPauseTask {
    /// Creates a death task whose animation lasts `animation_ms`.
    #[must_use]
    pub const fn new(animation_ms: u64) -> Self {
        Self {
            target: None,
            animation_ms,
            dying: false,
        }
    }

    /// Faces the death animation toward `target`.
    #[must_use]
    pub const fn facing_target(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }

    /// True once the death began.
    #[must_use]
    pub const fn is_dying(&self) -> bool {
        self.dying
    }

    fn facing(&self, ctx: &TickContext<'_>) -> Facing {
        let Some(owner) = ctx.owner() else {
            return Facing::Down;
        };
        if let Some(target) = self.target.and_then(|id| ctx.center_of(id)) {
            return Facing::from_direction(target - owner.center());
        }
        owner
            .movement
            .and_then(|movement| movement.facing())
            .unwrap_or(Facing::Down)
    }
}

impl BehaviorTask for DeathPauseTask {
    fn name(&self) -> &'static str {
        "death_pause"
    }

    fn priority(&mut self, ctx: &mut TickContext<'_>) -> i32 {
        if self.dying {
            return priority::DEATH;
        }
        match ctx.owner().and_then(|owner| owner.stats) {
            Some(stats) if stats.is_dead() => priority::DEATH,
            _ => priority::INELIGIBLE,
        }
    }

    fn start(&mut self, ctx: &mut TickContext<'_>) {
        if self.dying {
            return;
        }
        self.dying = true;
        let owner = ctx.owner;
        let now = ctx.now_ms();
        let facing = self.facing(ctx);

        ctx.halt_owner();
        if let Some(actor) = ctx.owner_mut() {
            actor.deal_damage = false;
            if let Some(touch) = actor.touch.as_mut() {
                touch.dispose();
            }
        }
        info!("{} died", owner);
        ctx.publish(GameEvent::DeathStarted {
            actor: owner,
            facing,
        });
        ctx.actors.schedule_removal(owner, now + self.animation_ms);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        ctx.halt_owner();
    }

    fn stop(&mut self, ctx: &mut TickContext<'_>) {
        trace!("death pause of {} stopped", ctx.owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorKind};
    use crate::combat_stats::CombatStats;
    use crate::movement::Movement;
    use crate::physics::{PhysicsLayer, PhysicsWorld};
    use crate::test_support::TestWorld;
    use crate::touch::TouchAttack;
    use glam::Vec2;

    #[test]
    fn test_pause_follows_flag() {
        let mut world = TestWorld::new();
        let npc = world.spawn(Actor::new(ActorKind::Melee).with_movement(Movement::uniform(1.0)));
        let mut task = PauseTask::new();

        assert_eq!(task.priority(&mut world.ctx(npc)), priority::INELIGIBLE);
        world.flags.enemies_paused = true;
        assert_eq!(task.priority(&mut world.ctx(npc)), 25);

        world.physics.set_linear_velocity(npc, Vec2::new(3.0, 0.0));
        task.start(&mut world.ctx(npc));
        assert_eq!(world.physics.linear_velocity(npc), Vec2::ZERO);

        task.stop(&mut world.ctx(npc));
        assert!(world.actors.get(npc).and_then(|a| a.movement).expect("movement").is_moving());
    }

    #[test]
    fn test_death_is_terminal_and_schedules_removal() {
        let mut world = TestWorld::new();
        let npc = world.spawn(
            Actor::new(ActorKind::Melee)
                .with_stats(CombatStats::new(10, 5))
                .with_movement(Movement::uniform(1.0))
                .with_touch(TouchAttack::new(PhysicsLayer::PLAYER, 1.0)),
        );
        let player = world.spawn(Actor::new(ActorKind::Player));
        world.move_center(npc, Vec2::ZERO);
        world.move_center(player, Vec2::new(-3.0, 0.0));
        let mut task = DeathPauseTask::new(1_500).facing_target(player);

        assert_eq!(task.priority(&mut world.ctx(npc)), priority::INELIGIBLE);
        if let Some(stats) = world.actors.get_mut(npc).and_then(|a| a.stats.as_mut()) {
            stats.hit(10);
        }
        assert_eq!(task.priority(&mut world.ctx(npc)), priority::DEATH);
        task.start(&mut world.ctx(npc));

        let actor = world.actors.get(npc).expect("actor");
        assert!(!actor.deal_damage);
        assert!(actor.touch.as_ref().is_some_and(TouchAttack::is_disposed));
        assert_eq!(world.actors.removal_time(npc), Some(2_500));
        assert!(world.events.drain().contains(&GameEvent::DeathStarted {
            actor: npc,
            facing: Facing::Left,
        }));

        if let Some(stats) = world.actors.get_mut(npc).and_then(|a| a.stats.as_mut()) {
            stats.add_health(10);
        }
        assert_eq!(task.priority(&mut world.ctx(npc)), priority::DEATH);
    }

    #[test]
    fn test_death_cleanup_tolerates_missing_owner() {
        let mut world = TestWorld::new();
        let npc = world.spawn(Actor::new(ActorKind::Melee).with_stats(CombatStats::new(0, 0)));
        let mut task = DeathPauseTask::new(100);
        task.start(&mut world.ctx(npc));
        world.actors.remove(npc).expect("remove");

        task.update(&mut world.ctx(npc));
        task.stop(&mut world.ctx(npc));
        task.stop(&mut world.ctx(npc));
        assert!(task.is_dying());
    }
}
