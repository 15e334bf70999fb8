//! Priority arbitration between an actor's behavior tasks.

use tracing::debug;

use crate::behavior::BehaviorTask;
use crate::context::TickContext;

/// Owns the tasks of one actor and keeps at most one of them active.
#[derive(Debug, Default)]
pub struct AiTaskScheduler {
    tasks: Vec<Box<dyn BehaviorTask>>,
    active: Option<usize>,
}

impl AiTaskScheduler {
    /// Creates a scheduler without tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task (builder form). Registration order breaks priority ties.
    #[must_use]
    pub fn with_task(mut self, task: impl BehaviorTask + 'static) -> Self {
        self.add_task(task);
        self
    }

    /// Adds a task.
    pub fn add_task(&mut self, task: impl BehaviorTask + 'static) {
        self.tasks.push(Box::new(task));
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if no task is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Index of the active task.
    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Name of the active task.
    #[must_use]
    pub fn active_name(&self) -> Option<&'static str> {
        self.active
            .and_then(|index| self.tasks.get(index))
            .map(|task| task.name())
    }

    /// Re-arbitrates and updates the winner. Called once per tick.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) {
        let mut best: Option<(usize, i32)> = None;
        for (index, task) in self.tasks.iter_mut().enumerate() {
            let priority = task.priority(ctx);
            if priority < 0 {
                continue;
            }
            if best.map_or(true, |(_, top)| priority > top) {
                best = Some((index, priority));
            }
        }

        let winner = best.map(|(index, _)| index);
        if winner != self.active {
            if let Some(old) = self.active.take() {
                debug!("{} stops {}", ctx.owner, self.tasks[old].name());
                self.tasks[old].stop(ctx);
            }
            if let Some(new) = winner {
                debug!("{} starts {}", ctx.owner, self.tasks[new].name());
                self.tasks[new].start(ctx);
                self.active = Some(new);
            }
        }

        if let Some(active) = self.active {
            self.tasks[active].update(ctx);
        }
    }

    /// Stops the active task. Used when the owner leaves the world.
    pub fn dispose(&mut self, ctx: &mut TickContext<'_>) {
        if let Some(old) = self.active.take() {
            self.tasks[old].stop(ctx);
        }
    }
}
