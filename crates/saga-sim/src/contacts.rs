//! Overlap tracking that turns actor boxes into collision callbacks.

use std::collections::BTreeMap;

use saga_common::ActorId;
use saga_gameplay::{ActorArena, Fixture};

/// One begin or end transition between two fixtures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactChange {
    /// Lower actor of the pair
    pub a: Fixture,
    /// Higher actor of the pair
    pub b: Fixture,
    /// True when the overlap began this step
    pub began: bool,
}

/// Remembers which pairs overlapped on the previous step.
///
/// Only pairs where at least one side carries a touch resolver are tracked.
#[derive(Debug, Default)]
pub struct ContactTracker {
    touching: BTreeMap<(ActorId, ActorId), (Fixture, Fixture)>,
}

impl ContactTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pairs currently overlapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.touching.len()
    }

    /// True if nothing overlaps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.touching.is_empty()
    }

    /// Compares current overlaps with the previous step. Ends come first,
    /// both in pair order.
    pub fn detect(&mut self, actors: &ActorArena) -> Vec<ContactChange> {
        let boxes: Vec<_> = actors
            .iter()
            .map(|(id, actor)| (id, actor.fixture(id), actor.bounds(), actor.touch.is_some()))
            .collect();

        let mut current = BTreeMap::new();
        for (i, (id_a, fixture_a, bounds_a, touch_a)) in boxes.iter().enumerate() {
            for (id_b, fixture_b, bounds_b, touch_b) in &boxes[i + 1..] {
                if (*touch_a || *touch_b) && bounds_a.overlaps(bounds_b) {
                    current.insert((*id_a, *id_b), (*fixture_a, *fixture_b));
                }
            }
        }

        let mut changes: Vec<ContactChange> = self
            .touching
            .iter()
            .filter(|(pair, _)| !current.contains_key(*pair))
            .map(|(_, (a, b))| ContactChange {
                a: *a,
                b: *b,
                began: false,
            })
            .collect();
        changes.extend(
            current
                .iter()
                .filter(|(pair, _)| !self.touching.contains_key(*pair))
                .map(|(_, (a, b))| ContactChange {
                    a: *a,
                    b: *b,
                    began: true,
                }),
        );

        self.touching = current;
        changes
    }
}
