//! Errors of explicit arena operations.

use thiserror::Error;

use crate::ids::ActorId;

/// Errors raised by explicit arena operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// Handle does not resolve to a live actor
    #[error("Actor {0} is not alive")]
    StaleHandle(ActorId),

    /// Arena is at its slot limit
    #[error("Arena full ({capacity} slots)")]
    Full {
        /// Maximum number of slots
        capacity: usize,
    },
}

