//! Error types surfaced by the session host.

use behavior_tree::BehaviorError;
use thiserror::Error;

use crate::entity::ActorId;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("actor {actor}: {source}")]
    Behavior {
        actor: ActorId,
        #[source]
        source: BehaviorError,
    },

    #[error(transparent)]
    Registry(#[from] BehaviorError),

    #[error("more than {limit} events at t={at}; a zero-time loop is not yielding")]
    Livelock { at: u64, limit: usize },
}

impl RuntimeError {
    pub(crate) fn behavior(actor: ActorId, source: BehaviorError) -> Self {
        Self::Behavior { actor, source }
    }

    /// Returns true if continuing could leave this replica diverged from the
    /// rest of the session.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Behavior { source, .. } | Self::Registry(source) => {
                source.is_invariant_violation()
            }
            Self::Livelock { .. } => true,
            Self::UnknownActor(_) => false,
        }
    }
}
