//! Error types for behavior tree construction and lifecycle.
//!
//! Two families share one enum:
//! - **Configuration** errors (`DuplicateBehavior`, `InvalidOption`,
//!   `InvalidSpec`) come from tree descriptions and registry setup. They are
//!   returned before any node of the offending tree runs.
//! - **Invariant violations** (`UnknownBehavior`, `DoubleCompletion`,
//!   `OrphanChild`) mean the registry and its callers disagree, or a concrete
//!   behavior or the scheduler itself has a bug. When a binding hits one it
//!   goes through [`InvariantPolicy`](crate::config::InvariantPolicy).
//!
//! Behavior *failure* is never an error; see [`Outcome`](crate::Outcome).

use thiserror::Error;

use crate::NodeId;

pub type Result<T> = std::result::Result<T, BehaviorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BehaviorError {
    #[error("unknown behavior `{name}`")]
    UnknownBehavior { name: String },

    #[error("behavior `{name}` is already registered")]
    DuplicateBehavior { name: String },

    #[error("behavior `{behavior}`: option `{key}` must be {expected}")]
    InvalidOption {
        behavior: String,
        key: String,
        expected: &'static str,
    },

    #[error("invalid behavior description: {0}")]
    InvalidSpec(String),

    #[error("node {node} completed after it was already doomed")]
    DoubleCompletion { node: NodeId },

    #[error("node {child} reported completion to destroyed parent {parent}")]
    OrphanChild { child: NodeId, parent: NodeId },
}

impl BehaviorError {
    /// Returns true if this error is fatal: a name the registry never saw,
    /// or broken tree bookkeeping, as opposed to a malformed description.
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownBehavior { .. }
                | Self::DoubleCompletion { .. }
                | Self::OrphanChild { .. }
        )
    }

    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownBehavior { .. } => "unknown_behavior",
            Self::DuplicateBehavior { .. } => "duplicate_behavior",
            Self::InvalidOption { .. } => "invalid_option",
            Self::InvalidSpec(_) => "invalid_spec",
            Self::DoubleCompletion { .. } => "double_completion",
            Self::OrphanChild { .. } => "orphan_child",
        }
    }

    pub(crate) fn invalid_option(
        behavior: &str,
        key: &str,
        expected: &'static str,
    ) -> Self {
        Self::InvalidOption {
            behavior: behavior.to_owned(),
            key: key.to_owned(),
            expected,
        }
    }
}
