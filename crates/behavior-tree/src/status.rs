//! Status returned by behavior nodes.

use serde_json::Value;

/// Terminal result of a behavior node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Outcome {
    /// The behavior completed successfully.
    Success,

    /// The behavior did not succeed.
    ///
    /// Failure is an ordinary result (a path is blocked, a target vanished),
    /// not an error. Parents react to it through their completion hooks.
    Failure,
}

impl Outcome {
    /// Returns `true` if this outcome is `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Returns `true` if this outcome is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Failure)
    }

    /// Inverts the outcome: Success becomes Failure and vice versa.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Outcome::Success => Outcome::Failure,
            Outcome::Failure => Outcome::Success,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// The result of one step of a leaf behavior.
///
/// # Virtual-time Semantics
///
/// A leaf runs across many ticks. Each tick it reports whether it is still
/// working or has reached its terminal outcome:
/// - `Running`: reschedule after the node's tick rate
/// - `Success(data)` / `Failure(data)`: complete exactly once, notify the parent
///
/// Returning a terminal status is the only way a leaf completes, so a leaf
/// cannot complete twice.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Running,
    Success(Value),
    Failure(Value),
}

impl Status {
    /// Success without payload.
    #[inline]
    pub fn success() -> Self {
        Status::Success(Value::Null)
    }

    /// Failure without payload.
    #[inline]
    pub fn failure() -> Self {
        Status::Failure(Value::Null)
    }

    pub fn from_outcome(outcome: Outcome, data: Value) -> Self {
        match outcome {
            Outcome::Success => Status::Success(data),
            Outcome::Failure => Status::Failure(data),
        }
    }

    /// Returns `true` while the behavior has not completed.
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, Status::Running)
    }

    /// Terminal outcome, or `None` while running.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Status::Running => None,
            Status::Success(_) => Some(Outcome::Success),
            Status::Failure(_) => Some(Outcome::Failure),
        }
    }

    /// Splits a terminal status into outcome and payload.
    pub fn into_completion(self) -> Option<(Outcome, Value)> {
        match self {
            Status::Running => None,
            Status::Success(data) => Some((Outcome::Success, data)),
            Status::Failure(data) => Some((Outcome::Failure, data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_swaps_outcomes() {
        assert_eq!(Outcome::Success.invert(), Outcome::Failure);
        assert_eq!(Outcome::Failure.invert(), Outcome::Success);
    }

    #[test]
    fn completion_splits_payload() {
        let status = Status::Failure(Value::from("blocked"));
        assert_eq!(status.outcome(), Some(Outcome::Failure));
        assert_eq!(
            status.into_completion(),
            Some((Outcome::Failure, Value::from("blocked")))
        );
        assert_eq!(Status::Running.into_completion(), None);
    }
}
