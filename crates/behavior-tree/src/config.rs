/// How an [`ActorBinding`](crate::ActorBinding) reacts to a broken invariant.
///
/// A replica that keeps running after its tree bookkeeping diverged may
/// drift from every other participant, so the strict policy aborts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantPolicy {
    /// Panic at the violation site.
    Panic,
    /// Log at `error` level, destroy the offending subtree and return the error.
    LogAndPrune,
}

impl InvariantPolicy {
    /// `Panic` in debug builds, `LogAndPrune` in release builds.
    pub const fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::LogAndPrune
        }
    }
}

impl Default for InvariantPolicy {
    fn default() -> Self {
        Self::for_build()
    }
}

/// Tunables for a behavior tree binding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TreeConfig {
    #[serde(default)]
    pub invariant_policy: InvariantPolicy,
}

impl TreeConfig {
    pub const fn new(invariant_policy: InvariantPolicy) -> Self {
        Self { invariant_policy }
    }
}
