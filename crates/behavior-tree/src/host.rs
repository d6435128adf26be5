//! Interface between the behavior tree and its host simulation.
//!
//! The tree never owns a clock, a random source or a callback queue. The host
//! provides all three through [`Host`], and delivers each scheduled
//! [`Wakeup`] back to the [`ActorBinding`](crate::ActorBinding) that asked
//! for it.
//!
//! # Host requirements
//!
//! - Wakeups due at the same virtual instant fire in the order they were
//!   scheduled (FIFO per instant).
//! - [`Host::random`] draws from the session's shared deterministic source,
//!   never from a replica-local generator.
//! - When an actor is torn down, its binding's `destroy` runs before the
//!   actor is reclaimed.

use std::fmt;

use serde_json::Value;

use crate::Outcome;

/// Handle to a node in an actor's arena.
///
/// The generation distinguishes successive occupants of the same slot, so a
/// handle held past its node's destruction can never reach a newer node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct NodeId {
    pub index: u32,
    pub generation: u32,
}

impl NodeId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Why a node asked to be woken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum WakeReason {
    /// Regular tick of a self-ticking leaf.
    Tick,
    /// One-shot timer of a `Delay` node.
    Timer,
    /// A `Loop` restarting its child.
    Restart,
}

/// A callback the host must deliver back after the requested delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Wakeup {
    pub node: NodeId,
    pub reason: WakeReason,
}

impl Wakeup {
    pub const fn new(node: NodeId, reason: WakeReason) -> Self {
        Self { node, reason }
    }
}

/// A node reached its terminal outcome.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompletionRecord {
    pub node: NodeId,
    pub name: String,
    pub outcome: Outcome,
    pub data: Value,
    /// Virtual time of the completion.
    pub at: u64,
    /// `true` for the root of the actor's tree.
    pub root: bool,
}

/// Services the host simulation provides to a behavior tree.
pub trait Host {
    /// Current virtual time in milliseconds.
    fn now(&self) -> u64;

    /// Deliver `wakeup` after `delay` virtual milliseconds.
    ///
    /// Wakeups with the same due time must fire in scheduling order.
    fn schedule(&mut self, delay: u64, wakeup: Wakeup);

    /// Next draw in `[0, 1)` from the shared deterministic source.
    fn random(&mut self) -> f64;

    /// Observer for every node completion, in completion order.
    fn completed(&mut self, _record: &CompletionRecord) {}
}

/// Uniform integer draw in `[0, bound)` from the host's shared source.
///
/// Returns 0 when `bound` is 0.
pub(crate) fn random_below(host: &mut dyn Host, bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    let draw = host.random().clamp(0.0, 1.0);
    ((draw * bound as f64) as u64).min(bound - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedHost(f64);

    impl Host for FixedHost {
        fn now(&self) -> u64 {
            0
        }
        fn schedule(&mut self, _delay: u64, _wakeup: Wakeup) {}
        fn random(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn random_below_stays_in_range() {
        assert_eq!(random_below(&mut FixedHost(0.0), 10), 0);
        assert_eq!(random_below(&mut FixedHost(0.999_999), 10), 9);
        assert_eq!(random_below(&mut FixedHost(0.5), 10), 5);
        assert_eq!(random_below(&mut FixedHost(0.7), 0), 0);
    }
}
