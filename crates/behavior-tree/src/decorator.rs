//! Decorator behavior nodes.
//!
//! Decorators wrap a single child description and transform or gate its
//! completion. Like composites they never tick. [`Delay`] lives here too: it
//! is classed with the decorators but behaves as a timed leaf.

use serde_json::Value;

use crate::composite::missing_child;
use crate::error::Result;
use crate::host::WakeReason;
use crate::node::Reaction;
use crate::spec::BehaviorSpec;
use crate::{NodeId, Outcome};

/// Option key holding a decorator's child.
pub const CHILD_KEY: &str = "behavior";
/// Option key for the number of `Loop` iterations (0 = unbounded).
pub const COUNT_KEY: &str = "count";
/// Option key for the `Delay` duration in virtual milliseconds.
pub const DELAY_KEY: &str = "delay";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorKind {
    /// Child success fails, child failure succeeds (NOT).
    Invert,
    /// Always succeeds once the child completes.
    Succeed,
    /// Always fails once the child completes.
    Fail,
    /// Restarts the child after each success; fails on the first failure.
    Loop,
}

pub(crate) struct Decorator {
    kind: DecoratorKind,
    child: BehaviorSpec,
    /// Loop bound; 0 = unbounded.
    count: u64,
    successes: u64,
    active: Option<NodeId>,
}

impl Decorator {
    pub(crate) fn from_spec(kind: DecoratorKind, spec: &BehaviorSpec) -> Result<Self> {
        let child = spec
            .child(CHILD_KEY)?
            .ok_or_else(|| missing_child(&spec.name, CHILD_KEY))?;
        let count = match kind {
            DecoratorKind::Loop => spec.u64_or(COUNT_KEY, 0)?,
            _ => 0,
        };
        Ok(Self::new(kind, child, count))
    }

    pub(crate) fn new(kind: DecoratorKind, child: BehaviorSpec, count: u64) -> Self {
        Self {
            kind,
            child,
            count,
            successes: 0,
            active: None,
        }
    }

    pub(crate) fn child(&self) -> &BehaviorSpec {
        &self.child
    }

    pub(crate) fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub(crate) fn adopt(&mut self, child: NodeId) {
        self.active = Some(child);
    }

    pub(crate) fn detach(&mut self, child: NodeId) -> bool {
        if self.active == Some(child) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn on_start(&mut self) -> Reaction {
        Reaction::Start(vec![self.child.clone()])
    }

    pub(crate) fn on_child_complete(&mut self, outcome: Outcome, data: Value) -> Reaction {
        match self.kind {
            DecoratorKind::Invert => Reaction::Complete(outcome.invert(), data),
            DecoratorKind::Succeed => Reaction::Complete(Outcome::Success, data),
            DecoratorKind::Fail => Reaction::Complete(Outcome::Failure, data),
            DecoratorKind::Loop => {
                if outcome.is_failure() {
                    return Reaction::Complete(Outcome::Failure, data);
                }
                self.successes += 1;
                if self.count != 0 && self.successes >= self.count {
                    Reaction::Complete(Outcome::Success, data)
                } else {
                    // Each iteration is its own host event, so a child that
                    // completes instantly cannot spin inside one callback.
                    Reaction::Schedule(0, WakeReason::Restart)
                }
            }
        }
    }

    pub(crate) fn on_wake(&mut self, reason: WakeReason) -> Reaction {
        match (self.kind, reason) {
            (DecoratorKind::Loop, WakeReason::Restart) if self.active.is_none() => {
                Reaction::Start(vec![self.child.clone()])
            }
            _ => Reaction::Wait,
        }
    }
}

/// Succeeds once, `delay` virtual milliseconds after it starts.
pub(crate) struct Delay {
    delay: u64,
}

impl Delay {
    pub(crate) fn from_spec(spec: &BehaviorSpec) -> Result<Self> {
        Ok(Self::new(spec.u64_or(DELAY_KEY, 0)?))
    }

    pub(crate) fn new(delay: u64) -> Self {
        Self { delay }
    }

    pub(crate) fn on_start(&mut self) -> Reaction {
        Reaction::Schedule(self.delay, WakeReason::Timer)
    }

    pub(crate) fn on_wake(&mut self, reason: WakeReason) -> Reaction {
        match reason {
            WakeReason::Timer => Reaction::Complete(Outcome::Success, Value::Null),
            _ => Reaction::Wait,
        }
    }
}
