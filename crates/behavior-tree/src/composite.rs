//! Composite behavior nodes.
//!
//! Composite nodes own a list of child descriptions and aggregate the
//! completions of the children they start into their own completion. They
//! never tick; every transition is a reaction to a child finishing.
//!
//! | Kind | Start | Child success | Child failure |
//! |---|---|---|---|
//! | `Sequence` | first child | next child, or succeed when none remain | fail |
//! | `Selector` | first child | succeed | next child, or fail when none remain |
//! | `ParallelSequence` | all children | succeed when none remain active | fail |
//! | `ParallelSelector` | all children | succeed | fail when none remain active |
//!
//! Completing a composite destroys whatever children are still active.

use serde_json::Value;

use crate::error::{BehaviorError, Result};
use crate::host::{Host, random_below};
use crate::node::Reaction;
use crate::spec::BehaviorSpec;
use crate::{NodeId, Outcome};

/// Option key listing a composite's children.
pub const CHILDREN_KEY: &str = "behaviors";
/// Option key enabling a deterministic random child order.
pub const SHUFFLE_KEY: &str = "shuffle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    /// Runs children one at a time until one fails (AND).
    Sequence,
    /// Runs children one at a time until one succeeds (OR).
    Selector,
    /// Runs all children at once; fails as soon as one fails.
    ParallelSequence,
    /// Runs all children at once; succeeds as soon as one succeeds.
    ParallelSelector,
}

impl CompositeKind {
    pub const fn is_parallel(self) -> bool {
        matches!(self, Self::ParallelSequence | Self::ParallelSelector)
    }

    /// The child outcome that completes the composite immediately.
    ///
    /// The opposite outcome advances (or drains) the composite instead.
    const fn decisive(self) -> Outcome {
        match self {
            Self::Sequence | Self::ParallelSequence => Outcome::Failure,
            Self::Selector | Self::ParallelSelector => Outcome::Success,
        }
    }

    /// Outcome when every child has gone the non-decisive way, including the
    /// case of no children at all.
    const fn exhausted(self) -> Outcome {
        match self {
            Self::Sequence | Self::ParallelSequence => Outcome::Success,
            Self::Selector | Self::ParallelSelector => Outcome::Failure,
        }
    }
}

pub(crate) struct Composite {
    kind: CompositeKind,
    children: Vec<BehaviorSpec>,
    shuffle: bool,
    /// Iteration order over `children`; a permutation when shuffled.
    order: Vec<usize>,
    cursor: usize,
    /// Children not yet resolved.
    pending: usize,
    active: Vec<NodeId>,
}

impl Composite {
    pub(crate) fn from_spec(kind: CompositeKind, spec: &BehaviorSpec) -> Result<Self> {
        let children = spec.children(CHILDREN_KEY)?.unwrap_or_default();
        let shuffle = spec.bool_or(SHUFFLE_KEY, false)?;
        Ok(Self::new(kind, children, shuffle))
    }

    pub(crate) fn new(kind: CompositeKind, children: Vec<BehaviorSpec>, shuffle: bool) -> Self {
        let order = (0..children.len()).collect();
        let pending = children.len();
        Self {
            kind,
            children,
            shuffle,
            order,
            cursor: 0,
            pending,
            active: Vec::new(),
        }
    }

    pub(crate) fn children(&self) -> &[BehaviorSpec] {
        &self.children
    }

    pub(crate) fn active(&self) -> &[NodeId] {
        &self.active
    }

    pub(crate) fn adopt(&mut self, child: NodeId) {
        self.active.push(child);
    }

    pub(crate) fn detach(&mut self, child: NodeId) -> bool {
        match self.active.iter().position(|id| *id == child) {
            Some(position) => {
                self.active.remove(position);
                true
            }
            None => false,
        }
    }

    pub(crate) fn on_start(&mut self, host: &mut dyn Host) -> Reaction {
        if self.shuffle {
            self.shuffle_order(host);
        }

        if self.children.is_empty() {
            return Reaction::Complete(self.kind.exhausted(), Value::Null);
        }

        if self.kind.is_parallel() {
            self.cursor = self.order.len();
            let specs = self.order.iter().map(|&i| self.children[i].clone()).collect();
            Reaction::Start(specs)
        } else {
            Reaction::Start(vec![self.next_child()])
        }
    }

    /// Reacts to an active child reaching `outcome`.
    ///
    /// The child must already be detached from `active`.
    pub(crate) fn on_child_complete(&mut self, outcome: Outcome, data: Value) -> Reaction {
        if outcome == self.kind.decisive() {
            return Reaction::Complete(outcome, data);
        }

        self.pending = self.pending.saturating_sub(1);

        if self.kind.is_parallel() {
            if self.active.is_empty() {
                Reaction::Complete(self.kind.exhausted(), data)
            } else {
                Reaction::Wait
            }
        } else if self.pending == 0 {
            Reaction::Complete(self.kind.exhausted(), data)
        } else {
            Reaction::Start(vec![self.next_child()])
        }
    }

    fn next_child(&mut self) -> BehaviorSpec {
        let index = self.order[self.cursor];
        self.cursor += 1;
        self.children[index].clone()
    }

    /// Fisher-Yates over the shared random source, drawn once per start.
    fn shuffle_order(&mut self, host: &mut dyn Host) {
        for i in (1..self.order.len()).rev() {
            let j = random_below(host, i as u64 + 1) as usize;
            self.order.swap(i, j);
        }
    }
}

/// Child descriptions a composite would start, for registry validation.
pub(crate) fn child_specs(kind: CompositeKind, spec: &BehaviorSpec) -> Result<Vec<BehaviorSpec>> {
    Composite::from_spec(kind, spec).map(|composite| composite.children().to_vec())
}

pub(crate) fn missing_child(behavior: &str, key: &str) -> BehaviorError {
    BehaviorError::invalid_option(behavior, key, "present")
}
