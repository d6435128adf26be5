//! Node records and the per-actor arena that stores them.
//!
//! Parent and child links are [`NodeId`]s into the arena rather than
//! references. The arena is a slot map: removing a node bumps its slot
//! version, so every handle to it (a parent's child list, a queued wakeup)
//! goes stale at once.

use serde_json::Value;
use slotmap::{Key, KeyData, SlotMap, new_key_type};

use crate::behavior::Behavior;
use crate::composite::Composite;
use crate::decorator::{Decorator, Delay};
use crate::host::WakeReason;
use crate::spec::BehaviorSpec;
use crate::{NodeId, Outcome};

/// What a built-in node asks the binding to do after a hook.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reaction {
    /// Nothing to do until the next child completion or wakeup.
    Wait,
    /// Start these children, in order, under the reacting node.
    Start(Vec<BehaviorSpec>),
    /// Terminal transition of the reacting node.
    Complete(Outcome, Value),
    /// Ask the host for a wakeup of the reacting node.
    Schedule(u64, WakeReason),
}

pub(crate) enum NodeKind<A> {
    Composite(Composite),
    Decorator(Decorator),
    Delay(Delay),
    Leaf(Box<dyn Behavior<A>>),
}

impl<A> NodeKind<A> {
    /// Children currently running under this node.
    pub(crate) fn active_children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Composite(composite) => composite.active().to_vec(),
            NodeKind::Decorator(decorator) => decorator.active().into_iter().collect(),
            NodeKind::Delay(_) | NodeKind::Leaf(_) => Vec::new(),
        }
    }

    pub(crate) fn adopt(&mut self, child: NodeId) {
        match self {
            NodeKind::Composite(composite) => composite.adopt(child),
            NodeKind::Decorator(decorator) => decorator.adopt(child),
            NodeKind::Delay(_) | NodeKind::Leaf(_) => {}
        }
    }

    /// Removes `child` from this node's bookkeeping. Returns false if it was
    /// not a tracked child.
    pub(crate) fn detach(&mut self, child: NodeId) -> bool {
        match self {
            NodeKind::Composite(composite) => composite.detach(child),
            NodeKind::Decorator(decorator) => decorator.detach(child),
            NodeKind::Delay(_) | NodeKind::Leaf(_) => false,
        }
    }
}

pub(crate) struct Node<A> {
    pub name: String,
    pub parent: Option<NodeId>,
    pub tick_rate: u64,
    /// Set once, when the node completes or starts being destroyed.
    pub doomed: bool,
    pub last_tick: u64,
    pub kind: NodeKind<A>,
}

new_key_type! {
    pub(crate) struct NodeKey;
}

impl From<NodeKey> for NodeId {
    fn from(key: NodeKey) -> Self {
        let raw = key.data().as_ffi();
        NodeId::new(raw as u32, (raw >> 32) as u32)
    }
}

impl From<NodeId> for NodeKey {
    fn from(id: NodeId) -> Self {
        let raw = (u64::from(id.generation) << 32) | u64::from(id.index);
        KeyData::from_ffi(raw).into()
    }
}

/// Generational storage for one actor's nodes.
pub(crate) struct Arena<A> {
    nodes: SlotMap<NodeKey, Node<A>>,
}

impl<A> Arena<A> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    pub(crate) fn insert(&mut self, node: Node<A>) -> NodeId {
        self.nodes.insert(node).into()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<A>> {
        self.nodes.get(id.into())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<A>> {
        self.nodes.get_mut(id.into())
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node<A>> {
        self.nodes.remove(id.into())
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Live node handles in slot order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().map(NodeId::from)
    }
}
