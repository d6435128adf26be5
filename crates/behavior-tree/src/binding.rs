//! Per-actor owner of a behavior tree.
//!
//! [`ActorBinding`] holds every node of one actor's current tree in an arena,
//! points at the single root, and drives the node lifecycle:
//!
//! - **start**: build the node, run its start hook, schedule its first tick
//!   after a jitter drawn from the shared random source
//! - **wake**: deliver a host callback; no-op for doomed or freed nodes
//! - **finish**: mark doomed, destroy active children, queue the completion
//! - **drain**: hand queued completions to parents in FIFO order
//!
//! Completions are queued instead of delivered recursively, so a sequence of
//! instantly succeeding children runs in constant stack depth and sibling
//! completions are processed in the order they happened.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, trace, warn};

use crate::behavior::{Behavior, Context};
use crate::config::{InvariantPolicy, TreeConfig};
use crate::error::{BehaviorError, Result};
use crate::host::{CompletionRecord, Host, WakeReason, Wakeup, random_below};
use crate::node::{Arena, Node, NodeKind, Reaction};
use crate::registry::BehaviorRegistry;
use crate::spec::{BehaviorSpec, TICK_RATE_KEY};
use crate::{NodeId, Outcome};

struct Completed {
    node: NodeId,
    outcome: Outcome,
    data: Value,
}

/// The behavior capability attached to one actor.
pub struct ActorBinding<A> {
    registry: Arc<BehaviorRegistry<A>>,
    config: TreeConfig,
    arena: Arena<A>,
    root: Option<NodeId>,
    last_outcome: Option<Outcome>,
    completions: VecDeque<Completed>,
}

impl<A: 'static> ActorBinding<A> {
    pub fn new(registry: Arc<BehaviorRegistry<A>>, config: TreeConfig) -> Self {
        Self {
            registry,
            config,
            arena: Arena::new(),
            root: None,
            last_outcome: None,
            completions: VecDeque::new(),
        }
    }

    pub fn registry(&self) -> &Arc<BehaviorRegistry<A>> {
        &self.registry
    }

    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Root of the running tree, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_running(&self) -> bool {
        self.root.is_some()
    }

    /// Outcome of the most recent root that ran to completion.
    ///
    /// Cleared when a new root starts; stays `None` for roots that were
    /// destroyed instead of completing.
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Returns true if `node` exists and is not doomed.
    pub fn is_live(&self, node: NodeId) -> bool {
        self.arena.get(node).is_some_and(|node| !node.doomed)
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.arena.get(node).map(|node| node.name.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node).and_then(|node| node.parent)
    }

    /// Live nodes with their behavior names, in arena slot order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.arena
            .ids()
            .filter_map(|id| self.arena.get(id).map(|node| (id, node.name.as_str())))
    }

    /// Replaces the actor's tree with one built from `spec`.
    ///
    /// The whole description is validated first; an invalid description
    /// leaves the running tree untouched. A name missing from the registry
    /// is an invariant violation and goes through the [`InvariantPolicy`].
    pub fn start_behavior(
        &mut self,
        spec: &BehaviorSpec,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<NodeId> {
        if let Err(err) = self.registry.validate(spec) {
            return Err(if err.is_invariant_violation() {
                self.violation(err)
            } else {
                err
            });
        }
        let kind = self.registry.instantiate(spec)?;
        let tick_rate = spec.u64(TICK_RATE_KEY)?;

        debug!("Starting behavior {} at t={}", spec.name, host.now());
        self.start_root(spec.name.clone(), kind, tick_rate, actor, host)
    }

    /// Replaces the actor's tree with an already-constructed leaf.
    ///
    /// For behaviors defined in application code that are not in the registry.
    pub fn start_node<B>(
        &mut self,
        name: impl Into<String>,
        behavior: B,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<NodeId>
    where
        B: Behavior<A> + 'static,
    {
        let name = name.into();
        debug!("Starting node {} at t={}", name, host.now());
        self.start_root(name, NodeKind::Leaf(Box::new(behavior)), None, actor, host)
    }

    /// Delivers a callback previously requested through [`Host::schedule`].
    pub fn fire(&mut self, wakeup: Wakeup, actor: &mut A, host: &mut dyn Host) -> Result<()> {
        let result = self.wake(wakeup, actor, host);
        self.settle(result, actor, host)
    }

    /// Completes `node` successfully from outside its own hooks.
    pub fn succeed(
        &mut self,
        node: NodeId,
        data: Value,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<()> {
        self.complete(node, Outcome::Success, data, actor, host)
    }

    /// Fails `node` from outside its own hooks.
    pub fn fail(
        &mut self,
        node: NodeId,
        data: Value,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<()> {
        self.complete(node, Outcome::Failure, data, actor, host)
    }

    /// Terminal transition of a live node.
    ///
    /// Completing a node that is doomed or gone is a
    /// [`BehaviorError::DoubleCompletion`].
    pub fn complete(
        &mut self,
        node: NodeId,
        outcome: Outcome,
        data: Value,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<()> {
        if !self.is_live(node) {
            return Err(self.violation(BehaviorError::DoubleCompletion { node }));
        }
        let result = self.finish(node, outcome, data, actor, host);
        self.settle(result, actor, host)
    }

    /// Destroys `node` and its active descendants, deepest first.
    ///
    /// Destroying the root, or a node whose parent is already going away,
    /// only tears the subtree down. Destroying an inner node under a live
    /// parent fails it instead, so the parent reacts as it would to any
    /// failed child and never waits on a slot that will not report.
    ///
    /// Returns `Ok(false)` if the node was already gone; calling it again is
    /// a no-op.
    pub fn destroy_node(
        &mut self,
        node: NodeId,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<bool> {
        let Some(entry) = self.arena.get(node) else {
            return Ok(false);
        };
        let notify = !entry.doomed && entry.parent.is_some_and(|parent| self.is_live(parent));
        if !notify {
            return Ok(self.teardown(node, actor));
        }

        debug!("Destroying inner node {} {}; failing it to its parent", entry.name, node);
        let result = self.finish(node, Outcome::Failure, Value::Null, actor, host);
        self.settle(result, actor, host).map(|()| true)
    }

    /// Removes `node` and its active descendants without telling any parent.
    fn teardown(&mut self, node: NodeId, actor: &mut A) -> bool {
        let Some(entry) = self.arena.get_mut(node) else {
            return false;
        };
        entry.doomed = true;
        let parent = entry.parent;

        for child in entry.kind.active_children() {
            self.teardown(child, actor);
        }

        if let Some(parent) = parent.and_then(|parent| self.arena.get_mut(parent)) {
            parent.kind.detach(node);
        }
        if self.root == Some(node) {
            self.root = None;
        }

        if let Some(removed) = self.arena.remove(node) {
            trace!("Destroyed {} {}", removed.name, node);
            release(removed, actor);
        }
        true
    }

    /// Tears down the whole tree. Called when the actor is destroyed or its
    /// tree is replaced.
    pub fn destroy(&mut self, actor: &mut A) {
        if let Some(root) = self.root.take() {
            debug!("Destroying tree rooted at {}", root);
            self.teardown(root, actor);
        }
        self.completions.clear();

        let leaked: Vec<NodeId> = self.arena.ids().collect();
        if !leaked.is_empty() {
            warn!("Sweeping {} nodes detached from the root", leaked.len());
            for node in leaked {
                self.teardown(node, actor);
            }
        }
    }

    fn start_root(
        &mut self,
        name: String,
        kind: NodeKind<A>,
        tick_rate: Option<u64>,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<NodeId> {
        self.destroy(actor);
        self.last_outcome = None;

        let root = match self.spawn(name, kind, tick_rate, None, actor, host) {
            Ok(root) => root,
            Err(err) => {
                self.abort(&err, actor);
                return Err(err);
            }
        };
        self.root = Some(root);
        self.settle(Ok(()), actor, host)?;
        Ok(root)
    }

    fn spawn_spec(
        &mut self,
        spec: &BehaviorSpec,
        parent: NodeId,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<NodeId> {
        let kind = self.registry.instantiate(spec)?;
        let tick_rate = spec.u64(TICK_RATE_KEY)?;
        self.spawn(spec.name.clone(), kind, tick_rate, Some(parent), actor, host)
    }

    fn spawn(
        &mut self,
        name: String,
        kind: NodeKind<A>,
        tick_rate: Option<u64>,
        parent: Option<NodeId>,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<NodeId> {
        let tick_rate = match &kind {
            NodeKind::Leaf(leaf) => tick_rate.unwrap_or_else(|| leaf.tick_rate()),
            _ => 0,
        };
        let id = self.arena.insert(Node {
            name,
            parent,
            tick_rate,
            doomed: false,
            last_tick: host.now(),
            kind,
        });
        trace!("Spawned {} under {:?}", id, parent);

        self.begin(id, actor, host)?;
        Ok(id)
    }

    /// Start hook and first scheduling of a freshly inserted node.
    fn begin(&mut self, id: NodeId, actor: &mut A, host: &mut dyn Host) -> Result<()> {
        let Some(node) = self.arena.get_mut(id) else {
            return Ok(());
        };
        let reaction = match &mut node.kind {
            NodeKind::Leaf(leaf) => {
                let status = leaf.on_start(&mut Context::new(actor, host, id));
                match status.into_completion() {
                    Some((outcome, data)) => Reaction::Complete(outcome, data),
                    None if node.tick_rate > 0 => {
                        // Jitter staggers siblings that start on the same instant.
                        let offset = random_below(host, node.tick_rate);
                        Reaction::Schedule(offset, WakeReason::Tick)
                    }
                    None => Reaction::Wait,
                }
            }
            NodeKind::Composite(composite) => composite.on_start(host),
            NodeKind::Decorator(decorator) => decorator.on_start(),
            NodeKind::Delay(delay) => delay.on_start(),
        };
        self.apply(id, reaction, actor, host)
    }

    fn wake(&mut self, wakeup: Wakeup, actor: &mut A, host: &mut dyn Host) -> Result<()> {
        let id = wakeup.node;
        let Some(node) = self.arena.get_mut(id) else {
            trace!("Dropping stale wakeup for {}", id);
            return Ok(());
        };
        if node.doomed {
            return Ok(());
        }

        let reaction = match (&mut node.kind, wakeup.reason) {
            (NodeKind::Leaf(leaf), WakeReason::Tick) => {
                let now = host.now();
                let delta = now.saturating_sub(node.last_tick);
                node.last_tick = now;

                let status = leaf.tick(&mut Context::new(actor, host, id), delta);
                match status.into_completion() {
                    Some((outcome, data)) => Reaction::Complete(outcome, data),
                    None if node.tick_rate > 0 => {
                        Reaction::Schedule(node.tick_rate, WakeReason::Tick)
                    }
                    None => Reaction::Wait,
                }
            }
            (NodeKind::Delay(delay), reason) => delay.on_wake(reason),
            (NodeKind::Decorator(decorator), reason) => decorator.on_wake(reason),
            (_, reason) => {
                warn!("Ignoring {:?} wakeup for {} ({})", reason, id, node.name);
                Reaction::Wait
            }
        };
        self.apply(id, reaction, actor, host)
    }

    fn apply(
        &mut self,
        id: NodeId,
        reaction: Reaction,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<()> {
        match reaction {
            Reaction::Wait => Ok(()),
            Reaction::Start(specs) => {
                for spec in &specs {
                    let child = self.spawn_spec(spec, id, actor, host)?;
                    if let Some(node) = self.arena.get_mut(id) {
                        node.kind.adopt(child);
                    }
                }
                Ok(())
            }
            Reaction::Complete(outcome, data) => self.finish(id, outcome, data, actor, host),
            Reaction::Schedule(delay, reason) => {
                host.schedule(delay, Wakeup::new(id, reason));
                Ok(())
            }
        }
    }

    /// Marks `id` doomed, destroys its active children and queues its
    /// completion for the parent.
    fn finish(
        &mut self,
        id: NodeId,
        outcome: Outcome,
        data: Value,
        actor: &mut A,
        host: &mut dyn Host,
    ) -> Result<()> {
        let Some(node) = self.arena.get_mut(id).filter(|node| !node.doomed) else {
            return Err(self.violation(BehaviorError::DoubleCompletion { node: id }));
        };
        node.doomed = true;

        let record = CompletionRecord {
            node: id,
            name: node.name.clone(),
            outcome,
            data: data.clone(),
            at: host.now(),
            root: node.parent.is_none(),
        };
        for child in node.kind.active_children() {
            self.teardown(child, actor);
        }

        trace!("{} {} finished: {}", record.name, id, outcome.as_str());
        host.completed(&record);
        self.completions.push_back(Completed {
            node: id,
            outcome,
            data,
        });
        Ok(())
    }

    /// Hands queued completions to their parents until none remain.
    fn drain(&mut self, actor: &mut A, host: &mut dyn Host) -> Result<()> {
        while let Some(done) = self.completions.pop_front() {
            // Gone already: an ancestor finished first and tore it down.
            let Some(node) = self.arena.remove(done.node) else {
                continue;
            };
            let parent = node.parent;
            let name = node.name.clone();
            release(node, actor);

            let Some(parent) = parent else {
                if self.root == Some(done.node) {
                    self.root = None;
                    self.last_outcome = Some(done.outcome);
                }
                debug!(
                    "Root {} finished at t={}: {}",
                    name,
                    host.now(),
                    done.outcome.as_str()
                );
                continue;
            };

            let Some(reaction) = self.notify_parent(parent, done.node, done.outcome, done.data)
            else {
                return Err(self.violation(BehaviorError::OrphanChild {
                    child: done.node,
                    parent,
                }));
            };
            self.apply(parent, reaction, actor, host)?;
        }
        Ok(())
    }

    fn notify_parent(
        &mut self,
        parent: NodeId,
        child: NodeId,
        outcome: Outcome,
        data: Value,
    ) -> Option<Reaction> {
        let node = self.arena.get_mut(parent)?;
        if node.doomed || !node.kind.detach(child) {
            return None;
        }
        match &mut node.kind {
            NodeKind::Composite(composite) => Some(composite.on_child_complete(outcome, data)),
            NodeKind::Decorator(decorator) => Some(decorator.on_child_complete(outcome, data)),
            NodeKind::Delay(_) | NodeKind::Leaf(_) => None,
        }
    }

    fn settle(&mut self, result: Result<()>, actor: &mut A, host: &mut dyn Host) -> Result<()> {
        let result = result.and_then(|()| self.drain(actor, host));
        if let Err(err) = &result {
            self.abort(err, actor);
        }
        result
    }

    fn abort(&mut self, err: &BehaviorError, actor: &mut A) {
        error!("Tearing down behavior tree after {}: {}", err.error_code(), err);
        self.destroy(actor);
    }

    fn violation(&self, err: BehaviorError) -> BehaviorError {
        match self.config.invariant_policy {
            InvariantPolicy::Panic => panic!("behavior tree invariant violated: {err}"),
            InvariantPolicy::LogAndPrune => {
                error!("Behavior tree invariant violated: {}", err);
                err
            }
        }
    }
}

fn release<A>(node: Node<A>, actor: &mut A) {
    if let NodeKind::Leaf(mut leaf) = node.kind {
        leaf.on_destroy(actor);
    }
}
