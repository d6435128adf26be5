//! Single-threaded simulation session.
//!
//! A [`Session`] owns every actor, one [`ActorBinding`] per actor, the event
//! queue and the shared random source. Each call to [`Session::step`] fires
//! exactly one scheduled wakeup; the simulation advances only through those
//! calls, so two sessions built from the same seed and fed the same commands
//! stay identical.

use std::collections::BTreeMap;
use std::sync::Arc;

use behavior_tree::{
    ActorBinding, Behavior, BehaviorRegistry, BehaviorSpec, CompletionRecord, Host, NodeId,
    Outcome, Wakeup,
};
use serde_json::Value;
use tracing::{debug, error, info, trace};

use crate::behaviors::default_registry;
use crate::config::SessionConfig;
use crate::entity::{ActorId, Entity};
use crate::error::{Result, RuntimeError};
use crate::random::SharedRandom;
use crate::scheduler::EventQueue;
use crate::transcript::{Transcript, digest_all};

struct Actor {
    entity: Entity,
    binding: ActorBinding<Entity>,
}

/// The [`Host`] one actor's binding sees while it runs.
struct ActorHost<'a> {
    actor: ActorId,
    queue: &'a mut EventQueue,
    random: &'a mut SharedRandom,
    transcript: &'a mut Transcript,
}

impl Host for ActorHost<'_> {
    fn now(&self) -> u64 {
        self.queue.now()
    }

    fn schedule(&mut self, delay: u64, wakeup: Wakeup) {
        self.queue.push(delay, self.actor, wakeup);
    }

    fn random(&mut self) -> f64 {
        self.random.next_f64()
    }

    fn completed(&mut self, record: &CompletionRecord) {
        trace!(
            "{} {} {} {:?} at t={}",
            self.actor, record.name, record.node, record.outcome, record.at
        );
        self.transcript.record(self.actor, record);
    }
}

pub struct Session {
    config: SessionConfig,
    registry: Arc<BehaviorRegistry<Entity>>,
    actors: BTreeMap<ActorId, Actor>,
    next_actor: u32,
    queue: EventQueue,
    random: SharedRandom,
    transcript: Transcript,
    instant: u64,
    events_at_instant: usize,
    fired: u64,
}

impl Session {
    pub fn new(registry: Arc<BehaviorRegistry<Entity>>, config: SessionConfig) -> Self {
        info!(
            "Session created (seed={}, policy={:?}, {} behaviors)",
            config.seed,
            config.invariant_policy,
            registry.len()
        );
        Self {
            random: SharedRandom::new(config.seed),
            config,
            registry,
            actors: BTreeMap::new(),
            next_actor: 0,
            queue: EventQueue::new(),
            transcript: Transcript::new(),
            instant: 0,
            events_at_instant: 0,
            fired: 0,
        }
    }

    /// A session using the builtins and the leaves in [`crate::behaviors`].
    pub fn with_default_registry(config: SessionConfig) -> Result<Self> {
        let registry = default_registry()?.build();
        Ok(Self::new(Arc::new(registry), config))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<BehaviorRegistry<Entity>> {
        &self.registry
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.queue.now()
    }

    /// Number of wakeups fired so far.
    pub fn events_fired(&self) -> u64 {
        self.fired
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    pub fn entity(&self, id: ActorId) -> Option<&Entity> {
        self.actors.get(&id).map(|actor| &actor.entity)
    }

    pub fn binding(&self, id: ActorId) -> Option<&ActorBinding<Entity>> {
        self.actors.get(&id).map(|actor| &actor.binding)
    }

    /// Adds an actor with an empty tree.
    pub fn spawn(&mut self, entity: Entity) -> ActorId {
        let id = ActorId(self.next_actor);
        self.next_actor += 1;

        debug!("Spawned {} ({})", id, entity.name);
        let binding = ActorBinding::new(Arc::clone(&self.registry), self.config.tree_config());
        self.actors.insert(id, Actor { entity, binding });
        id
    }

    /// Replaces the tree of `id` with one built from `spec`.
    pub fn start_behavior(&mut self, id: ActorId, spec: &BehaviorSpec) -> Result<NodeId> {
        self.drive(id, |binding, entity, host| {
            binding.start_behavior(spec, entity, host)
        })
    }

    /// Replaces the tree of `id` with an already-constructed leaf.
    pub fn start_node<B>(&mut self, id: ActorId, name: &str, behavior: B) -> Result<NodeId>
    where
        B: Behavior<Entity> + 'static,
    {
        self.drive(id, |binding, entity, host| {
            binding.start_node(name, behavior, entity, host)
        })
    }

    /// Completes `node` of actor `id` from outside its hooks.
    pub fn complete(
        &mut self,
        id: ActorId,
        node: NodeId,
        outcome: Outcome,
        data: Value,
    ) -> Result<()> {
        self.drive(id, |binding, entity, host| {
            binding.complete(node, outcome, data, entity, host)
        })
    }

    /// Destroys one node of actor `id` and its active descendants. An inner
    /// node under a live parent is reported to that parent as failed.
    ///
    /// Returns `Ok(false)` if the node was already gone.
    pub fn destroy_node(&mut self, id: ActorId, node: NodeId) -> Result<bool> {
        self.drive(id, |binding, entity, host| {
            binding.destroy_node(node, entity, host)
        })
    }

    /// Tears down the tree of `id`, then removes the actor.
    ///
    /// Pending wakeups addressed to the actor are dropped.
    pub fn destroy_actor(&mut self, id: ActorId) -> Result<Entity> {
        let actor = self
            .actors
            .get_mut(&id)
            .ok_or(RuntimeError::UnknownActor(id))?;
        actor.binding.destroy(&mut actor.entity);

        let removed = self
            .actors
            .remove(&id)
            .ok_or(RuntimeError::UnknownActor(id))?;
        self.queue.forget(id);
        debug!("Destroyed {} at t={}", id, self.queue.now());
        Ok(removed.entity)
    }

    /// Fires the next scheduled wakeup.
    ///
    /// Returns `Ok(false)` when the queue is empty.
    pub fn step(&mut self) -> Result<bool> {
        let Some(event) = self.queue.pop() else {
            return Ok(false);
        };
        self.guard_instant(event.due)?;

        if !self.actors.contains_key(&event.actor) {
            trace!("Dropping wakeup for removed {}", event.actor);
            return Ok(true);
        }

        self.fired += 1;
        self.drive(event.actor, |binding, entity, host| {
            binding.fire(event.wakeup, entity, host)
        })?;
        Ok(true)
    }

    /// Fires every wakeup due at or before `time`, then moves the clock to
    /// `time`. Returns the number of wakeups fired.
    pub fn run_until(&mut self, time: u64) -> Result<u64> {
        let before = self.fired;
        while self.queue.peek_due().is_some_and(|due| due <= time) {
            self.step()?;
        }
        self.queue.advance_to(time);
        Ok(self.fired - before)
    }

    pub fn run_for(&mut self, duration: u64) -> Result<u64> {
        self.run_until(self.now().saturating_add(duration))
    }

    /// SHA-256 over every live actor's state, in actor order.
    pub fn state_digest(&self) -> [u8; 32] {
        digest_all(self.actors.iter().map(|(id, actor)| (id, &actor.entity)))
    }

    pub fn state_digest_hex(&self) -> String {
        hex::encode(self.state_digest())
    }

    /// Runs `f` against the binding of `id` with a host bound to that actor,
    /// then reaps the actor if a leaf marked it dead.
    fn drive<T>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut ActorBinding<Entity>, &mut Entity, &mut dyn Host) -> behavior_tree::Result<T>,
    ) -> Result<T> {
        let actor = self
            .actors
            .get_mut(&id)
            .ok_or(RuntimeError::UnknownActor(id))?;
        let mut host = ActorHost {
            actor: id,
            queue: &mut self.queue,
            random: &mut self.random,
            transcript: &mut self.transcript,
        };
        let result = f(&mut actor.binding, &mut actor.entity, &mut host);

        if !actor.entity.alive {
            self.destroy_actor(id)?;
        }
        result.map_err(|source| RuntimeError::behavior(id, source))
    }

    fn guard_instant(&mut self, due: u64) -> Result<()> {
        if due == self.instant {
            self.events_at_instant += 1;
        } else {
            self.instant = due;
            self.events_at_instant = 1;
        }

        let limit = self.config.max_events_per_instant;
        if self.events_at_instant > limit {
            error!("Livelock: more than {} events at t={}", limit, due);
            return Err(RuntimeError::Livelock { at: due, limit });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("now", &self.queue.now())
            .field("actors", &self.actors.len())
            .field("pending", &self.queue.len())
            .field("completions", &self.transcript.len())
            .finish()
    }
}
