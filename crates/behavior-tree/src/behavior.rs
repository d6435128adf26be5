//! Leaf behavior trait.
//!
//! This module defines the [`Behavior`] trait implemented by application
//! leaves (movement, animation, timers). Composites and decorators are a
//! closed set built into the crate and do not implement it.
//!
//! The trait is generic over the actor state type `A`: every node of one
//! tree shares the same actor.

use crate::host::{Host, random_below};
use crate::{NodeId, Status};

/// Tick interval used when a leaf does not override [`Behavior::tick_rate`].
pub const DEFAULT_TICK_RATE: u64 = 100;

/// A leaf behavior node driven by virtual-time ticks.
///
/// A leaf completes by returning [`Status::Success`] or [`Status::Failure`]
/// from [`on_start`](Behavior::on_start) or [`tick`](Behavior::tick). After
/// that it is never called again.
pub trait Behavior<A> {
    /// Virtual milliseconds between ticks. `0` means the leaf never ticks
    /// and completes only from `on_start` or externally.
    ///
    /// The `tick_rate` option of the node's description takes precedence.
    fn tick_rate(&self) -> u64 {
        DEFAULT_TICK_RATE
    }

    /// Called once when the node is created, before its first tick.
    fn on_start(&mut self, _ctx: &mut Context<'_, A>) -> Status {
        Status::Running
    }

    /// One step of work. `delta` is the virtual time since the previous tick,
    /// or since start for the first tick.
    fn tick(&mut self, ctx: &mut Context<'_, A>, delta: u64) -> Status;

    /// Called exactly once when the node leaves the tree, whether it
    /// completed or was destroyed by an ancestor.
    fn on_destroy(&mut self, _actor: &mut A) {}
}

/// What a leaf sees while it runs.
pub struct Context<'a, A> {
    actor: &'a mut A,
    host: &'a mut dyn Host,
    node: NodeId,
}

impl<'a, A> Context<'a, A> {
    pub(crate) fn new(actor: &'a mut A, host: &'a mut dyn Host, node: NodeId) -> Self {
        Self { actor, host, node }
    }

    pub fn actor(&self) -> &A {
        &*self.actor
    }

    pub fn actor_mut(&mut self) -> &mut A {
        &mut *self.actor
    }

    /// Handle of the node being run.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.host.now()
    }

    /// Draw in `[0, 1)` from the shared deterministic source.
    pub fn random(&mut self) -> f64 {
        self.host.random()
    }

    /// Uniform integer draw in `[0, bound)` from the shared source.
    pub fn random_below(&mut self, bound: u64) -> u64 {
        random_below(&mut *self.host, bound)
    }
}

/// Boxed leaves delegate to their contents.
impl<A, B: Behavior<A> + ?Sized> Behavior<A> for Box<B> {
    #[inline]
    fn tick_rate(&self) -> u64 {
        (**self).tick_rate()
    }

    #[inline]
    fn on_start(&mut self, ctx: &mut Context<'_, A>) -> Status {
        (**self).on_start(ctx)
    }

    #[inline]
    fn tick(&mut self, ctx: &mut Context<'_, A>, delta: u64) -> Status {
        (**self).tick(ctx, delta)
    }

    #[inline]
    fn on_destroy(&mut self, actor: &mut A) {
        (**self).on_destroy(actor)
    }
}
