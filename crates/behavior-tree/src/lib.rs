//! Deterministic behavior tree scheduler for replicated simulations.
//!
//! Every replica of a session runs the same trees, ticked by the same
//! virtual clock, drawing from the same shared random source, so every
//! replica reaches bit-identical state.
//!
//! - **Virtual time only**: nodes reschedule themselves through the host's
//!   `schedule(delay)`; wall-clock time is never read
//! - **Explicit steps**: leaves return [`Status`] instead of calling
//!   completion methods, so a leaf completes at most once
//! - **Arena ownership**: nodes live in a per-actor arena and refer to each
//!   other by [`NodeId`]; freed slots can never be reached again
//! - **Data-driven trees**: trees are described as [`BehaviorSpec`] data and
//!   resolved by name through a read-only [`BehaviorRegistry`]
//!
//! # Architecture
//!
//! - [`Behavior`]: trait for application leaves
//! - [`Status`] / [`Outcome`]: step results and terminal outcomes
//! - Composites: `Sequence`, `Selector`, `ParallelSequence`, `ParallelSelector`
//! - Decorators: `Invert`, `Succeed`, `Fail`, `Loop`, `Delay`
//! - [`ActorBinding`]: owns one actor's tree and drives its lifecycle
//! - [`Host`]: the clock, scheduler and random source provided by the simulation

pub mod behavior;
pub mod binding;
pub mod builder;
pub mod composite;
pub mod config;
pub mod decorator;
pub mod error;
pub mod host;
pub mod registry;
pub mod spec;
pub mod status;

mod node;

pub use behavior::{Behavior, Context, DEFAULT_TICK_RATE};
pub use binding::ActorBinding;
pub use composite::CompositeKind;
pub use config::{InvariantPolicy, TreeConfig};
pub use decorator::DecoratorKind;
pub use error::{BehaviorError, Result};
pub use host::{CompletionRecord, Host, NodeId, WakeReason, Wakeup};
pub use registry::{BehaviorRegistry, Builtin, RegistryBuilder};
pub use spec::{BehaviorSpec, Options};
pub use status::{Outcome, Status};
