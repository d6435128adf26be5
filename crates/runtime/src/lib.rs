//! Reference host for behavior-tree sessions.
//!
//! This crate supplies everything a behavior tree expects from its
//! simulation: a virtual clock with FIFO-per-instant scheduling, a shared
//! seeded random source, actor lifetimes and a completion transcript for
//! replay comparison. Consumers build a [`Session`], spawn actors and drive
//! it with [`Session::step`] or [`Session::run_until`].
//!
//! Modules are organized by responsibility:
//! - [`session`] owns actors and their bindings and runs the event loop
//! - [`scheduler`] and [`random`] provide the host services
//! - [`behaviors`] holds the built-in leaves acting on [`Entity`]
//! - [`transcript`] records completions and digests them
//! - [`loaders`] reads scenarios (RON) and session config (TOML)
pub mod behaviors;
pub mod config;
pub mod entity;
pub mod error;
pub mod loaders;
pub mod random;
pub mod scheduler;
pub mod session;
pub mod transcript;

pub use behaviors::default_registry;
pub use config::SessionConfig;
pub use entity::{ActorId, Entity, Vec2};
pub use error::{Result, RuntimeError};
pub use loaders::{ActorSpec, ConfigLoader, LoadResult, Scenario, ScenarioLoader};
pub use random::SharedRandom;
pub use scheduler::{EventQueue, Scheduled};
pub use session::Session;
pub use transcript::{Transcript, TranscriptEntry};
