//! Session configuration structures and loaders.
use std::env;

use behavior_tree::{InvariantPolicy, TreeConfig};

/// Configuration shared by every binding and by the event loop of a session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed of the shared deterministic random source.
    pub seed: u64,
    pub invariant_policy: InvariantPolicy,
    /// Events allowed at one virtual instant before the session reports a
    /// livelock.
    pub max_events_per_instant: usize,
}

impl SessionConfig {
    pub const DEFAULT_MAX_EVENTS_PER_INSTANT: usize = 100_000;

    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BT_SIM_SEED` - Shared random seed (default: 0)
    /// - `BT_SIM_STRICT` - `true` panics on invariant violations, `false`
    ///   logs and prunes (default: panic in debug builds only)
    /// - `BT_SIM_MAX_EVENTS_PER_INSTANT` - Livelock threshold (default: 100000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(seed) = read_env::<u64>("BT_SIM_SEED") {
            config.seed = seed;
        }

        if let Some(strict) = read_env::<bool>("BT_SIM_STRICT") {
            config.invariant_policy = if strict {
                InvariantPolicy::Panic
            } else {
                InvariantPolicy::LogAndPrune
            };
        }

        if let Some(limit) = read_env::<usize>("BT_SIM_MAX_EVENTS_PER_INSTANT") {
            config.max_events_per_instant = limit.max(1);
        }

        config
    }

    pub fn tree_config(&self) -> TreeConfig {
        TreeConfig::new(self.invariant_policy)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            invariant_policy: InvariantPolicy::for_build(),
            max_events_per_instant: Self::DEFAULT_MAX_EVENTS_PER_INSTANT,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
