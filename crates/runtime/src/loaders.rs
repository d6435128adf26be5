//! File loaders for scenarios and session configuration.
//!
//! Scenarios are RON, session configuration is TOML. Both loaders return
//! [`LoadResult`] so callers can attach their own context.

use std::path::Path;

use behavior_tree::BehaviorSpec;
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::entity::{ActorId, Entity};
use crate::error::Result;
use crate::session::Session;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// One actor placed by a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    #[serde(default)]
    pub entity: Entity,
    /// Tree started right after the actor spawns.
    #[serde(default)]
    pub behavior: Option<BehaviorSpec>,
}

/// Actors to spawn and how long to run them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Virtual milliseconds to run.
    pub duration: u64,
    /// Overrides the session seed when set.
    #[serde(default)]
    pub seed: Option<u64>,
    pub actors: Vec<ActorSpec>,
}

impl Scenario {
    /// Spawns every actor in declaration order and starts its tree.
    pub fn populate(&self, session: &mut Session) -> Result<Vec<ActorId>> {
        tracing::info!("Populating session with {} actors", self.actors.len());

        let mut ids = Vec::with_capacity(self.actors.len());
        for spec in &self.actors {
            let id = session.spawn(spec.entity.clone());
            if let Some(behavior) = &spec.behavior {
                session.start_behavior(id, behavior)?;
            }
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario from a RON file.
    ///
    /// Behavior descriptions use map syntax or a bare string:
    ///
    /// ```text
    /// (
    ///     duration: 2000,
    ///     actors: [
    ///         (entity: (name: "a"), behavior: Some({"name": "Spin", "speed": 90.0})),
    ///         (entity: (name: "b"), behavior: Some("Destroy")),
    ///     ],
    /// )
    /// ```
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        let scenario: Scenario = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;

        Ok(scenario)
    }
}

/// Loader for session configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load session config from a TOML file. Missing keys keep their
    /// defaults.
    pub fn load(path: &Path) -> LoadResult<SessionConfig> {
        let content = read_file(path)?;
        let config: SessionConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.max_events_per_instant == 0 {
            anyhow::bail!("max_events_per_instant must be at least 1");
        }
        Ok(config)
    }
}
