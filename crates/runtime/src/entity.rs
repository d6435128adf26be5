//! Actor state driven by the built-in leaves.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Session-unique actor identifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Replicated state of one simulated actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entity {
    pub name: String,
    pub position: Vec2,
    /// Degrees, kept in `[0, 360)`.
    pub rotation: f64,
    pub scale: f64,
    pub counters: BTreeMap<String, i64>,
    /// Cleared by the `Destroy` leaf; the session reaps the actor after the
    /// current event.
    pub alive: bool,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    pub fn counter(&self, key: &str) -> i64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    pub fn bump(&mut self, key: &str) -> i64 {
        let value = self.counters.entry(key.to_owned()).or_insert(0);
        *value += 1;
        *value
    }

    pub fn rotate(&mut self, degrees: f64) {
        self.rotation = (self.rotation + degrees).rem_euclid(360.0);
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec2::default(),
            rotation: 0.0,
            scale: 1.0,
            counters: BTreeMap::new(),
            alive: true,
        }
    }
}
