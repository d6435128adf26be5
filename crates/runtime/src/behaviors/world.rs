//! Instant leaves that touch actor bookkeeping rather than its transform.

use behavior_tree::{Behavior, BehaviorSpec, Context, Result, Status};
use serde_json::json;

use super::invalid;
use crate::entity::Entity;

/// Succeeds with probability `p`, drawing from the shared source.
#[derive(Debug, Clone)]
pub struct Chance {
    p: f64,
}

impl Chance {
    pub fn from_spec(spec: &BehaviorSpec) -> Result<Self> {
        let p = spec.f64_or("p", 0.5)?;
        if !(0.0..=1.0).contains(&p) {
            return Err(invalid(spec, "p", "a probability in [0, 1]"));
        }
        Ok(Self { p })
    }
}

impl Behavior<Entity> for Chance {
    fn tick_rate(&self) -> u64 {
        0
    }

    fn on_start(&mut self, ctx: &mut Context<'_, Entity>) -> Status {
        let draw = ctx.random();
        if draw < self.p {
            Status::Success(json!(draw))
        } else {
            Status::Failure(json!(draw))
        }
    }

    fn tick(&mut self, _ctx: &mut Context<'_, Entity>, _delta: u64) -> Status {
        Status::Running
    }
}

/// Increments the counter named `key` and succeeds with its new value.
#[derive(Debug, Clone)]
pub struct Count {
    key: String,
}

impl Count {
    pub fn from_spec(spec: &BehaviorSpec) -> Result<Self> {
        let key = spec.str("key")?.unwrap_or("count").to_owned();
        Ok(Self { key })
    }
}

impl Behavior<Entity> for Count {
    fn tick_rate(&self) -> u64 {
        0
    }

    fn on_start(&mut self, ctx: &mut Context<'_, Entity>) -> Status {
        let value = ctx.actor_mut().bump(&self.key);
        Status::Success(json!(value))
    }

    fn tick(&mut self, _ctx: &mut Context<'_, Entity>, _delta: u64) -> Status {
        Status::Running
    }
}

/// Marks the actor for removal once the current event finishes.
#[derive(Debug, Clone, Copy)]
pub struct Destroy;

impl Behavior<Entity> for Destroy {
    fn tick_rate(&self) -> u64 {
        0
    }

    fn on_start(&mut self, ctx: &mut Context<'_, Entity>) -> Status {
        ctx.actor_mut().alive = false;
        Status::success()
    }

    fn tick(&mut self, _ctx: &mut Context<'_, Entity>, _delta: u64) -> Status {
        Status::Running
    }
}
