//! Leaves that change an entity's transform over time.

use behavior_tree::{Behavior, BehaviorSpec, Context, Result, Status};
use serde_json::json;

use super::{invalid, required_f64, seconds};
use crate::entity::{Entity, Vec2};

/// Rotates the entity at `speed` degrees per second.
#[derive(Debug, Clone)]
pub struct Spin {
    speed: f64,
    duration: Option<u64>,
    elapsed: u64,
}

impl Spin {
    pub fn from_spec(spec: &BehaviorSpec) -> Result<Self> {
        Ok(Self {
            speed: spec.f64_or("speed", 90.0)?,
            duration: spec.u64("duration")?,
            elapsed: 0,
        })
    }
}

impl Behavior<Entity> for Spin {
    fn tick(&mut self, ctx: &mut Context<'_, Entity>, delta: u64) -> Status {
        // Never rotate past the requested duration.
        let step = match self.duration {
            Some(duration) => delta.min(duration.saturating_sub(self.elapsed)),
            None => delta,
        };
        self.elapsed += step;
        ctx.actor_mut().rotate(self.speed * seconds(step));

        match self.duration {
            Some(duration) if self.elapsed >= duration => {
                Status::Success(json!(ctx.actor().rotation))
            }
            _ => Status::Running,
        }
    }
}

/// Grows or shrinks the entity's scale toward `size` at `rate` units per
/// second.
#[derive(Debug, Clone)]
pub struct Inflate {
    size: f64,
    rate: f64,
}

impl Inflate {
    pub fn from_spec(spec: &BehaviorSpec) -> Result<Self> {
        let size = required_f64(spec, "size")?;
        let rate = spec.f64_or("rate", 1.0)?;
        if rate <= 0.0 {
            return Err(invalid(spec, "rate", "a positive number"));
        }
        Ok(Self { size, rate })
    }
}

impl Behavior<Entity> for Inflate {
    fn on_start(&mut self, ctx: &mut Context<'_, Entity>) -> Status {
        if ctx.actor().scale == self.size {
            return Status::Success(json!(self.size));
        }
        Status::Running
    }

    fn tick(&mut self, ctx: &mut Context<'_, Entity>, delta: u64) -> Status {
        let actor = ctx.actor_mut();
        let step = self.rate * seconds(delta);
        let remaining = self.size - actor.scale;
        if remaining.abs() <= step {
            actor.scale = self.size;
            return Status::Success(json!(self.size));
        }
        actor.scale += step.copysign(remaining);
        Status::Running
    }
}

/// Walks the entity in a straight line to `(x, y)` at `speed` units per
/// second.
#[derive(Debug, Clone)]
pub struct MoveTo {
    target: Vec2,
    speed: f64,
}

impl MoveTo {
    pub fn from_spec(spec: &BehaviorSpec) -> Result<Self> {
        let target = Vec2::new(required_f64(spec, "x")?, required_f64(spec, "y")?);
        let speed = spec.f64_or("speed", 1.0)?;
        if speed <= 0.0 {
            return Err(invalid(spec, "speed", "a positive number"));
        }
        Ok(Self { target, speed })
    }

    fn arrived(&self) -> Status {
        Status::Success(json!({ "x": self.target.x, "y": self.target.y }))
    }
}

impl Behavior<Entity> for MoveTo {
    fn on_start(&mut self, ctx: &mut Context<'_, Entity>) -> Status {
        if ctx.actor().position == self.target {
            return self.arrived();
        }
        Status::Running
    }

    fn tick(&mut self, ctx: &mut Context<'_, Entity>, delta: u64) -> Status {
        let actor = ctx.actor_mut();
        let step = self.speed * seconds(delta);
        let distance = actor.position.distance(self.target);
        if distance <= step {
            actor.position = self.target;
            return self.arrived();
        }
        let ratio = step / distance;
        actor.position.x += (self.target.x - actor.position.x) * ratio;
        actor.position.y += (self.target.y - actor.position.y) * ratio;
        Status::Running
    }
}
