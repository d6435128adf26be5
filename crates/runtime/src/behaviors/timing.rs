use behavior_tree::{Behavior, BehaviorSpec, Context, Result, Status};

use crate::entity::Entity;

/// Succeeds once `duration` virtual milliseconds have passed since start.
#[derive(Debug, Clone)]
pub struct Wait {
    duration: u64,
    started: u64,
}

impl Wait {
    pub fn new(duration: u64) -> Self {
        Self {
            duration,
            started: 0,
        }
    }

    pub fn from_spec(spec: &BehaviorSpec) -> Result<Self> {
        Ok(Self::new(spec.u64_or("duration", 0)?))
    }
}

impl Behavior<Entity> for Wait {
    fn on_start(&mut self, ctx: &mut Context<'_, Entity>) -> Status {
        self.started = ctx.now();
        if self.duration == 0 {
            return Status::success();
        }
        Status::Running
    }

    fn tick(&mut self, ctx: &mut Context<'_, Entity>, _delta: u64) -> Status {
        if ctx.now().saturating_sub(self.started) >= self.duration {
            Status::success()
        } else {
            Status::Running
        }
    }
}
