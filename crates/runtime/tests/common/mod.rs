//! Leaves and session setup shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use behavior_tree::{Behavior, BehaviorSpec, Context, InvariantPolicy, Status};
use sim_runtime::{Entity, Session, SessionConfig, default_registry};

/// Completes successfully from its start hook.
pub struct AlwaysSucceed;

impl Behavior<Entity> for AlwaysSucceed {
    fn tick_rate(&self) -> u64 {
        0
    }

    fn on_start(&mut self, ctx: &mut Context<'_, Entity>) -> Status {
        ctx.actor_mut().bump("started:succeed");
        Status::success()
    }

    fn tick(&mut self, _ctx: &mut Context<'_, Entity>, _delta: u64) -> Status {
        Status::Running
    }
}

/// Fails from its start hook.
pub struct AlwaysFail;

impl Behavior<Entity> for AlwaysFail {
    fn tick_rate(&self) -> u64 {
        0
    }

    fn on_start(&mut self, ctx: &mut Context<'_, Entity>) -> Status {
        ctx.actor_mut().bump("started:fail");
        Status::failure()
    }

    fn tick(&mut self, _ctx: &mut Context<'_, Entity>, _delta: u64) -> Status {
        Status::Running
    }
}

/// Ticks every millisecond and succeeds `after` ms past its start.
///
/// Counts its ticks under `ticks:<label>` and its teardown under
/// `destroyed:<label>`.
pub struct SlowSucceed {
    label: String,
    after: u64,
    started: u64,
}

impl SlowSucceed {
    pub fn from_spec(spec: &BehaviorSpec) -> behavior_tree::Result<Self> {
        Ok(Self {
            label: spec.str("label")?.unwrap_or("slow").to_owned(),
            after: spec.u64_or("after", 0)?,
            started: 0,
        })
    }
}

impl Behavior<Entity> for SlowSucceed {
    fn tick_rate(&self) -> u64 {
        1
    }

    fn on_start(&mut self, ctx: &mut Context<'_, Entity>) -> Status {
        self.started = ctx.now();
        ctx.actor_mut().bump(&format!("started:{}", self.label));
        Status::Running
    }

    fn tick(&mut self, ctx: &mut Context<'_, Entity>, _delta: u64) -> Status {
        ctx.actor_mut().bump(&format!("ticks:{}", self.label));
        if ctx.now() - self.started >= self.after {
            Status::success()
        } else {
            Status::Running
        }
    }

    fn on_destroy(&mut self, actor: &mut Entity) {
        actor.bump(&format!("destroyed:{}", self.label));
    }
}

/// Never completes on its own.
pub struct Forever {
    label: String,
}

impl Forever {
    pub fn from_spec(spec: &BehaviorSpec) -> behavior_tree::Result<Self> {
        Ok(Self {
            label: spec.str("label")?.unwrap_or("forever").to_owned(),
        })
    }
}

impl Behavior<Entity> for Forever {
    fn tick_rate(&self) -> u64 {
        5
    }

    fn on_start(&mut self, ctx: &mut Context<'_, Entity>) -> Status {
        ctx.actor_mut().bump(&format!("started:{}", self.label));
        Status::Running
    }

    fn tick(&mut self, ctx: &mut Context<'_, Entity>, _delta: u64) -> Status {
        ctx.actor_mut().bump(&format!("ticks:{}", self.label));
        Status::Running
    }

    fn on_destroy(&mut self, actor: &mut Entity) {
        actor.bump(&format!("destroyed:{}", self.label));
    }
}

pub fn session_with_seed(seed: u64) -> Session {
    let mut builder = default_registry().expect("default registry");
    builder
        .register("AlwaysSucceed", |_: &BehaviorSpec| Ok(AlwaysSucceed))
        .expect("register AlwaysSucceed")
        .register("AlwaysFail", |_: &BehaviorSpec| Ok(AlwaysFail))
        .expect("register AlwaysFail")
        .register("SlowSucceed", SlowSucceed::from_spec)
        .expect("register SlowSucceed")
        .register("Forever", Forever::from_spec)
        .expect("register Forever");

    let config = SessionConfig {
        invariant_policy: InvariantPolicy::LogAndPrune,
        max_events_per_instant: 1_000,
        ..SessionConfig::new(seed)
    };
    Session::new(Arc::new(builder.build()), config)
}

pub fn session() -> Session {
    session_with_seed(0xB7)
}
