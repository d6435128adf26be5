//! Builder utilities for ergonomic tree descriptions.
//!
//! Instead of assembling option maps by hand, write
//! `sequence(vec![leaf("Inflate").with("size", 4), leaf("Destroy")])`.

use serde_json::Value;

use crate::composite::{CHILDREN_KEY, SHUFFLE_KEY};
use crate::decorator::{CHILD_KEY, COUNT_KEY, DELAY_KEY};
use crate::spec::BehaviorSpec;

/// A description of a registered leaf, without options.
#[inline]
pub fn leaf(name: &str) -> BehaviorSpec {
    BehaviorSpec::new(name)
}

fn composite(name: &str, children: Vec<BehaviorSpec>) -> BehaviorSpec {
    let children: Vec<Value> = children.into_iter().map(Value::from).collect();
    BehaviorSpec::new(name).with(CHILDREN_KEY, children)
}

fn decorator(name: &str, child: BehaviorSpec) -> BehaviorSpec {
    BehaviorSpec::new(name).with(CHILD_KEY, Value::from(child))
}

#[inline]
pub fn sequence(children: Vec<BehaviorSpec>) -> BehaviorSpec {
    composite("Sequence", children)
}

#[inline]
pub fn selector(children: Vec<BehaviorSpec>) -> BehaviorSpec {
    composite("Selector", children)
}

#[inline]
pub fn parallel_sequence(children: Vec<BehaviorSpec>) -> BehaviorSpec {
    composite("ParallelSequence", children)
}

#[inline]
pub fn parallel_selector(children: Vec<BehaviorSpec>) -> BehaviorSpec {
    composite("ParallelSelector", children)
}

/// Marks a composite description to iterate its children in shuffled order.
#[inline]
pub fn shuffled(spec: BehaviorSpec) -> BehaviorSpec {
    spec.with(SHUFFLE_KEY, true)
}

#[inline]
pub fn invert(child: BehaviorSpec) -> BehaviorSpec {
    decorator("Invert", child)
}

#[inline]
pub fn succeed(child: BehaviorSpec) -> BehaviorSpec {
    decorator("Succeed", child)
}

#[inline]
pub fn fail(child: BehaviorSpec) -> BehaviorSpec {
    decorator("Fail", child)
}

/// A `Loop` running `child` `count` times (`0` = until destroyed).
#[inline]
pub fn repeat(count: u64, child: BehaviorSpec) -> BehaviorSpec {
    decorator("Loop", child).with(COUNT_KEY, count)
}

#[inline]
pub fn delay(delay_ms: u64) -> BehaviorSpec {
    BehaviorSpec::new("Delay").with(DELAY_KEY, delay_ms)
}
