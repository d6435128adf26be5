//! Built-in leaves of the reference host.
//!
//! Every leaf acts on an [`Entity`] and reads its parameters from the
//! description's options:
//!
//! | name      | options                              | completes               |
//! |-----------|--------------------------------------|-------------------------|
//! | `Wait`    | `duration`                           | after `duration` ms     |
//! | `Spin`    | `speed` (deg/s), `duration?`         | after `duration`, never if unset |
//! | `Inflate` | `size`, `rate` (units/s)             | when `scale` reaches `size` |
//! | `MoveTo`  | `x`, `y`, `speed` (units/s)          | on arrival              |
//! | `Chance`  | `p`                                  | at start, succeeds with probability `p` |
//! | `Count`   | `key`                                | at start, bumping the counter |
//! | `Destroy` |                                      | at start, marking the actor dead |

mod motion;
mod timing;
mod world;

pub use motion::{Inflate, MoveTo, Spin};
pub use timing::Wait;
pub use world::{Chance, Count, Destroy};

use behavior_tree::{BehaviorError, BehaviorSpec, RegistryBuilder, Result};

use crate::entity::Entity;

/// Registry builder holding the builtins plus every leaf of this module.
///
/// Callers may register further leaves before freezing it.
pub fn default_registry() -> Result<RegistryBuilder<Entity>> {
    let mut builder = RegistryBuilder::with_builtins();
    builder
        .register("Wait", Wait::from_spec)?
        .register("Spin", Spin::from_spec)?
        .register("Inflate", Inflate::from_spec)?
        .register("MoveTo", MoveTo::from_spec)?
        .register("Chance", Chance::from_spec)?
        .register("Count", Count::from_spec)?
        .register("Destroy", |_: &BehaviorSpec| Ok(Destroy))?;
    Ok(builder)
}

fn required_f64(spec: &BehaviorSpec, key: &str) -> Result<f64> {
    spec.f64(key)?
        .ok_or_else(|| invalid(spec, key, "a number"))
}

fn invalid(spec: &BehaviorSpec, key: &str, expected: &'static str) -> BehaviorError {
    BehaviorError::InvalidOption {
        behavior: spec.name.clone(),
        key: key.to_owned(),
        expected,
    }
}

/// Virtual milliseconds to seconds.
fn seconds(delta: u64) -> f64 {
    delta as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_contains_leaves_and_builtins() {
        let registry = default_registry().expect("registry").build();
        for name in ["Wait", "Spin", "Inflate", "MoveTo", "Chance", "Count", "Destroy"] {
            assert!(registry.contains(name), "{name}");
        }
        assert!(registry.contains("Sequence"));
        assert_eq!(registry.builtin("Spin"), Ok(None));
    }

    #[test]
    fn bad_options_fail_validation() {
        let registry = default_registry().expect("registry").build();
        let spec = BehaviorSpec::new("Inflate").with("size", "big");
        assert!(matches!(
            registry.validate(&spec),
            Err(BehaviorError::InvalidOption { ref key, .. }) if key == "size"
        ));

        let spec = BehaviorSpec::new("MoveTo").with("x", 1).with("y", 1).with("speed", 0);
        assert!(registry.validate(&spec).is_err());
    }
}
