//! Name-to-implementation table for behavior descriptions.
//!
//! The registry is assembled once with a [`RegistryBuilder`] before any
//! session starts and is read-only afterwards. Bindings share it through an
//! `Arc`. Entries are kept in a `BTreeMap` so iteration never depends on
//! insertion or hash order.
//!
//! Registering the same name twice is an error in every build profile.

use std::collections::BTreeMap;
use std::fmt;

use crate::behavior::Behavior;
use crate::composite::{Composite, CompositeKind, child_specs};
use crate::decorator::{Decorator, DecoratorKind, Delay};
use crate::error::{BehaviorError, Result};
use crate::node::NodeKind;
use crate::spec::BehaviorSpec;

/// Constructs a leaf from its description.
pub type LeafFactory<A> = dyn Fn(&BehaviorSpec) -> Result<Box<dyn Behavior<A>>> + Send + Sync;

/// Node families implemented by the crate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Composite(CompositeKind),
    Decorator(DecoratorKind),
    Delay,
}

impl Builtin {
    /// Every builtin with its default registry name.
    pub const ALL: [(&'static str, Builtin); 9] = [
        ("Sequence", Builtin::Composite(CompositeKind::Sequence)),
        ("Selector", Builtin::Composite(CompositeKind::Selector)),
        ("ParallelSequence", Builtin::Composite(CompositeKind::ParallelSequence)),
        ("ParallelSelector", Builtin::Composite(CompositeKind::ParallelSelector)),
        ("Invert", Builtin::Decorator(DecoratorKind::Invert)),
        ("Succeed", Builtin::Decorator(DecoratorKind::Succeed)),
        ("Fail", Builtin::Decorator(DecoratorKind::Fail)),
        ("Loop", Builtin::Decorator(DecoratorKind::Loop)),
        ("Delay", Builtin::Delay),
    ];
}

enum Entry<A> {
    Builtin(Builtin),
    Leaf(Box<LeafFactory<A>>),
}

/// Collects registrations; frozen into a [`BehaviorRegistry`] by [`build`](Self::build).
pub struct RegistryBuilder<A> {
    entries: BTreeMap<String, Entry<A>>,
}

impl<A: 'static> RegistryBuilder<A> {
    /// An empty builder, without the builtin composites and decorators.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// A builder pre-populated with every [`Builtin`] under its default name.
    pub fn with_builtins() -> Self {
        let mut builder = Self::new();
        for (name, builtin) in Builtin::ALL {
            builder.entries.insert(name.to_owned(), Entry::Builtin(builtin));
        }
        builder
    }

    /// Registers a leaf factory under `name`.
    pub fn register<B, F>(&mut self, name: impl Into<String>, factory: F) -> Result<&mut Self>
    where
        B: Behavior<A> + 'static,
        F: Fn(&BehaviorSpec) -> Result<B> + Send + Sync + 'static,
    {
        let boxed: Box<LeafFactory<A>> = Box::new(move |spec: &BehaviorSpec| {
            factory(spec).map(|leaf| Box::new(leaf) as Box<dyn Behavior<A>>)
        });
        self.insert(name.into(), Entry::Leaf(boxed))
    }

    /// Registers a builtin under an additional name.
    pub fn register_builtin(&mut self, name: impl Into<String>, builtin: Builtin) -> Result<&mut Self> {
        self.insert(name.into(), Entry::Builtin(builtin))
    }

    pub fn build(self) -> BehaviorRegistry<A> {
        tracing::debug!("Behavior registry frozen with {} entries", self.entries.len());
        BehaviorRegistry {
            entries: self.entries,
        }
    }

    fn insert(&mut self, name: String, entry: Entry<A>) -> Result<&mut Self> {
        if self.entries.contains_key(&name) {
            return Err(BehaviorError::DuplicateBehavior { name });
        }
        self.entries.insert(name, entry);
        Ok(self)
    }
}

impl<A: 'static> Default for RegistryBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only table mapping behavior names to implementations.
pub struct BehaviorRegistry<A> {
    entries: BTreeMap<String, Entry<A>>,
}

impl<A: 'static> BehaviorRegistry<A> {
    pub fn builder() -> RegistryBuilder<A> {
        RegistryBuilder::with_builtins()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The builtin registered under `name`, if it is one.
    pub fn builtin(&self, name: &str) -> Result<Option<Builtin>> {
        match self.lookup(name)? {
            Entry::Builtin(builtin) => Ok(Some(*builtin)),
            Entry::Leaf(_) => Ok(None),
        }
    }

    /// Checks a whole description before any of it runs: every name must
    /// resolve and every node must build from its options.
    pub fn validate(&self, spec: &BehaviorSpec) -> Result<()> {
        let mut stack = vec![spec.clone()];
        while let Some(spec) = stack.pop() {
            match self.lookup(&spec.name)? {
                Entry::Builtin(Builtin::Composite(kind)) => {
                    stack.extend(child_specs(*kind, &spec)?);
                }
                Entry::Builtin(Builtin::Decorator(kind)) => {
                    let decorator = Decorator::from_spec(*kind, &spec)?;
                    stack.push(decorator.child().clone());
                }
                Entry::Builtin(Builtin::Delay) => {
                    Delay::from_spec(&spec)?;
                }
                Entry::Leaf(factory) => {
                    factory(&spec)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn instantiate(&self, spec: &BehaviorSpec) -> Result<NodeKind<A>> {
        let kind = match self.lookup(&spec.name)? {
            Entry::Builtin(Builtin::Composite(kind)) => {
                NodeKind::Composite(Composite::from_spec(*kind, spec)?)
            }
            Entry::Builtin(Builtin::Decorator(kind)) => {
                NodeKind::Decorator(Decorator::from_spec(*kind, spec)?)
            }
            Entry::Builtin(Builtin::Delay) => NodeKind::Delay(Delay::from_spec(spec)?),
            Entry::Leaf(factory) => NodeKind::Leaf(factory(spec)?),
        };
        Ok(kind)
    }

    fn lookup(&self, name: &str) -> Result<&Entry<A>> {
        self.entries
            .get(name)
            .ok_or_else(|| BehaviorError::UnknownBehavior {
                name: name.to_owned(),
            })
    }
}

impl<A> fmt::Debug for BehaviorRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorRegistry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
