//! Declarative behavior descriptions.
//!
//! A tree is plain data: a behavior name plus options, where composite and
//! decorator options nest further descriptions.
//!
//! ```text
//! {name: "Sequence", behaviors: [{name: "Inflate", size: 4}, "Destroy"]}
//! ```
//!
//! A bare string is shorthand for a behavior without options. Options live in
//! an ordered map so a description serializes identically on every replica.

use serde_json::{Map, Value};

use crate::error::{BehaviorError, Result};

/// Option key that overrides a leaf's tick rate.
pub const TICK_RATE_KEY: &str = "tick_rate";

/// Ordered option map.
pub type Options = Map<String, Value>;

/// A behavior referenced by registry name, with its options.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct BehaviorSpec {
    pub name: String,
    pub options: Options,
}

impl BehaviorSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Options::new(),
        }
    }

    /// Adds an option (builder pattern).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn u64(&self, key: &str) -> Result<Option<u64>> {
        self.typed(key, "a non-negative integer", Value::as_u64)
    }

    pub fn u64_or(&self, key: &str, default: u64) -> Result<u64> {
        Ok(self.u64(key)?.unwrap_or(default))
    }

    pub fn f64(&self, key: &str) -> Result<Option<f64>> {
        self.typed(key, "a number", Value::as_f64)
    }

    pub fn f64_or(&self, key: &str, default: f64) -> Result<f64> {
        Ok(self.f64(key)?.unwrap_or(default))
    }

    pub fn bool(&self, key: &str) -> Result<Option<bool>> {
        self.typed(key, "a boolean", Value::as_bool)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.bool(key)?.unwrap_or(default))
    }

    pub fn str(&self, key: &str) -> Result<Option<&str>> {
        match self.options.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| BehaviorError::invalid_option(&self.name, key, "a string")),
        }
    }

    /// A nested description (decorator child).
    pub fn child(&self, key: &str) -> Result<Option<BehaviorSpec>> {
        match self.options.get(key) {
            None => Ok(None),
            Some(value) => BehaviorSpec::try_from(value.clone())
                .map(Some)
                .map_err(|_| BehaviorError::invalid_option(&self.name, key, "a behavior")),
        }
    }

    /// A list of nested descriptions (composite children).
    pub fn children(&self, key: &str) -> Result<Option<Vec<BehaviorSpec>>> {
        let Some(value) = self.options.get(key) else {
            return Ok(None);
        };
        let expected = "a list of behaviors";
        let items = value
            .as_array()
            .ok_or_else(|| BehaviorError::invalid_option(&self.name, key, expected))?;
        items
            .iter()
            .map(|item| {
                BehaviorSpec::try_from(item.clone())
                    .map_err(|_| BehaviorError::invalid_option(&self.name, key, expected))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn typed<T>(
        &self,
        key: &str,
        expected: &'static str,
        extract: impl Fn(&Value) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.options.get(key) {
            None => Ok(None),
            Some(value) => extract(value)
                .map(Some)
                .ok_or_else(|| BehaviorError::invalid_option(&self.name, key, expected)),
        }
    }
}

impl From<&str> for BehaviorSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for BehaviorSpec {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl TryFrom<Value> for BehaviorSpec {
    type Error = BehaviorError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Self::new(name)),
            Value::Object(mut options) => match options.remove("name") {
                Some(Value::String(name)) => Ok(Self { name, options }),
                Some(other) => Err(BehaviorError::InvalidSpec(format!(
                    "`name` must be a string, found {other}"
                ))),
                None => Err(BehaviorError::InvalidSpec(
                    "object description is missing `name`".to_owned(),
                )),
            },
            other => Err(BehaviorError::InvalidSpec(format!(
                "expected a name or an object, found {other}"
            ))),
        }
    }
}

impl From<BehaviorSpec> for Value {
    fn from(spec: BehaviorSpec) -> Self {
        if spec.options.is_empty() {
            return Value::String(spec.name);
        }
        let mut object = spec.options;
        object.insert("name".to_owned(), Value::String(spec.name));
        Value::Object(object)
    }
}
