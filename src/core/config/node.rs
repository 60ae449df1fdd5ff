//! Config tree nodes.
//!
//! A [`Node`] is the in-memory form of a config document. It mirrors
//! `serde_yaml::Value` with string-only mapping keys and one extra variant,
//! [`Node::Deferred`], for values computed when they are read.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_yaml::Value;

/// Mapping of keys to child nodes.
pub type Mapping = BTreeMap<String, Node>;

/// A config value computed on every read.
///
/// Cloning shares the underlying thunk.
#[derive(Clone)]
pub struct Deferred(Arc<dyn Fn() -> Value + Send + Sync>);

impl Deferred {
    pub fn new<F>(thunk: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(thunk))
    }

    /// Invoke the thunk.
    pub fn force(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

/// A node of the config tree.
#[derive(Debug, Clone, Default)]
pub enum Node {
    /// Present but without a value (`~`, `null`).
    #[default]
    Null,
    Bool(bool),
    Number(serde_yaml::Number),
    String(String),
    Sequence(Vec<Node>),
    Mapping(Mapping),
    Deferred(Deferred),
}

impl Node {
    /// An empty mapping.
    pub fn mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of a scalar node; `None` for null, collections and
    /// deferred values.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Convert to a plain value, invoking every deferred thunk once.
    pub fn force(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Sequence(items) => Value::Sequence(items.iter().map(Node::force).collect()),
            Self::Mapping(map) => {
                let mut out = serde_yaml::Mapping::new();
                for (key, value) in map {
                    out.insert(Value::String(key.clone()), value.force());
                }
                Value::Mapping(out)
            }
            Self::Deferred(deferred) => deferred.force(),
        }
    }

    /// Number of scalar leaves below this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Sequence(items) => items.iter().map(Node::leaf_count).sum(),
            Self::Mapping(map) => map.values().map(Node::leaf_count).sum(),
            _ => 1,
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key_text(key), Node::from(value)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

impl From<Deferred> for Node {
    fn from(deferred: Deferred) -> Self {
        Self::Deferred(deferred)
    }
}

/// Mapping keys are always strings in the tree; YAML allows any scalar.
fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
