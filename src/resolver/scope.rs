//! Variable scope threading.
//!
//! A scope is the mapping from variable names to primitive values visible at
//! a point in the text. It has two layers: a `base` map inherited from the
//! caller (visible everywhere in the frame) and a list of offset-tagged
//! bindings produced by `var` directives in this frame. Tagging bindings
//! with the byte offset of their directive keeps source-order visibility: a
//! binding applies only to text at or after the directive that created it,
//! both when recursing into includes and during final substitution.
//!
//! Scope flows strictly downward. A child frame receives a flattened copy
//! of everything visible at the include's offset and can never write back.

use std::collections::HashMap;
use std::fmt;

use serde_yaml::Value;

/// A primitive variable value. Anything else in a `var` payload is dropped
/// rather than bound.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    /// A string, substituted verbatim.
    String(String),
    /// A number, rendered in plain decimal form.
    Number(serde_yaml::Number),
    /// A boolean, rendered as `true`/`false`.
    Bool(bool),
}

impl VarValue {
    /// Convert a YAML value, returning `None` for non-primitives.
    pub fn from_yaml(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            _ => None,
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for VarValue {
    fn from(value: i64) -> Self {
        Self::Number(serde_yaml::Number::from(value))
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        Self::Number(serde_yaml::Number::from(value))
    }
}

/// A binding produced by a `var` directive, tagged with the byte offset of
/// the directive that created it in the current frame text.
#[derive(Debug, Clone)]
struct ScopedBinding {
    offset: usize,
    name: String,
    value: VarValue,
}

/// The variable mapping for one resolution frame.
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    base: HashMap<String, VarValue>,
    bindings: Vec<ScopedBinding>,
}

impl VariableScope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope seeded from a caller-provided map; these values are visible
    /// everywhere in the frame.
    pub fn from_map(base: HashMap<String, VarValue>) -> Self {
        Self {
            base,
            bindings: Vec::new(),
        }
    }

    /// Record a binding at the given byte offset.
    pub fn bind_at(&mut self, offset: usize, name: impl Into<String>, value: VarValue) {
        self.bindings.push(ScopedBinding {
            offset,
            name: name.into(),
            value,
        });
    }

    /// Look up `name` as visible at byte offset `offset`. Frame bindings
    /// shadow the base map; among frame bindings of the same name the one
    /// with the largest applicable offset wins, with later recordings
    /// breaking ties.
    pub fn lookup_at(&self, name: &str, offset: usize) -> Option<&VarValue> {
        let mut best: Option<&ScopedBinding> = None;
        for binding in &self.bindings {
            if binding.name == name
                && binding.offset <= offset
                && best.is_none_or(|current| binding.offset >= current.offset)
            {
                best = Some(binding);
            }
        }
        best.map(|b| &b.value).or_else(|| self.base.get(name))
    }

    /// Flatten everything visible at `offset` into a fresh scope for a
    /// child frame. The child starts with no offset-tagged bindings of its
    /// own; the parent's bindings become part of its base.
    pub fn child_at(&self, offset: usize) -> Self {
        let mut base = self.base.clone();
        let mut visible: Vec<&ScopedBinding> = self
            .bindings
            .iter()
            .filter(|b| b.offset <= offset)
            .collect();
        visible.sort_by_key(|b| b.offset);
        for binding in visible {
            base.insert(binding.name.clone(), binding.value.clone());
        }
        Self::from_map(base)
    }

    /// Keep binding offsets valid across a text splice replacing
    /// `[start, end)` with `replacement_len` bytes.
    pub fn adjust_for_splice(&mut self, start: usize, end: usize, replacement_len: usize) {
        for binding in &mut self.bindings {
            if binding.offset >= end {
                binding.offset = binding.offset - (end - start) + replacement_len;
            } else if binding.offset > start {
                binding.offset = start;
            }
        }
    }
}
