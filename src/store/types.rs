use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::EvalError;

/// A typed binding available to a code block.
///
/// `Vector` is a fixed-length real vector (e.g. a 3-component displacement),
/// while `Array` stands in for a per-particle data array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Real(f64),
    Vector(Vec<f64>),
    Array(Vec<f64>),
}

impl Value {
    /// Placeholder used to make an array name independently evaluable.
    pub fn placeholder_array() -> Self {
        Value::Array(vec![0.0; 2])
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Vector(_) => "vector",
            Value::Array(_) => "array",
        }
    }
}

/// Ordered set of named bindings. Iteration order is insertion order.
///
/// Cloning a `Context` is a deep copy: no storage is shared with the original.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    values: IndexMap<String, Value>,
}

impl Context {
    pub fn new() -> Self { Self::default() }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn contains(&self, name: &str) -> bool { self.values.contains_key(name) }

    pub fn get(&self, name: &str) -> Option<&Value> { self.values.get(name) }

    /// Inserts or replaces a binding. A replaced binding keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Overlays every binding of `other` onto this context.
    pub fn merge(&mut self, other: Context) {
        self.values.extend(other.values);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    // --- Typed accessors used by direct evaluators ---

    fn lookup(&self, name: &str) -> Result<&Value, EvalError> {
        self.values
            .get(name)
            .ok_or_else(|| EvalError::MissingBinding { name: name.to_string() })
    }

    fn mismatch(name: &str, expected: &'static str, found: &Value) -> EvalError {
        EvalError::TypeMismatch { name: name.to_string(), expected, found: found.kind() }
    }

    pub fn index(&self, name: &str) -> Result<usize, EvalError> {
        match self.lookup(name)? {
            Value::Int(i) if *i >= 0 => Ok(*i as usize),
            other => Err(Self::mismatch(name, "non-negative int", other)),
        }
    }

    pub fn real(&self, name: &str) -> Result<f64, EvalError> {
        match self.lookup(name)? {
            Value::Real(x) => Ok(*x),
            Value::Int(i) => Ok(*i as f64),
            other => Err(Self::mismatch(name, "real", other)),
        }
    }

    pub fn vector(&self, name: &str) -> Result<&[f64], EvalError> {
        match self.lookup(name)? {
            Value::Vector(v) => Ok(v),
            other => Err(Self::mismatch(name, "vector", other)),
        }
    }

    /// Reads `name[idx]` where `name` is a particle array and `idx` an index binding.
    pub fn element(&self, name: &str, idx: &str) -> Result<f64, EvalError> {
        let i = self.index(idx)?;
        match self.lookup(name)? {
            Value::Array(a) => a.get(i).copied().ok_or(EvalError::IndexOutOfBounds {
                name: name.to_string(),
                index: i,
                len: a.len(),
            }),
            other => Err(Self::mismatch(name, "array", other)),
        }
    }

    pub fn set_real(&mut self, name: &str, value: f64) {
        self.insert(name, Value::Real(value));
    }

    pub fn set_vector(&mut self, name: &str, value: Vec<f64>) {
        self.insert(name, Value::Vector(value));
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
