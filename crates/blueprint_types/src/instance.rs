//! Instances created from blueprints
//!
//! An instance owns its field values outright; nothing is shared between
//! instances. Fields keep the blueprint's layout order, ancestors first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Unique identifier of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub uuid::Uuid);

impl InstanceId {
    /// Create a new unique instance ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single named field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

/// A concrete object created from a blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    /// Name of the blueprint this instance was created from
    pub blueprint: String,
    fields: Vec<Field>,
}

impl Instance {
    /// Build an instance from already-ordered fields
    pub fn from_fields(blueprint: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id: InstanceId::new(),
            blueprint: blueprint.into(),
            fields,
        }
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Field names in layout order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Compare field names and values, ignoring identity
    pub fn same_state(&self, other: &Instance) -> bool {
        self.blueprint == other.blueprint && self.fields == other.fields
    }
}
