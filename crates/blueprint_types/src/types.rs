// Blueprint Types - Declarations of blueprints, their fields and behaviors
//
// A BlueprintDef is the serializable half of a blueprint: names, field order,
// parent link and template behaviors. Native behavior code is attached by the
// runtime when the definition is declared.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Field Definition
// ─────────────────────────────────────────────────────────────────────────────

/// A field declared by a blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

impl From<&str> for FieldDef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FieldDef {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Behavior Definition
// ─────────────────────────────────────────────────────────────────────────────

/// A behavior declared by a blueprint
///
/// Behaviors with a `template` are rendered from the instance's fields, e.g.
/// `"{name} says hello."`. Behaviors without one must be given native code at
/// declaration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorDef {
    /// Behavior name
    pub name: String,
    /// Format template over field names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BehaviorDef {
    /// Declare a behavior implemented in native code
    pub fn native(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: None,
            description: None,
        }
    }

    /// Declare a behavior rendered from a template
    pub fn template(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: Some(template.into()),
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Blueprint Definition
// ─────────────────────────────────────────────────────────────────────────────

/// A named template for instances
///
/// `fields` holds only the fields this blueprint adds; inherited fields come
/// from the parent chain and are laid out ahead of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintDef {
    /// Unique blueprint name (e.g., "Hero", "Mage")
    pub name: String,
    /// Parent blueprint, if this blueprint extends one
    #[serde(default, rename = "extends", skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Own fields, in positional order
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Own behaviors
    #[serde(default)]
    pub behaviors: Vec<BehaviorDef>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BlueprintDef {
    /// Create a blueprint with no parent, fields, or behaviors
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            behaviors: Vec::new(),
            description: None,
        }
    }

    /// Set the parent blueprint
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add a single field
    pub fn with_field(mut self, field: impl Into<FieldDef>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Add several fields in order
    pub fn with_fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldDef>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Add a behavior
    pub fn with_behavior(mut self, behavior: BehaviorDef) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// Set the description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Get an own field by name
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get an own behavior by name
    pub fn get_behavior(&self, name: &str) -> Option<&BehaviorDef> {
        self.behaviors.iter().find(|b| b.name == name)
    }
}
