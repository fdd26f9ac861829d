//! Errors raised while declaring, instantiating, or invoking blueprints

/// Errors that can occur when working with blueprints
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlueprintError {
    #[error("Blueprint already declared: {0}")]
    AlreadyDeclared(String),

    #[error("Blueprint not found: {0}")]
    NotFound(String),

    #[error("Blueprint {blueprint} extends undeclared parent {parent}")]
    UnknownParent { blueprint: String, parent: String },

    #[error("Blueprint {blueprint} declares field {field} more than once in its lineage")]
    DuplicateField { blueprint: String, field: String },

    #[error("Blueprint {blueprint} declares behavior {behavior} with no implementation")]
    MissingImplementation { blueprint: String, behavior: String },

    #[error("Invalid template for {blueprint}.{behavior}: {reason}")]
    InvalidTemplate {
        blueprint: String,
        behavior: String,
        reason: String,
    },

    #[error("Blueprint {blueprint} expects {expected} arguments, got {actual}")]
    ArityMismatch {
        blueprint: String,
        expected: usize,
        actual: usize,
    },

    #[error("Blueprint {blueprint} has no field {field}")]
    UnknownField { blueprint: String, field: String },

    #[error("Blueprint {blueprint} left fields unset after initialization: {}", .missing.join(", "))]
    MalformedInitialization {
        blueprint: String,
        missing: Vec<String>,
    },

    #[error("Behavior {behavior} not found on {blueprint} or its ancestors")]
    BehaviorNotFound { blueprint: String, behavior: String },

    #[error("Behavior {behavior} failed: {reason}")]
    BehaviorFailed { behavior: String, reason: String },
}

impl BlueprintError {
    /// Shorthand for a behavior reporting its own failure
    pub fn behavior_failed(behavior: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BehaviorFailed {
            behavior: behavior.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_message() {
        let err = BlueprintError::UnknownField {
            blueprint: "Mage".to_string(),
            field: "mana".to_string(),
        };
        assert_eq!(err.to_string(), "Blueprint Mage has no field mana");
    }

    #[test]
    fn test_malformed_message_lists_missing_fields() {
        let err = BlueprintError::MalformedInitialization {
            blueprint: "Mage".to_string(),
            missing: vec!["name".to_string(), "level".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Blueprint Mage left fields unset after initialization: name, level"
        );
    }
}
