// Initializers - How an instance's fields get their values
//
// The default initializer is positional: parent fields first (delegated to
// the parent's own initializer), then the blueprint's own fields. A custom
// initializer works on a Construction and is expected to call init_parent
// before touching inherited fields.

use std::sync::Arc;

use blueprint_types::{BlueprintError, Value};
use tracing::trace;

use crate::registry::Blueprint;

/// Custom initializer signature
pub type InitFn = dyn Fn(&mut Construction<'_>, &[Value]) -> Result<(), BlueprintError> + Send + Sync;

/// Shared handle to a custom initializer
pub type Initializer = Arc<InitFn>;

/// An instance under construction
pub struct Construction<'a> {
    blueprint: &'a Blueprint,
    slots: Vec<Option<Value>>,
    parent_initialized: bool,
}

impl<'a> Construction<'a> {
    fn new(blueprint: &'a Blueprint) -> Self {
        Self {
            blueprint,
            slots: vec![None; blueprint.layout().len()],
            parent_initialized: blueprint.parent().is_none(),
        }
    }

    /// Name of the blueprint being constructed
    pub fn blueprint(&self) -> &str {
        self.blueprint.name()
    }

    /// Run the parent's initializer with `args`, filling the inherited fields
    ///
    /// A no-op for blueprints without a parent.
    pub fn init_parent(&mut self, args: &[Value]) -> Result<(), BlueprintError> {
        let Some(parent) = self.blueprint.parent() else {
            return Ok(());
        };
        let inherited = construct(parent, args)?;
        for (slot, value) in self.slots.iter_mut().zip(inherited) {
            *slot = Some(value);
        }
        self.parent_initialized = true;
        Ok(())
    }

    /// Assign a field
    ///
    /// Own fields can be set at any time. Inherited fields can only be
    /// overwritten once the parent initializer has run.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), BlueprintError> {
        let index = self
            .blueprint
            .layout()
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| BlueprintError::UnknownField {
                blueprint: self.blueprint.name().to_string(),
                field: field.to_string(),
            })?;

        if index < self.blueprint.parent_arity() && !self.parent_initialized {
            return Err(self.malformed());
        }
        self.slots[index] = Some(value.into());
        Ok(())
    }

    fn malformed(&self) -> BlueprintError {
        BlueprintError::MalformedInitialization {
            blueprint: self.blueprint.name().to_string(),
            missing: self
                .blueprint
                .layout()
                .iter()
                .zip(&self.slots)
                .filter(|(_, slot)| slot.is_none())
                .map(|(name, _)| name.clone())
                .collect(),
        }
    }

    fn finish(self) -> Result<Vec<Value>, BlueprintError> {
        if self.slots.iter().any(Option::is_none) {
            return Err(self.malformed());
        }
        Ok(self.slots.into_iter().flatten().collect())
    }
}

/// Produce field values for `blueprint` in layout order
pub(crate) fn construct(blueprint: &Blueprint, args: &[Value]) -> Result<Vec<Value>, BlueprintError> {
    if let Some(init) = blueprint.initializer() {
        trace!(blueprint = blueprint.name(), "running custom initializer");
        let mut construction = Construction::new(blueprint);
        init(&mut construction, args)?;
        return construction.finish();
    }

    let expected = blueprint.layout().len();
    if args.len() != expected {
        return Err(BlueprintError::ArityMismatch {
            blueprint: blueprint.name().to_string(),
            expected,
            actual: args.len(),
        });
    }

    let split = blueprint.parent_arity();
    let mut values = match blueprint.parent() {
        Some(parent) => construct(parent, &args[..split])?,
        None => Vec::with_capacity(expected),
    };
    values.extend_from_slice(&args[split..]);
    Ok(values)
}
