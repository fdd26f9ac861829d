// Behaviors - Operations callable on instances
//
// A behavior reads the invoking instance through a BehaviorContext and returns
// a Value. It never receives the instance mutably, so invoking it leaves the
// instance untouched.

use blueprint_types::{BlueprintError, Instance, Value};

use crate::registry::Blueprint;

// ─────────────────────────────────────────────────────────────────────────────
// Behavior Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for behavior implementations
pub trait Behavior: Send + Sync {
    /// Run the behavior against the instance in `ctx`
    fn invoke(&self, ctx: &BehaviorContext<'_>, args: &[Value]) -> Result<Value, BlueprintError>;
}

/// Function-based behavior (for closures)
pub struct FnBehavior<F>
where
    F: Fn(&BehaviorContext<'_>, &[Value]) -> Result<Value, BlueprintError> + Send + Sync,
{
    func: F,
}

impl<F> FnBehavior<F>
where
    F: Fn(&BehaviorContext<'_>, &[Value]) -> Result<Value, BlueprintError> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Behavior for FnBehavior<F>
where
    F: Fn(&BehaviorContext<'_>, &[Value]) -> Result<Value, BlueprintError> + Send + Sync,
{
    fn invoke(&self, ctx: &BehaviorContext<'_>, args: &[Value]) -> Result<Value, BlueprintError> {
        (self.func)(ctx, args)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Behavior Context
// ─────────────────────────────────────────────────────────────────────────────

/// What a running behavior can see
pub struct BehaviorContext<'a> {
    instance: &'a Instance,
    /// Blueprint of the instance
    blueprint: &'a Blueprint,
    /// Blueprint whose implementation is running
    owner: &'a str,
    behavior: &'a str,
}

impl<'a> BehaviorContext<'a> {
    pub(crate) fn new(
        instance: &'a Instance,
        blueprint: &'a Blueprint,
        owner: &'a str,
        behavior: &'a str,
    ) -> Self {
        Self {
            instance,
            blueprint,
            owner,
            behavior,
        }
    }

    /// The invoking instance
    pub fn instance(&self) -> &Instance {
        self.instance
    }

    /// Name of the blueprint that defines the running implementation
    pub fn owner(&self) -> &str {
        self.owner
    }

    /// Name of the behavior being invoked
    pub fn behavior(&self) -> &str {
        self.behavior
    }

    /// Get a field of the invoking instance
    pub fn field(&self, name: &str) -> Result<&Value, BlueprintError> {
        self.instance.get(name).ok_or_else(|| {
            BlueprintError::behavior_failed(self.behavior, format!("instance has no field {name}"))
        })
    }

    /// Get a string field of the invoking instance
    pub fn field_str(&self, name: &str) -> Result<&str, BlueprintError> {
        self.field(name)?.as_str().ok_or_else(|| {
            BlueprintError::behavior_failed(self.behavior, format!("field {name} is not a string"))
        })
    }

    /// Run the version of this behavior that the owner's parent chain resolves
    ///
    /// This is the only way to reach an implementation shadowed by the owner.
    pub fn call_parent(&self, args: &[Value]) -> Result<Value, BlueprintError> {
        let owner = self
            .blueprint
            .ancestor(self.owner)
            .ok_or_else(|| BlueprintError::NotFound(self.owner.to_string()))?;

        let parent = owner.parent().ok_or_else(|| BlueprintError::BehaviorNotFound {
            blueprint: self.owner.to_string(),
            behavior: self.behavior.to_string(),
        })?;

        let entry = parent
            .lookup(self.behavior)
            .ok_or_else(|| BlueprintError::BehaviorNotFound {
                blueprint: parent.name().to_string(),
                behavior: self.behavior.to_string(),
            })?;

        let ctx = BehaviorContext::new(self.instance, self.blueprint, &entry.owner, self.behavior);
        entry.behavior.invoke(&ctx, args)
    }
}
