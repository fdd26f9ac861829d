// Blueprint Registry - Declared blueprints and behavior resolution
//
// Declaring a blueprint resolves it against its parent once: the lineage,
// the field layout and the behavior table are all fixed at that point.
// Lookups afterwards never walk the chain at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use blueprint_types::{BehaviorDef, BlueprintDef, BlueprintError, Field, Instance, Value};

use crate::behavior::{Behavior, BehaviorContext, FnBehavior};
use crate::init::{self, Construction, Initializer};
use crate::template::TemplateBehavior;

// ─────────────────────────────────────────────────────────────────────────────
// Declaration
// ─────────────────────────────────────────────────────────────────────────────

/// A blueprint definition plus the native code that goes with it
pub struct Declaration {
    def: BlueprintDef,
    natives: HashMap<String, Arc<dyn Behavior>>,
    initializer: Option<Initializer>,
}

impl Declaration {
    pub fn new(def: BlueprintDef) -> Self {
        Self {
            def,
            natives: HashMap::new(),
            initializer: None,
        }
    }

    /// Attach a native behavior
    ///
    /// Adds a matching `BehaviorDef` if the definition doesn't list one, and
    /// takes precedence over a template of the same name.
    pub fn behavior(mut self, name: impl Into<String>, behavior: Arc<dyn Behavior>) -> Self {
        let name = name.into();
        match self.def.behaviors.iter_mut().find(|b| b.name == name) {
            Some(existing) => existing.template = None,
            None => self.def.behaviors.push(BehaviorDef::native(name.clone())),
        }
        self.natives.insert(name, behavior);
        self
    }

    /// Attach a native behavior from a closure
    pub fn behavior_fn<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&BehaviorContext<'_>, &[Value]) -> Result<Value, BlueprintError>
            + Send
            + Sync
            + 'static,
    {
        self.behavior(name, Arc::new(FnBehavior::new(func)))
    }

    /// Replace the positional initializer with custom logic
    pub fn initializer<F>(mut self, func: F) -> Self
    where
        F: Fn(&mut Construction<'_>, &[Value]) -> Result<(), BlueprintError>
            + Send
            + Sync
            + 'static,
    {
        self.initializer = Some(Arc::new(func));
        self
    }
}

impl From<BlueprintDef> for Declaration {
    fn from(def: BlueprintDef) -> Self {
        Self::new(def)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Declared Blueprint
// ─────────────────────────────────────────────────────────────────────────────

/// Entry in a blueprint's resolved behavior table
#[derive(Clone)]
pub(crate) struct BehaviorEntry {
    /// Blueprint whose implementation this is
    pub(crate) owner: String,
    pub(crate) behavior: Arc<dyn Behavior>,
}

/// A declared blueprint, resolved against its ancestors
pub struct Blueprint {
    def: BlueprintDef,
    parent: Option<Arc<Blueprint>>,
    lineage: Vec<String>,
    layout: Vec<String>,
    behaviors: HashMap<String, BehaviorEntry>,
    initializer: Option<Initializer>,
}

impl Blueprint {
    fn resolve(decl: Declaration, parent: Option<Arc<Blueprint>>) -> Result<Self, BlueprintError> {
        let Declaration {
            def,
            mut natives,
            initializer,
        } = decl;

        let mut lineage = vec![def.name.clone()];
        let mut layout = Vec::new();
        let mut behaviors = HashMap::new();
        if let Some(parent) = &parent {
            lineage.extend(parent.lineage.iter().cloned());
            layout.extend(parent.layout.iter().cloned());
            behaviors = parent.behaviors.clone();
        }

        for field in &def.fields {
            if layout.contains(&field.name) {
                return Err(BlueprintError::DuplicateField {
                    blueprint: def.name.clone(),
                    field: field.name.clone(),
                });
            }
            layout.push(field.name.clone());
        }

        for bdef in &def.behaviors {
            let behavior: Arc<dyn Behavior> = match natives.remove(&bdef.name) {
                Some(native) => native,
                None => {
                    let Some(source) = &bdef.template else {
                        return Err(BlueprintError::MissingImplementation {
                            blueprint: def.name.clone(),
                            behavior: bdef.name.clone(),
                        });
                    };
                    let invalid = |reason: String| BlueprintError::InvalidTemplate {
                        blueprint: def.name.clone(),
                        behavior: bdef.name.clone(),
                        reason,
                    };
                    let template = TemplateBehavior::parse(source).map_err(invalid)?;
                    let unknown = template
                        .placeholders()
                        .find(|p| !layout.iter().any(|f| f.as_str() == *p));
                    if let Some(unknown) = unknown {
                        return Err(invalid(format!("unknown field {unknown}")));
                    }
                    Arc::new(template)
                }
            };
            // Nearest definition wins: replaces anything inherited.
            behaviors.insert(
                bdef.name.clone(),
                BehaviorEntry {
                    owner: def.name.clone(),
                    behavior,
                },
            );
        }

        Ok(Self {
            def,
            parent,
            lineage,
            layout,
            behaviors,
            initializer,
        })
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// The definition this blueprint was declared from
    pub fn def(&self) -> &BlueprintDef {
        &self.def
    }

    pub fn parent(&self) -> Option<&Blueprint> {
        self.parent.as_deref()
    }

    /// This blueprint followed by its ancestors, nearest first
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    /// All instance fields, ancestors' first
    pub fn layout(&self) -> &[String] {
        &self.layout
    }

    /// Number of fields inherited from the parent chain
    pub fn parent_arity(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| p.layout.len())
    }

    /// Whether this blueprint itself (not an ancestor) defines `behavior`
    pub fn defines(&self, behavior: &str) -> bool {
        self.def.get_behavior(behavior).is_some()
    }

    /// Resolved behavior names with the blueprint that supplies each, sorted
    pub fn behaviors(&self) -> Vec<(String, String)> {
        let mut out: Vec<_> = self
            .behaviors
            .iter()
            .map(|(name, entry)| (name.clone(), entry.owner.clone()))
            .collect();
        out.sort();
        out
    }

    /// Find this blueprint or an ancestor by name
    pub fn ancestor(&self, name: &str) -> Option<&Blueprint> {
        let mut current = Some(self);
        while let Some(bp) = current {
            if bp.name() == name {
                return Some(bp);
            }
            current = bp.parent();
        }
        None
    }

    pub(crate) fn lookup(&self, behavior: &str) -> Option<&BehaviorEntry> {
        self.behaviors.get(behavior)
    }

    pub(crate) fn initializer(&self) -> Option<&Initializer> {
        self.initializer.as_ref()
    }
}

impl std::fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blueprint")
            .field("name", &self.def.name)
            .field("lineage", &self.lineage)
            .field("layout", &self.layout)
            .field("behaviors", &self.behaviors())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry Events
// ─────────────────────────────────────────────────────────────────────────────

/// Events broadcast when the registry changes
#[derive(Debug, Clone, PartialEq)]
pub enum BlueprintChange {
    /// A blueprint was declared
    Declared {
        name: String,
        parent: Option<String>,
    },
}

/// One step of a behavior lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStep {
    pub blueprint: String,
    /// Whether this blueprint defines the behavior itself
    pub defines: bool,
}

/// A serializable snapshot of all declarations, in declaration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub blueprints: Vec<BlueprintDef>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Blueprint Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of declared blueprints
///
/// Blueprints are declared once and never change afterwards. The registry is
/// `Send + Sync` and can be shared behind an `Arc`.
pub struct BlueprintRegistry {
    blueprints: DashMap<String, Arc<Blueprint>>,
    order: RwLock<Vec<String>>,
    change_tx: broadcast::Sender<BlueprintChange>,
}

impl Default for BlueprintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlueprintRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(256);
        Self {
            blueprints: DashMap::new(),
            order: RwLock::new(Vec::new()),
            change_tx,
        }
    }

    /// Create a new registry wrapped in an Arc
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Subscribe to declarations made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<BlueprintChange> {
        self.change_tx.subscribe()
    }

    /// Declare a blueprint whose behaviors are all templates
    pub fn declare(&self, def: BlueprintDef) -> Result<Arc<Blueprint>, BlueprintError> {
        self.declare_with(Declaration::new(def))
    }

    /// Declare a blueprint with native behaviors and/or a custom initializer
    ///
    /// The parent must already be declared.
    pub fn declare_with(&self, decl: Declaration) -> Result<Arc<Blueprint>, BlueprintError> {
        let name = decl.def.name.clone();
        if self.blueprints.contains_key(&name) {
            return Err(BlueprintError::AlreadyDeclared(name));
        }

        let parent = match &decl.def.parent {
            Some(parent) => Some(self.get(parent).ok_or_else(|| {
                BlueprintError::UnknownParent {
                    blueprint: name.clone(),
                    parent: parent.clone(),
                }
            })?),
            None => None,
        };

        let blueprint = Arc::new(Blueprint::resolve(decl, parent)?);

        match self.blueprints.entry(name.clone()) {
            Entry::Occupied(_) => return Err(BlueprintError::AlreadyDeclared(name)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&blueprint));
            }
        }
        self.order.write().push(name.clone());

        info!(
            blueprint = %name,
            parent = ?blueprint.def.parent,
            fields = blueprint.layout.len(),
            behaviors = blueprint.behaviors.len(),
            "declared blueprint"
        );

        // Notify subscribers (ignore send errors - means no subscribers)
        let _ = self.change_tx.send(BlueprintChange::Declared {
            name,
            parent: blueprint.def.parent.clone(),
        });

        Ok(blueprint)
    }

    /// Get a declared blueprint by name
    pub fn get(&self, name: &str) -> Option<Arc<Blueprint>> {
        self.blueprints.get(name).map(|r| Arc::clone(r.value()))
    }

    fn require(&self, name: &str) -> Result<Arc<Blueprint>, BlueprintError> {
        self.get(name)
            .ok_or_else(|| BlueprintError::NotFound(name.to_string()))
    }

    /// Check if a blueprint is declared
    pub fn contains(&self, name: &str) -> bool {
        self.blueprints.contains_key(name)
    }

    /// Get the number of declared blueprints
    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// Blueprint names in declaration order
    pub fn names(&self) -> Vec<String> {
        self.order.read().clone()
    }

    /// Create an instance from positional arguments
    pub fn instantiate(&self, name: &str, args: &[Value]) -> Result<Instance, BlueprintError> {
        let blueprint = self.require(name)?;
        let values = init::construct(&blueprint, args)?;

        let fields = blueprint
            .layout
            .iter()
            .cloned()
            .zip(values)
            .map(|(name, value)| Field { name, value })
            .collect();
        let instance = Instance::from_fields(name, fields);

        debug!(blueprint = name, id = %instance.id, "instantiated");
        Ok(instance)
    }

    /// Invoke a behavior on an instance
    pub fn invoke(
        &self,
        instance: &Instance,
        behavior: &str,
        args: &[Value],
    ) -> Result<Value, BlueprintError> {
        let blueprint = self.require(&instance.blueprint)?;
        let entry = blueprint.lookup(behavior).ok_or_else(|| {
            warn!(blueprint = %instance.blueprint, behavior, "behavior not found");
            BlueprintError::BehaviorNotFound {
                blueprint: instance.blueprint.clone(),
                behavior: behavior.to_string(),
            }
        })?;

        debug!(blueprint = %instance.blueprint, behavior, owner = %entry.owner, "invoking");
        let ctx = BehaviorContext::new(instance, &blueprint, &entry.owner, behavior);
        entry.behavior.invoke(&ctx, args)
    }

    /// Name of the blueprint whose implementation `behavior` resolves to
    pub fn resolve(&self, blueprint: &str, behavior: &str) -> Result<String, BlueprintError> {
        let bp = self.require(blueprint)?;
        bp.lookup(behavior)
            .map(|entry| entry.owner.clone())
            .ok_or_else(|| BlueprintError::BehaviorNotFound {
                blueprint: blueprint.to_string(),
                behavior: behavior.to_string(),
            })
    }

    /// Walk the lineage the way a lookup would, stopping at the first definer
    ///
    /// If no blueprint defines the behavior every step reports `defines: false`.
    pub fn resolution_chain(
        &self,
        blueprint: &str,
        behavior: &str,
    ) -> Result<Vec<ResolutionStep>, BlueprintError> {
        let bp = self.require(blueprint)?;
        let mut steps = Vec::new();
        let mut current = Some(bp.as_ref());
        while let Some(b) = current {
            let defines = b.defines(behavior);
            steps.push(ResolutionStep {
                blueprint: b.name().to_string(),
                defines,
            });
            if defines {
                break;
            }
            current = b.parent();
        }
        Ok(steps)
    }

    /// True if the instance's blueprint is `name` or descends from it
    pub fn is_instance_of(&self, instance: &Instance, name: &str) -> bool {
        self.get(&instance.blueprint)
            .is_some_and(|bp| bp.lineage.iter().any(|n| n == name))
    }

    /// Export all declarations (for serialization)
    pub fn snapshot(&self) -> RegistrySnapshot {
        let blueprints = self
            .order
            .read()
            .iter()
            .filter_map(|name| self.get(name).map(|bp| bp.def.clone()))
            .collect();
        RegistrySnapshot { blueprints }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> BlueprintDef {
        BlueprintDef::new("Hero")
            .with_fields(["name", "level"])
            .with_behavior(BehaviorDef::template("greet", "{name} says hello."))
    }

    fn mage() -> BlueprintDef {
        BlueprintDef::new("Mage").extends("Hero").with_field("spell")
    }

    fn tutorial() -> BlueprintRegistry {
        let registry = BlueprintRegistry::new();
        registry.declare(hero()).unwrap();
        registry.declare(mage()).unwrap();
        registry
    }

    fn args(values: impl IntoIterator<Item = Value>) -> Vec<Value> {
        values.into_iter().collect()
    }

    #[test]
    fn test_empty_registry() {
        let registry = BlueprintRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_hero_greets() {
        let registry = tutorial();
        let varg = registry
            .instantiate("Hero", &args([Value::from("Varg"), Value::from(1)]))
            .unwrap();

        assert_eq!(varg.get_str("name"), Some("Varg"));
        assert_eq!(varg.get_i64("level"), Some(1));
        assert_eq!(
            registry.invoke(&varg, "greet", &[]).unwrap(),
            Value::from("Varg says hello.")
        );
    }

    #[test]
    fn test_mage_inherits_fields_and_greet() {
        let registry = tutorial();
        let lejon = registry
            .instantiate(
                "Mage",
                &args([Value::from("Lejon"), Value::from(2), Value::from("Magic Missile")]),
            )
            .unwrap();

        assert_eq!(
            lejon.field_names().collect::<Vec<_>>(),
            ["name", "level", "spell"]
        );
        assert_eq!(lejon.get_str("name"), Some("Lejon"));
        assert_eq!(lejon.get_i64("level"), Some(2));
        assert_eq!(lejon.get_str("spell"), Some("Magic Missile"));
        assert_eq!(
            registry.invoke(&lejon, "greet", &[]).unwrap(),
            Value::from("Lejon says hello.")
        );
    }

    #[test]
    fn test_fields_accept_any_value() {
        let registry = tutorial();
        let odd = registry
            .instantiate(
                "Mage",
                &args([Value::from(7), Value::Null, Value::from(vec![1, 2])]),
            )
            .unwrap();
        assert_eq!(odd.get("name"), Some(&Value::Int(7)));
        assert_eq!(odd.get("level"), Some(&Value::Null));
        assert_eq!(registry.invoke(&odd, "greet", &[]).unwrap(), Value::from("7 says hello."));
    }

    #[test]
    fn test_greet_is_idempotent() {
        let registry = tutorial();
        let varg = registry
            .instantiate("Hero", &args([Value::from("Varg"), Value::from(1)]))
            .unwrap();
        let before = varg.clone();

        let first = registry.invoke(&varg, "greet", &[]).unwrap();
        for _ in 0..5 {
            assert_eq!(registry.invoke(&varg, "greet", &[]).unwrap(), first);
        }
        assert_eq!(varg, before);
    }

    #[test]
    fn test_arity_mismatch() {
        let registry = tutorial();
        let err = registry
            .instantiate("Mage", &args([Value::from("Lejon"), Value::from(2)]))
            .unwrap_err();
        assert_eq!(
            err,
            BlueprintError::ArityMismatch {
                blueprint: "Mage".to_string(),
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_unknown_blueprint_and_behavior() {
        let registry = tutorial();
        assert!(matches!(
            registry.instantiate("Rogue", &[]),
            Err(BlueprintError::NotFound(_))
        ));

        let varg = registry
            .instantiate("Hero", &args([Value::from("Varg"), Value::from(1)]))
            .unwrap();
        assert_eq!(
            registry.invoke(&varg, "cast", &[]).unwrap_err(),
            BlueprintError::BehaviorNotFound {
                blueprint: "Hero".to_string(),
                behavior: "cast".to_string()
            }
        );
    }

    #[test]
    fn test_parent_must_exist_first() {
        let registry = BlueprintRegistry::new();
        assert_eq!(
            registry.declare(mage()).unwrap_err(),
            BlueprintError::UnknownParent {
                blueprint: "Mage".to_string(),
                parent: "Hero".to_string()
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_declare_duplicate_fails() {
        let registry = tutorial();
        assert!(matches!(
            registry.declare(hero()),
            Err(BlueprintError::AlreadyDeclared(_))
        ));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_field_collision_rejected() {
        let registry = tutorial();
        let clash = BlueprintDef::new("Paladin").extends("Hero").with_field("level");
        assert_eq!(
            registry.declare(clash).unwrap_err(),
            BlueprintError::DuplicateField {
                blueprint: "Paladin".to_string(),
                field: "level".to_string()
            }
        );
    }

    #[test]
    fn test_template_validation() {
        let registry = tutorial();
        let bad = BlueprintDef::new("Bard")
            .extends("Hero")
            .with_behavior(BehaviorDef::template("sing", "{name} plays the {lute}"));
        assert!(matches!(
            registry.declare(bad),
            Err(BlueprintError::InvalidTemplate { .. })
        ));

        let missing = BlueprintDef::new("Monk").with_behavior(BehaviorDef::native("meditate"));
        assert!(matches!(
            registry.declare(missing),
            Err(BlueprintError::MissingImplementation { .. })
        ));
    }

    #[test]
    fn test_shadowing_leaves_parent_unaffected() {
        let registry = BlueprintRegistry::new();
        registry.declare(hero()).unwrap();
        registry
            .declare(
                mage().with_behavior(BehaviorDef::template("greet", "{name} greets you arcanely.")),
            )
            .unwrap();

        let varg = registry
            .instantiate("Hero", &args([Value::from("Varg"), Value::from(1)]))
            .unwrap();
        let lejon = registry
            .instantiate(
                "Mage",
                &args([Value::from("Lejon"), Value::from(2), Value::from("Magic Missile")]),
            )
            .unwrap();

        assert_eq!(
            registry.invoke(&lejon, "greet", &[]).unwrap(),
            Value::from("Lejon greets you arcanely.")
        );
        assert_eq!(
            registry.invoke(&varg, "greet", &[]).unwrap(),
            Value::from("Varg says hello.")
        );
        assert_eq!(registry.resolve("Mage", "greet").unwrap(), "Mage");
        assert_eq!(registry.resolve("Hero", "greet").unwrap(), "Hero");
    }

    #[test]
    fn test_call_parent_reaches_shadowed_version() {
        let registry = tutorial();
        registry
            .declare_with(
                Declaration::new(BlueprintDef::new("Archmage").extends("Mage")).behavior_fn(
                    "greet",
                    |ctx, args| {
                        let base = ctx.call_parent(args)?;
                        Ok(Value::from(format!("{base} The air crackles.")))
                    },
                ),
            )
            .unwrap();

        let archmage = registry
            .instantiate(
                "Archmage",
                &args([Value::from("Ysolde"), Value::from(9), Value::from("Meteor")]),
            )
            .unwrap();
        assert_eq!(
            registry.invoke(&archmage, "greet", &[]).unwrap(),
            Value::from("Ysolde says hello. The air crackles.")
        );

        // Hero's greet has nothing above it to chain to.
        let varg = registry
            .instantiate("Hero", &args([Value::from("Varg"), Value::from(1)]))
            .unwrap();
        registry
            .declare_with(
                Declaration::new(BlueprintDef::new("Squire").extends("Hero"))
                    .behavior_fn("greet", |ctx, args| ctx.call_parent(args)),
            )
            .unwrap();
        let squire = registry
            .instantiate("Squire", &args([Value::from("Pip"), Value::from(0)]))
            .unwrap();
        assert_eq!(
            registry.invoke(&squire, "greet", &[]).unwrap(),
            Value::from("Pip says hello.")
        );
        assert_eq!(
            registry.invoke(&varg, "greet", &[]).unwrap(),
            Value::from("Varg says hello.")
        );
    }

    #[test]
    fn test_resolution_chain() {
        let registry = tutorial();
        let chain = registry.resolution_chain("Mage", "greet").unwrap();
        assert_eq!(
            chain,
            vec![
                ResolutionStep { blueprint: "Mage".into(), defines: false },
                ResolutionStep { blueprint: "Hero".into(), defines: true },
            ]
        );

        let missing = registry.resolution_chain("Mage", "cast").unwrap();
        assert_eq!(missing.len(), 2);
        assert!(missing.iter().all(|s| !s.defines));
    }

    #[test]
    fn test_three_level_nearest_definer_wins() {
        let registry = tutorial();
        registry
            .declare(
                BlueprintDef::new("Archmage")
                    .extends("Mage")
                    .with_field("tower"),
            )
            .unwrap();
        registry
            .declare(
                BlueprintDef::new("Lich")
                    .extends("Archmage")
                    .with_behavior(BehaviorDef::template("greet", "{name} rasps from {tower}.")),
            )
            .unwrap();

        let archmage = registry.get("Archmage").unwrap();
        assert_eq!(archmage.lineage(), ["Archmage", "Mage", "Hero"]);
        assert_eq!(archmage.layout(), ["name", "level", "spell", "tower"]);
        assert_eq!(registry.resolve("Archmage", "greet").unwrap(), "Hero");
        assert_eq!(registry.resolve("Lich", "greet").unwrap(), "Lich");

        let lich = registry
            .instantiate(
                "Lich",
                &args([
                    Value::from("Vex"),
                    Value::from(20),
                    Value::from("Finger of Death"),
                    Value::from("the Spire"),
                ]),
            )
            .unwrap();
        assert_eq!(
            registry.invoke(&lich, "greet", &[]).unwrap(),
            Value::from("Vex rasps from the Spire.")
        );

        // Table lookup and chain walk agree.
        for name in ["Hero", "Mage", "Archmage", "Lich"] {
            let chain = registry.resolution_chain(name, "greet").unwrap();
            let last = chain.last().unwrap();
            assert!(last.defines);
            assert_eq!(registry.resolve(name, "greet").unwrap(), last.blueprint);
        }
    }

    #[test]
    fn test_custom_initializer_chains_parent() {
        let registry = tutorial();
        registry
            .declare_with(
                Declaration::new(BlueprintDef::new("Necromancer").extends("Mage").with_field("minions"))
                    .initializer(|c, args| {
                        c.init_parent(&args[..3])?;
                        c.set("minions", args.len() as i64 - 3)
                    }),
            )
            .unwrap();

        let n = registry
            .instantiate(
                "Necromancer",
                &args([
                    Value::from("Mordra"),
                    Value::from(5),
                    Value::from("Raise Dead"),
                    Value::from("skeleton"),
                    Value::from("zombie"),
                ]),
            )
            .unwrap();
        assert_eq!(n.get_str("name"), Some("Mordra"));
        assert_eq!(n.get_str("spell"), Some("Raise Dead"));
        assert_eq!(n.get_i64("minions"), Some(2));
    }

    #[test]
    fn test_skipping_parent_initializer_is_malformed() {
        let registry = tutorial();
        registry
            .declare_with(
                Declaration::new(BlueprintDef::new("Sorcerer").extends("Hero").with_field("spell"))
                    .initializer(|c, args| c.set("spell", args[0].clone())),
            )
            .unwrap();

        assert_eq!(
            registry
                .instantiate("Sorcerer", &args([Value::from("Fireball")]))
                .unwrap_err(),
            BlueprintError::MalformedInitialization {
                blueprint: "Sorcerer".to_string(),
                missing: vec!["name".to_string(), "level".to_string()],
            }
        );
    }

    #[test]
    fn test_inherited_field_before_parent_is_malformed() {
        let registry = tutorial();
        registry
            .declare_with(
                Declaration::new(BlueprintDef::new("Warlock").extends("Hero"))
                    .initializer(|c, _| c.set("name", "Nobody")),
            )
            .unwrap();
        assert!(matches!(
            registry.instantiate("Warlock", &[]),
            Err(BlueprintError::MalformedInitialization { .. })
        ));
    }

    #[test]
    fn test_child_overrides_inherited_value_after_parent() {
        let registry = tutorial();
        registry
            .declare_with(
                Declaration::new(BlueprintDef::new("Apprentice").extends("Mage")).initializer(
                    |c, args| {
                        c.init_parent(args)?;
                        c.set("level", 1)
                    },
                ),
            )
            .unwrap();
        let a = registry
            .instantiate(
                "Apprentice",
                &args([Value::from("Tam"), Value::from(4), Value::from("Light")]),
            )
            .unwrap();
        assert_eq!(a.get_i64("level"), Some(1));
        assert!(matches!(
            registry.instantiate("Apprentice", &args([Value::from("Tam")])),
            Err(BlueprintError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_set_field_outside_layout() {
        let registry = BlueprintRegistry::new();
        registry
            .declare_with(
                Declaration::new(BlueprintDef::new("Hero").with_fields(["name", "level"]))
                    .initializer(|c, _| c.set("mana", 10)),
            )
            .unwrap();

        assert_eq!(
            registry.instantiate("Hero", &[]).unwrap_err(),
            BlueprintError::UnknownField {
                blueprint: "Hero".to_string(),
                field: "mana".to_string()
            }
        );
    }

    #[test]
    fn test_call_parent_from_root_blueprint() {
        let registry = BlueprintRegistry::new();
        registry
            .declare_with(
                Declaration::new(BlueprintDef::new("Hero").with_fields(["name", "level"]))
                    .behavior_fn("greet", |ctx, args| ctx.call_parent(args)),
            )
            .unwrap();

        let varg = registry
            .instantiate("Hero", &args([Value::from("Varg"), Value::from(1)]))
            .unwrap();
        assert_eq!(
            registry.invoke(&varg, "greet", &[]).unwrap_err(),
            BlueprintError::BehaviorNotFound {
                blueprint: "Hero".to_string(),
                behavior: "greet".to_string()
            }
        );
    }

    #[test]
    fn test_is_instance_of() {
        let registry = tutorial();
        let lejon = registry
            .instantiate(
                "Mage",
                &args([Value::from("Lejon"), Value::from(2), Value::from("Magic Missile")]),
            )
            .unwrap();
        assert!(registry.is_instance_of(&lejon, "Mage"));
        assert!(registry.is_instance_of(&lejon, "Hero"));
        assert!(!registry.is_instance_of(&lejon, "Rogue"));
    }

    #[test]
    fn test_subscribe_to_declarations() {
        let registry = BlueprintRegistry::new();
        let mut rx = registry.subscribe();

        registry.declare(hero()).unwrap();
        registry.declare(mage()).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            BlueprintChange::Declared { name: "Hero".into(), parent: None }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            BlueprintChange::Declared { name: "Mage".into(), parent: Some("Hero".into()) }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_snapshot_in_declaration_order() {
        let registry = tutorial();
        let snapshot = registry.snapshot();
        let names: Vec<_> = snapshot.blueprints.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Hero", "Mage"]);
        assert_eq!(registry.names(), ["Hero", "Mage"]);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["blueprints"][1]["extends"], "Hero");
    }

    #[test]
    fn test_behaviors_listing() {
        let registry = tutorial();
        registry
            .declare_with(
                Declaration::new(BlueprintDef::new("Cleric").extends("Hero"))
                    .behavior_fn("heal", |ctx, _| Ok(Value::from(format!("{} heals.", ctx.field_str("name")?)))),
            )
            .unwrap();
        let cleric = registry.get("Cleric").unwrap();
        assert_eq!(
            cleric.behaviors(),
            vec![
                ("greet".to_string(), "Hero".to_string()),
                ("heal".to_string(), "Cleric".to_string()),
            ]
        );
        assert!(cleric.defines("heal"));
        assert!(!cleric.defines("greet"));
    }
}
