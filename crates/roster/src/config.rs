//! Roster Configuration Types
//!
//! A roster file declares blueprints and the instances to build from them.
//!
//! ```toml
//! [[blueprint]]
//! name = "Hero"
//! fields = ["name", "level"]
//! [blueprint.behaviors]
//! greet = "{name} says hello."
//!
//! [[instance]]
//! blueprint = "Hero"
//! args = ["Varg", 1]
//! invoke = ["greet"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use blueprint_runtime::BlueprintRegistry;
use blueprint_types::{BehaviorDef, BlueprintDef, Instance, Value};

use crate::heroes;

/// Roster file (roster.toml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterFile {
    #[serde(default, rename = "blueprint")]
    pub blueprints: Vec<BlueprintEntry>,
    #[serde(default, rename = "instance")]
    pub instances: Vec<InstanceEntry>,
}

/// A `[[blueprint]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintEntry {
    pub name: String,
    pub extends: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    /// Behavior name to template
    #[serde(default)]
    pub behaviors: BTreeMap<String, String>,
    pub description: Option<String>,
}

/// An `[[instance]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceEntry {
    pub blueprint: String,
    #[serde(default)]
    pub args: Vec<Value>,
    /// Behaviors to invoke when reporting
    #[serde(default)]
    pub invoke: Vec<String>,
}

impl From<&BlueprintEntry> for BlueprintDef {
    fn from(entry: &BlueprintEntry) -> Self {
        let mut def = BlueprintDef::new(&entry.name).with_fields(entry.fields.iter().cloned());
        def.parent = entry.extends.clone();
        def.description = entry.description.clone();
        for (name, template) in &entry.behaviors {
            def = def.with_behavior(BehaviorDef::template(name, template));
        }
        def
    }
}

/// Template behaviors carry over; native ones have no file form and are skipped.
impl From<&BlueprintDef> for BlueprintEntry {
    fn from(def: &BlueprintDef) -> Self {
        Self {
            name: def.name.clone(),
            extends: def.parent.clone(),
            fields: def.fields.iter().map(|f| f.name.clone()).collect(),
            behaviors: def
                .behaviors
                .iter()
                .filter_map(|b| Some((b.name.clone(), b.template.clone()?)))
                .collect(),
            description: def.description.clone(),
        }
    }
}

impl InstanceEntry {
    /// Positional args that rebuild `instance`'s field values
    pub fn from_instance(instance: &Instance, invoke: Vec<String>) -> Self {
        Self {
            blueprint: instance.blueprint.clone(),
            args: instance.iter().map(|f| f.value.clone()).collect(),
            invoke,
        }
    }
}

impl RosterFile {
    /// Read and parse a roster file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read roster {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid roster {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// The Hero/Mage roster used when no file is given
    pub fn tutorial() -> Self {
        let greet = vec!["greet".to_string()];
        Self {
            blueprints: vec![
                BlueprintEntry::from(&heroes::hero_blueprint()),
                BlueprintEntry::from(&heroes::mage_blueprint()),
            ],
            instances: vec![
                InstanceEntry::from_instance(&heroes::varg().to_instance(), greet.clone()),
                InstanceEntry::from_instance(&heroes::lejon().to_instance(), greet),
            ],
        }
    }

    /// Declare every blueprint and build every instance, in file order
    pub fn build(&self) -> Result<Roster> {
        let registry = BlueprintRegistry::new();
        for entry in &self.blueprints {
            registry
                .declare(BlueprintDef::from(entry))
                .with_context(|| format!("cannot declare blueprint {}", entry.name))?;
        }

        let mut members = Vec::with_capacity(self.instances.len());
        for (index, entry) in self.instances.iter().enumerate() {
            let instance = registry
                .instantiate(&entry.blueprint, &entry.args)
                .with_context(|| format!("cannot build instance #{} ({})", index + 1, entry.blueprint))?;
            members.push(Member {
                instance,
                invoke: entry.invoke.clone(),
            });
        }

        info!(
            blueprints = registry.len(),
            instances = members.len(),
            "roster built"
        );
        Ok(Roster { registry, members })
    }
}

/// An instance and the behaviors to report on
#[derive(Debug, Clone)]
pub struct Member {
    pub instance: Instance,
    pub invoke: Vec<String>,
}

/// A built roster: declared blueprints plus their instances
pub struct Roster {
    pub registry: BlueprintRegistry,
    pub members: Vec<Member>,
}
