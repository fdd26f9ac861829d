//! Console reports
//!
//! Reports are plain serializable structs. Text output goes through their
//! `Display` impls; JSON output serializes them directly.

use std::fmt;

use serde::Serialize;

use blueprint_runtime::{BlueprintRegistry, ResolutionStep};
use blueprint_types::{Field, Instance, Value};

use crate::config::Roster;
use crate::heroes::{self, Greet};

// ─────────────────────────────────────────────────────────────────────────────
// Instance Reports
// ─────────────────────────────────────────────────────────────────────────────

/// Result of invoking one behavior
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Value(Value),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallReport {
    pub behavior: String,
    pub chain: Vec<ResolutionStep>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceReport {
    pub blueprint: String,
    pub fields: Vec<Field>,
    pub calls: Vec<CallReport>,
}

impl InstanceReport {
    pub fn build(registry: &BlueprintRegistry, instance: &Instance, invoke: &[String]) -> Self {
        let calls = invoke
            .iter()
            .map(|behavior| {
                let (chain, outcome) =
                    match registry.resolution_chain(&instance.blueprint, behavior) {
                        Ok(chain) => {
                            let outcome = match registry.invoke(instance, behavior, &[]) {
                                Ok(value) => Outcome::Value(value),
                                Err(e) => Outcome::Error(e.to_string()),
                            };
                            (chain, outcome)
                        }
                        Err(e) => (Vec::new(), Outcome::Error(e.to_string())),
                    };
                CallReport {
                    behavior: behavior.clone(),
                    chain,
                    outcome,
                }
            })
            .collect();

        Self {
            blueprint: instance.blueprint.clone(),
            fields: instance.iter().cloned().collect(),
            calls,
        }
    }
}

impl fmt::Display for InstanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.blueprint)?;
        let width = self.fields.iter().map(|fd| fd.name.len()).max().unwrap_or(0);
        for field in &self.fields {
            writeln!(f, "  {:width$} = {}", field.name, field.value)?;
        }
        for call in &self.calls {
            let chain: Vec<String> = call
                .chain
                .iter()
                .map(|step| {
                    if step.defines {
                        format!("{}*", step.blueprint)
                    } else {
                        step.blueprint.clone()
                    }
                })
                .collect();
            write!(f, "  {}()", call.behavior)?;
            if !chain.is_empty() {
                write!(f, " via {}", chain.join(" -> "))?;
            }
            match &call.outcome {
                Outcome::Value(v) => writeln!(f, " => {v}")?,
                Outcome::Error(e) => writeln!(f, " failed: {e}")?,
            }
        }
        Ok(())
    }
}

/// Reports for every member of a roster
pub fn show(roster: &Roster) -> Vec<InstanceReport> {
    roster
        .members
        .iter()
        .map(|m| InstanceReport::build(&roster.registry, &m.instance, &m.invoke))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Blueprint Reports
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviorSource {
    pub name: String,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintReport {
    pub name: String,
    pub lineage: Vec<String>,
    pub layout: Vec<String>,
    pub behaviors: Vec<BehaviorSource>,
}

impl fmt::Display for BlueprintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.lineage.join(" : "))?;
        writeln!(f, "  fields:    {}", self.layout.join(", "))?;
        let behaviors: Vec<String> = self
            .behaviors
            .iter()
            .map(|b| format!("{} (from {})", b.name, b.owner))
            .collect();
        writeln!(f, "  behaviors: {}", behaviors.join(", "))
    }
}

/// Reports for every declared blueprint, in declaration order
pub fn describe(registry: &BlueprintRegistry) -> Vec<BlueprintReport> {
    registry
        .names()
        .iter()
        .filter_map(|name| registry.get(name))
        .map(|bp| BlueprintReport {
            name: bp.name().to_string(),
            lineage: bp.lineage().to_vec(),
            layout: bp.layout().to_vec(),
            behaviors: bp
                .behaviors()
                .into_iter()
                .map(|(name, owner)| BehaviorSource { name, owner })
                .collect(),
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Static vs Dynamic
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub blueprint: String,
    pub static_greeting: String,
    pub dynamic_greeting: Option<String>,
    pub same_fields: bool,
}

impl Comparison {
    pub fn agrees(&self) -> bool {
        self.same_fields && self.dynamic_greeting.as_deref() == Some(self.static_greeting.as_str())
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<5} static: {:<20} dynamic: {:<20} {}",
            self.blueprint,
            self.static_greeting,
            self.dynamic_greeting.as_deref().unwrap_or("<none>"),
            if self.agrees() { "ok" } else { "MISMATCH" }
        )
    }
}

fn compare_one(
    registry: &BlueprintRegistry,
    static_instance: Instance,
    static_greeting: String,
    args: &[Value],
) -> anyhow::Result<Comparison> {
    let dynamic = registry.instantiate(&static_instance.blueprint, args)?;
    let dynamic_greeting = registry
        .invoke(&dynamic, "greet", &[])?
        .as_str()
        .map(str::to_string);
    Ok(Comparison {
        blueprint: static_instance.blueprint.clone(),
        static_greeting,
        dynamic_greeting,
        same_fields: static_instance.same_state(&dynamic),
    })
}

/// Build the tutorial scenario both ways and compare
pub fn compare() -> anyhow::Result<Vec<Comparison>> {
    let registry = BlueprintRegistry::new();
    heroes::declare(&registry)?;

    let varg = heroes::varg();
    let lejon = heroes::lejon();

    Ok(vec![
        compare_one(
            &registry,
            varg.to_instance(),
            varg.greet(),
            &[Value::from("Varg"), Value::from(1)],
        )?,
        compare_one(
            &registry,
            lejon.to_instance(),
            lejon.greet(),
            &[Value::from("Lejon"), Value::from(2), Value::from("Magic Missile")],
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterFile;
    use crate::heroes::Hero;

    #[test]
    fn test_show_tutorial_text() {
        let roster = RosterFile::tutorial().build().unwrap();
        let text: String = show(&roster).iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            "Hero\n  name  = Varg\n  level = 1\n  greet() via Hero* => Varg says hello.\n\
             Mage\n  name  = Lejon\n  level = 2\n  spell = Magic Missile\n  greet() via Mage -> Hero* => Lejon says hello.\n"
        );
    }

    #[test]
    fn test_show_json_shape() {
        let roster = RosterFile::tutorial().build().unwrap();
        let json = serde_json::to_value(show(&roster)).unwrap();
        assert_eq!(json[1]["fields"][2]["value"], "Magic Missile");
        assert_eq!(json[1]["calls"][0]["outcome"]["value"], "Lejon says hello.");
        assert_eq!(json[1]["calls"][0]["chain"][1]["blueprint"], "Hero");
    }

    #[test]
    fn test_missing_behavior_reported() {
        let roster = RosterFile::tutorial().build().unwrap();
        let report = InstanceReport::build(
            &roster.registry,
            &roster.members[0].instance,
            &["cast".to_string()],
        );
        assert!(matches!(report.calls[0].outcome, Outcome::Error(_)));
        assert!(report.to_string().contains("cast() via Hero failed"));
    }

    #[test]
    fn test_unknown_blueprint_reported_as_error() {
        let registry = BlueprintRegistry::new();
        let stray = Hero::new("Varg", 1).to_instance();
        let report = InstanceReport::build(&registry, &stray, &["greet".to_string()]);

        assert!(report.calls[0].chain.is_empty());
        assert_eq!(
            report.calls[0].outcome,
            Outcome::Error("Blueprint not found: Hero".to_string())
        );
        assert!(report.to_string().contains("  greet() failed: Blueprint not found: Hero\n"));
    }

    #[test]
    fn test_describe() {
        let roster = RosterFile::tutorial().build().unwrap();
        let reports = describe(&roster.registry);
        assert_eq!(reports[1].lineage, ["Mage", "Hero"]);
        assert_eq!(reports[1].layout, ["name", "level", "spell"]);
        assert_eq!(
            reports[1].behaviors,
            vec![BehaviorSource { name: "greet".into(), owner: "Hero".into() }]
        );
        assert_eq!(
            reports[1].to_string(),
            "Mage : Hero\n  fields:    name, level, spell\n  behaviors: greet (from Hero)\n"
        );
    }

    #[test]
    fn test_compare_agrees() {
        let rows = compare().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(Comparison::agrees));
        assert_eq!(rows[1].static_greeting, "Lejon says hello.");
    }
}
