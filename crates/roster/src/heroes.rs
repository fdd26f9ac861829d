//! Hero and Mage, written both ways
//!
//! The static rendition is plain Rust: a struct per blueprint, embedding for
//! inheritance and a trait default method for the shared behavior. The dynamic
//! rendition declares the same two blueprints into a `BlueprintRegistry`.

use std::ops::Deref;

use blueprint_runtime::BlueprintRegistry;
use blueprint_types::{BehaviorDef, BlueprintDef, BlueprintError, Field, Instance, Value};

/// Template shared by `Greet::greet` and the dynamic `greet` behavior
pub const GREETING: &str = "{name} says hello.";

// ─────────────────────────────────────────────────────────────────────────────
// Static Blueprints
// ─────────────────────────────────────────────────────────────────────────────

/// Anything with a name can greet
pub trait Greet {
    fn name(&self) -> &str;

    fn greet(&self) -> String {
        format!("{} says hello.", self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hero {
    pub name: String,
    pub level: u32,
}

impl Hero {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field {
                name: "name".to_string(),
                value: Value::from(self.name.as_str()),
            },
            Field {
                name: "level".to_string(),
                value: Value::from(self.level),
            },
        ]
    }

    /// The same state as a dynamic `Hero` instance
    pub fn to_instance(&self) -> Instance {
        Instance::from_fields("Hero", self.fields())
    }
}

impl Greet for Hero {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A Hero with a spell
///
/// The embedded `Hero` is built first, then the spell is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Mage {
    hero: Hero,
    pub spell: String,
}

impl Mage {
    pub fn new(name: impl Into<String>, level: u32, spell: impl Into<String>) -> Self {
        let hero = Hero::new(name, level);
        Self {
            hero,
            spell: spell.into(),
        }
    }

    pub fn to_instance(&self) -> Instance {
        let mut fields = self.hero.fields();
        fields.push(Field {
            name: "spell".to_string(),
            value: Value::from(self.spell.as_str()),
        });
        Instance::from_fields("Mage", fields)
    }
}

impl Deref for Mage {
    type Target = Hero;

    fn deref(&self) -> &Hero {
        &self.hero
    }
}

impl Greet for Mage {
    fn name(&self) -> &str {
        &self.hero.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dynamic Blueprints
// ─────────────────────────────────────────────────────────────────────────────

pub fn hero_blueprint() -> BlueprintDef {
    BlueprintDef::new("Hero")
        .with_fields(["name", "level"])
        .with_behavior(BehaviorDef::template("greet", GREETING))
        .with_description("An adventurer with a name and a level")
}

pub fn mage_blueprint() -> BlueprintDef {
    BlueprintDef::new("Mage")
        .extends("Hero")
        .with_field("spell")
        .with_description("A Hero who knows a spell")
}

/// Varg, level 1
pub fn varg() -> Hero {
    Hero::new("Varg", 1)
}

/// Lejon, level 2, knows Magic Missile
pub fn lejon() -> Mage {
    Mage::new("Lejon", 2, "Magic Missile")
}

/// Declare Hero, then Mage
pub fn declare(registry: &BlueprintRegistry) -> Result<(), BlueprintError> {
    registry.declare(hero_blueprint())?;
    registry.declare(mage_blueprint())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_hero() {
        let varg = Hero::new("Varg", 1);
        assert_eq!(varg.greet(), "Varg says hello.");
        assert_eq!(varg.greet(), varg.greet());
    }

    #[test]
    fn test_static_mage_inherits() {
        let lejon = Mage::new("Lejon", 2, "Magic Missile");
        assert_eq!(lejon.name, "Lejon");
        assert_eq!(lejon.level, 2);
        assert_eq!(lejon.spell, "Magic Missile");
        assert_eq!(lejon.greet(), "Lejon says hello.");
    }

    #[test]
    fn test_static_shadowing() {
        struct Warlock(Hero);
        impl Greet for Warlock {
            fn name(&self) -> &str {
                &self.0.name
            }
            fn greet(&self) -> String {
                format!("{} whispers.", self.name())
            }
        }

        let w = Warlock(Hero::new("Nyx", 3));
        assert_eq!(w.greet(), "Nyx whispers.");
        assert_eq!(Hero::new("Nyx", 3).greet(), "Nyx says hello.");
    }

    #[test]
    fn test_static_and_dynamic_agree() {
        let registry = BlueprintRegistry::new();
        declare(&registry).unwrap();

        let varg = Hero::new("Varg", 1);
        let dyn_varg = registry
            .instantiate("Hero", &[Value::from("Varg"), Value::from(1)])
            .unwrap();
        assert!(varg.to_instance().same_state(&dyn_varg));
        assert_eq!(
            registry.invoke(&dyn_varg, "greet", &[]).unwrap(),
            Value::from(varg.greet())
        );

        let lejon = Mage::new("Lejon", 2, "Magic Missile");
        let dyn_lejon = registry
            .instantiate(
                "Mage",
                &[Value::from("Lejon"), Value::from(2), Value::from("Magic Missile")],
            )
            .unwrap();
        assert!(lejon.to_instance().same_state(&dyn_lejon));
        assert_eq!(
            registry.invoke(&dyn_lejon, "greet", &[]).unwrap(),
            Value::from(lejon.greet())
        );
    }
}
