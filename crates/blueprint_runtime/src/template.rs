//! Template behaviors
//!
//! A template such as `"{name} says hello."` is parsed once, when its
//! blueprint is declared, and rendered from the invoking instance's fields.
//! `{{` and `}}` produce literal braces.

use blueprint_types::{BlueprintError, Value};

use crate::behavior::{Behavior, BehaviorContext};

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A behavior that formats instance fields into a string
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateBehavior {
    source: String,
    segments: Vec<Segment>,
}

impl TemplateBehavior {
    /// Parse a template, returning a human-readable reason on failure
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(format!("unclosed '{{' at offset {pos}"));
                    }
                    let name = name.trim();
                    if name.is_empty() || name.contains('{') {
                        return Err(format!("invalid placeholder at offset {pos}"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(name.to_string()));
                }
                '}' => return Err(format!("unmatched '}}' at offset {pos}")),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Field names referenced by the template, in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

impl Behavior for TemplateBehavior {
    fn invoke(&self, ctx: &BehaviorContext<'_>, _args: &[Value]) -> Result<Value, BlueprintError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => out.push_str(&ctx.field(name)?.to_string()),
            }
        }
        Ok(Value::String(out))
    }
}
