//! Roster - Blueprint tutorial library
//!
//! Builds rosters of blueprints and instances (from a TOML file or the
//! built-in Hero/Mage tutorial) and renders them for the console.

pub mod config;
pub mod heroes;
pub mod report;

use serde::Serialize;

pub use config::{Roster, RosterFile};

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Render a list of reports as text blocks or a JSON array
pub fn render<T>(reports: &[T], format: Format) -> anyhow::Result<String>
where
    T: Serialize + std::fmt::Display,
{
    Ok(match format {
        Format::Text => reports
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        Format::Json => serde_json::to_string_pretty(reports)?,
    })
}
