//! Roster CLI
//!
//! Prints blueprint instances, their behavior resolution, and the static vs
//! dynamic comparison of the Hero/Mage tutorial.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use roster::{Format, RosterFile, render, report};

/// Blueprint roster viewer
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "Inspect blueprints, instances and behavior resolution", long_about = None)]
struct Args {
    /// Roster file to load (defaults to the built-in Hero/Mage tutorial)
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log declarations and lookups to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Print each instance with its fields and invoked behaviors
    Show,
    /// Print each blueprint's lineage, layout and resolved behaviors
    Describe,
    /// Build the tutorial with plain structs and with blueprints, and compare
    Compare,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "roster=debug,blueprint_runtime=debug"
    } else {
        "roster=info,blueprint_runtime=info"
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = args.command.unwrap_or(Command::Show);
    debug!(?command, roster = ?args.roster, "starting");

    let output = match command {
        Command::Compare => render(&report::compare()?, args.format)?,
        Command::Show | Command::Describe => {
            let file = match &args.roster {
                Some(path) => RosterFile::load(path)?,
                None => RosterFile::tutorial(),
            };
            let roster = file.build()?;
            if command == Command::Show {
                render(&report::show(&roster), args.format)?
            } else {
                render(&report::describe(&roster.registry), args.format)?
            }
        }
    };

    println!("{output}");
    Ok(())
}
