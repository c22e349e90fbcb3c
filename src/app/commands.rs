//! Command Dispatch
//!
//! Parses REPL lines into commands and runs them against an `AppContext`.
//! Dispatch never exits the process; it hands back a `Flow` for the loop.

use std::io::Write;
use std::ops::ControlFlow;

use serde::Deserialize;

use crate::app::AppContext;
use crate::error::CommandError;

/// Name and description of every command, in help order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("help", "Displays a help message"),
    ("exit", "Exit the Pokedex"),
    ("pokedex", "Displays the names of caught Pokemon"),
    (
        "inspect",
        "Display the name, height, weight, stats and type(s) of a caught Pokemon",
    ),
];

/// A parsed REPL command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Pokedex,
    Inspect(String),
}

/// What the host loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    ///
    /// Input is case-insensitive; extra arguments are ignored.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim().to_lowercase();
        let mut words = line.split_whitespace();

        let Some(name) = words.next() else {
            return Ok(None);
        };

        let command = match name {
            "help" => Command::Help,
            "exit" => Command::Exit,
            "pokedex" => Command::Pokedex,
            "inspect" => {
                let target = words.next().ok_or(CommandError::MissingArgument("inspect"))?;
                Command::Inspect(target.to_string())
            }
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

// == Stored Record ==
/// The subset of a caught Pokemon record the inspect command prints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PokemonRecord {
    name: String,
    height: u32,
    weight: u32,
    stats: Vec<StatSlot>,
    types: Vec<TypeSlot>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatSlot {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NamedResource {
    name: String,
}

/// Runs `command`, writing user-facing text to `out`.
pub async fn dispatch<W: Write>(
    ctx: &AppContext,
    command: Command,
    out: &mut W,
) -> Result<Flow, CommandError> {
    match command {
        Command::Help => {
            writeln!(out, "\nWelcome to the Pokedex!")?;
            writeln!(out, "Usage:")?;
            for (name, description) in COMMANDS {
                writeln!(out, "{}: {}", name, description)?;
            }
        }
        Command::Exit => {
            writeln!(out, "Exiting REPL...")?;
            return Ok(Flow::Exit);
        }
        Command::Pokedex => {
            let prefix = ctx.config().durable_prefix.as_str();
            let mut names = Vec::new();
            ctx.cache()
                .iterate(|key, _| {
                    if let Some(name) = key.strip_prefix(prefix) {
                        names.push(name.to_string());
                    }
                    ControlFlow::Continue(())
                })
                .await;
            names.sort();

            writeln!(out, "Your Pokedex:")?;
            for name in names {
                writeln!(out, " - {}", name)?;
            }
        }
        Command::Inspect(name) => {
            let Some(data) = ctx.cache().get(&ctx.durable_key(&name)).await else {
                writeln!(out, "You have not caught {}.", name)?;
                return Ok(Flow::Continue);
            };
            let record: PokemonRecord = serde_json::from_slice(&data)
                .map_err(|source| CommandError::Record { name, source })?;
            write_record(out, &record)?;
        }
    }
    Ok(Flow::Continue)
}

fn write_record<W: Write>(out: &mut W, record: &PokemonRecord) -> std::io::Result<()> {
    writeln!(out, "Name: {}", record.name)?;
    writeln!(out, "Height: {}", record.height)?;
    writeln!(out, "Weight: {}", record.weight)?;
    writeln!(out, "Stats:")?;
    for slot in &record.stats {
        writeln!(out, "  -{}: {}", slot.stat.name, slot.base_stat)?;
    }
    writeln!(out, "Types:")?;
    for slot in &record.types {
        writeln!(out, "  - {}", slot.kind.name)?;
    }
    Ok(())
}
