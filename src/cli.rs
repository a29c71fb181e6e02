//! Command-line interface definitions and command handlers.
//!
//! Handlers write their results to any [`Write`] so the binary can hand
//! them stdout while tests capture a buffer.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::interpreter::Interpreter;
use crate::locator::{Located, Locator};
use crate::randomizer::Randomizer;

/// Hierarchical address resolver for the Library of Babel
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: holotheca.toml)
    #[arg(short = 'C', long, global = true, default_value = "holotheca.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve references to addresses, or to text for ranged references
    #[command(visible_alias = "l")]
    Locate {
        /// References such as `2abz0.2.4.5.12` or `2abz0.2.4.5.12.[5-28,30]`
        #[arg(value_name = "REFERENCE", required = true)]
        references: Vec<String>,
    },

    /// Print a random address
    #[command(visible_alias = "r")]
    Random {
        /// Levels below the root (default: the leaf)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Seed for a reproducible address
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Run a reference program; `-` reads it from stdin
    Run {
        #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_locate(&self) -> bool {
        matches!(self.command, Commands::Locate { .. })
    }
    pub const fn is_random(&self) -> bool {
        matches!(self.command, Commands::Random { .. })
    }
    pub const fn is_run(&self) -> bool {
        matches!(self.command, Commands::Run { .. })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `holotheca locate`
pub fn locate(locator: &Locator, references: &[String], out: &mut impl Write) -> Result<()> {
    for reference in references {
        let located = locator
            .call(reference)
            .with_context(|| format!("failed to locate `{reference}`"))?;
        match located {
            Located::Address(address) => {
                writeln!(out, "{address}")?;
                writeln!(out, "{}", address.to_url())?;
            }
            Located::Text(text) => writeln!(out, "{text}")?,
        }
    }
    Ok(())
}

/// `holotheca random`
pub fn random(
    locator: &Locator,
    depth: Option<usize>,
    seed: Option<u64>,
    out: &mut impl Write,
) -> Result<()> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut randomizer = Randomizer::new(locator.clone(), rng);
    let address = match depth {
        Some(depth) => randomizer.address(depth),
        None => randomizer.leaf(),
    }
    .context("failed to build a random address")?;

    writeln!(out, "{address}")?;
    writeln!(out, "{}", address.to_url())?;
    Ok(())
}

/// `holotheca run`
pub fn run(locator: &Locator, file: &Path, out: &mut impl Write) -> Result<()> {
    let program = read_program(file)?;
    let output = Interpreter::new(locator.clone())
        .run(&program)
        .with_context(|| format!("failed to run `{}`", file.display()))?;
    out.write_all(output.as_bytes())?;
    Ok(())
}

fn read_program(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut program = String::new();
        io::stdin()
            .read_to_string(&mut program)
            .context("failed to read program from stdin")?;
        return Ok(program);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read `{}`", file.display()))
}
