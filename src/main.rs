//! Holotheca command-line entry point.

use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};

use holotheca::cli::{self, Cli, Commands};
use holotheca::config::HolothecaConfig;
use holotheca::{log, logger};

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    if let Err(err) = run(&cli) {
        log!("error"; "{:#}", err);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = HolothecaConfig::load(&cli.config).context("failed to load config")?;
    let locator = config
        .locator(config.content_provider())
        .context("invalid hierarchy configuration")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Commands::Locate { references } => cli::locate(&locator, references, &mut out)?,
        Commands::Random { depth, seed } => cli::random(&locator, *depth, *seed, &mut out)?,
        Commands::Run { file } => cli::run(&locator, file, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
