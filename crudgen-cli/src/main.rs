//! crudgen CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{GenerateArgs, GenerateCommand, ImportArgs, ImportCommand};
use crudgen::config::{CrudgenConfig, CONFIG_FILE};
use crudgen_cli::observability;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crudgen")]
#[command(version)]
#[command(about = "CRUD code generator for GoFrame projects backed by MySQL", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import table definitions from a MySQL schema
    Import(ImportArgs),
    /// Generate code from table definitions
    Generate(GenerateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    observability::init(cli.verbose)?;

    let config = CrudgenConfig::load_from(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Import(args) => {
            ImportCommand::new(args.apply(config.import)).execute().await?;
        }
        Commands::Generate(args) => {
            GenerateCommand::new(args.apply(config.generate)).execute().await?;
        }
    }

    Ok(())
}
