mod check;
mod completions;
mod db_name;
mod enum_usage;
mod generate;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use db_name::DbNameCommand;
use enum_usage::EnumUsageCommand;
use eyre::Result;
use generate::GenerateCommand;

/// Extension trait for exiting on model errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for ogma_model::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "ogma")]
#[command(version)]
#[command(about = "A database access code generator for Java")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::EnumUsage(cmd) => cmd.run(),
            Commands::DbName(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate database code from a model file
    Generate(GenerateCommand),

    /// Validate a model file without generating code
    Check(CheckCommand),

    /// Report which tables and columns use each enum
    EnumUsage(EnumUsageCommand),

    /// Get a unique database name (for temp db)
    DbName(DbNameCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
