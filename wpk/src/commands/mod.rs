mod check;
mod completions;
mod generate;
mod ir;

use std::path::PathBuf;

use check::CheckCommand;
use clap::{Args, Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use generate::GenerateCommand;
use ir::IrCommand;
use wpkernel_config::LoadedConfig;

use crate::logger;

/// Extension trait for exiting on config errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for wpkernel_config::Result<T> {
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

/// Config file argument shared by every command that reads one.
#[derive(Args)]
pub struct ConfigArg {
    /// Path to the kernel config (.toml or .json)
    #[arg(short, long, default_value = "wpk.config.toml")]
    pub config: PathBuf,
}

impl ConfigArg {
    pub fn load(&self) -> LoadedConfig {
        wpkernel_config::load(&self.config).unwrap_or_exit()
    }
}

#[derive(Parser)]
#[command(name = "wpk")]
#[command(version)]
#[command(about = "Generate WordPress REST controllers from a WPKernel config")]
pub(crate) struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        logger::init(logger::level_filter(self.verbose, self.quiet));

        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Ir(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate PHP controllers from the kernel config
    Generate(GenerateCommand),

    /// Validate the kernel config without writing anything
    Check(CheckCommand),

    /// Print the intermediate representation as JSON
    Ir(IrCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
