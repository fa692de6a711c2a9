use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use wpkernel_core::DiskFileSystem;

use super::ConfigArg;
use crate::{
    ops::{GenerateOptions, generate},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Plugin root the generated files are written below (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Preview generated code without writing to disk
    #[arg(long)]
    pub dry_run: bool,

    /// Regenerate even when the manifest records the current IR
    #[arg(short, long)]
    pub force: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let loaded = self.config.load();
        let report = generate(
            &loaded,
            &DiskFileSystem,
            GenerateOptions {
                output_dir: &self.output,
                dry_run: self.dry_run,
                force: self.force,
            },
        )?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
