use clap::Args;
use eyre::Result;

use super::ConfigArg;
use crate::{
    ops::check,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub config: ConfigArg,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let loaded = self.config.load();
        let report = check(&loaded, &self.config.config)?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
