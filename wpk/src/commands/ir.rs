use clap::Args;
use eyre::Result;

use super::ConfigArg;
use crate::ops::ir_json;

#[derive(Args)]
pub struct IrCommand {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Pretty-print the JSON
    #[arg(long)]
    pub pretty: bool,
}

impl IrCommand {
    pub fn run(&self) -> Result<()> {
        let loaded = self.config.load();
        println!("{}", ir_json(&loaded, self.pretty)?);
        Ok(())
    }
}
