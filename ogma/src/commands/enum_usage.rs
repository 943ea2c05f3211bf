use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use ogma_model::load_model;

use super::UnwrapOrExit;
use crate::ops;
use crate::reports::{Report, TerminalOutput};

#[derive(Args)]
pub struct EnumUsageCommand {
    /// The file with the DB model
    #[arg(value_name = "MODEL_FILE")]
    pub model_file: PathBuf,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl EnumUsageCommand {
    /// Run the enum-usage command
    pub fn run(&self) -> Result<()> {
        let schema = load_model(&self.model_file).unwrap_or_exit();
        let report = ops::enum_usage(&schema);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            report.render(&mut TerminalOutput::new());
        }
        Ok(())
    }
}
