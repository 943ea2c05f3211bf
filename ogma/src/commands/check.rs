use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use ogma_model::load_model;

use super::UnwrapOrExit;
use crate::ops;
use crate::reports::{Report, TerminalOutput};

#[derive(Args)]
pub struct CheckCommand {
    /// The file with the DB model
    #[arg(value_name = "MODEL_FILE")]
    pub model_file: PathBuf,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let schema = load_model(&self.model_file).unwrap_or_exit();
        let report = ops::check(&schema, &self.model_file);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            report.render(&mut TerminalOutput::new());
        }

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
