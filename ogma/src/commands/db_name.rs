use clap::Args;
use eyre::Result;
use ogma_model::unique_database_name;

#[derive(Args)]
pub struct DbNameCommand {}

impl DbNameCommand {
    /// Run the db-name command
    pub fn run(&self) -> Result<()> {
        println!("{}", unique_database_name());
        Ok(())
    }
}
