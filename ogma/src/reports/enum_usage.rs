//! Enum-usage command report data structures.

use serde::Serialize;

use super::output::{Output, Report};

/// The usage sites of one enum.
#[derive(Debug, Serialize)]
pub struct EnumUsage {
    pub name: String,
    /// `table.column` sites, ordered by table then column.
    pub sites: Vec<String>,
}

/// Report data mapping each used enum to its columns.
#[derive(Debug, Serialize)]
pub struct EnumUsageReport {
    pub enums: Vec<EnumUsage>,
}

impl Report for EnumUsageReport {
    fn render(&self, out: &mut dyn Output) {
        if self.enums.is_empty() {
            out.preformatted("No enums found in the given model");
            return;
        }

        for usage in &self.enums {
            out.section(&format!("Enum: {}", usage.name));
            for site in &usage.sites {
                out.list_item(site);
            }
        }
    }
}
