//! Enum-usage operation - which columns use each enum.

use indexmap::IndexMap;
use ogma_codegen::{TypeFamily, type_mappings};
use ogma_model::Schema;

use crate::reports::{EnumUsage, EnumUsageReport};

/// Invert the enum type mappings into an enum -> usage sites report.
///
/// Sites are ordered by table then column name; enums appear in the order
/// of their first usage.
pub fn enum_usage(schema: &Schema) -> EnumUsageReport {
    let mut usages: IndexMap<String, Vec<String>> = IndexMap::new();
    for (table, columns) in type_mappings(schema, &[TypeFamily::Enum]) {
        for (column, enum_name) in columns {
            usages
                .entry(enum_name)
                .or_default()
                .push(format!("{table}.{column}"));
        }
    }

    EnumUsageReport {
        enums: usages
            .into_iter()
            .map(|(name, sites)| EnumUsage { name, sites })
            .collect(),
    }
}
