//! Check command report data structures.

use std::path::PathBuf;

use serde::Serialize;

use super::output::{Output, Report};

/// Report data from model validation.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Path to the model file.
    pub model_path: PathBuf,
    /// Declared schema name, if any.
    pub schema_name: Option<String>,
    pub tables: usize,
    pub enums: usize,
    pub procedures: usize,
    /// Validation error messages.
    pub errors: Vec<String>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.warning(&format!("error: {}", error));
        }

        if !self.errors.is_empty() {
            out.newline();
            out.preformatted(&format!(
                "{} error(s) in {}",
                self.errors.len(),
                self.model_path.display()
            ));
            return;
        }

        out.preformatted(&format!("✓ {} is valid", self.model_path.display()));
        if let Some(name) = &self.schema_name {
            out.preformatted(&format!("  schema {}", name));
        }
        out.preformatted(&format!(
            "  {} table(s), {} enum(s), {} stored procedure(s)",
            self.tables, self.enums, self.procedures
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid() {
        let report = CheckReport {
            model_path: PathBuf::from("model.py"),
            schema_name: Some("Sales".to_string()),
            tables: 2,
            enums: 1,
            procedures: 0,
            errors: Vec::new(),
        };
        assert!(report.is_valid());
    }

    #[test]
    fn test_serializes_to_json() {
        let report = CheckReport {
            model_path: PathBuf::from("model.py"),
            schema_name: None,
            tables: 0,
            enums: 0,
            procedures: 0,
            errors: vec!["schema name is required".to_string()],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errors"][0], "schema name is required");
        assert_eq!(json["schema_name"], serde_json::Value::Null);
    }
}
