//! Check operation - model validation.

use std::path::Path;

use ogma_model::{Schema, validate};

use crate::reports::CheckReport;

/// Validate a loaded model and summarize the outcome.
pub fn check(schema: &Schema, model_path: &Path) -> CheckReport {
    let violations = validate(schema);

    CheckReport {
        model_path: model_path.to_path_buf(),
        schema_name: schema.name.clone(),
        tables: schema.tables.len(),
        enums: schema.enums.len(),
        procedures: schema.procedures.len(),
        errors: violations.iter().map(|v| v.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogma_model::parse_model;

    #[test]
    fn test_check_valid_model() {
        let schema = parse_model(
            r#"
Schema("Sales")
Table("t", Column("id", Integer))
"#,
            "model.py",
        )
        .unwrap();
        let report = check(&schema, Path::new("model.py"));
        assert!(report.is_valid());
        assert_eq!(report.tables, 1);
        assert_eq!(report.schema_name.as_deref(), Some("Sales"));
    }

    #[test]
    fn test_check_collects_all_violations() {
        let schema = parse_model(
            r#"
Table("t", Column("state", enums.Missing(), ForeignKey("ghost.id")))
"#,
            "model.py",
        )
        .unwrap();
        let report = check(&schema, Path::new("model.py"));
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 3);
    }
}
