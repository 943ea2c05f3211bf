//! Cross-reference validation of a loaded schema.
//!
//! Structural problems (duplicate names, malformed constructor calls) never
//! reach this module; they fail the load. What remains is reference
//! resolution, and every broken reference is accumulated so the caller sees
//! the full list in one pass instead of the first failure.

use std::fmt;

use super::{Schema, Table, TableConstraint};

/// Category of a validation violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A dangling foreign-key or enum reference.
    Reference,
    /// A missing or malformed schema name.
    SchemaName,
}

/// One problem found while validating a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
    /// Where the problem sits, e.g. `orders.status`.
    pub location: Option<String>,
}

impl Violation {
    fn reference(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Reference,
            message: message.into(),
            location: Some(location.into()),
        }
    }

    fn schema_name(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::SchemaName,
            message: message.into(),
            location: None,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (at {location})")?;
        }
        Ok(())
    }
}

/// Characters that cannot appear in a schema name.
const INVALID_SCHEMA_NAME_CHARS: &str = "-^<>/'\"{}[\\]~`";

/// Validate a loaded schema, accumulating every violation.
///
/// An empty result means the schema is ready for emission.
pub fn validate(schema: &Schema) -> Vec<Violation> {
    let mut violations = Vec::new();

    check_schema_name(schema, &mut violations);

    for table in schema.tables.values() {
        for column in table.columns.values() {
            let location = format!("{}.{}", table.name, column.name);

            if let Some(enum_name) = column.ty.enum_name()
                && !schema.enums.contains_key(enum_name)
            {
                violations.push(Violation::reference(
                    format!(
                        "column '{location}' references undeclared enum '{enum_name}'"
                    ),
                    location.clone(),
                ));
            }

            if let Some(fk) = &column.foreign_key {
                check_fk_target(schema, &fk.target, &location, &mut violations);
            }
        }

        for constraint in &table.constraints {
            check_constraint(schema, table, constraint, &mut violations);
        }

        for index in &table.indexes {
            for column in &index.columns {
                check_local_column(table, column, &index.name, &mut violations);
            }
        }
    }

    violations
}

fn check_schema_name(schema: &Schema, violations: &mut Vec<Violation>) {
    match &schema.name {
        None => violations.push(Violation::schema_name(
            "schema name is required; declare one with Schema(\"name\")",
        )),
        Some(name) => {
            let invalid = name.is_empty()
                || name
                    .chars()
                    .any(|c| c == '.' || INVALID_SCHEMA_NAME_CHARS.contains(c));
            if invalid {
                violations.push(Violation::schema_name(format!(
                    "invalid schema name '{name}': it cannot contain any of .{INVALID_SCHEMA_NAME_CHARS}"
                )));
            }
        }
    }
}

fn check_constraint(
    schema: &Schema,
    table: &Table,
    constraint: &TableConstraint,
    violations: &mut Vec<Violation>,
) {
    match constraint {
        TableConstraint::PrimaryKey { columns } => {
            for column in columns {
                check_local_column(table, column, "primary key", violations);
            }
        }
        TableConstraint::Unique { columns, .. } => {
            for column in columns {
                check_local_column(table, column, "unique constraint", violations);
            }
        }
        TableConstraint::ForeignKey {
            columns, targets, ..
        } => {
            for column in columns {
                check_local_column(table, column, "foreign key", violations);
            }
            for target in targets {
                let location = format!("{}.({})", table.name, columns.join(", "));
                check_fk_target(schema, target, &location, violations);
            }
        }
        // Check expressions are free-form SQL; nothing to resolve.
        TableConstraint::Check { .. } => {}
    }
}

fn check_local_column(
    table: &Table,
    column: &str,
    context: &str,
    violations: &mut Vec<Violation>,
) {
    if table.column(column).is_none() {
        violations.push(Violation::reference(
            format!(
                "{context} on table '{}' names unknown column '{column}'",
                table.name
            ),
            format!("{}.{column}", table.name),
        ));
    }
}

fn check_fk_target(
    schema: &Schema,
    target: &str,
    location: &str,
    violations: &mut Vec<Violation>,
) {
    let Some((table_name, column_name)) = target.split_once('.') else {
        violations.push(Violation::reference(
            format!("foreign key target '{target}' is not of the form 'table.column'"),
            location.to_string(),
        ));
        return;
    };

    match schema.tables.get(table_name) {
        None => violations.push(Violation::reference(
            format!("foreign key at '{location}' references unknown table '{table_name}'"),
            location.to_string(),
        )),
        Some(table) => {
            if table.column(column_name).is_none() {
                violations.push(Violation::reference(
                    format!(
                        "foreign key at '{location}' references unknown column '{table_name}.{column_name}'"
                    ),
                    location.to_string(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_model;

    fn load(src: &str) -> Schema {
        parse_model(src, "model.py").unwrap()
    }

    #[test]
    fn test_valid_schema_has_no_violations() {
        let schema = load(
            r#"
Schema("Sales")
Status = Enum("Status", "OPEN", "CLOSED")
Table("customers", Column("id", BigInteger, primary_key=True))
Table(
    "orders",
    Column("id", BigInteger, primary_key=True),
    Column("customer_id", BigInteger, ForeignKey(tables.customers.id), nullable=False),
    Column("status", Status(), nullable=False),
)
"#,
        );
        assert_eq!(validate(&schema), Vec::new());
    }

    #[test]
    fn test_undeclared_enum_names_the_column() {
        let schema = load(
            r#"
Schema("Sales")
Table("orders", Column("status", enums.Missing(), nullable=False))
"#,
        );
        let violations = validate(&schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::Reference);
        assert!(violations[0].message.contains("orders.status"));
        assert!(violations[0].message.contains("Missing"));
    }

    #[test]
    fn test_dangling_foreign_key_table_and_column() {
        let schema = load(
            r#"
Schema("Sales")
Table("t1", Column("a", Integer, ForeignKey("ghost.id")))
Table("t2", Column("b", Integer, ForeignKey("t1.nope")))
"#,
        );
        let violations = validate(&schema);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("unknown table 'ghost'"));
        assert!(violations[1].message.contains("unknown column 't1.nope'"));
    }

    #[test]
    fn test_all_reference_errors_are_accumulated() {
        let schema = load(
            r#"
Table("orders", Column("status", enums.Missing(), ForeignKey("ghost.id")))
"#,
        );
        // Missing schema name, missing enum, missing FK table: all reported.
        let violations = validate(&schema);
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].kind, ViolationKind::SchemaName);
        assert!(violations.iter().any(|v| v.message.contains("Missing")));
        assert!(violations.iter().any(|v| v.message.contains("ghost")));
    }

    #[test]
    fn test_missing_schema_name() {
        let schema = load(r#"Table("t", Column("a", Integer))"#);
        let violations = validate(&schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::SchemaName);
    }

    #[test]
    fn test_invalid_schema_name_characters() {
        for bad in ["has.dot", "has-dash", "has'quote", ""] {
            let schema = load(&format!("Schema(\"{bad}\")"));
            let violations = validate(&schema);
            assert_eq!(violations.len(), 1, "expected a violation for {bad:?}");
            assert_eq!(violations[0].kind, ViolationKind::SchemaName);
        }
    }

    #[test]
    fn test_constraint_columns_must_exist() {
        let schema = load(
            r#"
Schema("S")
Table(
    "t",
    Column("a", Integer),
    PrimaryKeyConstraint("nope"),
    UniqueConstraint("missing"),
    Index("ix_t", "ghost"),
)
"#,
        );
        let violations = validate(&schema);
        assert_eq!(violations.len(), 3);
        assert!(violations.iter().all(|v| v.kind == ViolationKind::Reference));
    }

    #[test]
    fn test_malformed_fk_target() {
        let schema = load(r#"
Schema("S")
Table("t", Column("a", Integer, ForeignKey("nodot")))
"#);
        let violations = validate(&schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("table.column"));
    }

    #[test]
    fn test_table_level_fk_targets_checked() {
        let schema = load(
            r#"
Schema("S")
Table(
    "lines",
    Column("order_id", BigInteger),
    ForeignKeyConstraint(["order_id"], ["orders.id"]),
)
"#,
        );
        let violations = validate(&schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("unknown table 'orders'"));
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation::reference("broken reference", "orders.status");
        assert_eq!(violation.to_string(), "broken reference (at orders.status)");
    }
}
