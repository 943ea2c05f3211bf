//! DDL emission for MySQL/MariaDB-class engines.
//!
//! Tables are emitted in DSL declaration order: the emitter performs no
//! dependency-based reordering and no cycle detection, so ordering tables
//! compatibly with their foreign keys is the model author's responsibility.

use ogma_model::{
    Column, ColumnType, DefaultValue, EnumDef, Index, RefAction, Schema, Table, TableConstraint,
};

/// Render the full DDL script for a schema.
///
/// One CREATE TABLE per table (followed by its CREATE INDEX statements),
/// stored procedures last, statements joined by `";\n\n"`.
pub fn schema_ddl(schema: &Schema) -> String {
    let mut statements = Vec::new();
    for table in schema.tables.values() {
        statements.push(create_table(schema, table));
        for index in &table.indexes {
            statements.push(create_index(table, index));
        }
    }
    for procedure in &schema.procedures {
        statements.push(procedure.creation_statement());
    }
    multiline_rstrip(&statements.join(";\n\n"))
}

/// The CREATE TABLE statement for one table.
pub fn create_table(schema: &Schema, table: &Table) -> String {
    let mut clauses: Vec<String> = Vec::new();

    for column in table.columns.values() {
        clauses.push(column_definition(column));
    }

    let pk = table.primary_key_columns();
    if !pk.is_empty() {
        clauses.push(format!("PRIMARY KEY ({})", pk.join(", ")));
    }

    for constraint in &table.constraints {
        match constraint {
            // Merged into the PRIMARY KEY clause above.
            TableConstraint::PrimaryKey { .. } => {}
            TableConstraint::Unique { columns, name } => {
                clauses.push(named(name, format!("UNIQUE ({})", columns.join(", "))));
            }
            TableConstraint::Check { expression, name } => {
                clauses.push(named(name, format!("CHECK ({expression})")));
            }
            TableConstraint::ForeignKey {
                columns,
                targets,
                name,
                on_update,
                on_delete,
            } => {
                clauses.push(named(
                    name,
                    foreign_key_clause(columns, targets, *on_update, *on_delete),
                ));
            }
        }
    }

    // Enum-typed columns are constrained to their declared value range.
    for column in table.columns.values() {
        if let Some(enum_name) = column.ty.enum_name()
            && let Some(def) = schema.enums.get(enum_name)
        {
            clauses.push(format!(
                "CONSTRAINT ck_{}_{} CHECK ({})",
                table.name,
                column.name,
                enum_check_expression(&column.name, def)
            ));
        }
    }

    for column in table.columns.values() {
        if let Some(fk) = &column.foreign_key {
            clauses.push(foreign_key_clause(
                std::slice::from_ref(&column.name),
                std::slice::from_ref(&fk.target),
                fk.on_update,
                fk.on_delete,
            ));
        }
    }

    let options = &table.options;
    format!(
        "CREATE TABLE {} (\n    {}\n) ENGINE={} DEFAULT CHARSET={} COLLATE={} ROW_FORMAT={}",
        table.name,
        clauses.join(",\n    "),
        options.engine,
        options.charset,
        options.collation,
        options.row_format,
    )
}

fn named(name: &Option<String>, clause: String) -> String {
    match name {
        Some(name) => format!("CONSTRAINT {name} {clause}"),
        None => clause,
    }
}

fn foreign_key_clause(
    columns: &[String],
    targets: &[String],
    on_update: Option<RefAction>,
    on_delete: Option<RefAction>,
) -> String {
    // Targets were validated to be well-formed "table.column" references.
    let target_table = targets[0].split_once('.').map(|(t, _)| t).unwrap_or("");
    let target_columns: Vec<&str> = targets
        .iter()
        .map(|t| t.split_once('.').map(|(_, c)| c).unwrap_or(t.as_str()))
        .collect();

    let mut clause = format!(
        "FOREIGN KEY ({}) REFERENCES {} ({})",
        columns.join(", "),
        target_table,
        target_columns.join(", "),
    );
    if let Some(action) = on_update {
        clause.push_str(&format!(" ON UPDATE {}", action.as_sql()));
    }
    if let Some(action) = on_delete {
        clause.push_str(&format!(" ON DELETE {}", action.as_sql()));
    }
    clause
}

/// The integer range check for an enum-typed column.
fn enum_check_expression(column: &str, def: &EnumDef) -> String {
    let values: Vec<String> = (0..def.labels.len()).map(|v| v.to_string()).collect();
    format!("{column} in ({})", values.join(","))
}

fn column_definition(column: &Column) -> String {
    let mut definition = format!("{} {}", column.name, type_sql(&column.ty));
    if !column.is_nullable() {
        definition.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        definition.push_str(&format!(" DEFAULT {}", default_sql(default)));
    }
    if column.autoincrement {
        definition.push_str(" AUTO_INCREMENT");
    }
    if column.unique {
        definition.push_str(" UNIQUE");
    }
    definition
}

fn type_sql(ty: &ColumnType) -> String {
    match ty {
        ColumnType::Integer => "INTEGER".to_string(),
        ColumnType::BigInteger => "BIGINT".to_string(),
        ColumnType::Boolean => "BOOL".to_string(),
        // Millisecond precision on MySQL.
        ColumnType::DateTime => "DATETIME(3)".to_string(),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::LargeBinary => "BLOB".to_string(),
        ColumnType::String { length } => format!("VARCHAR({length})"),
        ColumnType::Numeric { precision: None } => "NUMERIC".to_string(),
        ColumnType::Numeric {
            precision: Some((precision, scale)),
        } => format!("NUMERIC({precision}, {scale})"),
        ColumnType::VarBinary { length } => format!("VARBINARY({length})"),
        ColumnType::Binary { length } => format!("BINARY({length})"),
        // Integer-backed; the value range check is a table constraint.
        ColumnType::EnumRef(_) => "INTEGER".to_string(),
    }
}

fn default_sql(default: &DefaultValue) -> String {
    match default {
        DefaultValue::Int(v) => v.to_string(),
        DefaultValue::Bool(v) => v.to_string(),
        DefaultValue::Str(v) => format!("'{}'", v.replace('\'', "''")),
        DefaultValue::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
        DefaultValue::Null => "NULL".to_string(),
    }
}

fn create_index(table: &Table, index: &Index) -> String {
    let unique = if index.unique { "UNIQUE " } else { "" };
    format!(
        "CREATE {unique}INDEX {} ON {} ({})",
        index.name,
        table.name,
        index.columns.join(", "),
    )
}

/// Remove trailing spaces from all lines.
fn multiline_rstrip(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}
