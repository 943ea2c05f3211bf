//! The in-memory database model: tables, columns, types, enums.
//!
//! Entities are built once by the DSL evaluator, aggregated into a [`Schema`],
//! validated, and then consumed read-only by the emitters.

pub mod validate;

use indexmap::IndexMap;

use crate::procedures::StoredProcedure;

/// Semantic column type, mapped to a concrete SQL type by the DDL emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInteger,
    Boolean,
    DateTime,
    Text,
    LargeBinary,
    String { length: u32 },
    Numeric { precision: Option<(u32, u32)> },
    VarBinary { length: u32 },
    Binary { length: u32 },
    /// Integer-backed reference to a declared [`EnumDef`], by name.
    EnumRef(String),
}

impl ColumnType {
    /// The referenced enum name, for enum-typed columns.
    pub fn enum_name(&self) -> Option<&str> {
        match self {
            ColumnType::EnumRef(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, ColumnType::Boolean)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, ColumnType::Binary { .. })
    }
}

/// A column default, rendered into the DDL as a server-side default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Int(i64),
    Bool(bool),
    Str(String),
    CurrentTimestamp,
    Null,
}

/// Referential action for foreign keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefAction {
    Cascade,
    SetNull,
    Restrict,
}

impl RefAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            RefAction::Cascade => "CASCADE",
            RefAction::SetNull => "SET NULL",
            RefAction::Restrict => "RESTRICT",
        }
    }

    /// Parse the SQL spelling ("CASCADE", "SET NULL", "RESTRICT").
    pub fn from_sql(s: &str) -> Option<Self> {
        match s {
            "CASCADE" => Some(RefAction::Cascade),
            "SET NULL" => Some(RefAction::SetNull),
            "RESTRICT" => Some(RefAction::Restrict),
            _ => None,
        }
    }
}

/// A column-level foreign key. The target is a lazy `"table.column"`
/// reference, resolved by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub target: String,
    pub on_update: Option<RefAction>,
    pub on_delete: Option<RefAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    /// Explicit nullability; unset columns are nullable unless primary key.
    pub nullable: Option<bool>,
    pub primary_key: bool,
    pub unique: bool,
    pub autoincrement: bool,
    pub default: Option<DefaultValue>,
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(!self.primary_key)
    }
}

/// A table-level constraint declared in the DSL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    PrimaryKey {
        columns: Vec<String>,
    },
    ForeignKey {
        columns: Vec<String>,
        targets: Vec<String>,
        name: Option<String>,
        on_update: Option<RefAction>,
        on_delete: Option<RefAction>,
    },
    Unique {
        columns: Vec<String>,
        name: Option<String>,
    },
    Check {
        expression: String,
        name: Option<String>,
    },
}

/// A secondary index, emitted as a separate CREATE INDEX statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// MySQL table options. Every table gets the same defaults unless the DSL
/// overrides them per table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub engine: String,
    pub charset: String,
    pub collation: String,
    pub row_format: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            engine: "InnoDB".to_string(),
            charset: "utf8mb4".to_string(),
            collation: "utf8mb4_general_ci".to_string(),
            row_format: "DYNAMIC".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    /// Columns in declaration order, keyed by name.
    pub columns: IndexMap<String, Column>,
    pub constraints: Vec<TableConstraint>,
    pub indexes: Vec<Index>,
    pub options: TableOptions,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Primary key columns, combining per-column flags and any
    /// PrimaryKeyConstraint declaration, in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .columns
            .values()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect();
        for constraint in &self.constraints {
            if let TableConstraint::PrimaryKey { columns } = constraint {
                for column in columns {
                    if !keys.contains(&column.as_str()) {
                        keys.push(column);
                    }
                }
            }
        }
        keys
    }
}

/// An integer-backed enum declaration. Labels are numbered from zero in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub labels: Vec<String>,
}

/// Database connection parameters, consumed by the jOOQ config emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub host: String,
    pub name: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// The aggregate model produced by loading one DSL file.
///
/// Declaration order of tables and enums is preserved; the struct is never
/// mutated after the loader returns it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Declared schema name; `None` until a `Schema("...")` call runs,
    /// which the validator reports as a violation.
    pub name: Option<String>,
    pub tables: IndexMap<String, Table>,
    pub enums: IndexMap<String, EnumDef>,
    pub procedures: Vec<StoredProcedure>,
}

impl Schema {
    /// Visit every column of every table, in declaration order.
    pub fn visit_columns(&self, mut visit: impl FnMut(&Table, &Column)) {
        for table in self.tables.values() {
            for column in table.columns.values() {
                visit(table, column);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, ty: ColumnType) -> Column {
        Column {
            name: name.to_string(),
            ty,
            nullable: None,
            primary_key: false,
            unique: false,
            autoincrement: false,
            default: None,
            foreign_key: None,
        }
    }

    #[test]
    fn test_nullable_defaults() {
        let plain = column("a", ColumnType::Integer);
        assert!(plain.is_nullable());

        let mut pk = column("id", ColumnType::BigInteger);
        pk.primary_key = true;
        assert!(!pk.is_nullable());

        let mut forced = column("b", ColumnType::Integer);
        forced.primary_key = true;
        forced.nullable = Some(true);
        assert!(forced.is_nullable());
    }

    #[test]
    fn test_primary_key_columns_merges_flags_and_constraint() {
        let mut columns = IndexMap::new();
        let mut id = column("id", ColumnType::BigInteger);
        id.primary_key = true;
        columns.insert("id".to_string(), id);
        columns.insert("tenant".to_string(), column("tenant", ColumnType::Integer));

        let table = Table {
            name: "t".to_string(),
            columns,
            constraints: vec![TableConstraint::PrimaryKey {
                columns: vec!["id".to_string(), "tenant".to_string()],
            }],
            indexes: Vec::new(),
            options: TableOptions::default(),
        };

        assert_eq!(table.primary_key_columns(), vec!["id", "tenant"]);
    }

    #[test]
    fn test_ref_action_round_trip() {
        assert_eq!(RefAction::from_sql("CASCADE"), Some(RefAction::Cascade));
        assert_eq!(RefAction::from_sql("SET NULL"), Some(RefAction::SetNull));
        assert_eq!(RefAction::from_sql("cascade"), None);
        assert_eq!(RefAction::SetNull.as_sql(), "SET NULL");
    }

    #[test]
    fn test_default_table_options() {
        let options = TableOptions::default();
        assert_eq!(options.engine, "InnoDB");
        assert_eq!(options.charset, "utf8mb4");
        assert_eq!(options.collation, "utf8mb4_general_ci");
        assert_eq!(options.row_format, "DYNAMIC");
    }
}
