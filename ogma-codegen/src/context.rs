//! Template context assembly from a loaded schema.

use std::collections::BTreeMap;

use ogma_model::{DbSettings, EnumDef, Schema};

use crate::template::Value;

/// Suffix of generated jOOQ converter class names.
pub const CONVERTER_SUFFIX: &str = "TypeConverter";

/// Everything needed to render the enum-related templates for one enum.
#[derive(Debug, Clone)]
pub struct EnumData {
    pub name: String,
    pub labels: Vec<String>,
    package: String,
    converter_package: String,
}

impl EnumData {
    pub fn new(def: &EnumDef, package: &str, converter_package: &str) -> Self {
        Self {
            name: def.name.clone(),
            labels: def.labels.clone(),
            package: package.to_string(),
            converter_package: converter_package.to_string(),
        }
    }

    pub fn code_file_name(&self) -> String {
        format!("{}.java", self.name)
    }

    pub fn converter_class_name(&self) -> String {
        format!("{}{CONVERTER_SUFFIX}", self.name)
    }

    pub fn converter_file_name(&self) -> String {
        format!("{}{CONVERTER_SUFFIX}.java", self.name)
    }

    pub fn enum_fqn(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }

    pub fn converter_fqn(&self) -> String {
        format!("{}.{}{CONVERTER_SUFFIX}", self.converter_package, self.name)
    }

    /// Values numbered from zero, each carrying the list terminator the Java
    /// enum body needs (`,` between values, `;` after the last one).
    pub fn value_entries(&self) -> Value {
        let last = self.labels.len().saturating_sub(1);
        Value::list(self.labels.iter().enumerate().map(|(num, label)| {
            Value::map([
                ("valname", label.as_str().into()),
                ("valnum", (num as i64).into()),
                ("terminator", if num == last { ";".into() } else { ",".into() }),
            ])
        }))
    }
}

/// Which column type families to collect jOOQ forced-type mappings for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Enum,
    Boolean,
    Binary,
}

/// The default filter used by code generation.
pub const DEFAULT_TYPE_FAMILIES: &[TypeFamily] = &[TypeFamily::Enum, TypeFamily::Boolean];

/// Nested `table -> column -> type name` mapping of columns that need a
/// forced type, sorted by table then column name.
pub fn type_mappings(
    schema: &Schema,
    families: &[TypeFamily],
) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut mappings: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

    schema.visit_columns(|table, column| {
        let type_name = if let Some(enum_name) = column.ty.enum_name() {
            if !families.contains(&TypeFamily::Enum) {
                return;
            }
            enum_name.to_string()
        } else if column.ty.is_boolean() {
            if !families.contains(&TypeFamily::Boolean) {
                return;
            }
            "BOOLEAN".to_string()
        } else if column.ty.is_binary() {
            if !families.contains(&TypeFamily::Binary) {
                return;
            }
            "BINARY".to_string()
        } else {
            return;
        };

        mappings
            .entry(table.name.clone())
            .or_default()
            .insert(column.name.clone(), type_name);
    });

    mappings
}

/// Build the context for the jOOQ generator configuration template.
///
/// `enums` must carry the full declaration-ordered enum list so that
/// `{{#enums}}` blocks render in input order; forced-type `fields` come out
/// sorted by table then column name.
pub fn jooq_config_context(
    schema: &Schema,
    enums: &[EnumData],
    settings: &DbSettings,
    schema_name: &str,
    package: &str,
    code_dir: &str,
) -> Value {
    let mut fields = Vec::new();
    for (table, columns) in type_mappings(schema, DEFAULT_TYPE_FAMILIES) {
        for (column, type_name) in columns {
            // Enum types are referenced by their fully qualified Java name.
            let type_fqn = enums
                .iter()
                .find(|e| e.name == type_name)
                .map(|e| e.enum_fqn())
                .unwrap_or(type_name);
            fields.push(Value::map([
                ("name", type_fqn.into()),
                ("expression", format!("{table}\\.{column}").into()),
            ]));
        }
    }

    let enum_entries = enums.iter().map(|e| {
        Value::map([
            ("enum_fqn", e.enum_fqn().into()),
            ("converter_fqn", e.converter_fqn().into()),
        ])
    });

    Value::map([
        ("dbhost", settings.host.as_str().into()),
        ("dbport", i64::from(settings.port).into()),
        ("dbname", settings.name.as_str().into()),
        ("dbuser", settings.user.as_str().into()),
        ("dbpassword", settings.password.as_str().into()),
        ("schema_name", schema_name.into()),
        ("package", package.into()),
        ("codedir", code_dir.into()),
        ("enums", Value::list(enum_entries)),
        ("fields", Value::list(fields)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogma_model::parse_model;

    fn sample_schema() -> Schema {
        parse_model(
            r#"
Schema("Sales")
Status = Enum("OrderStatus", "PLACED", "PAID")
Table(
    "orders",
    Column("id", BigInteger, primary_key=True),
    Column("status", Status(), nullable=False),
    Column("archived", Boolean, nullable=False, default=False),
    Column("payload", BINARY(16)),
)
Table("audit", Column("entry", Integer))
"#,
            "model.py",
        )
        .unwrap()
    }

    fn sample_enum() -> EnumData {
        EnumData::new(
            &EnumDef {
                name: "OrderStatus".to_string(),
                labels: vec!["PLACED".to_string(), "PAID".to_string()],
            },
            "com.acme.sales.enums",
            "com.acme.sales.enums.converters",
        )
    }

    #[test]
    fn test_enum_data_names() {
        let data = sample_enum();
        assert_eq!(data.code_file_name(), "OrderStatus.java");
        assert_eq!(data.converter_class_name(), "OrderStatusTypeConverter");
        assert_eq!(data.converter_file_name(), "OrderStatusTypeConverter.java");
        assert_eq!(data.enum_fqn(), "com.acme.sales.enums.OrderStatus");
        assert_eq!(
            data.converter_fqn(),
            "com.acme.sales.enums.converters.OrderStatusTypeConverter"
        );
    }

    #[test]
    fn test_value_entries_terminators() {
        let Value::List(entries) = sample_enum().value_entries() else {
            panic!("expected a list");
        };
        assert_eq!(entries.len(), 2);
        let Value::Map(first) = &entries[0] else {
            panic!("expected a map");
        };
        assert_eq!(first["valname"], Value::Str("PLACED".to_string()));
        assert_eq!(first["valnum"], Value::Int(0));
        assert_eq!(first["terminator"], Value::Str(",".to_string()));
        let Value::Map(last) = &entries[1] else {
            panic!("expected a map");
        };
        assert_eq!(last["terminator"], Value::Str(";".to_string()));
    }

    #[test]
    fn test_type_mappings_default_families() {
        let schema = sample_schema();
        let mappings = type_mappings(&schema, DEFAULT_TYPE_FAMILIES);
        // Only the enum and boolean columns; audit has neither.
        assert_eq!(mappings.len(), 1);
        let orders = &mappings["orders"];
        assert_eq!(orders["status"], "OrderStatus");
        assert_eq!(orders["archived"], "BOOLEAN");
        assert!(!orders.contains_key("payload"));
    }

    #[test]
    fn test_type_mappings_binary_family() {
        let schema = sample_schema();
        let mappings = type_mappings(&schema, &[TypeFamily::Binary]);
        assert_eq!(mappings["orders"]["payload"], "BINARY");
        assert_eq!(mappings["orders"].len(), 1);
    }

    #[test]
    fn test_jooq_context_fields_sorted_and_qualified() {
        let schema = sample_schema();
        let enums = vec![sample_enum()];
        let settings = DbSettings {
            host: "localhost".to_string(),
            name: "tempdb".to_string(),
            port: 3306,
            user: "gen".to_string(),
            password: "secret".to_string(),
        };
        let context = jooq_config_context(
            &schema,
            &enums,
            &settings,
            "Sales",
            "com.acme.sales.db",
            "/out/code",
        );

        let Value::Map(map) = &context else {
            panic!("expected a map");
        };
        assert_eq!(map["dbport"], Value::Int(3306));
        assert_eq!(map["schema_name"], Value::Str("Sales".to_string()));

        let Value::List(fields) = &map["fields"] else {
            panic!("expected a list");
        };
        assert_eq!(fields.len(), 2);
        // Sorted by column name within the table: archived before status.
        let Value::Map(first) = &fields[0] else {
            panic!("expected a map");
        };
        assert_eq!(first["name"], Value::Str("BOOLEAN".to_string()));
        assert_eq!(
            first["expression"],
            Value::Str("orders\\.archived".to_string())
        );
        let Value::Map(second) = &fields[1] else {
            panic!("expected a map");
        };
        assert_eq!(
            second["name"],
            Value::Str("com.acme.sales.enums.OrderStatus".to_string())
        );
    }
}
