//! Artifact generation from a validated schema.
//!
//! The [`Generator`] renders everything one `generate` invocation produces:
//! Java enums and converters, the DDL script, and the jOOQ generator
//! configuration. `preview()` renders without touching disk; `generate()`
//! writes the same files.

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use eyre::{Result, eyre};
use ogma_model::{DbSettings, Schema};

use crate::context::{EnumData, jooq_config_context};
use crate::ddl;
use crate::file::RenderedFile;
use crate::naming;
use crate::template::{Template, Value};

const JOOQ_CONFIG_TEMPLATE: &str = include_str!("../templates/jooq_generator_config.xml.mustache");
const JAVA_ENUM_TEMPLATE: &str = include_str!("../templates/java_enum.java.mustache");
const JAVA_ENUM_CONVERTER_TEMPLATE: &str =
    include_str!("../templates/java_enum_converter.java.mustache");

/// Where the three artifact families land.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub code_dir: PathBuf,
    pub sql_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl OutputLayout {
    /// All artifact families under one directory.
    pub fn single(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            code_dir: dir.clone(),
            sql_dir: dir.clone(),
            config_dir: dir,
        }
    }
}

/// Inputs of one generation run besides the schema itself.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    pub db: DbSettings,
    /// Base Java package of generated database code.
    pub base_package: String,
    /// Model file path, surfaced in generated-file headers.
    pub model_file: String,
}

pub struct Generator<'a> {
    schema: &'a Schema,
    settings: GenerateSettings,
    layout: OutputLayout,
    schema_name: String,
    package_schema: String,
    enum_package: String,
    converter_package: String,
    db_package: String,
    enums: Vec<EnumData>,
    generated_at: String,
}

impl<'a> Generator<'a> {
    /// Build a generator for a schema that already passed validation.
    pub fn new(
        schema: &'a Schema,
        settings: GenerateSettings,
        layout: OutputLayout,
    ) -> Result<Self> {
        let schema_name = schema
            .name
            .clone()
            .ok_or_else(|| eyre!("schema has no name; validate the model first"))?;
        let package_schema = naming::package_schema_name(&schema_name);
        let enum_package = naming::enum_package(&settings.base_package, &package_schema);
        let converter_package =
            naming::enum_converter_package(&settings.base_package, &package_schema);
        let db_package = naming::db_query_package(&settings.base_package, &package_schema);

        let enums = schema
            .enums
            .values()
            .map(|def| EnumData::new(def, &enum_package, &converter_package))
            .collect();

        Ok(Self {
            schema,
            settings,
            layout,
            schema_name,
            package_schema,
            enum_package,
            converter_package,
            db_package,
            enums,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }

    /// Pin the generation timestamp, for reproducible output.
    pub fn with_generated_at(mut self, timestamp: impl Into<String>) -> Self {
        self.generated_at = timestamp.into();
        self
    }

    /// Render all artifacts without writing anything.
    pub fn preview(&self) -> Result<Vec<RenderedFile>> {
        let enum_template = Template::parse(JAVA_ENUM_TEMPLATE)?;
        let converter_template = Template::parse(JAVA_ENUM_CONVERTER_TEMPLATE)?;

        let mut files = Vec::new();
        for data in &self.enums {
            files.push(self.enum_file(&enum_template, data));
            files.push(self.converter_file(&converter_template, data));
        }
        files.push(self.ddl_file());
        files.push(self.jooq_config_file()?);
        Ok(files)
    }

    /// Render all artifacts and write them to the output layout.
    pub fn generate(&self) -> Result<Vec<RenderedFile>> {
        let files = self.preview()?;
        for file in &files {
            file.write()?;
        }
        Ok(files)
    }

    /// Header variables shared by all generated-code templates.
    fn header_entries(&self) -> [(&'static str, Value); 3] {
        [
            ("compiler_version", env!("CARGO_PKG_VERSION").into()),
            ("generated_at", self.generated_at.as_str().into()),
            (
                "database_model_file",
                self.settings.model_file.replace('\\', "/").into(),
            ),
        ]
    }

    fn enum_file(&self, template: &Template, data: &EnumData) -> RenderedFile {
        let mut entries = vec![
            ("name", Value::from(data.name.as_str())),
            ("package", self.enum_package.as_str().into()),
            ("file_name", data.code_file_name().into()),
            ("values", data.value_entries()),
        ];
        entries.extend(self.header_entries());

        let path = naming::package_dir(&self.layout.code_dir, &self.enum_package)
            .join(data.code_file_name());
        RenderedFile::new(path, template.render(&Value::map(entries)))
    }

    fn converter_file(&self, template: &Template, data: &EnumData) -> RenderedFile {
        let mut entries = vec![
            ("name", Value::from(data.name.as_str())),
            ("package", self.converter_package.as_str().into()),
            ("file_name", data.converter_file_name().into()),
            ("converter_class_name", data.converter_class_name().into()),
            ("enum_fqn", data.enum_fqn().into()),
        ];
        entries.extend(self.header_entries());

        let path = naming::package_dir(&self.layout.code_dir, &self.converter_package)
            .join(data.converter_file_name());
        RenderedFile::new(path, template.render(&Value::map(entries)))
    }

    fn ddl_file(&self) -> RenderedFile {
        let path = self
            .layout
            .sql_dir
            .join(format!("full_ddl.{}.mysql.sql", self.package_schema));
        RenderedFile::new(path, ddl::schema_ddl(self.schema))
    }

    fn jooq_config_file(&self) -> Result<RenderedFile> {
        let template = Template::parse(JOOQ_CONFIG_TEMPLATE)?;
        let context = jooq_config_context(
            self.schema,
            &self.enums,
            &self.settings.db,
            &self.schema_name,
            &self.db_package,
            &self.layout.code_dir.display().to_string(),
        );
        let path = self
            .layout
            .config_dir
            .join(format!("ogma_jooq_gen_config.{}.xml", self.package_schema));
        Ok(RenderedFile::new(path, template.render(&context)))
    }
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
)
"#,
            "model.py",
        )
        .unwrap()
    }

    fn settings() -> GenerateSettings {
        GenerateSettings {
            db: DbSettings {
                host: "localhost".to_string(),
                name: "tempdb".to_string(),
                port: 3306,
                user: "gen".to_string(),
                password: "secret".to_string(),
            },
            base_package: "com.acme".to_string(),
            model_file: "model.py".to_string(),
        }
    }

    #[test]
    fn test_preview_file_set() {
        let schema = sample_schema();
        let generator =
            Generator::new(&schema, settings(), OutputLayout::single("/out")).unwrap();
        let files = generator.preview().unwrap();

        let paths: Vec<String> = files
            .iter()
            .map(|f| f.path.display().to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/out/com/acme/sales/enums/OrderStatus.java",
                "/out/com/acme/sales/enums/converters/OrderStatusTypeConverter.java",
                "/out/full_ddl.sales.mysql.sql",
                "/out/ogma_jooq_gen_config.sales.xml",
            ]
        );
    }

    #[test]
    fn test_schema_without_name_is_rejected() {
        let schema = parse_model(r#"Table("t", Column("id", Integer))"#, "model.py").unwrap();
        let result = Generator::new(&schema, settings(), OutputLayout::single("/out"));
        assert!(result.is_err());
    }

    #[test]
    fn test_enum_java_content() {
        let schema = sample_schema();
        let generator = Generator::new(&schema, settings(), OutputLayout::single("/out"))
            .unwrap()
            .with_generated_at("2024-01-01T00:00:00Z");
        let files = generator.preview().unwrap();
        let enum_java = &files[0].content;

        assert!(enum_java.contains("package com.acme.sales.enums;"));
        assert!(enum_java.contains("public enum OrderStatus {"));
        assert!(enum_java.contains("    PLACED(0),\n    PAID(1);\n"));
        assert!(enum_java.contains("// Generated by Ogma"));
        assert!(enum_java.contains("on 2024-01-01T00:00:00Z"));
        assert!(enum_java.contains("// Source model: model.py"));
    }

    #[test]
    fn test_converter_java_content() {
        let schema = sample_schema();
        let generator =
            Generator::new(&schema, settings(), OutputLayout::single("/out")).unwrap();
        let files = generator.preview().unwrap();
        let converter = &files[1].content;

        assert!(converter.contains("package com.acme.sales.enums.converters;"));
        assert!(converter.contains("import com.acme.sales.enums.OrderStatus;"));
        assert!(converter.contains(
            "public class OrderStatusTypeConverter implements Converter<Integer, OrderStatus> {"
        ));
    }

    #[test]
    fn test_windows_model_path_is_normalized_in_headers() {
        let schema = sample_schema();
        let mut settings = settings();
        settings.model_file = "models\\sales.py".to_string();
        let generator =
            Generator::new(&schema, settings, OutputLayout::single("/out")).unwrap();
        let files = generator.preview().unwrap();
        assert!(files[0].content.contains("// Source model: models/sales.py"));
    }

    #[test]
    fn test_generate_writes_all_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let schema = sample_schema();
        let generator =
            Generator::new(&schema, settings(), OutputLayout::single(temp.path())).unwrap();

        let files = generator.generate().unwrap();

        assert_eq!(files.len(), 4);
        for file in &files {
            assert!(file.path.exists(), "missing {}", file.path.display());
        }
    }

    #[test]
    fn test_separate_output_dirs() {
        let schema = sample_schema();
        let layout = OutputLayout {
            code_dir: PathBuf::from("/code"),
            sql_dir: PathBuf::from("/sql"),
            config_dir: PathBuf::from("/config"),
        };
        let generator = Generator::new(&schema, settings(), layout).unwrap();
        let files = generator.preview().unwrap();

        assert!(files[0].path.starts_with("/code"));
        assert!(files[2].path.starts_with("/sql"));
        assert!(files[3].path.starts_with("/config"));
    }
}
