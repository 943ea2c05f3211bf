//! Artifact emission for the Ogma generator: the mustache-style template
//! engine, template context assembly, the MySQL DDL emitter, and the
//! generator that ties them together.

mod config;
mod context;
mod ddl;
mod file;
mod generator;
mod naming;
mod template;

pub use config::{CodegenConfig, DatabaseConfig, ProjectConfig};
pub use context::{
    CONVERTER_SUFFIX, DEFAULT_TYPE_FAMILIES, EnumData, TypeFamily, jooq_config_context,
    type_mappings,
};
pub use ddl::{create_table, schema_ddl};
pub use file::{RenderedFile, write_file};
pub use generator::{GenerateSettings, Generator, OutputLayout};
pub use naming::{
    DEFAULT_BASE_PACKAGE, db_query_package, enum_converter_package, enum_package, package_dir,
    package_schema_name,
};
pub use template::{Template, TemplateError, Value};
