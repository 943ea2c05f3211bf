//! Java package naming for generated code.

use std::path::{Path, PathBuf};

/// Base package used when the caller does not configure one.
pub const DEFAULT_BASE_PACKAGE: &str = "com.example.dbutils";

/// Schema component used inside package names.
pub fn package_schema_name(schema_name: &str) -> String {
    schema_name.to_lowercase()
}

/// Package holding generated enum classes.
pub fn enum_package(base: &str, schema: &str) -> String {
    format!("{base}.{schema}.enums")
}

/// Package holding generated jOOQ enum converters.
pub fn enum_converter_package(base: &str, schema: &str) -> String {
    format!("{base}.{schema}.enums.converters")
}

/// Package the jOOQ generator writes query classes into.
pub fn db_query_package(base: &str, schema: &str) -> String {
    format!("{base}.{schema}.db")
}

/// Directory for a package under the code output directory.
pub fn package_dir(code_dir: &Path, package: &str) -> PathBuf {
    let mut dir = code_dir.to_path_buf();
    for element in package.split('.') {
        dir.push(element);
    }
    dir
}
