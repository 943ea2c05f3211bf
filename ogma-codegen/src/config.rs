//! Optional `ogma.toml` project configuration.
//!
//! Every value here is a default; command-line flags always win. A missing
//! file is not an error, so purely flag-driven invocations keep working.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub codegen: CodegenConfig,
}

/// `[database]`: connection parameter defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// `[codegen]`: output and packaging defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodegenConfig {
    pub java_package: Option<String>,
    pub code_dir: Option<PathBuf>,
    pub sql_dir: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
}

impl ProjectConfig {
    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read '{}'", path.display()))?;
        toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse '{}'", path.display()))
    }

    /// Like [`ProjectConfig::load`], but a missing file yields defaults.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config: ProjectConfig = toml::from_str(
            r#"
[database]
host = "db.internal"
port = 3307
user = "generator"
password = "secret"

[codegen]
java_package = "com.acme.db"
code_dir = "gen/java"
sql_dir = "gen/sql"
"#,
        )
        .unwrap();

        assert_eq!(config.database.host.as_deref(), Some("db.internal"));
        assert_eq!(config.database.port, Some(3307));
        assert_eq!(config.database.name, None);
        assert_eq!(config.codegen.java_package.as_deref(), Some("com.acme.db"));
        assert_eq!(config.codegen.code_dir, Some(PathBuf::from("gen/java")));
        assert_eq!(config.codegen.config_dir, None);
    }

    #[test]
    fn test_empty_config() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        assert!(config.database.host.is_none());
        assert!(config.codegen.java_package.is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: std::result::Result<ProjectConfig, _> =
            toml::from_str("[database]\nhostname = \"typo\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_optional_missing_file() {
        let config = ProjectConfig::load_optional("/definitely/not/ogma.toml").unwrap();
        assert!(config.database.user.is_none());
    }
}
