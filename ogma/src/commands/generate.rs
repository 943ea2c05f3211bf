use std::path::PathBuf;

use clap::Args;
use eyre::{Result, eyre};
use ogma_codegen::{
    DEFAULT_BASE_PACKAGE, GenerateSettings, Generator, OutputLayout, ProjectConfig,
};
use ogma_model::{DbSettings, load_model, unique_database_name, validate};

use super::UnwrapOrExit;

const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Args)]
pub struct GenerateCommand {
    /// The file with the DB model
    #[arg(value_name = "MODEL_FILE")]
    pub model_file: PathBuf,

    /// The database user to connect to the database
    #[arg(short = 'u', long)]
    pub db_user: Option<String>,

    /// The database password to connect to the database
    #[arg(short = 'p', long)]
    pub db_password: Option<String>,

    /// The host holding the database
    #[arg(short = 'H', long)]
    pub db_host: Option<String>,

    /// The name of the database to create or read
    #[arg(long)]
    pub db_name: Option<String>,

    /// The database port
    #[arg(short = 'P', long)]
    pub db_port: Option<u16>,

    /// The base Java package of generated database code
    #[arg(long)]
    pub java_package: Option<String>,

    /// The directory under which generated code should be
    #[arg(short = 'c', long)]
    pub code_dir: Option<PathBuf>,

    /// The directory under which generated SQL should be
    #[arg(long)]
    pub sql_dir: Option<PathBuf>,

    /// The directory under which generated config should be
    #[arg(short = 'x', long)]
    pub config_dir: Option<PathBuf>,

    /// Path to a project config with defaults for the flags above
    #[arg(long, default_value = "ogma.toml")]
    pub config: PathBuf,

    /// Override the schema from the model
    #[arg(long, hide = true)]
    pub schema: Option<String>,

    /// Preview generated files without writing to disk
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let config = ProjectConfig::load_optional(&self.config)?;

        let mut schema = load_model(&self.model_file).unwrap_or_exit();

        // Hidden override. WARNING: this hides problems in invalid models.
        if let Some(name) = &self.schema {
            schema.name = Some(name.clone());
        }

        let violations = validate(&schema);
        if !violations.is_empty() {
            for violation in &violations {
                eprintln!("error: {violation}");
            }
            eprintln!();
            eprintln!(
                "{} error(s) in {}; nothing was generated",
                violations.len(),
                self.model_file.display()
            );
            std::process::exit(1);
        }

        let settings = self.settings(&config)?;
        let layout = self.layout(&config);
        let generator = Generator::new(&schema, settings, layout)?;

        if self.dry_run {
            self.run_preview(&generator)
        } else {
            self.run_generation(&generator, &schema)
        }
    }

    fn run_generation(&self, generator: &Generator, schema: &ogma_model::Schema) -> Result<()> {
        let files = generator.generate()?;

        println!(
            "{} (schema {})",
            self.model_file.display(),
            schema.name.as_deref().unwrap_or("?"),
        );
        println!(
            "  {} table(s), {} enum(s), {} stored procedure(s)",
            schema.tables.len(),
            schema.enums.len(),
            schema.procedures.len(),
        );
        println!();

        println!("Generated:");
        for file in &files {
            println!("  @ {}", file.path.display());
        }

        Ok(())
    }

    fn run_preview(&self, generator: &Generator) -> Result<()> {
        let files = generator.preview()?;

        for file in &files {
            println!("── {} ──", file.path.display());
            println!("{}", file.content);
        }

        println!("── Summary ──");
        println!("{} files would be generated", files.len());

        Ok(())
    }

    /// Resolve generation settings: flags win over ogma.toml, which wins
    /// over built-in defaults.
    fn settings(&self, config: &ProjectConfig) -> Result<GenerateSettings> {
        let db = &config.database;
        let user = self
            .db_user
            .clone()
            .or_else(|| db.user.clone())
            .ok_or_else(|| eyre!("a database user is required (--db-user or [database].user)"))?;
        let password = self
            .db_password
            .clone()
            .or_else(|| db.password.clone())
            .ok_or_else(|| {
                eyre!("a database password is required (--db-password or [database].password)")
            })?;

        Ok(GenerateSettings {
            db: DbSettings {
                host: self
                    .db_host
                    .clone()
                    .or_else(|| db.host.clone())
                    .unwrap_or_else(|| "localhost".to_string()),
                name: self
                    .db_name
                    .clone()
                    .or_else(|| db.name.clone())
                    .unwrap_or_else(unique_database_name),
                port: self.db_port.or(db.port).unwrap_or(3306),
                user,
                password,
            },
            base_package: self
                .java_package
                .clone()
                .or_else(|| config.codegen.java_package.clone())
                .unwrap_or_else(|| DEFAULT_BASE_PACKAGE.to_string()),
            model_file: self.model_file.display().to_string(),
        })
    }

    fn layout(&self, config: &ProjectConfig) -> OutputLayout {
        let codegen = &config.codegen;
        let resolve = |flag: &Option<PathBuf>, configured: &Option<PathBuf>| {
            flag.clone()
                .or_else(|| configured.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
        };
        OutputLayout {
            code_dir: resolve(&self.code_dir, &codegen.code_dir),
            sql_dir: resolve(&self.sql_dir, &codegen.sql_dir),
            config_dir: resolve(&self.config_dir, &codegen.config_dir),
        }
    }
}
