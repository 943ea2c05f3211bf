//! Model loading: file and string entry points.

use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result, SourceContext};
use crate::schema::Schema;
use crate::{eval, lexer, parser};

impl FromStr for Schema {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_model(s, "model.py")
    }
}

/// Load and evaluate a database model file.
pub fn load_model(path: impl AsRef<Path>) -> Result<Schema> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })?;
    parse_model(&content, &path.display().to_string())
}

/// Evaluate model source with the given filename for error reporting.
pub fn parse_model(content: &str, filename: &str) -> Result<Schema> {
    let ctx = SourceContext::new(content, filename);
    let tokens = lexer::tokenize(&ctx)?;
    let stmts = parser::parse(&ctx, &tokens)?;
    eval::evaluate(&ctx, &stmts)
}
