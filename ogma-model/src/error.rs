use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for model operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the model source and filename, reducing parameter passing
/// in error factory functions.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a syntax error at the given span.
    pub fn syntax_error(&self, message: impl Into<String>, span: impl Into<SourceSpan>) -> Box<Error> {
        Box::new(Error::Syntax {
            src: self.named_source(),
            span: span.into(),
            message: message.into(),
        })
    }

    /// Create a forbidden-import error at the given span.
    pub fn forbidden_import(&self, span: impl Into<SourceSpan>) -> Box<Error> {
        Box::new(Error::ForbiddenImport {
            src: self.named_source(),
            span: span.into(),
        })
    }

    /// Create a duplicate-name error at the span of the second definition.
    pub fn duplicate(
        &self,
        kind: impl Into<String>,
        name: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Duplicate {
            src: self.named_source(),
            span: span.into(),
            kind: kind.into(),
            name: name.into(),
        })
    }

    /// Create an unknown-name error at the given span.
    pub fn unknown_name(&self, name: impl Into<String>, span: impl Into<SourceSpan>) -> Box<Error> {
        Box::new(Error::UnknownName {
            src: self.named_source(),
            span: span.into(),
            name: name.into(),
        })
    }

    /// Create an invalid-call error (wrong arguments to a model constructor).
    pub fn invalid_call(&self, message: impl Into<String>, span: impl Into<SourceSpan>) -> Box<Error> {
        Box::new(Error::InvalidCall {
            src: self.named_source(),
            span: span.into(),
            message: message.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("pass the path of a database model file"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid syntax in database model")]
    #[diagnostic(code(ogma::syntax_error))]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        message: String,
    },

    #[error("import statements are not allowed in database models")]
    #[diagnostic(
        code(ogma::forbidden_import),
        help("model files only use the injected model names; remove the import")
    )]
    ForbiddenImport {
        #[source_code]
        src: NamedSource<String>,
        #[label("import found here")]
        span: SourceSpan,
    },

    #[error("duplicate {kind} '{name}'")]
    #[diagnostic(code(ogma::duplicate_name))]
    Duplicate {
        #[source_code]
        src: NamedSource<String>,
        #[label("'{name}' is defined again here")]
        span: SourceSpan,
        kind: String,
        name: String,
    },

    #[error("unknown name '{name}'")]
    #[diagnostic(
        code(ogma::unknown_name),
        help("models can only use the injected model names and earlier assignments")
    )]
    UnknownName {
        #[source_code]
        src: NamedSource<String>,
        #[label("not defined")]
        span: SourceSpan,
        name: String,
    },

    #[error("{message}")]
    #[diagnostic(code(ogma::invalid_call))]
    InvalidCall {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_message() {
        let ctx = SourceContext::new("Table(", "model.py");
        let err = ctx.syntax_error("unexpected end of file", (6, 0));
        assert_eq!(err.to_string(), "invalid syntax in database model");
    }

    #[test]
    fn test_duplicate_error_message() {
        let ctx = SourceContext::new("Enum(\"Color\")\nEnum(\"Color\")", "model.py");
        let err = ctx.duplicate("enum", "Color", (14, 13));
        assert_eq!(err.to_string(), "duplicate enum 'Color'");
    }

    #[test]
    fn test_source_context_accessors() {
        let ctx = SourceContext::new("content", "model.py");
        assert_eq!(ctx.src(), "content");
        assert_eq!(ctx.filename(), "model.py");
    }
}
