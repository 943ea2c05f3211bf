//! Tokenizer for the database model DSL.
//!
//! The surface syntax is a small Python-flavoured declaration language:
//! `#` comments, single/double/triple-quoted strings, integers, identifiers,
//! and the punctuation needed for constructor calls and simple assignments.
//! Newlines separate statements, but only outside parentheses and brackets.

use miette::SourceSpan;

use crate::error::{Result, SourceContext};

/// A half-open byte range into the model source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let end = (other.offset + other.len).max(self.offset + self.len);
        Span::new(self.offset, end - self.offset)
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::from((span.offset, span.len))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    True,
    False,
    None,
    /// The `import` keyword; only ever an error, kept distinct for reporting.
    Import,
    /// The `from` keyword; starts a `from ... import ...` statement.
    From,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Equals,
    Dot,
    /// Statement separator (newline at bracket depth zero).
    Newline,
}

impl TokenKind {
    /// Short human-readable description for syntax errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("name '{name}'"),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::Int(v) => format!("number {v}"),
            TokenKind::True => "True".to_string(),
            TokenKind::False => "False".to_string(),
            TokenKind::None => "None".to_string(),
            TokenKind::Import => "'import'".to_string(),
            TokenKind::From => "'from'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Equals => "'='".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::Newline => "end of line".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenize the model source.
///
/// Newlines inside parentheses or brackets are insignificant, so multi-line
/// constructor calls do not produce statement breaks.
pub fn tokenize(ctx: &SourceContext) -> Result<Vec<Token>> {
    let src = ctx.src();
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut depth: usize = 0;

    while pos < bytes.len() {
        let start = pos;
        match bytes[pos] {
            b' ' | b'\t' | b'\r' => pos += 1,
            b'\n' => {
                if depth == 0 {
                    tokens.push(Token {
                        kind: TokenKind::Newline,
                        span: Span::new(pos, 1),
                    });
                }
                pos += 1;
            }
            b'#' => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            b'(' => {
                depth += 1;
                tokens.push(Token {
                    kind: TokenKind::LParen,
                    span: Span::new(pos, 1),
                });
                pos += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                tokens.push(Token {
                    kind: TokenKind::RParen,
                    span: Span::new(pos, 1),
                });
                pos += 1;
            }
            b'[' => {
                depth += 1;
                tokens.push(Token {
                    kind: TokenKind::LBracket,
                    span: Span::new(pos, 1),
                });
                pos += 1;
            }
            b']' => {
                depth = depth.saturating_sub(1);
                tokens.push(Token {
                    kind: TokenKind::RBracket,
                    span: Span::new(pos, 1),
                });
                pos += 1;
            }
            b',' => {
                tokens.push(Token {
                    kind: TokenKind::Comma,
                    span: Span::new(pos, 1),
                });
                pos += 1;
            }
            b'=' => {
                tokens.push(Token {
                    kind: TokenKind::Equals,
                    span: Span::new(pos, 1),
                });
                pos += 1;
            }
            b'.' => {
                tokens.push(Token {
                    kind: TokenKind::Dot,
                    span: Span::new(pos, 1),
                });
                pos += 1;
            }
            b'\'' | b'"' => {
                let (value, end) = lex_string(ctx, src, pos)?;
                tokens.push(Token {
                    kind: TokenKind::Str(value),
                    span: Span::new(start, end - start),
                });
                pos = end;
            }
            b'0'..=b'9' => {
                let end = lex_int_end(bytes, pos);
                let text = &src[pos..end];
                let value = text.parse::<i64>().map_err(|_| {
                    ctx.syntax_error(format!("number '{text}' is out of range"), Span::new(pos, end - pos))
                })?;
                tokens.push(Token {
                    kind: TokenKind::Int(value),
                    span: Span::new(start, end - start),
                });
                pos = end;
            }
            b'-' if pos + 1 < bytes.len() && bytes[pos + 1].is_ascii_digit() => {
                let end = lex_int_end(bytes, pos + 1);
                let text = &src[pos..end];
                let value = text.parse::<i64>().map_err(|_| {
                    ctx.syntax_error(format!("number '{text}' is out of range"), Span::new(pos, end - pos))
                })?;
                tokens.push(Token {
                    kind: TokenKind::Int(value),
                    span: Span::new(start, end - start),
                });
                pos = end;
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let mut end = pos + 1;
                while end < bytes.len()
                    && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                {
                    end += 1;
                }
                let kind = match &src[pos..end] {
                    "True" => TokenKind::True,
                    "False" => TokenKind::False,
                    "None" => TokenKind::None,
                    "import" => TokenKind::Import,
                    "from" => TokenKind::From,
                    name => TokenKind::Ident(name.to_string()),
                };
                tokens.push(Token {
                    kind,
                    span: Span::new(start, end - start),
                });
                pos = end;
            }
            other => {
                return Err(ctx.syntax_error(
                    format!("unexpected character '{}'", other as char),
                    Span::new(pos, 1),
                ));
            }
        }
    }

    Ok(tokens)
}

fn lex_int_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    pos
}

/// Lex a string starting at `start` (which holds the opening quote).
/// Returns the unescaped value and the byte offset past the closing quote.
fn lex_string(ctx: &SourceContext, src: &str, start: usize) -> Result<(String, usize)> {
    let bytes = src.as_bytes();
    let quote = bytes[start];
    let triple = bytes.len() >= start + 3 && bytes[start + 1] == quote && bytes[start + 2] == quote;
    let (open_len, terminator_len) = if triple { (3, 3) } else { (1, 1) };

    let mut value = String::new();
    let mut pos = start + open_len;
    loop {
        if pos >= bytes.len() {
            return Err(ctx.syntax_error(
                "unterminated string",
                Span::new(start, bytes.len() - start),
            ));
        }
        if bytes[pos] == quote {
            let closes = if triple {
                bytes.len() >= pos + 3 && bytes[pos + 1] == quote && bytes[pos + 2] == quote
            } else {
                true
            };
            if closes {
                return Ok((value, pos + terminator_len));
            }
            value.push(quote as char);
            pos += 1;
            continue;
        }
        if !triple && bytes[pos] == b'\n' {
            return Err(ctx.syntax_error(
                "unterminated string",
                Span::new(start, pos - start),
            ));
        }
        if bytes[pos] == b'\\' && pos + 1 < bytes.len() {
            let escaped = match bytes[pos + 1] {
                b'n' => '\n',
                b't' => '\t',
                b'\\' => '\\',
                b'\'' => '\'',
                b'"' => '"',
                other => {
                    // Unknown escapes pass through verbatim, backslash included.
                    value.push('\\');
                    value.push(other as char);
                    pos += 2;
                    continue;
                }
            };
            value.push(escaped);
            pos += 2;
            continue;
        }
        // Advance over one UTF-8 character.
        let ch_len = src[pos..].chars().next().map(char::len_utf8).unwrap_or(1);
        value.push_str(&src[pos..pos + ch_len]);
        pos += ch_len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<TokenKind> {
        let ctx = SourceContext::new(src, "model.py");
        tokenize(&ctx)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_call() {
        assert_eq!(
            lex(r#"Schema("Sales")"#),
            vec![
                TokenKind::Ident("Schema".to_string()),
                TokenKind::LParen,
                TokenKind::Str("Sales".to_string()),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_newlines_inside_parens_are_skipped() {
        let kinds = lex("Table(\n  \"t\",\n)\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident("Table".to_string()),
                TokenKind::LParen,
                TokenKind::Str("t".to_string()),
                TokenKind::Comma,
                TokenKind::RParen,
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let kinds = lex("# heading\nSchema(\"S\")  # trailing\n");
        assert!(kinds.contains(&TokenKind::Ident("Schema".to_string())));
        assert!(!kinds.iter().any(|k| matches!(k, TokenKind::Str(s) if s.contains("heading"))));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            lex("True False None import from"),
            vec![
                TokenKind::True,
                TokenKind::False,
                TokenKind::None,
                TokenKind::Import,
                TokenKind::From,
            ]
        );
    }

    #[test]
    fn test_integers() {
        assert_eq!(
            lex("Numeric(10, 2)"),
            vec![
                TokenKind::Ident("Numeric".to_string()),
                TokenKind::LParen,
                TokenKind::Int(10),
                TokenKind::Comma,
                TokenKind::Int(2),
                TokenKind::RParen,
            ]
        );
        assert_eq!(lex("-5"), vec![TokenKind::Int(-5)]);
    }

    #[test]
    fn test_triple_quoted_string() {
        let kinds = lex("ProcSqlBody(\"\"\"\nSELECT 1;\n\"\"\")");
        assert!(matches!(
            &kinds[2],
            TokenKind::Str(s) if s.contains("SELECT 1;")
        ));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(lex(r#"'it\'s'"#), vec![TokenKind::Str("it's".to_string())]);
        assert_eq!(
            lex(r#""line\nbreak""#),
            vec![TokenKind::Str("line\nbreak".to_string())]
        );
    }

    #[test]
    fn test_unterminated_string_fails() {
        let ctx = SourceContext::new("'open", "model.py");
        assert!(tokenize(&ctx).is_err());
    }

    #[test]
    fn test_unexpected_character_fails() {
        let ctx = SourceContext::new("Table(!)", "model.py");
        let err = tokenize(&ctx).unwrap_err();
        assert_eq!(err.to_string(), "invalid syntax in database model");
    }

    #[test]
    fn test_spans_point_into_source() {
        let ctx = SourceContext::new("Schema(\"S\")", "model.py");
        let tokens = tokenize(&ctx).unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[2].span, Span::new(7, 3));
    }
}
