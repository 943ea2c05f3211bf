//! Recursive-descent parser for the model DSL.
//!
//! Statements are either constructor-call expressions or simple
//! `name = expr` assignments. `import` / `from ... import` statements are
//! rejected with a dedicated policy error rather than a generic syntax error.

use crate::error::{Result, SourceContext};
use crate::lexer::{Span, Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { name: String, value: Expr },
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    Name(String),
    List(Vec<Expr>),
    Attr {
        base: Box<Expr>,
        attr: String,
        attr_span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
}

/// Parse a token stream into statements.
pub fn parse(ctx: &SourceContext, tokens: &[Token]) -> Result<Vec<Stmt>> {
    let mut parser = Parser {
        ctx,
        tokens,
        pos: 0,
    };
    parser.program()
}

struct Parser<'a> {
    ctx: &'a SourceContext,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn program(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while let Some(token) = self.peek() {
            match &token.kind {
                TokenKind::Newline => {
                    self.pos += 1;
                }
                TokenKind::Import | TokenKind::From => {
                    return Err(self.ctx.forbidden_import(self.statement_span()));
                }
                _ => {
                    stmts.push(self.statement()?);
                    self.expect_statement_end()?;
                }
            }
        }
        Ok(stmts)
    }

    /// Span from the current token to the end of its line, for import errors.
    fn statement_span(&self) -> Span {
        let start = self.tokens[self.pos].span;
        let mut end = start;
        for token in &self.tokens[self.pos..] {
            if token.kind == TokenKind::Newline {
                break;
            }
            end = token.span;
        }
        start.to(end)
    }

    fn statement(&mut self) -> Result<Stmt> {
        // An assignment is IDENT '=' not followed by another '=' (there is no
        // equality operator in this grammar, so one lookahead suffices).
        if let (Some(TokenKind::Ident(name)), Some(TokenKind::Equals)) =
            (self.kind_at(0), self.kind_at(1))
        {
            let name = name.clone();
            self.pos += 2;
            let value = self.expr()?;
            return Ok(Stmt::Assign { name, value });
        }
        Ok(Stmt::Expr(self.expr()?))
    }

    fn expect_statement_end(&mut self) -> Result<()> {
        match self.peek() {
            Option::None => Ok(()),
            Some(token) if token.kind == TokenKind::Newline => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(self.ctx.syntax_error(
                format!("expected end of statement, found {}", token.kind.describe()),
                token.span,
            )),
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Dot) => {
                    self.pos += 1;
                    let (attr, attr_span) = self.expect_ident("attribute name")?;
                    let span = expr.span.to(attr_span);
                    expr = Expr {
                        kind: ExprKind::Attr {
                            base: Box::new(expr),
                            attr,
                            attr_span,
                        },
                        span,
                    };
                }
                Some(TokenKind::LParen) => {
                    self.pos += 1;
                    let (args, kwargs, close_span) = self.arguments()?;
                    let span = expr.span.to(close_span);
                    expr = Expr {
                        kind: ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                            kwargs,
                        },
                        span,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn arguments(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>, Span)> {
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();

        loop {
            match self.peek() {
                Option::None => {
                    return Err(self.ctx.syntax_error(
                        "unexpected end of file inside argument list",
                        self.end_span(),
                    ));
                }
                Some(token) if token.kind == TokenKind::RParen => {
                    let span = token.span;
                    self.pos += 1;
                    return Ok((args, kwargs, span));
                }
                _ => {}
            }

            // Keyword argument: IDENT '=' expr
            if let (Some(TokenKind::Ident(name)), Some(TokenKind::Equals)) =
                (self.kind_at(0), self.kind_at(1))
            {
                let name = name.clone();
                let name_span = self.tokens[self.pos].span;
                if kwargs.iter().any(|(existing, _)| *existing == name) {
                    return Err(self
                        .ctx
                        .syntax_error(format!("repeated keyword argument '{name}'"), name_span));
                }
                self.pos += 2;
                let value = self.expr()?;
                kwargs.push((name, value));
            } else {
                let value = self.expr()?;
                if !kwargs.is_empty() {
                    return Err(self.ctx.syntax_error(
                        "positional argument follows keyword argument",
                        value.span,
                    ));
                }
                args.push(value);
            }

            match self.peek() {
                Some(token) if token.kind == TokenKind::Comma => {
                    self.pos += 1;
                }
                Some(token) if token.kind == TokenKind::RParen => {}
                Some(token) => {
                    return Err(self.ctx.syntax_error(
                        format!("expected ',' or ')', found {}", token.kind.describe()),
                        token.span,
                    ));
                }
                Option::None => {
                    return Err(self.ctx.syntax_error(
                        "unexpected end of file inside argument list",
                        self.end_span(),
                    ));
                }
            }
        }
    }

    fn list(&mut self, open_span: Span) -> Result<Expr> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Option::None => {
                    return Err(self
                        .ctx
                        .syntax_error("unexpected end of file inside list", self.end_span()));
                }
                Some(token) if token.kind == TokenKind::RBracket => {
                    let span = open_span.to(token.span);
                    self.pos += 1;
                    return Ok(Expr {
                        kind: ExprKind::List(items),
                        span,
                    });
                }
                _ => {}
            }

            items.push(self.expr()?);

            match self.peek() {
                Some(token) if token.kind == TokenKind::Comma => {
                    self.pos += 1;
                }
                Some(token) if token.kind == TokenKind::RBracket => {}
                Some(token) => {
                    return Err(self.ctx.syntax_error(
                        format!("expected ',' or ']', found {}", token.kind.describe()),
                        token.span,
                    ));
                }
                Option::None => {
                    return Err(self
                        .ctx
                        .syntax_error("unexpected end of file inside list", self.end_span()));
                }
            }
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            Option::None => {
                return Err(self
                    .ctx
                    .syntax_error("unexpected end of file", self.end_span()));
            }
        };

        let kind = match token.kind {
            TokenKind::Str(value) => ExprKind::Str(value),
            TokenKind::Int(value) => ExprKind::Int(value),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::None => ExprKind::None,
            TokenKind::Ident(name) => ExprKind::Name(name),
            TokenKind::LBracket => {
                self.pos += 1;
                return self.list(token.span);
            }
            TokenKind::Import | TokenKind::From => {
                return Err(self.ctx.forbidden_import(token.span));
            }
            other => {
                return Err(self.ctx.syntax_error(
                    format!("expected an expression, found {}", other.describe()),
                    token.span,
                ));
            }
        };

        self.pos += 1;
        Ok(Expr {
            kind,
            span: token.span,
        })
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, Span)> {
        match self.peek() {
            Some(token) => {
                if let TokenKind::Ident(name) = &token.kind {
                    let result = (name.clone(), token.span);
                    self.pos += 1;
                    Ok(result)
                } else {
                    Err(self.ctx.syntax_error(
                        format!("expected {what}, found {}", token.kind.describe()),
                        token.span,
                    ))
                }
            }
            Option::None => Err(self
                .ctx
                .syntax_error(format!("expected {what}"), self.end_span())),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn kind_at(&self, ahead: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn end_span(&self) -> Span {
        Span::new(self.ctx.src().len(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lexer::tokenize;

    fn parse_src(src: &str) -> Result<Vec<Stmt>> {
        let ctx = SourceContext::new(src, "model.py");
        let tokens = tokenize(&ctx)?;
        parse(&ctx, &tokens)
    }

    #[test]
    fn test_call_statement() {
        let stmts = parse_src(r#"Schema("Sales")"#).unwrap();
        assert_eq!(stmts.len(), 1);
        let Stmt::Expr(expr) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { callee, args, kwargs } = &expr.kind else {
            panic!("expected call");
        };
        assert_eq!(callee.kind, ExprKind::Name("Schema".to_string()));
        assert_eq!(args.len(), 1);
        assert!(kwargs.is_empty());
    }

    #[test]
    fn test_assignment() {
        let stmts = parse_src(r#"Status = Enum("Status", "ON", "OFF")"#).unwrap();
        let Stmt::Assign { name, value, .. } = &stmts[0] else {
            panic!("expected assignment");
        };
        assert_eq!(name, "Status");
        assert!(matches!(value.kind, ExprKind::Call { .. }));
    }

    #[test]
    fn test_keyword_arguments() {
        let stmts = parse_src(r#"Column("id", Integer, primary_key=True, nullable=False)"#).unwrap();
        let Stmt::Expr(expr) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { args, kwargs, .. } = &expr.kind else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 2);
        assert_eq!(kwargs[0].0, "primary_key");
        assert_eq!(kwargs[0].1.kind, ExprKind::Bool(true));
        assert_eq!(kwargs[1].0, "nullable");
        assert_eq!(kwargs[1].1.kind, ExprKind::Bool(false));
    }

    #[test]
    fn test_attribute_chain() {
        let stmts = parse_src("ForeignKey(tables.customers.id)").unwrap();
        let Stmt::Expr(expr) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { args, .. } = &expr.kind else {
            panic!("expected call");
        };
        let ExprKind::Attr { base, attr, .. } = &args[0].kind else {
            panic!("expected attribute access");
        };
        assert_eq!(attr, "id");
        assert!(matches!(&base.kind, ExprKind::Attr { attr, .. } if attr == "customers"));
    }

    #[test]
    fn test_list_literal() {
        let stmts = parse_src(r#"ForeignKeyConstraint(["a", "b"], ["t.a", "t.b"])"#).unwrap();
        let Stmt::Expr(expr) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { args, .. } = &expr.kind else {
            panic!("expected call");
        };
        let ExprKind::List(items) = &args[0].kind else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_trailing_commas() {
        assert!(parse_src("Table(\n  \"t\",\n  Column(\"id\", Integer),\n)").is_ok());
        assert!(parse_src(r#"UniqueConstraint("a", "b",)"#).is_ok());
    }

    #[test]
    fn test_import_is_policy_error() {
        let err = parse_src("import os").unwrap_err();
        assert!(matches!(*err, Error::ForbiddenImport { .. }));

        let err = parse_src("from os import path").unwrap_err();
        assert!(matches!(*err, Error::ForbiddenImport { .. }));
    }

    #[test]
    fn test_import_after_statements_is_still_caught() {
        let err = parse_src("Schema(\"S\")\nimport os\n").unwrap_err();
        assert!(matches!(*err, Error::ForbiddenImport { .. }));
    }

    #[test]
    fn test_positional_after_keyword_fails() {
        let err = parse_src(r#"Column("id", nullable=False, Integer)"#).unwrap_err();
        assert!(matches!(*err, Error::Syntax { .. }));
    }

    #[test]
    fn test_unclosed_call_fails() {
        let err = parse_src("Table(\"t\"").unwrap_err();
        assert!(matches!(*err, Error::Syntax { .. }));
    }

    #[test]
    fn test_two_statements_per_line_fail() {
        // No statement separator other than a newline.
        let err = parse_src(r#"Schema("A") Schema("B")"#).unwrap_err();
        assert!(matches!(*err, Error::Syntax { .. }));
    }
}
