//! Evaluator for parsed model statements.
//!
//! Runs the statement list against an explicit injected environment: the
//! model-utility names (`Table`, `Column`, `Enum`, the column types, SQL
//! keyword constants, the `enums`/`tables` namespaces) are bindings in a
//! per-evaluation scope, not global state. Entities register themselves into
//! the schema as they are constructed; duplicate names fail the load
//! immediately, while dangling `enums.X` / `tables.t.c` references are left
//! for the validator to report in one pass.

use std::collections::{HashMap, VecDeque};

use crate::error::{Result, SourceContext};
use crate::lexer::Span;
use crate::parser::{Expr, ExprKind, Stmt};
use crate::procedures::{ParamDirection, ProcParam, StoredProcedure};
use crate::schema::{
    Column, ColumnType, DefaultValue, EnumDef, ForeignKey, Index, RefAction, Schema, Table,
    TableConstraint, TableOptions,
};

/// Model constructors available to every model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Schema,
    Table,
    Column,
    Enum,
    ForeignKey,
    ForeignKeyConstraint,
    PrimaryKeyConstraint,
    UniqueConstraint,
    CheckConstraint,
    Index,
    StoredProcedure,
    ProcParam,
    ProcComment,
    ProcSqlBody,
}

/// Column types that take parameters when called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeCtor {
    String,
    Numeric,
    VarBinary,
    Binary,
}

impl TypeCtor {
    fn name(&self) -> &'static str {
        match self {
            TypeCtor::String => "String",
            TypeCtor::Numeric => "Numeric",
            TypeCtor::VarBinary => "VARBINARY",
            TypeCtor::Binary => "BINARY",
        }
    }
}

/// A runtime value produced while evaluating model statements.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    List(Vec<Value>),
    Type(ColumnType),
    TypeCtor(TypeCtor),
    Builtin(Builtin),
    Column(Column),
    Constraint(TableConstraint),
    Index(Index),
    ForeignKey(ForeignKey),
    /// A declared (or lazily referenced) enum used as a column type factory.
    EnumType(String),
    EnumsNamespace,
    TablesNamespace,
    /// `tables.orders`, waiting for a column attribute.
    TableRef(String),
    /// `tables.orders.id`, a lazy `"table.column"` reference.
    ColumnRef(String),
    /// `CURRENT_TIMESTAMP` / `NULL` constants, usable as column defaults.
    Keyword(DefaultValue),
    Direction(ParamDirection),
    ProcParam(ProcParam),
    ProcComment(String),
    ProcSqlBody(String),
}

impl Value {
    fn describe(&self) -> &'static str {
        match self {
            Value::Str(_) => "a string",
            Value::Int(_) => "a number",
            Value::Bool(_) => "a boolean",
            Value::None => "None",
            Value::List(_) => "a list",
            Value::Type(_) => "a column type",
            Value::TypeCtor(_) => "a column type",
            Value::Builtin(_) => "a model constructor",
            Value::Column(_) => "a column",
            Value::Constraint(_) => "a table constraint",
            Value::Index(_) => "an index",
            Value::ForeignKey(_) => "a foreign key",
            Value::EnumType(_) => "an enum",
            Value::EnumsNamespace | Value::TablesNamespace => "a namespace",
            Value::TableRef(_) => "a table reference",
            Value::ColumnRef(_) => "a column reference",
            Value::Keyword(_) => "a SQL keyword",
            Value::Direction(_) => "a parameter direction",
            Value::ProcParam(_) => "a procedure parameter",
            Value::ProcComment(_) => "a procedure comment",
            Value::ProcSqlBody(_) => "a procedure body",
        }
    }
}

/// Evaluate parsed statements into a schema.
pub fn evaluate(ctx: &SourceContext, stmts: &[Stmt]) -> Result<Schema> {
    let mut evaluator = Evaluator {
        ctx,
        schema: Schema::default(),
        scope: environment(),
    };
    for stmt in stmts {
        evaluator.statement(stmt)?;
    }
    Ok(evaluator.schema)
}

/// The injected model-utility namespace.
fn environment() -> HashMap<String, Value> {
    let mut env = HashMap::new();

    for (name, builtin) in [
        ("Schema", Builtin::Schema),
        ("Table", Builtin::Table),
        ("Column", Builtin::Column),
        ("Enum", Builtin::Enum),
        ("ForeignKey", Builtin::ForeignKey),
        ("ForeignKeyConstraint", Builtin::ForeignKeyConstraint),
        ("PrimaryKeyConstraint", Builtin::PrimaryKeyConstraint),
        ("UniqueConstraint", Builtin::UniqueConstraint),
        ("CheckConstraint", Builtin::CheckConstraint),
        ("Index", Builtin::Index),
        ("StoredProcedure", Builtin::StoredProcedure),
        ("ProcParam", Builtin::ProcParam),
        ("ProcComment", Builtin::ProcComment),
        ("ProcSqlBody", Builtin::ProcSqlBody),
    ] {
        env.insert(name.to_string(), Value::Builtin(builtin));
    }

    for (name, ty) in [
        ("Integer", ColumnType::Integer),
        ("BigInteger", ColumnType::BigInteger),
        ("Boolean", ColumnType::Boolean),
        ("DateTime", ColumnType::DateTime),
        ("Text", ColumnType::Text),
        ("LargeBinary", ColumnType::LargeBinary),
    ] {
        env.insert(name.to_string(), Value::Type(ty));
    }

    for (name, ctor) in [
        ("String", TypeCtor::String),
        ("Numeric", TypeCtor::Numeric),
        ("VARBINARY", TypeCtor::VarBinary),
        ("BINARY", TypeCtor::Binary),
    ] {
        env.insert(name.to_string(), Value::TypeCtor(ctor));
    }

    // Predefined literals, so model files never spell keywords as strings.
    env.insert(
        "CURRENT_TIMESTAMP".to_string(),
        Value::Keyword(DefaultValue::CurrentTimestamp),
    );
    env.insert("NULL".to_string(), Value::Keyword(DefaultValue::Null));
    env.insert("CASCADE".to_string(), Value::Str("CASCADE".to_string()));
    env.insert("SET_NULL".to_string(), Value::Str("SET NULL".to_string()));
    env.insert("RESTRICT".to_string(), Value::Str("RESTRICT".to_string()));

    env.insert("IN".to_string(), Value::Direction(ParamDirection::In));
    env.insert("OUT".to_string(), Value::Direction(ParamDirection::Out));
    env.insert("INOUT".to_string(), Value::Direction(ParamDirection::InOut));

    env.insert("enums".to_string(), Value::EnumsNamespace);
    env.insert("tables".to_string(), Value::TablesNamespace);

    env
}

struct Evaluator<'a> {
    ctx: &'a SourceContext,
    schema: Schema,
    scope: HashMap<String, Value>,
}

impl<'a> Evaluator<'a> {
    fn statement(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign { name, value, .. } => {
                let value = self.expr(value)?;
                self.scope.insert(name.clone(), value);
            }
            Stmt::Expr(expr) => {
                self.expr(expr)?;
            }
        }
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Str(value) => Ok(Value::Str(value.clone())),
            ExprKind::Int(value) => Ok(Value::Int(*value)),
            ExprKind::Bool(value) => Ok(Value::Bool(*value)),
            ExprKind::None => Ok(Value::None),
            ExprKind::List(items) => {
                let values = items
                    .iter()
                    .map(|item| self.expr(item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::List(values))
            }
            ExprKind::Name(name) => match self.scope.get(name) {
                Some(value) => Ok(value.clone()),
                None => Err(self.ctx.unknown_name(name, expr.span)),
            },
            ExprKind::Attr {
                base,
                attr,
                attr_span,
            } => self.attribute(base, attr, *attr_span),
            ExprKind::Call {
                callee,
                args,
                kwargs,
            } => self.call(callee, args, kwargs, expr.span),
        }
    }

    fn attribute(&mut self, base: &Expr, attr: &str, attr_span: Span) -> Result<Value> {
        let base_value = self.expr(base)?;
        match base_value {
            // Lazy references: existence is the validator's concern, so that
            // every dangling reference is reported in one pass.
            Value::EnumsNamespace => Ok(Value::EnumType(attr.to_string())),
            Value::TablesNamespace => Ok(Value::TableRef(attr.to_string())),
            Value::TableRef(table) => Ok(Value::ColumnRef(format!("{table}.{attr}"))),
            other => Err(self.ctx.invalid_call(
                format!("{} has no attribute '{attr}'", other.describe()),
                attr_span,
            )),
        }
    }

    fn call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        kwargs: &[(String, Expr)],
        span: Span,
    ) -> Result<Value> {
        let callee_value = self.expr(callee)?;

        let mut positional = VecDeque::new();
        for arg in args {
            positional.push_back((self.expr(arg)?, arg.span));
        }
        let mut keyword = Vec::new();
        for (name, arg) in kwargs {
            keyword.push((name.clone(), self.expr(arg)?, arg.span));
        }

        match callee_value {
            Value::Builtin(builtin) => {
                let call = Call {
                    ctx: self.ctx,
                    name: builtin_name(builtin),
                    span,
                    positional,
                    keyword,
                };
                self.builtin(builtin, call)
            }
            Value::Type(ty) => {
                let call = Call::bare(self.ctx, "column type", span, positional, keyword);
                call.finish()?;
                Ok(Value::Type(ty))
            }
            Value::TypeCtor(ctor) => {
                let call = Call::bare(self.ctx, ctor.name(), span, positional, keyword);
                self.type_ctor(ctor, call)
            }
            Value::EnumType(name) => {
                let call = Call::bare(self.ctx, "enum type", span, positional, keyword);
                call.finish()?;
                Ok(Value::Type(ColumnType::EnumRef(name)))
            }
            other => Err(self
                .ctx
                .invalid_call(format!("{} is not callable", other.describe()), span)),
        }
    }

    fn type_ctor(&mut self, ctor: TypeCtor, mut call: Call<'_>) -> Result<Value> {
        let ty = match ctor {
            TypeCtor::String => ColumnType::String {
                length: call.expect_u32("a length")?,
            },
            TypeCtor::Numeric => {
                if call.positional.is_empty() {
                    ColumnType::Numeric { precision: None }
                } else {
                    let precision = call.expect_u32("a precision")?;
                    let scale = call.expect_u32("a scale")?;
                    ColumnType::Numeric {
                        precision: Some((precision, scale)),
                    }
                }
            }
            TypeCtor::VarBinary => ColumnType::VarBinary {
                length: call.expect_u32("a length")?,
            },
            TypeCtor::Binary => ColumnType::Binary {
                length: call.expect_u32("a length")?,
            },
        };
        call.finish()?;
        Ok(Value::Type(ty))
    }

    fn builtin(&mut self, builtin: Builtin, call: Call<'_>) -> Result<Value> {
        match builtin {
            Builtin::Schema => self.schema_decl(call),
            Builtin::Table => self.table(call),
            Builtin::Column => self.column(call),
            Builtin::Enum => self.enum_decl(call),
            Builtin::ForeignKey => self.foreign_key(call),
            Builtin::ForeignKeyConstraint => self.foreign_key_constraint(call),
            Builtin::PrimaryKeyConstraint => self.primary_key_constraint(call),
            Builtin::UniqueConstraint => self.unique_constraint(call),
            Builtin::CheckConstraint => self.check_constraint(call),
            Builtin::Index => self.index(call),
            Builtin::StoredProcedure => self.stored_procedure(call),
            Builtin::ProcParam => self.proc_param(call),
            Builtin::ProcComment => {
                let mut call = call;
                let text = call.expect_str("the comment text")?;
                call.finish()?;
                Ok(Value::ProcComment(text))
            }
            Builtin::ProcSqlBody => {
                let mut call = call;
                let text = call.expect_str("the SQL body")?;
                call.finish()?;
                Ok(Value::ProcSqlBody(text))
            }
        }
    }

    /// `Schema("name")`: declare the schema name. Last declaration wins.
    fn schema_decl(&mut self, mut call: Call<'_>) -> Result<Value> {
        let name = call.expect_str("the schema name")?;
        call.finish()?;
        self.schema.name = Some(name);
        Ok(Value::None)
    }

    /// `Enum("Name", "label", ...)`: integer-backed enum declaration.
    fn enum_decl(&mut self, mut call: Call<'_>) -> Result<Value> {
        let span = call.span;
        let name = call.expect_str("the enum name")?;

        let mut labels: Vec<String> = Vec::new();
        while !call.positional.is_empty() {
            let (label, label_span) = call.expect_str_at("an enum value")?;
            if label.is_empty() {
                return Err(self
                    .ctx
                    .invalid_call("enum values cannot be empty", label_span));
            }
            if labels.contains(&label) {
                return Err(self
                    .ctx
                    .duplicate(format!("value in enum '{name}'"), label, label_span));
            }
            labels.push(label);
        }
        if labels.is_empty() {
            return Err(self.ctx.invalid_call(
                format!("enum '{name}' needs at least one value"),
                span,
            ));
        }
        call.finish()?;

        if self.schema.enums.contains_key(&name) {
            return Err(self.ctx.duplicate("enum", name, span));
        }
        self.schema
            .enums
            .insert(name.clone(), EnumDef { name: name.clone(), labels });
        Ok(Value::EnumType(name))
    }

    /// `Table("name", Column(...), ..., constraints..., **mysql options)`.
    fn table(&mut self, mut call: Call<'_>) -> Result<Value> {
        let span = call.span;
        let name = call.expect_str("the table name")?;

        let mut table = Table {
            name: name.clone(),
            columns: Default::default(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            options: TableOptions::default(),
        };

        while let Some((value, value_span)) = call.positional.pop_front() {
            match value {
                Value::Column(column) => {
                    if table.columns.contains_key(&column.name) {
                        return Err(self.ctx.duplicate(
                            format!("column in table '{name}'"),
                            column.name,
                            value_span,
                        ));
                    }
                    table.columns.insert(column.name.clone(), column);
                }
                Value::Constraint(constraint) => table.constraints.push(constraint),
                Value::Index(index) => table.indexes.push(index),
                other => {
                    return Err(self.ctx.invalid_call(
                        format!("unexpected {} in Table(...)", other.describe()),
                        value_span,
                    ));
                }
            }
        }

        if let Some(engine) = call.kwarg_str_any(&["mysql_engine"])? {
            table.options.engine = engine;
        }
        if let Some(charset) = call.kwarg_str_any(&[
            "mysql_character_set",
            "mysql_charset",
            "mysql_default_character_set",
            "mysql_default_charset",
        ])? {
            table.options.charset = charset;
        }
        if let Some(collation) =
            call.kwarg_str_any(&["mysql_collate", "mysql_default_collate", "mysql_collation"])?
        {
            table.options.collation = collation;
        }
        if let Some(row_format) = call.kwarg_str_any(&["mysql_row_format"])? {
            table.options.row_format = row_format;
        }
        call.finish()?;

        if self.schema.tables.contains_key(&name) {
            return Err(self.ctx.duplicate("table", name, span));
        }
        self.schema.tables.insert(name.clone(), table);
        Ok(Value::TableRef(name))
    }

    /// `Column("name", <type>, [ForeignKey(...)], **settings)`.
    fn column(&mut self, mut call: Call<'_>) -> Result<Value> {
        let name = call.expect_str("the column name")?;

        let ty = match call.positional.pop_front() {
            Some((Value::Type(ty), _)) => ty,
            Some((Value::EnumType(enum_name), _)) => ColumnType::EnumRef(enum_name),
            Some((Value::TypeCtor(TypeCtor::Numeric), _)) => ColumnType::Numeric { precision: None },
            Some((Value::TypeCtor(ctor), span)) => {
                return Err(self.ctx.invalid_call(
                    format!("{} requires a length, e.g. {}(255)", ctor.name(), ctor.name()),
                    span,
                ));
            }
            Some((other, span)) => {
                return Err(self.ctx.invalid_call(
                    format!("Column expects a column type, found {}", other.describe()),
                    span,
                ));
            }
            None => {
                return Err(self
                    .ctx
                    .invalid_call(format!("column '{name}' is missing a type"), call.span));
            }
        };

        let foreign_key = match call.positional.pop_front() {
            None => None,
            Some((Value::ForeignKey(fk), _)) => Some(fk),
            Some((other, span)) => {
                return Err(self.ctx.invalid_call(
                    format!("unexpected {} in Column(...)", other.describe()),
                    span,
                ));
            }
        };

        if let Some((_, span)) = call.kwarg("server_default") {
            return Err(self.ctx.invalid_call(
                "server_default should not be used directly in columns. Use default instead",
                span,
            ));
        }

        let default = match call.kwarg("default") {
            None => None,
            Some((Value::Int(v), _)) => Some(DefaultValue::Int(v)),
            Some((Value::Bool(v), _)) => Some(DefaultValue::Bool(v)),
            Some((Value::Str(v), _)) => Some(DefaultValue::Str(v)),
            Some((Value::Keyword(keyword), _)) => Some(keyword),
            Some((other, span)) => {
                return Err(self.ctx.invalid_call(
                    format!("unsupported default value: {}", other.describe()),
                    span,
                ));
            }
        };

        let column = Column {
            name,
            ty,
            nullable: call.kwarg_bool("nullable")?,
            primary_key: call.kwarg_bool("primary_key")?.unwrap_or(false),
            unique: call.kwarg_bool("unique")?.unwrap_or(false),
            autoincrement: call.kwarg_bool("autoincrement")?.unwrap_or(false),
            default,
            foreign_key,
        };
        call.finish()?;
        Ok(Value::Column(column))
    }

    /// `ForeignKey("table.column" | tables.t.c, onupdate=, ondelete=)`.
    fn foreign_key(&mut self, mut call: Call<'_>) -> Result<Value> {
        let target = call.expect_column_ref("the target column")?;
        let on_update = call.kwarg_action("onupdate")?;
        let on_delete = call.kwarg_action("ondelete")?;
        call.finish()?;
        Ok(Value::ForeignKey(ForeignKey {
            target,
            on_update,
            on_delete,
        }))
    }

    fn foreign_key_constraint(&mut self, mut call: Call<'_>) -> Result<Value> {
        let span = call.span;
        let columns = call.expect_str_list("the local columns")?;
        let targets = call.expect_column_ref_list("the target columns")?;
        if columns.len() != targets.len() {
            return Err(self.ctx.invalid_call(
                "ForeignKeyConstraint needs as many target columns as local columns",
                span,
            ));
        }
        let name = call.kwarg_str("name")?;
        let on_update = call.kwarg_action("onupdate")?;
        let on_delete = call.kwarg_action("ondelete")?;
        call.finish()?;
        Ok(Value::Constraint(TableConstraint::ForeignKey {
            columns,
            targets,
            name,
            on_update,
            on_delete,
        }))
    }

    fn primary_key_constraint(&mut self, mut call: Call<'_>) -> Result<Value> {
        let span = call.span;
        let mut columns = Vec::new();
        while !call.positional.is_empty() {
            columns.push(call.expect_str("a column name")?);
        }
        if columns.is_empty() {
            return Err(self
                .ctx
                .invalid_call("PrimaryKeyConstraint needs at least one column", span));
        }
        call.finish()?;
        Ok(Value::Constraint(TableConstraint::PrimaryKey { columns }))
    }

    fn unique_constraint(&mut self, mut call: Call<'_>) -> Result<Value> {
        let span = call.span;
        let mut columns = Vec::new();
        while !call.positional.is_empty() {
            columns.push(call.expect_str("a column name")?);
        }
        if columns.is_empty() {
            return Err(self
                .ctx
                .invalid_call("UniqueConstraint needs at least one column", span));
        }
        let name = call.kwarg_str("name")?;
        call.finish()?;
        Ok(Value::Constraint(TableConstraint::Unique { columns, name }))
    }

    fn check_constraint(&mut self, mut call: Call<'_>) -> Result<Value> {
        let expression = call.expect_str("the check expression")?;
        let name = call.kwarg_str("name")?;
        call.finish()?;
        Ok(Value::Constraint(TableConstraint::Check { expression, name }))
    }

    fn index(&mut self, mut call: Call<'_>) -> Result<Value> {
        let span = call.span;
        let name = call.expect_str("the index name")?;
        let mut columns = Vec::new();
        while !call.positional.is_empty() {
            columns.push(call.expect_str("a column name")?);
        }
        if columns.is_empty() {
            return Err(self.ctx.invalid_call(
                format!("index '{name}' needs at least one column"),
                span,
            ));
        }
        let unique = call.kwarg_bool("unique")?.unwrap_or(false);
        call.finish()?;
        Ok(Value::Index(Index {
            name,
            columns,
            unique,
        }))
    }

    /// `StoredProcedure("name", ProcParam(...), ProcComment(...),
    /// ProcSqlBody(...))`: argument semantics by type, any order.
    fn stored_procedure(&mut self, mut call: Call<'_>) -> Result<Value> {
        let span = call.span;
        let name = call.expect_str("the procedure name")?;

        let mut params = Vec::new();
        let mut comment = None;
        let mut body = None;
        while let Some((value, value_span)) = call.positional.pop_front() {
            match value {
                Value::ProcParam(param) => params.push(param),
                Value::ProcComment(text) => comment = Some(text),
                Value::ProcSqlBody(text) => body = Some(text),
                other => {
                    return Err(self.ctx.invalid_call(
                        format!("unexpected {} in StoredProcedure(...)", other.describe()),
                        value_span,
                    ));
                }
            }
        }
        call.finish()?;

        let Some(body) = body else {
            return Err(self.ctx.invalid_call(
                format!("stored procedure '{name}' needs a ProcSqlBody"),
                span,
            ));
        };
        if self.schema.procedures.iter().any(|p| p.name == name) {
            return Err(self.ctx.duplicate("stored procedure", name, span));
        }
        self.schema.procedures.push(StoredProcedure {
            name,
            comment,
            params,
            body,
        });
        Ok(Value::None)
    }

    fn proc_param(&mut self, mut call: Call<'_>) -> Result<Value> {
        let span = call.span;
        let name = call.expect_str("the parameter name")?;
        let sql_type = call.expect_str("the SQL type")?;
        let direction = match call.positional.pop_front() {
            Some((Value::Direction(direction), _)) => direction,
            Some((other, value_span)) => {
                return Err(self.ctx.invalid_call(
                    format!(
                        "ProcParam expects IN, OUT or INOUT, found {}",
                        other.describe()
                    ),
                    value_span,
                ));
            }
            None => {
                return Err(self.ctx.invalid_call(
                    format!("parameter '{name}' is missing a direction (IN, OUT or INOUT)"),
                    span,
                ));
            }
        };
        call.finish()?;
        Ok(Value::ProcParam(ProcParam {
            name,
            sql_type,
            direction,
        }))
    }
}

fn builtin_name(builtin: Builtin) -> &'static str {
    match builtin {
        Builtin::Schema => "Schema",
        Builtin::Table => "Table",
        Builtin::Column => "Column",
        Builtin::Enum => "Enum",
        Builtin::ForeignKey => "ForeignKey",
        Builtin::ForeignKeyConstraint => "ForeignKeyConstraint",
        Builtin::PrimaryKeyConstraint => "PrimaryKeyConstraint",
        Builtin::UniqueConstraint => "UniqueConstraint",
        Builtin::CheckConstraint => "CheckConstraint",
        Builtin::Index => "Index",
        Builtin::StoredProcedure => "StoredProcedure",
        Builtin::ProcParam => "ProcParam",
        Builtin::ProcComment => "ProcComment",
        Builtin::ProcSqlBody => "ProcSqlBody",
    }
}

/// Evaluated arguments of one call, consumed left to right.
struct Call<'a> {
    ctx: &'a SourceContext,
    name: &'static str,
    span: Span,
    positional: VecDeque<(Value, Span)>,
    keyword: Vec<(String, Value, Span)>,
}

impl<'a> Call<'a> {
    fn bare(
        ctx: &'a SourceContext,
        name: &'static str,
        span: Span,
        positional: VecDeque<(Value, Span)>,
        keyword: Vec<(String, Value, Span)>,
    ) -> Self {
        Self {
            ctx,
            name,
            span,
            positional,
            keyword,
        }
    }

    fn expect_str(&mut self, what: &str) -> Result<String> {
        self.expect_str_at(what).map(|(value, _)| value)
    }

    fn expect_str_at(&mut self, what: &str) -> Result<(String, Span)> {
        match self.positional.pop_front() {
            Some((Value::Str(value), span)) => Ok((value, span)),
            Some((other, span)) => Err(self.ctx.invalid_call(
                format!(
                    "{} expects {what} as a string, found {}",
                    self.name,
                    other.describe()
                ),
                span,
            )),
            None => Err(self
                .ctx
                .invalid_call(format!("{} is missing {what}", self.name), self.span)),
        }
    }

    fn expect_u32(&mut self, what: &str) -> Result<u32> {
        match self.positional.pop_front() {
            Some((Value::Int(value), span)) => u32::try_from(value).map_err(|_| {
                self.ctx
                    .invalid_call(format!("{} expects {what} >= 0", self.name), span)
            }),
            Some((other, span)) => Err(self.ctx.invalid_call(
                format!(
                    "{} expects {what} as a number, found {}",
                    self.name,
                    other.describe()
                ),
                span,
            )),
            None => Err(self
                .ctx
                .invalid_call(format!("{} is missing {what}", self.name), self.span)),
        }
    }

    /// A `"table.column"` string or a `tables.t.c` reference.
    fn expect_column_ref(&mut self, what: &str) -> Result<String> {
        match self.positional.pop_front() {
            Some((Value::Str(value), _)) | Some((Value::ColumnRef(value), _)) => Ok(value),
            Some((other, span)) => Err(self.ctx.invalid_call(
                format!(
                    "{} expects {what} as 'table.column', found {}",
                    self.name,
                    other.describe()
                ),
                span,
            )),
            None => Err(self
                .ctx
                .invalid_call(format!("{} is missing {what}", self.name), self.span)),
        }
    }

    fn expect_str_list(&mut self, what: &str) -> Result<Vec<String>> {
        self.expect_list(what, |value| match value {
            Value::Str(s) => Some(s),
            _ => None,
        })
    }

    fn expect_column_ref_list(&mut self, what: &str) -> Result<Vec<String>> {
        self.expect_list(what, |value| match value {
            Value::Str(s) | Value::ColumnRef(s) => Some(s),
            _ => None,
        })
    }

    fn expect_list(
        &mut self,
        what: &str,
        mut accept: impl FnMut(Value) -> Option<String>,
    ) -> Result<Vec<String>> {
        match self.positional.pop_front() {
            Some((Value::List(items), span)) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match accept(item) {
                        Some(value) => values.push(value),
                        None => {
                            return Err(self.ctx.invalid_call(
                                format!("{} expects {what} as a list of strings", self.name),
                                span,
                            ));
                        }
                    }
                }
                Ok(values)
            }
            Some((other, span)) => Err(self.ctx.invalid_call(
                format!(
                    "{} expects {what} as a list, found {}",
                    self.name,
                    other.describe()
                ),
                span,
            )),
            None => Err(self
                .ctx
                .invalid_call(format!("{} is missing {what}", self.name), self.span)),
        }
    }

    fn kwarg(&mut self, key: &str) -> Option<(Value, Span)> {
        let index = self.keyword.iter().position(|(name, _, _)| name == key)?;
        let (_, value, span) = self.keyword.remove(index);
        Some((value, span))
    }

    fn kwarg_bool(&mut self, key: &str) -> Result<Option<bool>> {
        match self.kwarg(key) {
            None => Ok(None),
            Some((Value::Bool(value), _)) => Ok(Some(value)),
            Some((other, span)) => Err(self.ctx.invalid_call(
                format!("'{key}' expects True or False, found {}", other.describe()),
                span,
            )),
        }
    }

    fn kwarg_str(&mut self, key: &str) -> Result<Option<String>> {
        match self.kwarg(key) {
            None => Ok(None),
            Some((Value::Str(value), _)) => Ok(Some(value)),
            Some((other, span)) => Err(self.ctx.invalid_call(
                format!("'{key}' expects a string, found {}", other.describe()),
                span,
            )),
        }
    }

    /// First present keyword among `keys` (SQLAlchemy-style option aliases).
    fn kwarg_str_any(&mut self, keys: &[&str]) -> Result<Option<String>> {
        for key in keys {
            if let Some(value) = self.kwarg_str(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn kwarg_action(&mut self, key: &str) -> Result<Option<RefAction>> {
        match self.kwarg(key) {
            None => Ok(None),
            Some((Value::Str(value), span)) => RefAction::from_sql(&value).map(Some).ok_or_else(|| {
                self.ctx.invalid_call(
                    format!("'{key}' expects CASCADE, SET_NULL or RESTRICT, found '{value}'"),
                    span,
                )
            }),
            Some((other, span)) => Err(self.ctx.invalid_call(
                format!(
                    "'{key}' expects CASCADE, SET_NULL or RESTRICT, found {}",
                    other.describe()
                ),
                span,
            )),
        }
    }

    fn finish(mut self) -> Result<()> {
        if let Some((value, span)) = self.positional.pop_front() {
            return Err(self.ctx.invalid_call(
                format!("unexpected {} in {}(...)", value.describe(), self.name),
                span,
            ));
        }
        if let Some((key, _, span)) = self.keyword.first() {
            return Err(self.ctx.invalid_call(
                format!("unknown keyword argument '{key}' for {}", self.name),
                *span,
            ));
        }
        Ok(())
    }
}
