// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Database model loading for the Ogma generator.
//!
//! The model DSL is evaluated by an explicit lexer/parser/interpreter with a
//! fixed injected environment; there is no dynamic execution and no module
//! system. Loading produces an immutable [`Schema`] which [`validate`]
//! cross-checks before any artifact is emitted.

mod dbname;
mod error;
mod eval;
mod lexer;
mod loader;
mod parser;
mod procedures;
mod schema;

pub use dbname::unique_database_name;
pub use error::{Error, Result, SourceContext};
pub use loader::{load_model, parse_model};
pub use procedures::{ParamDirection, ProcParam, StoredProcedure};
pub use schema::validate::{Violation, ViolationKind, validate};
pub use schema::{
    Column, ColumnType, DbSettings, DefaultValue, EnumDef, ForeignKey, Index, RefAction, Schema,
    Table, TableConstraint, TableOptions,
};
