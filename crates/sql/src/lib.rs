//! SQL front end for PostgreSQL log analysis.
//!
//! This crate turns the SQL text embedded in PostgreSQL log lines into:
//! - a parsed [`Program`] of statements with best-effort error collection,
//! - canonical renderings with or without literal masking, where the
//!   masked text is a stable [`Fingerprint`] for grouping structurally
//!   identical queries, and
//! - structured facts (tables touched, join edges, columns per clause)
//!   with table aliases resolved across nested scopes.
//!
//! Everything is a pure in-memory transformation of one statement's text:
//! no I/O, no execution, no planning. Instances hold cursor state, so give
//! each worker its own lexer/parser/extractor when processing in parallel.

mod error;
mod extraction;
mod fingerprint;
mod parsing;

pub use error::{Error, Result};
pub use extraction::{ColumnInQuery, Extractor, Scope, Table, TableInQuery, TableJoin};
pub use fingerprint::{Fingerprint, FingerprintCache};
pub use parsing::ast;
pub use parsing::{Keyword, Lexer, Parser, Position, Program, Statement, Token, parse_sql};
