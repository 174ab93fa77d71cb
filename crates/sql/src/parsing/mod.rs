//! SQL front end: lexer, parser, and AST.
//!
//! This module parses raw SQL text into an abstract syntax tree. It only
//! ensures the syntax is well-formed within the practical PostgreSQL subset
//! seen in application logs; name resolution against live tables is the
//! extraction module's concern.

pub mod ast;
mod lexer;
mod parser;

use crate::error::Error;

pub use ast::{Program, Statement};
pub use lexer::{Keyword, Lexer, Position, Token};
pub use parser::Parser;

/// Parses a SQL string into a program plus the accumulated parse errors.
/// One statement is appended per input statement even when malformed, so
/// check the error list before trusting the tree.
pub fn parse_sql(sql: &str) -> (Program, Vec<Error>) {
    let mut parser = Parser::new(Lexer::new(sql));
    let program = parser.parse_program();
    let errors = parser.errors().to_vec();
    (program, errors)
}
