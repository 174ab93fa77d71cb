//! Error types for the SQL front end

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the lexer, parser, and extractor. None of these abort
/// processing: the parser and extractor accumulate them in statement-scoped
/// lists and continue at best effort, so callers must inspect the error list
/// before trusting the output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("expected next token to be {expected}, got {found} instead at statement {statement}")]
    UnexpectedToken {
        expected: String,
        found: String,
        statement: usize,
    },

    #[error("no prefix parse handler for {token} at statement {statement}")]
    NoPrefixHandler { token: String, statement: usize },

    #[error("illegal token {token} at line {line}, char {char}")]
    IllegalToken {
        token: String,
        line: usize,
        char: usize,
    },

    #[error("unterminated string literal at line {line}, char {char}")]
    BadString { line: usize, char: usize },

    #[error("invalid escape sequence {escape} at line {line}, char {char}")]
    BadEscape {
        escape: String,
        line: usize,
        char: usize,
    },

    #[error("comment skipping exceeded {0} tokens, aborting statement")]
    RunawayComment(usize),

    #[error("column {column} set multiple times at statement {statement}")]
    DuplicateAssignment { column: String, statement: usize },

    #[error("cannot extract facts from an error placeholder: {0}")]
    ErrorNode(String),
}
