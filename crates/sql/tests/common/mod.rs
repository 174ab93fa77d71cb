//! Common test utilities for the SQL front end integration tests
#![allow(dead_code)]

use lantern_sql::{Error, Extractor, Program, Statement, parse_sql};

/// Parses the input, returning the program and whatever errors accumulated.
pub fn parse(sql: &str) -> (Program, Vec<Error>) {
    parse_sql(sql)
}

/// Parses exactly one statement and asserts the parse was clean.
pub fn parse_one(sql: &str) -> Statement {
    let (mut program, errors) = parse_sql(sql);
    assert!(
        errors.is_empty(),
        "unexpected parse errors for {:?}: {:?}",
        sql,
        errors
    );
    assert_eq!(program.len(), 1, "expected one statement for {:?}", sql);
    program.statements.remove(0)
}

/// Canonical unmasked rendering of a single clean statement.
pub fn unmasked(sql: &str) -> String {
    parse_one(sql).render(false)
}

/// Canonical masked rendering of a single clean statement.
pub fn masked(sql: &str) -> String {
    parse_one(sql).render(true)
}

/// Asserts the canonical rendering is a fixed point: re-lexing and
/// re-parsing the rendered text renders to the identical string.
pub fn assert_roundtrip(sql: &str) {
    let first = unmasked(sql);
    let second = unmasked(&first);
    assert_eq!(
        first, second,
        "rendering not stable under reparse for {:?}",
        sql
    );
}

/// Extracts facts from a single clean statement.
pub fn extract(sql: &str) -> Extractor {
    let statement = parse_one(sql);
    let mut extractor = Extractor::new();
    extractor.extract(&statement);
    assert!(
        extractor.errors().is_empty(),
        "unexpected extraction errors for {:?}: {:?}",
        sql,
        extractor.errors()
    );
    extractor
}
