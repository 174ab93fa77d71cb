//! Lexer scanning tests: token kinds, positions, comments, error tokens.

use lantern_sql::{Keyword, Lexer, Position, Token};

fn tokens(input: &str) -> Vec<Token> {
    Lexer::new(input).map(|(token, _)| token).collect()
}

#[test]
fn scans_a_simple_statement() {
    assert_eq!(
        tokens("select id from users;"),
        vec![
            Token::Keyword(Keyword::Select),
            Token::Ident("id".into()),
            Token::Keyword(Keyword::From),
            Token::Ident("users".into()),
            Token::Semicolon,
            Token::Eof,
        ]
    );
}

#[test]
fn keywords_are_case_insensitive() {
    assert_eq!(
        tokens("SeLeCt FROM where"),
        vec![
            Token::Keyword(Keyword::Select),
            Token::Keyword(Keyword::From),
            Token::Keyword(Keyword::Where),
            Token::Eof,
        ]
    );
}

#[test]
fn scans_multi_character_operators() {
    assert_eq!(
        tokens("<= >= <> != :: -> ->> #> #>> @> <@ ?| ?& || && ~ ~* !~ !~* #-"),
        vec![
            Token::LessThanOrEqual,
            Token::GreaterThanOrEqual,
            Token::NotEqual,
            Token::NotEqual,
            Token::Typecast,
            Token::Arrow,
            Token::LongArrow,
            Token::HashArrow,
            Token::HashLongArrow,
            Token::AtArrow,
            Token::ArrowAt,
            Token::QuestionPipe,
            Token::QuestionAnd,
            Token::Concat,
            Token::AmpAmp,
            Token::Tilde,
            Token::TildeStar,
            Token::NotTilde,
            Token::NotTildeStar,
            Token::HashMinus,
            Token::Eof,
        ]
    );
}

#[test]
fn string_escapes_decode() {
    assert_eq!(
        tokens(r"'it''s' 'a\nb'"),
        vec![
            Token::String("it's".into()),
            Token::String("a\nb".into()),
            Token::Eof,
        ]
    );
}

#[test]
fn invalid_escape_is_a_bad_escape_token() {
    assert_eq!(
        tokens(r"'a\qb'"),
        vec![Token::BadEscape(r"\q".into()), Token::Eof]
    );
}

#[test]
fn unterminated_string_is_a_bad_string_token() {
    assert_eq!(
        tokens("'abc"),
        vec![Token::BadString("abc".into()), Token::Eof]
    );
}

#[test]
fn quoted_identifier_is_not_a_keyword() {
    assert_eq!(
        tokens("\"select\" \"User\""),
        vec![
            Token::QuotedIdent("select".into()),
            Token::QuotedIdent("User".into()),
            Token::Eof,
        ]
    );
}

#[test]
fn number_promotion_requires_one_dot() {
    assert_eq!(
        tokens("42 3.14 1.2.3"),
        vec![
            Token::Integer("42".into()),
            Token::Float("3.14".into()),
            Token::Float("1.2".into()),
            Token::Period,
            Token::Integer("3".into()),
            Token::Eof,
        ]
    );
}

#[test]
fn positional_params_scan_as_param_tokens() {
    assert_eq!(
        tokens("$1 $23"),
        vec![
            Token::Param("$1".into()),
            Token::Param("$23".into()),
            Token::Eof,
        ]
    );
}

#[test]
fn comments_are_returned_not_swallowed() {
    assert_eq!(
        tokens("1 -- line\n/* block */ 2"),
        vec![
            Token::Integer("1".into()),
            Token::Comment(" line".into()),
            Token::Comment(" block ".into()),
            Token::Integer("2".into()),
            Token::Eof,
        ]
    );
}

#[test]
fn unknown_character_is_illegal() {
    assert_eq!(
        tokens("select \u{1F980}"),
        vec![
            Token::Keyword(Keyword::Select),
            Token::Illegal("\u{1F980}".into()),
            Token::Eof,
        ]
    );
}

#[test]
fn positions_track_lines_and_chars() {
    let mut lexer = Lexer::new("select\nid,\n  name");
    assert_eq!(Lexer::scan(&mut lexer).1, Position { line: 0, char: 0 });
    assert_eq!(Lexer::scan(&mut lexer).1, Position { line: 1, char: 0 });
    assert_eq!(Lexer::scan(&mut lexer).1, Position { line: 1, char: 2 });
    assert_eq!(Lexer::scan(&mut lexer).1, Position { line: 2, char: 2 });
    let (token, position) = Lexer::scan(&mut lexer);
    assert_eq!(token, Token::Eof);
    // Probing end of input again reports the same position.
    assert_eq!(Lexer::scan(&mut lexer).1, position);
}

#[test]
fn scan_iterator_stops_after_eof() {
    let collected: Vec<_> = Lexer::new("1").collect();
    assert_eq!(collected.len(), 2);
    assert_eq!(collected[1].0, Token::Eof);
}
