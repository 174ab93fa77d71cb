//! The SQL parser.
//!
//! Statement dispatch selects a grammar from the leading token; expressions
//! are parsed with precedence climbing over per-token prefix and infix
//! handlers. The parser never aborts on a malformed statement: failures are
//! appended to a statement-scoped error list, an error placeholder node
//! stands in for the missing sub-expression, and the statement loop still
//! appends one statement per iteration. Callers must check [`Parser::errors`]
//! before trusting the returned tree.
//!
//! Context-sensitive sub-grammars (call arguments, array literals, CREATE
//! … LIKE, UPDATE … SET) each push an explicit [`ParseContext`] that decides
//! the terminator set for expression parsing, with a guaranteed pop on every
//! exit path. Multi-word phrases (`AT TIME ZONE`, `SIMILAR TO`, `NOT LIKE`,
//! …) are folded from a small explicit lookahead buffer, never inside the
//! lexer.

use std::collections::VecDeque;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::ast::{
    Clause, ColumnDef, ColumnOption, CommandTag, ConflictAction, Cte, DdlStatement,
    DistinctClause, DmlStatement, ExprKind, Expression, FromItem, IdentPart, InfixOp,
    Direction, InsertSource, JoinType, LikeClause, LikeOption, Literal, LockClause, LockMode,
    LockWait, NullsOrder, OnConflict, PrefixOp, Program, SelectCore, SetOperator, SetQuantifier,
    SetScope, Statement, TransactionStatement, TypeName, TypedKind, UtilityStatement,
    WithStatement,
};
use super::lexer::{Keyword, Lexer, Position, Token};
use crate::error::Error;

/// Upper bound on consecutive comment tokens skipped in one advance, so
/// adversarial input fails with an error instead of spinning.
const MAX_COMMENT_RUN: usize = 50_000;

/// Operator precedence. Set operators bind lowest and are handled at the
/// select-expression level only; `LOWEST` is the entry minimum.
type Precedence = u8;
const LOWEST: Precedence = 0;
const OR: Precedence = 2;
const AND: Precedence = 3;
const NOT: Precedence = 4;
const TIME_ZONE: Precedence = 5;
const EQUALITY: Precedence = 6;
const COMPARISON: Precedence = 7;
const ADDITIVE: Precedence = 8;
const MULTIPLICATIVE: Precedence = 9;
const EXPONENT: Precedence = 10;
const JSON: Precedence = 11;
const POSTFIX: Precedence = 12;

/// The context a sub-grammar parses expressions in. Each context has its
/// own terminator set; the stack is pushed via [`Parser::with_context`] so
/// the pop happens on every exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseContext {
    /// The default top-level set.
    Statement,
    /// Inside a function-call argument list.
    CallArgs,
    /// Inside `[` … `]` of an array literal or index.
    Array,
    /// Inside a `CREATE TABLE … (LIKE …)` clause.
    CreateLike,
    /// Inside an `UPDATE … SET` assignment list.
    UpdateSet,
}

impl ParseContext {
    fn is_terminator(&self, token: &Token) -> bool {
        match self {
            ParseContext::Statement => matches!(
                token,
                Token::Comma
                    | Token::Semicolon
                    | Token::Eof
                    | Token::Keyword(
                        Keyword::Where
                            | Keyword::Group
                            | Keyword::Having
                            | Keyword::Order
                            | Keyword::Limit
                            | Keyword::Offset
                            | Keyword::Fetch
                            | Keyword::For
                    )
            ),
            ParseContext::CallArgs => matches!(token, Token::CloseParen | Token::Comma),
            ParseContext::Array => {
                matches!(token, Token::CloseBracket | Token::Comma | Token::Colon)
            }
            ParseContext::CreateLike => matches!(
                token,
                Token::CloseParen
                    | Token::Comma
                    | Token::Keyword(Keyword::Including | Keyword::Excluding)
            ),
            ParseContext::UpdateSet => matches!(
                token,
                Token::Comma
                    | Token::Semicolon
                    | Token::Eof
                    | Token::Keyword(Keyword::From | Keyword::Where | Keyword::Returning)
            ),
        }
    }
}

/// The SQL parser. Holds the lexer cursor, a four-token lookahead buffer
/// for multi-word folding, the context stack, and the per-statement
/// parameter-offset counter. Not safe for concurrent reuse; parse each
/// statement with its own instance when fanning out.
pub struct Parser {
    lexer: Lexer,
    current: (Token, Position),
    lookahead: VecDeque<(Token, Position)>,
    errors: Vec<Error>,
    context: Vec<ParseContext>,
    clause: Clause,
    command: CommandTag,
    param_offset: usize,
    statement: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let mut errors = Vec::new();
        let current = scan_past_comments(&mut lexer, &mut errors);
        Parser {
            lexer,
            current,
            lookahead: VecDeque::new(),
            errors,
            context: Vec::new(),
            clause: Clause::None,
            command: CommandTag::Expression,
            param_offset: 0,
            statement: 0,
        }
    }

    /// Parses the whole input. One statement is appended per iteration even
    /// when that statement's tree contains an error placeholder, so the
    /// program length always matches the statement count of the input.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();
        while !self.token_is(&Token::Eof) {
            self.param_offset = 0;
            self.statement = program.len();
            self.clause = Clause::None;
            let statement = self.parse_statement();
            program.statements.push(statement);
            while self.next_is(Token::Semicolon) {}
        }
        if !self.errors.is_empty() {
            tracing::debug!(
                statements = program.len(),
                errors = self.errors.len(),
                "parsed program with errors"
            );
        }
        program
    }

    /// The accumulated error list. Check this before rendering or
    /// extracting from the returned program.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn scan_token(&mut self) -> (Token, Position) {
        scan_past_comments(&mut self.lexer, &mut self.errors)
    }

    fn advance(&mut self) {
        self.current = match self.lookahead.pop_front() {
            Some(next) => next,
            None => self.scan_token(),
        };
    }

    fn token(&self) -> &Token {
        &self.current.0
    }

    /// Peeks `n` tokens past the current one (0 is the immediate next).
    /// The buffer never needs to grow past the four tokens multi-word
    /// folding requires.
    fn peek(&mut self, n: usize) -> &Token {
        while self.lookahead.len() <= n {
            let next = self.scan_token();
            self.lookahead.push_back(next);
        }
        &self.lookahead[n].0
    }

    fn token_is(&self, token: &Token) -> bool {
        self.token() == token
    }

    /// Consumes the current token if it is the given one, returning true.
    fn next_is(&mut self, token: Token) -> bool {
        if self.token_is(&token) {
            self.advance();
            return true;
        }
        false
    }

    /// Consumes the current token if it is the given one. Equivalent to
    /// next_is(), but expresses intent better.
    fn skip(&mut self, token: Token) {
        self.next_is(token);
    }

    /// Consumes the expected token, or records an error and leaves the
    /// cursor in place. Returns whether the token was found.
    fn expect(&mut self, expected: Token) -> bool {
        if self.next_is(expected.clone()) {
            return true;
        }
        self.errors.push(Error::UnexpectedToken {
            expected: expected.to_string(),
            found: self.token().to_string(),
            statement: self.statement,
        });
        false
    }

    /// Whether the current token is a word matching `word`, compared
    /// case-insensitively. Quoted identifiers never match.
    fn word_is(&self, word: &str) -> bool {
        self.token().word().as_deref() == Some(word)
    }

    fn peek_word_is(&mut self, n: usize, word: &str) -> bool {
        self.peek(n).word().as_deref() == Some(word)
    }

    /// Consumes and returns a name-position word: a bare or quoted
    /// identifier, or an unreserved keyword. Records an error otherwise.
    fn next_name(&mut self) -> Option<String> {
        let name = match self.token() {
            Token::Ident(name) => name.clone(),
            Token::QuotedIdent(name) => name.clone(),
            Token::Keyword(keyword) if keyword.is_unreserved() => {
                keyword.to_string().to_lowercase()
            }
            _ => {
                self.errors.push(Error::UnexpectedToken {
                    expected: "identifier".into(),
                    found: self.token().to_string(),
                    statement: self.statement,
                });
                return None;
            }
        };
        self.advance();
        Some(name)
    }

    // ------------------------------------------------------------------
    // Scoped state
    // ------------------------------------------------------------------

    fn with_context<T>(&mut self, context: ParseContext, f: impl FnOnce(&mut Self) -> T) -> T {
        self.context.push(context);
        let out = f(self);
        self.context.pop();
        out
    }

    fn in_clause<T>(&mut self, clause: Clause, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.clause;
        self.clause = clause;
        let out = f(self);
        self.clause = previous;
        out
    }

    fn at_terminator(&self) -> bool {
        let context = self.context.last().copied().unwrap_or(ParseContext::Statement);
        context.is_terminator(self.token())
    }

    /// Builds an expression stamped with the current clause and command
    /// tags.
    fn expr(&self, kind: ExprKind) -> Expression {
        Expression::new(kind, self.clause, self.command)
    }

    fn next_param(&mut self) -> usize {
        self.param_offset += 1;
        self.param_offset
    }

    fn error_expr(&mut self, error: Error) -> Expression {
        let token = self.token().to_string();
        self.errors.push(error);
        self.expr(ExprKind::Error(token))
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> Statement {
        // Canonical rendering wraps statements in parentheses, so a
        // round-tripped statement arrives as `(INSERT …);`. Unwrap one
        // paren level when it encloses a statement keyword; parenthesized
        // SELECTs take the expression path instead.
        if self.token_is(&Token::OpenParen) {
            if let Token::Keyword(keyword) = self.peek(0) {
                if is_statement_keyword(*keyword) {
                    self.advance();
                    let statement = self.parse_statement();
                    self.expect(Token::CloseParen);
                    return statement;
                }
            }
        }
        match self.token() {
            Token::Keyword(Keyword::Select) | Token::Keyword(Keyword::Values) => {
                self.command = CommandTag::Select;
                Statement::Dml(DmlStatement::Select(self.parse_select_expression()))
            }
            Token::Keyword(Keyword::Insert) => self.parse_insert(),
            Token::Keyword(Keyword::Update) => self.parse_update(),
            Token::Keyword(Keyword::Delete) => self.parse_delete(),
            Token::Keyword(Keyword::Create) => self.parse_create(),
            Token::Keyword(Keyword::Drop) => self.parse_drop(),
            Token::Keyword(Keyword::Analyze) => self.parse_analyze(),
            Token::Keyword(Keyword::Set) => self.parse_set(),
            Token::Keyword(Keyword::With) => self.parse_with(),
            Token::Keyword(Keyword::Show) => self.parse_show(),
            Token::Keyword(Keyword::Begin) => {
                self.command = CommandTag::Begin;
                self.advance();
                self.skip(Keyword::Work.into());
                self.skip(Keyword::Transaction.into());
                Statement::Transaction(TransactionStatement::Begin)
            }
            Token::Keyword(Keyword::Commit) => {
                self.command = CommandTag::Commit;
                self.advance();
                self.skip(Keyword::Work.into());
                self.skip(Keyword::Transaction.into());
                Statement::Transaction(TransactionStatement::Commit)
            }
            Token::Keyword(Keyword::Rollback) => {
                self.command = CommandTag::Rollback;
                self.advance();
                self.skip(Keyword::Work.into());
                self.skip(Keyword::Transaction.into());
                let mut savepoint = None;
                if self.next_is(Keyword::To.into()) {
                    self.skip(Keyword::Savepoint.into());
                    savepoint = self.next_name();
                }
                Statement::Transaction(TransactionStatement::Rollback { savepoint })
            }
            Token::Keyword(Keyword::Savepoint) => {
                self.command = CommandTag::Savepoint;
                self.advance();
                let name = self.next_name().unwrap_or_default();
                Statement::Transaction(TransactionStatement::Savepoint { name })
            }
            _ => {
                self.command = CommandTag::Expression;
                Statement::Expression(self.parse_expression(LOWEST))
            }
        }
    }

    fn parse_insert(&mut self) -> Statement {
        self.command = CommandTag::Insert;
        self.advance();
        self.expect(Keyword::Into.into());
        let table = self.in_clause(Clause::From, |p| p.parse_identifier());
        let mut columns = Vec::new();
        // A parenthesized SELECT here is the insert source, not a column
        // list.
        if self.token_is(&Token::OpenParen)
            && !matches!(self.peek(0), Token::Keyword(Keyword::Select))
        {
            self.advance();
            columns = self.in_clause(Clause::Columns, |p| p.parse_identifier_list());
            self.expect(Token::CloseParen);
        }
        let source = if self.token_is(&Keyword::Values.into()) {
            InsertSource::Values(self.in_clause(Clause::Values, |p| p.parse_values()))
        } else if matches!(
            self.token(),
            Token::Keyword(Keyword::Select) | Token::OpenParen
        ) {
            InsertSource::Select(self.parse_select_expression())
        } else if self.next_is(Keyword::Default.into()) {
            self.expect(Keyword::Values.into());
            InsertSource::DefaultValues
        } else {
            let error = Error::UnexpectedToken {
                expected: "VALUES or SELECT".into(),
                found: self.token().to_string(),
                statement: self.statement,
            };
            InsertSource::Values(self.error_expr(error))
        };
        let on_conflict = self.parse_on_conflict();
        let returning = self.parse_returning();
        Statement::Dml(DmlStatement::Insert {
            table,
            columns,
            source,
            on_conflict,
            returning,
        })
    }

    fn parse_on_conflict(&mut self) -> Option<OnConflict> {
        if !self.next_is(Keyword::On.into()) {
            return None;
        }
        self.expect(Keyword::Conflict.into());
        let mut target = Vec::new();
        if self.next_is(Token::OpenParen) {
            target = self.in_clause(Clause::Conflict, |p| p.parse_identifier_list());
            self.expect(Token::CloseParen);
        }
        self.expect(Keyword::Do.into());
        let action = if self.next_is(Keyword::Nothing.into()) {
            ConflictAction::DoNothing
        } else {
            self.expect(Keyword::Update.into());
            self.expect(Keyword::Set.into());
            let assignments = self.in_clause(Clause::Conflict, |p| p.parse_assignments());
            ConflictAction::DoUpdate(assignments)
        };
        let mut filter = None;
        if self.next_is(Keyword::Where.into()) {
            filter = Some(self.in_clause(Clause::Where, |p| p.parse_expression(LOWEST)));
        }
        Some(OnConflict {
            target,
            action,
            r#where: filter,
        })
    }

    fn parse_returning(&mut self) -> Vec<Expression> {
        if !self.next_is(Keyword::Returning.into()) {
            return Vec::new();
        }
        self.in_clause(Clause::Returning, |p| p.parse_expression_list())
    }

    fn parse_update(&mut self) -> Statement {
        self.command = CommandTag::Update;
        self.advance();
        let table = self.in_clause(Clause::From, |p| p.parse_identifier());
        self.expect(Keyword::Set.into());
        let assignments = self.in_clause(Clause::Set, |p| p.parse_assignments());
        let mut from = Vec::new();
        if self.next_is(Keyword::From.into()) {
            from = self.parse_from_items();
        }
        let filter = self.parse_where_clause();
        let returning = self.parse_returning();
        Statement::Dml(DmlStatement::Update {
            table,
            assignments,
            from,
            r#where: filter,
            returning,
        })
    }

    /// Parses `column = expr, …` under the UpdateSet context, so FROM,
    /// WHERE, and RETURNING terminate the value expression.
    fn parse_assignments(&mut self) -> Vec<(Expression, Expression)> {
        self.with_context(ParseContext::UpdateSet, |p| {
            let mut assignments: Vec<(Expression, Expression)> = Vec::new();
            loop {
                let column = p.parse_identifier();
                p.expect(Token::Equal);
                let value = p.parse_expression(LOWEST);
                let name = column.render(false);
                if assignments.iter().any(|(c, _)| c.render(false) == name) {
                    p.errors.push(Error::DuplicateAssignment {
                        column: name,
                        statement: p.statement,
                    });
                }
                assignments.push((column, value));
                if !p.next_is(Token::Comma) {
                    break;
                }
            }
            assignments
        })
    }

    fn parse_delete(&mut self) -> Statement {
        self.command = CommandTag::Delete;
        self.advance();
        self.expect(Keyword::From.into());
        let table = self.in_clause(Clause::From, |p| p.parse_identifier());
        let mut using = Vec::new();
        if self.next_is(Keyword::Using.into()) {
            using = self.parse_from_items();
        }
        let filter = self.parse_where_clause();
        let returning = self.parse_returning();
        Statement::Dml(DmlStatement::Delete {
            table,
            using,
            r#where: filter,
            returning,
        })
    }

    fn parse_create(&mut self) -> Statement {
        self.command = CommandTag::Create;
        self.advance();
        if self.token_is(&Keyword::Table.into()) {
            return self.parse_create_table();
        }
        let unique = self.next_is(Keyword::Unique.into());
        if self.token_is(&Keyword::Index.into()) {
            return self.parse_create_index(unique);
        }
        let error = Error::UnexpectedToken {
            expected: "TABLE or INDEX".into(),
            found: self.token().to_string(),
            statement: self.statement,
        };
        Statement::Expression(self.error_expr(error))
    }

    fn parse_create_table(&mut self) -> Statement {
        self.advance();
        let mut if_not_exists = false;
        if self.next_is(Keyword::If.into()) {
            self.expect(Keyword::Not.into());
            self.expect(Keyword::Exists.into());
            if_not_exists = true;
        }
        let name = self.parse_identifier();
        let mut columns = Vec::new();
        let mut like = None;
        if self.next_is(Token::OpenParen) {
            if !self.token_is(&Token::CloseParen) {
                loop {
                    if self.token_is(&Keyword::Like.into()) {
                        like = Some(self.parse_like_clause());
                    } else {
                        columns.push(self.parse_column_def());
                    }
                    if !self.next_is(Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(Token::CloseParen);
        }
        Statement::Ddl(DdlStatement::CreateTable {
            name,
            if_not_exists,
            columns,
            like,
        })
    }

    /// Parses `LIKE parent INCLUDING/EXCLUDING …`. The source expression is
    /// parsed under the CreateLike context so INCLUDING and EXCLUDING
    /// terminate it.
    fn parse_like_clause(&mut self) -> LikeClause {
        self.advance();
        let source =
            self.with_context(ParseContext::CreateLike, |p| p.parse_expression(LOWEST));
        let mut options = Vec::new();
        loop {
            let including = match self.token() {
                Token::Keyword(Keyword::Including) => true,
                Token::Keyword(Keyword::Excluding) => false,
                _ => break,
            };
            self.advance();
            let property = match self.token().word() {
                Some(word) => {
                    self.advance();
                    word
                }
                None => {
                    self.errors.push(Error::UnexpectedToken {
                        expected: "LIKE option".into(),
                        found: self.token().to_string(),
                        statement: self.statement,
                    });
                    break;
                }
            };
            options.push(LikeOption {
                including,
                property,
            });
        }
        LikeClause { source, options }
    }

    fn parse_column_def(&mut self) -> ColumnDef {
        let name = self.next_name().unwrap_or_default();
        let datatype = self.parse_type();
        let mut options = Vec::new();
        loop {
            match self.token() {
                Token::Keyword(Keyword::Primary) => {
                    self.advance();
                    self.expect(Keyword::Key.into());
                    options.push(ColumnOption::PrimaryKey);
                }
                Token::Keyword(Keyword::Not) => {
                    self.advance();
                    self.expect(Keyword::Null.into());
                    options.push(ColumnOption::NotNull);
                }
                Token::Keyword(Keyword::Null) => {
                    self.advance();
                    options.push(ColumnOption::Null);
                }
                Token::Keyword(Keyword::Unique) => {
                    self.advance();
                    options.push(ColumnOption::Unique);
                }
                Token::Keyword(Keyword::Default) => {
                    self.advance();
                    let value = self.with_context(ParseContext::CreateLike, |p| {
                        p.parse_expression(LOWEST)
                    });
                    options.push(ColumnOption::Default(value));
                }
                Token::Keyword(Keyword::References) => {
                    self.advance();
                    let table = self.parse_identifier();
                    let mut column = None;
                    if self.next_is(Token::OpenParen) {
                        column = self.next_name();
                        self.expect(Token::CloseParen);
                    }
                    options.push(ColumnOption::References { table, column });
                }
                Token::Keyword(Keyword::Check) => {
                    self.advance();
                    options.push(ColumnOption::Check(self.parse_expression(LOWEST)));
                }
                _ => break,
            }
        }
        ColumnDef {
            name,
            datatype,
            options,
        }
    }

    fn parse_create_index(&mut self, unique: bool) -> Statement {
        self.advance();
        let name = self.next_name().unwrap_or_default();
        self.expect(Keyword::On.into());
        let table = self.in_clause(Clause::From, |p| p.parse_identifier());
        self.expect(Token::OpenParen);
        let columns = self.in_clause(Clause::Columns, |p| p.parse_expression_list());
        self.expect(Token::CloseParen);
        Statement::Ddl(DdlStatement::CreateIndex {
            name,
            unique,
            table,
            columns,
        })
    }

    fn parse_drop(&mut self) -> Statement {
        self.command = CommandTag::Drop;
        self.advance();
        if self.next_is(Keyword::Table.into()) {
            let if_exists = self.parse_if_exists();
            let mut names = vec![self.in_clause(Clause::From, |p| p.parse_identifier())];
            while self.next_is(Token::Comma) {
                names.push(self.in_clause(Clause::From, |p| p.parse_identifier()));
            }
            return Statement::Ddl(DdlStatement::DropTable { names, if_exists });
        }
        if self.next_is(Keyword::Index.into()) {
            let if_exists = self.parse_if_exists();
            let mut names = vec![self.next_name().unwrap_or_default()];
            while self.next_is(Token::Comma) {
                names.push(self.next_name().unwrap_or_default());
            }
            return Statement::Ddl(DdlStatement::DropIndex { names, if_exists });
        }
        let error = Error::UnexpectedToken {
            expected: "TABLE or INDEX".into(),
            found: self.token().to_string(),
            statement: self.statement,
        };
        Statement::Expression(self.error_expr(error))
    }

    fn parse_if_exists(&mut self) -> bool {
        if self.next_is(Keyword::If.into()) {
            self.expect(Keyword::Exists.into());
            return true;
        }
        false
    }

    fn parse_analyze(&mut self) -> Statement {
        self.command = CommandTag::Analyze;
        self.advance();
        let mut table = None;
        let mut columns = Vec::new();
        if matches!(self.token(), Token::Ident(_) | Token::QuotedIdent(_)) {
            table = Some(self.in_clause(Clause::From, |p| p.parse_identifier()));
            if self.next_is(Token::OpenParen) {
                columns = self.in_clause(Clause::Columns, |p| p.parse_identifier_list());
                self.expect(Token::CloseParen);
            }
        }
        Statement::Utility(UtilityStatement::Analyze { table, columns })
    }

    fn parse_set(&mut self) -> Statement {
        self.command = CommandTag::Set;
        self.advance();
        let scope = if self.next_is(Keyword::Local.into()) {
            Some(SetScope::Local)
        } else if self.next_is(Keyword::Session.into()) {
            Some(SetScope::Session)
        } else {
            None
        };
        let mut name = self.next_name().unwrap_or_default();
        while self.next_is(Token::Period) {
            name.push('.');
            name.push_str(&self.next_name().unwrap_or_default());
        }
        if !self.next_is(Token::Equal) {
            self.expect(Keyword::To.into());
        }
        let value = if self.next_is(Keyword::Default.into()) {
            None
        } else {
            let mut values =
                vec![self.in_clause(Clause::Set, |p| p.parse_expression(LOWEST))];
            while self.next_is(Token::Comma) {
                values.push(self.in_clause(Clause::Set, |p| p.parse_expression(LOWEST)));
            }
            if values.len() == 1 {
                values.pop()
            } else {
                Some(self.expr(ExprKind::Grouped(values)))
            }
        };
        Statement::Utility(UtilityStatement::Set { scope, name, value })
    }

    fn parse_show(&mut self) -> Statement {
        self.command = CommandTag::Show;
        self.advance();
        let name = if self.next_is(Keyword::All.into()) {
            "ALL".to_string()
        } else {
            let mut name = self.next_name().unwrap_or_default();
            while self.next_is(Token::Period) {
                name.push('.');
                name.push_str(&self.next_name().unwrap_or_default());
            }
            name
        };
        Statement::Utility(UtilityStatement::Show { name })
    }

    fn parse_with(&mut self) -> Statement {
        self.command = CommandTag::With;
        self.advance();
        let recursive = self.next_is(Keyword::Recursive.into());
        let mut ctes = Vec::new();
        loop {
            let name = self.next_name().unwrap_or_default();
            let mut columns = Vec::new();
            if self.next_is(Token::OpenParen) {
                loop {
                    columns.push(self.next_name().unwrap_or_default());
                    if !self.next_is(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::CloseParen);
            }
            self.expect(Keyword::As.into());
            self.expect(Token::OpenParen);
            let query = self.in_clause(Clause::With, |p| p.parse_select_expression());
            self.expect(Token::CloseParen);
            ctes.push(Cte {
                name,
                columns,
                query,
            });
            if !self.next_is(Token::Comma) {
                break;
            }
        }
        let body = Box::new(self.parse_statement());
        Statement::With(WithStatement {
            recursive,
            ctes,
            body,
        })
    }

    // ------------------------------------------------------------------
    // SELECT
    // ------------------------------------------------------------------

    /// Parses a select expression: one or more SELECT/VALUES operands
    /// combined by set operators. Set operators bind below every other
    /// operator and only combine whole select expressions.
    fn parse_select_expression(&mut self) -> Expression {
        let left = self.parse_select_operand();
        self.parse_set_ops(left)
    }

    /// Combines an already-parsed select operand with any trailing
    /// UNION/INTERSECT/EXCEPT chain.
    fn parse_set_ops(&mut self, mut left: Expression) -> Expression {
        loop {
            let op = match self.token() {
                Token::Keyword(Keyword::Union) => SetOperator::Union,
                Token::Keyword(Keyword::Intersect) => SetOperator::Intersect,
                Token::Keyword(Keyword::Except) => SetOperator::Except,
                _ => break,
            };
            self.advance();
            let all = self.next_is(Keyword::All.into());
            self.skip(Keyword::Distinct.into());
            let right = self.parse_select_operand();
            left = self.expr(ExprKind::SetOp {
                left: Box::new(left),
                op,
                all,
                right: Box::new(right),
            });
        }
        left
    }

    fn parse_select_operand(&mut self) -> Expression {
        match self.token() {
            Token::Keyword(Keyword::Select) => self.parse_select_core(),
            Token::Keyword(Keyword::Values) => {
                self.in_clause(Clause::Values, |p| p.parse_values())
            }
            Token::OpenParen => {
                self.advance();
                let inner = self.parse_select_expression();
                self.expect(Token::CloseParen);
                inner
            }
            _ => {
                let error = Error::UnexpectedToken {
                    expected: Keyword::Select.to_string(),
                    found: self.token().to_string(),
                    statement: self.statement,
                };
                self.error_expr(error)
            }
        }
    }

    fn parse_select_core(&mut self) -> Expression {
        self.advance();
        let mut core = SelectCore::new();
        if self.next_is(Keyword::Distinct.into()) {
            if self.next_is(Keyword::On.into()) {
                self.expect(Token::OpenParen);
                let exprs = self.in_clause(Clause::Select, |p| p.parse_expression_list());
                self.expect(Token::CloseParen);
                core.distinct = Some(DistinctClause::On(exprs));
            } else {
                core.distinct = Some(DistinctClause::All);
            }
        } else {
            self.skip(Keyword::All.into());
        }
        core.select = self.in_clause(Clause::Select, |p| p.parse_select_list());
        if self.next_is(Keyword::From.into()) {
            core.from = self.parse_from_items();
        }
        core.r#where = self.parse_where_clause();
        if self.next_is(Keyword::Group.into()) {
            self.expect(Keyword::By.into());
            core.group_by = self.in_clause(Clause::GroupBy, |p| p.parse_expression_list());
        }
        if self.next_is(Keyword::Having.into()) {
            core.having =
                Some(self.in_clause(Clause::Having, |p| p.parse_expression(LOWEST)));
        }
        if self.next_is(Keyword::Order.into()) {
            self.expect(Keyword::By.into());
            core.order_by = self.in_clause(Clause::OrderBy, |p| p.parse_sort_list());
        }
        if self.next_is(Keyword::Limit.into()) {
            core.limit = Some(self.in_clause(Clause::Limit, |p| p.parse_expression(LOWEST)));
        }
        if self.next_is(Keyword::Offset.into()) {
            core.offset =
                Some(self.in_clause(Clause::Offset, |p| p.parse_expression(LOWEST)));
            self.skip(Keyword::Row.into());
            self.skip(Keyword::Rows.into());
        }
        if self.token_is(&Keyword::Fetch.into()) {
            core.fetch = Some(self.in_clause(Clause::Fetch, |p| p.parse_fetch()));
        }
        if self.token_is(&Keyword::For.into()) {
            core.lock = Some(self.in_clause(Clause::Lock, |p| p.parse_lock_clause()));
        }
        self.expr(ExprKind::Select(Box::new(core)))
    }

    fn parse_select_list(&mut self) -> Vec<(Expression, Option<String>)> {
        let mut select = Vec::new();
        loop {
            let expr = self.parse_expression(LOWEST);
            let mut alias = None;
            if self.next_is(Keyword::As.into()) {
                alias = self.next_name();
            } else if matches!(self.token(), Token::Ident(_) | Token::QuotedIdent(_))
                && !matches!(expr.kind, ExprKind::All)
            {
                alias = self.next_name();
            }
            select.push((expr, alias));
            if !self.next_is(Token::Comma) {
                break;
            }
        }
        select
    }

    fn parse_where_clause(&mut self) -> Option<Expression> {
        if !self.next_is(Keyword::Where.into()) {
            return None;
        }
        Some(self.in_clause(Clause::Where, |p| p.parse_expression(LOWEST)))
    }

    fn parse_from_items(&mut self) -> Vec<FromItem> {
        let mut from = Vec::new();
        loop {
            let mut item = self.in_clause(Clause::From, |p| p.parse_from_table());
            while let Some(join) = self.parse_join_type() {
                let right = self.in_clause(Clause::From, |p| p.parse_from_table());
                let mut predicate = None;
                if join != JoinType::Cross {
                    self.expect(Keyword::On.into());
                    predicate =
                        Some(self.in_clause(Clause::Join, |p| p.parse_expression(LOWEST)));
                }
                item = FromItem::Join {
                    left: Box::new(item),
                    right: Box::new(right),
                    join,
                    predicate,
                };
            }
            from.push(item);
            if !self.next_is(Token::Comma) {
                break;
            }
        }
        from
    }

    fn parse_from_table(&mut self) -> FromItem {
        if self.next_is(Token::OpenParen) {
            let query = self.parse_select_expression();
            self.expect(Token::CloseParen);
            let alias = self.parse_alias();
            return FromItem::Subquery { query, alias };
        }
        let name = self.parse_identifier();
        let alias = self.parse_alias();
        FromItem::Table { name, alias }
    }

    fn parse_alias(&mut self) -> Option<String> {
        if self.next_is(Keyword::As.into()) {
            return self.next_name();
        }
        if matches!(self.token(), Token::Ident(_) | Token::QuotedIdent(_)) {
            return self.next_name();
        }
        None
    }

    fn parse_join_type(&mut self) -> Option<JoinType> {
        if self.next_is(Keyword::Join.into()) {
            return Some(JoinType::Inner);
        }
        if self.next_is(Keyword::Inner.into()) {
            self.expect(Keyword::Join.into());
            return Some(JoinType::Inner);
        }
        if self.next_is(Keyword::Cross.into()) {
            self.expect(Keyword::Join.into());
            return Some(JoinType::Cross);
        }
        if self.next_is(Keyword::Left.into()) {
            self.skip(Keyword::Outer.into());
            self.expect(Keyword::Join.into());
            return Some(JoinType::Left);
        }
        if self.next_is(Keyword::Right.into()) {
            self.skip(Keyword::Outer.into());
            self.expect(Keyword::Join.into());
            return Some(JoinType::Right);
        }
        if self.next_is(Keyword::Full.into()) {
            self.skip(Keyword::Outer.into());
            self.expect(Keyword::Join.into());
            return Some(JoinType::Full);
        }
        None
    }

    fn parse_sort_list(&mut self) -> Vec<Expression> {
        let mut sorts = Vec::new();
        loop {
            sorts.push(self.parse_sort_expr());
            if !self.next_is(Token::Comma) {
                break;
            }
        }
        sorts
    }

    fn parse_sort_expr(&mut self) -> Expression {
        let expr = self.parse_expression(LOWEST);
        let direction = if self.next_is(Keyword::Asc.into()) {
            Some(Direction::Asc)
        } else if self.next_is(Keyword::Desc.into()) {
            Some(Direction::Desc)
        } else {
            None
        };
        let mut nulls = None;
        if self.next_is(Keyword::Nulls.into()) {
            if self.next_is(Keyword::First.into()) {
                nulls = Some(NullsOrder::First);
            } else if self.next_is(Keyword::Last.into()) {
                nulls = Some(NullsOrder::Last);
            } else {
                self.errors.push(Error::UnexpectedToken {
                    expected: "FIRST or LAST".into(),
                    found: self.token().to_string(),
                    statement: self.statement,
                });
            }
        }
        self.expr(ExprKind::Sort {
            expr: Box::new(expr),
            direction,
            nulls,
        })
    }

    fn parse_fetch(&mut self) -> Expression {
        self.advance();
        if !self.next_is(Keyword::First.into()) {
            self.expect(Keyword::Next.into());
        }
        let mut count = None;
        if !matches!(self.token(), Token::Keyword(Keyword::Row | Keyword::Rows)) {
            count = Some(Box::new(self.parse_expression(LOWEST)));
        }
        if !self.next_is(Keyword::Rows.into()) {
            self.expect(Keyword::Row.into());
        }
        self.expect(Keyword::Only.into());
        self.expr(ExprKind::Fetch { count })
    }

    fn parse_lock_clause(&mut self) -> LockClause {
        self.advance();
        let mode = if self.next_is(Keyword::Update.into()) {
            LockMode::Update
        } else if self.next_is(Keyword::Share.into()) {
            LockMode::Share
        } else if self.token_is(&Keyword::Key.into()) {
            self.advance();
            self.expect(Keyword::Share.into());
            LockMode::KeyShare
        } else if self.word_is("NO") {
            self.advance();
            self.expect(Keyword::Key.into());
            self.expect(Keyword::Update.into());
            LockMode::NoKeyUpdate
        } else {
            self.errors.push(Error::UnexpectedToken {
                expected: "UPDATE or SHARE".into(),
                found: self.token().to_string(),
                statement: self.statement,
            });
            LockMode::Update
        };
        let mut tables = Vec::new();
        if self.next_is(Keyword::Of.into()) {
            tables = self.parse_identifier_list();
        }
        let wait = if self.next_is(Keyword::Nowait.into()) {
            LockWait::Nowait
        } else if self.next_is(Keyword::Skip.into()) {
            self.expect(Keyword::Locked.into());
            LockWait::SkipLocked
        } else {
            LockWait::Block
        };
        LockClause { mode, tables, wait }
    }

    fn parse_values(&mut self) -> Expression {
        self.advance();
        let mut rows = Vec::new();
        loop {
            self.expect(Token::OpenParen);
            let row = self.with_context(ParseContext::CallArgs, |p| p.parse_expression_list());
            self.expect(Token::CloseParen);
            rows.push(row);
            if !self.next_is(Token::Comma) {
                break;
            }
        }
        self.expr(ExprKind::Values(rows))
    }

    fn parse_expression_list(&mut self) -> Vec<Expression> {
        let mut list = vec![self.parse_expression(LOWEST)];
        while self.next_is(Token::Comma) {
            list.push(self.parse_expression(LOWEST));
        }
        list
    }

    fn parse_identifier_list(&mut self) -> Vec<Expression> {
        let mut list = vec![self.parse_identifier()];
        while self.next_is(Token::Comma) {
            list.push(self.parse_identifier());
        }
        list
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Precedence climbing: parse a prefix expression, then consume infix
    /// operators while the next token is not in the current context's
    /// terminator set and binds tighter than `min_precedence`. A trailing
    /// `::type` is attached to the finished expression via `set_cast`.
    fn parse_expression(&mut self, min_precedence: Precedence) -> Expression {
        let mut left = self.parse_prefix();
        loop {
            if self.at_terminator() {
                break;
            }
            match self.token() {
                Token::Typecast if POSTFIX > min_precedence => {
                    self.advance();
                    let datatype = self.parse_type().to_string();
                    left.set_cast(datatype);
                    continue;
                }
                Token::OpenBracket if POSTFIX > min_precedence => {
                    left = self.parse_index(left);
                    continue;
                }
                Token::Keyword(Keyword::Between) if COMPARISON > min_precedence => {
                    left = self.parse_between(left, false);
                    continue;
                }
                Token::Keyword(Keyword::In) if COMPARISON > min_precedence => {
                    left = self.parse_in(left, false);
                    continue;
                }
                Token::Keyword(Keyword::Is) if EQUALITY > min_precedence => {
                    left = self.parse_is(left);
                    continue;
                }
                Token::Keyword(Keyword::Over) if TIME_ZONE > min_precedence => {
                    left = self.parse_over(left);
                    continue;
                }
                Token::Keyword(Keyword::Not) if COMPARISON > min_precedence => {
                    // NOT as an infix only introduces a negated comparison.
                    match self.peek(0).clone() {
                        Token::Keyword(Keyword::Between) => {
                            self.advance();
                            left = self.parse_between(left, true);
                            continue;
                        }
                        Token::Keyword(Keyword::In) => {
                            self.advance();
                            left = self.parse_in(left, true);
                            continue;
                        }
                        Token::Keyword(Keyword::Like) => {
                            self.advance();
                            self.advance();
                            left = self.parse_infix(left, InfixOp::NotLike, COMPARISON);
                            continue;
                        }
                        Token::Keyword(Keyword::Ilike) => {
                            self.advance();
                            self.advance();
                            left = self.parse_infix(left, InfixOp::NotIlike, COMPARISON);
                            continue;
                        }
                        Token::Keyword(Keyword::Similar) => {
                            self.advance();
                            self.advance();
                            self.expect(Keyword::To.into());
                            left = self.parse_infix(left, InfixOp::NotSimilarTo, COMPARISON);
                            continue;
                        }
                        _ => break,
                    }
                }
                Token::Keyword(Keyword::Similar) if COMPARISON > min_precedence => {
                    self.advance();
                    self.expect(Keyword::To.into());
                    left = self.parse_infix(left, InfixOp::SimilarTo, COMPARISON);
                    continue;
                }
                _ => {}
            }
            // AT TIME ZONE is folded from three word tokens of lookahead;
            // an identifier literally named `at` parses normally when not
            // followed by TIME ZONE.
            if TIME_ZONE > min_precedence
                && self.word_is("AT")
                && self.peek_word_is(0, "TIME")
                && self.peek_word_is(1, "ZONE")
            {
                self.advance();
                self.advance();
                self.advance();
                left = self.parse_infix(left, InfixOp::AtTimeZone, TIME_ZONE);
                continue;
            }
            let Some((op, precedence)) = infix_operator(self.token()) else {
                break;
            };
            if precedence <= min_precedence {
                break;
            }
            self.advance();
            left = self.parse_infix(left, op, precedence);
        }
        left
    }

    fn parse_infix(&mut self, left: Expression, op: InfixOp, precedence: Precedence) -> Expression {
        // Exponentiation is right-associative; everything else binds left.
        let min = if op == InfixOp::Exponentiate {
            precedence - 1
        } else {
            precedence
        };
        let right = self.parse_expression(min);
        self.expr(ExprKind::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Prefix dispatch: atoms and prefix operators. A token with no prefix
    /// handler records an error and yields an error placeholder node; the
    /// offending token is consumed so the statement loop always makes
    /// progress.
    fn parse_prefix(&mut self) -> Expression {
        match self.token().clone() {
            Token::Integer(text) => {
                self.advance();
                let param = self.next_param();
                let value = match text.parse::<i128>() {
                    Ok(n) => Literal::Integer(n),
                    Err(_) => Literal::Unknown(text),
                };
                self.expr(ExprKind::Literal { value, param })
            }
            Token::Float(text) => {
                self.advance();
                let param = self.next_param();
                let value = match Decimal::from_str(&text) {
                    Ok(d) => Literal::Float(d),
                    Err(_) => Literal::Unknown(text),
                };
                self.expr(ExprKind::Literal { value, param })
            }
            Token::String(text) => {
                self.advance();
                let param = self.next_param();
                self.expr(ExprKind::Literal {
                    value: Literal::String(text),
                    param,
                })
            }
            Token::Param(text) => {
                self.advance();
                let param = self.next_param();
                self.expr(ExprKind::Literal {
                    value: Literal::Unknown(text),
                    param,
                })
            }
            Token::Keyword(Keyword::True) => {
                self.advance();
                let param = self.next_param();
                self.expr(ExprKind::Literal {
                    value: Literal::Boolean(true),
                    param,
                })
            }
            Token::Keyword(Keyword::False) => {
                self.advance();
                let param = self.next_param();
                self.expr(ExprKind::Literal {
                    value: Literal::Boolean(false),
                    param,
                })
            }
            Token::Keyword(Keyword::Null) => {
                self.advance();
                let param = self.next_param();
                self.expr(ExprKind::Literal {
                    value: Literal::Null,
                    param,
                })
            }
            Token::Asterisk => {
                self.advance();
                self.expr(ExprKind::All)
            }
            Token::Minus => {
                self.advance();
                let operand = self.parse_expression(EXPONENT);
                self.expr(ExprKind::Prefix {
                    op: PrefixOp::Minus,
                    expr: Box::new(operand),
                })
            }
            Token::Plus => {
                self.advance();
                let operand = self.parse_expression(EXPONENT);
                self.expr(ExprKind::Prefix {
                    op: PrefixOp::Plus,
                    expr: Box::new(operand),
                })
            }
            Token::Keyword(Keyword::Not) => {
                self.advance();
                let operand = self.parse_expression(NOT);
                self.expr(ExprKind::Prefix {
                    op: PrefixOp::Not,
                    expr: Box::new(operand),
                })
            }
            Token::Keyword(Keyword::Exists) => {
                self.advance();
                let operand = self.parse_expression(NOT);
                self.expr(ExprKind::Prefix {
                    op: PrefixOp::Exists,
                    expr: Box::new(operand),
                })
            }
            Token::Keyword(Keyword::Case) => self.parse_case(),
            Token::Keyword(Keyword::Array) => {
                self.advance();
                self.expect(Token::OpenBracket);
                let items = self.with_context(ParseContext::Array, |p| {
                    if p.token_is(&Token::CloseBracket) {
                        Vec::new()
                    } else {
                        p.parse_expression_list()
                    }
                });
                self.expect(Token::CloseBracket);
                self.expr(ExprKind::Array(items))
            }
            Token::Keyword(Keyword::Cast) => {
                self.advance();
                self.expect(Token::OpenParen);
                let mut inner =
                    self.with_context(ParseContext::CallArgs, |p| p.parse_expression(LOWEST));
                self.expect(Keyword::As.into());
                let datatype = self.parse_type().to_string();
                self.expect(Token::CloseParen);
                inner.set_cast(datatype);
                inner
            }
            Token::Keyword(Keyword::Interval) => {
                self.advance();
                let value = self.parse_prefix();
                self.expr(ExprKind::Typed {
                    kind: TypedKind::Interval,
                    value: Box::new(value),
                })
            }
            Token::Keyword(Keyword::Timestamp) if matches!(self.peek(0), Token::String(_)) => {
                self.advance();
                let value = self.parse_prefix();
                self.expr(ExprKind::Typed {
                    kind: TypedKind::Timestamp,
                    value: Box::new(value),
                })
            }
            Token::Keyword(Keyword::Default) => {
                self.advance();
                self.expr(ExprKind::Keyword("DEFAULT".into()))
            }
            Token::Keyword(Keyword::Any | Keyword::All)
                if matches!(self.peek(0), Token::OpenParen) =>
            {
                let name = self.token().to_string();
                self.advance();
                self.parse_call(name)
            }
            Token::OpenParen => {
                self.advance();
                if matches!(
                    self.token(),
                    Token::Keyword(Keyword::Select | Keyword::Values)
                ) {
                    let subquery = self.parse_select_expression();
                    self.expect(Token::CloseParen);
                    // `(SELECT …) UNION (SELECT …)` continues past the
                    // closing paren.
                    return self.parse_set_ops(subquery);
                }
                let mut items =
                    self.with_context(ParseContext::CallArgs, |p| p.parse_expression_list());
                self.expect(Token::CloseParen);
                if items.len() == 1 {
                    // A single parenthesized expression is its inner
                    // expression; rendering restores parentheses on binary
                    // nodes, so nesting Grouped here would grow parens on
                    // every round trip.
                    items.pop().expect("single-element list")
                } else {
                    self.expr(ExprKind::Grouped(items))
                }
            }
            Token::Ident(_) | Token::QuotedIdent(_) => {
                let identifier = self.parse_identifier();
                if self.token_is(&Token::OpenParen) {
                    let name = identifier.render(false);
                    return self.parse_call(name);
                }
                identifier
            }
            Token::Keyword(keyword) if keyword.is_unreserved() => {
                let identifier = self.parse_identifier();
                if self.token_is(&Token::OpenParen) {
                    let name = identifier.render(false);
                    return self.parse_call(name);
                }
                identifier
            }
            Token::BadString(_) => {
                let (line, char) = (self.current.1.line, self.current.1.char);
                let expr = self.error_expr(Error::BadString { line, char });
                self.advance();
                expr
            }
            Token::BadEscape(text) => {
                let (line, char) = (self.current.1.line, self.current.1.char);
                let expr = self.error_expr(Error::BadEscape {
                    escape: text,
                    line,
                    char,
                });
                self.advance();
                expr
            }
            Token::Illegal(text) => {
                let (line, char) = (self.current.1.line, self.current.1.char);
                let expr = self.error_expr(Error::IllegalToken {
                    token: text,
                    line,
                    char,
                });
                self.advance();
                expr
            }
            token => {
                let expr = self.error_expr(Error::NoPrefixHandler {
                    token: token.to_string(),
                    statement: self.statement,
                });
                // Consume the offending token so parsing always advances.
                if !self.token_is(&Token::Eof) {
                    self.advance();
                }
                expr
            }
        }
    }

    /// Parses a dotted identifier path: `a`, `a.b`, `a.b.c`, `a.*`.
    fn parse_identifier(&mut self) -> Expression {
        let mut parts = Vec::new();
        match self.token().clone() {
            Token::Ident(name) => {
                self.advance();
                parts.push(IdentPart::bare(name));
            }
            Token::QuotedIdent(name) => {
                self.advance();
                parts.push(IdentPart {
                    name,
                    quoted: true,
                });
            }
            Token::Keyword(keyword) if keyword.is_unreserved() => {
                self.advance();
                parts.push(IdentPart::bare(keyword.to_string().to_lowercase()));
            }
            token => {
                return self.error_expr(Error::UnexpectedToken {
                    expected: "identifier".into(),
                    found: token.to_string(),
                    statement: self.statement,
                });
            }
        }
        while self.token_is(&Token::Period) {
            self.advance();
            match self.token().clone() {
                Token::Ident(name) => {
                    self.advance();
                    parts.push(IdentPart::bare(name));
                }
                Token::QuotedIdent(name) => {
                    self.advance();
                    parts.push(IdentPart {
                        name,
                        quoted: true,
                    });
                }
                Token::Keyword(keyword) if keyword.is_unreserved() => {
                    self.advance();
                    parts.push(IdentPart::bare(keyword.to_string().to_lowercase()));
                }
                Token::Asterisk => {
                    self.advance();
                    parts.push(IdentPart::bare("*"));
                }
                token => {
                    self.errors.push(Error::UnexpectedToken {
                        expected: "identifier".into(),
                        found: token.to_string(),
                        statement: self.statement,
                    });
                    break;
                }
            }
        }
        self.expr(ExprKind::Identifier(parts))
    }

    fn parse_call(&mut self, name: String) -> Expression {
        self.advance();
        let mut quantifier = None;
        if self.next_is(Keyword::Distinct.into()) {
            quantifier = Some(SetQuantifier::Distinct);
        } else if self.next_is(Keyword::All.into()) {
            quantifier = Some(SetQuantifier::All);
        }
        let args = self.with_context(ParseContext::CallArgs, |p| {
            p.in_clause(Clause::CallArg, |p| {
                if p.token_is(&Token::CloseParen) {
                    Vec::new()
                } else {
                    p.parse_expression_list()
                }
            })
        });
        self.expect(Token::CloseParen);
        self.expr(ExprKind::Call {
            name,
            quantifier,
            args,
            over: None,
        })
    }

    fn parse_over(&mut self, left: Expression) -> Expression {
        self.advance();
        self.expect(Token::OpenParen);
        let mut partition_by = Vec::new();
        if self.next_is(Keyword::Partition.into()) {
            self.expect(Keyword::By.into());
            partition_by =
                self.with_context(ParseContext::CallArgs, |p| p.parse_expression_list());
        }
        let mut order_by = Vec::new();
        if self.next_is(Keyword::Order.into()) {
            self.expect(Keyword::By.into());
            order_by = self.with_context(ParseContext::CallArgs, |p| p.parse_sort_list());
        }
        self.expect(Token::CloseParen);
        let window = self.expr(ExprKind::Window {
            partition_by,
            order_by,
        });
        let mut left = left;
        match &mut left.kind {
            ExprKind::Call { over, .. } => {
                *over = Some(Box::new(window));
                left
            }
            _ => {
                self.errors.push(Error::UnexpectedToken {
                    expected: "function call before OVER".into(),
                    found: left.token_literal(),
                    statement: self.statement,
                });
                left
            }
        }
    }

    fn parse_between(&mut self, left: Expression, negated: bool) -> Expression {
        self.advance();
        let low = self.parse_expression(COMPARISON);
        self.expect(Keyword::And.into());
        let high = self.parse_expression(COMPARISON);
        self.expr(ExprKind::Between {
            expr: Box::new(left),
            low: Box::new(low),
            high: Box::new(high),
            negated,
        })
    }

    fn parse_in(&mut self, left: Expression, negated: bool) -> Expression {
        self.advance();
        self.expect(Token::OpenParen);
        let list = if matches!(
            self.token(),
            Token::Keyword(Keyword::Select | Keyword::Values)
        ) {
            vec![self.parse_select_expression()]
        } else {
            self.with_context(ParseContext::CallArgs, |p| p.parse_expression_list())
        };
        self.expect(Token::CloseParen);
        self.expr(ExprKind::In {
            expr: Box::new(left),
            list,
            negated,
        })
    }

    fn parse_is(&mut self, left: Expression) -> Expression {
        self.advance();
        let op = if self.next_is(Keyword::Not.into()) {
            InfixOp::IsNot
        } else {
            InfixOp::Is
        };
        let right = match self.token() {
            Token::Keyword(Keyword::Null) => {
                self.advance();
                self.expr(ExprKind::Keyword("NULL".into()))
            }
            Token::Keyword(Keyword::True) => {
                self.advance();
                self.expr(ExprKind::Keyword("TRUE".into()))
            }
            Token::Keyword(Keyword::False) => {
                self.advance();
                self.expr(ExprKind::Keyword("FALSE".into()))
            }
            _ => {
                let error = Error::UnexpectedToken {
                    expected: "NULL, TRUE, or FALSE".into(),
                    found: self.token().to_string(),
                    statement: self.statement,
                };
                self.error_expr(error)
            }
        };
        self.expr(ExprKind::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_index(&mut self, left: Expression) -> Expression {
        self.advance();
        self.with_context(ParseContext::Array, |p| {
            let mut lower = None;
            let mut upper = None;
            let mut slice = false;
            if !p.token_is(&Token::Colon) {
                lower = Some(Box::new(p.parse_expression(LOWEST)));
            }
            if p.next_is(Token::Colon) {
                slice = true;
                if !p.token_is(&Token::CloseBracket) {
                    upper = Some(Box::new(p.parse_expression(LOWEST)));
                }
            }
            p.expect(Token::CloseBracket);
            p.expr(ExprKind::Index {
                base: Box::new(left),
                lower,
                upper,
                slice,
            })
        })
    }

    fn parse_case(&mut self) -> Expression {
        self.advance();
        let mut operand = None;
        if !self.token_is(&Keyword::When.into()) {
            operand = Some(Box::new(self.parse_expression(LOWEST)));
        }
        let mut when_clauses = Vec::new();
        while self.next_is(Keyword::When.into()) {
            let condition = self.parse_expression(LOWEST);
            self.expect(Keyword::Then.into());
            let result = self.parse_expression(LOWEST);
            when_clauses.push((condition, result));
        }
        let mut else_clause = None;
        if self.next_is(Keyword::Else.into()) {
            else_clause = Some(Box::new(self.parse_expression(LOWEST)));
        }
        self.expect(Keyword::End.into());
        self.expr(ExprKind::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    /// Parses a type reference: a (possibly multi-word) name, optional
    /// parameters, optional array suffix. Used for both `::` casts and
    /// CREATE TABLE column types.
    fn parse_type(&mut self) -> TypeName {
        let mut name = match self.token().word() {
            Some(word) => {
                self.advance();
                word
            }
            None => {
                self.errors.push(Error::UnexpectedToken {
                    expected: "type name".into(),
                    found: self.token().to_string(),
                    statement: self.statement,
                });
                return TypeName {
                    name: String::new(),
                    params: Vec::new(),
                    array: false,
                };
            }
        };
        // Known multi-word spellings only; anything else would swallow a
        // bare column alias.
        if name == "DOUBLE" && self.word_is("PRECISION") {
            self.advance();
            name.push_str(" PRECISION");
        } else if (name == "TIMESTAMP" || name == "TIME")
            && (self.word_is("WITH") || self.word_is("WITHOUT"))
            && self.peek_word_is(0, "TIME")
            && self.peek_word_is(1, "ZONE")
        {
            let with = self.token().word().expect("word checked");
            self.advance();
            self.advance();
            self.advance();
            name.push(' ');
            name.push_str(&with);
            name.push_str(" TIME ZONE");
        } else if name == "CHARACTER" && self.word_is("VARYING") {
            self.advance();
            name.push_str(" VARYING");
        }
        let mut params = Vec::new();
        if self.next_is(Token::OpenParen) {
            loop {
                match self.token().clone() {
                    Token::Integer(text) => {
                        self.advance();
                        params.push(text);
                    }
                    token => {
                        self.errors.push(Error::UnexpectedToken {
                            expected: "type parameter".into(),
                            found: token.to_string(),
                            statement: self.statement,
                        });
                        break;
                    }
                }
                if !self.next_is(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::CloseParen);
        }
        let mut array = false;
        if self.next_is(Token::OpenBracket) {
            self.expect(Token::CloseBracket);
            array = true;
        }
        TypeName {
            name,
            params,
            array,
        }
    }
}

/// Scans the next non-comment token, bounding the skip so adversarial
/// input cannot spin the parser.
fn scan_past_comments(lexer: &mut Lexer, errors: &mut Vec<Error>) -> (Token, Position) {
    let mut skipped = 0usize;
    loop {
        let (token, position) = lexer.scan();
        if matches!(token, Token::Comment(_)) {
            skipped += 1;
            if skipped >= MAX_COMMENT_RUN {
                tracing::warn!(skipped, "comment run exceeded guard, aborting scan");
                errors.push(Error::RunawayComment(MAX_COMMENT_RUN));
                return (Token::Eof, position);
            }
            continue;
        }
        return (token, position);
    }
}

/// Keywords that begin a non-SELECT statement, used to unwrap the
/// parentheses canonical rendering puts around such statements.
fn is_statement_keyword(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::Insert
            | Keyword::Update
            | Keyword::Delete
            | Keyword::Create
            | Keyword::Drop
            | Keyword::Analyze
            | Keyword::Set
            | Keyword::With
            | Keyword::Begin
            | Keyword::Commit
            | Keyword::Rollback
            | Keyword::Show
            | Keyword::Savepoint
    )
}

/// The plain infix operator table: token → operator and precedence. The
/// multi-token operators (BETWEEN, IN, IS, NOT …, AT TIME ZONE, casts,
/// indexing, OVER) are dispatched before this table is consulted.
fn infix_operator(token: &Token) -> Option<(InfixOp, Precedence)> {
    let (op, precedence) = match token {
        Token::Keyword(Keyword::Or) => (InfixOp::Or, OR),
        Token::Keyword(Keyword::And) => (InfixOp::And, AND),
        Token::Equal => (InfixOp::Equal, EQUALITY),
        Token::NotEqual => (InfixOp::NotEqual, EQUALITY),
        Token::LessThan => (InfixOp::LessThan, EQUALITY),
        Token::LessThanOrEqual => (InfixOp::LessThanOrEqual, EQUALITY),
        Token::GreaterThan => (InfixOp::GreaterThan, EQUALITY),
        Token::GreaterThanOrEqual => (InfixOp::GreaterThanOrEqual, EQUALITY),
        Token::Keyword(Keyword::Like) => (InfixOp::Like, COMPARISON),
        Token::Keyword(Keyword::Ilike) => (InfixOp::Ilike, COMPARISON),
        Token::Tilde => (InfixOp::RegexMatch, COMPARISON),
        Token::TildeStar => (InfixOp::RegexIMatch, COMPARISON),
        Token::NotTilde => (InfixOp::NotRegexMatch, COMPARISON),
        Token::NotTildeStar => (InfixOp::NotRegexIMatch, COMPARISON),
        Token::Plus => (InfixOp::Add, ADDITIVE),
        Token::Minus => (InfixOp::Subtract, ADDITIVE),
        Token::Asterisk => (InfixOp::Multiply, MULTIPLICATIVE),
        Token::Slash => (InfixOp::Divide, MULTIPLICATIVE),
        Token::Percent => (InfixOp::Remainder, MULTIPLICATIVE),
        Token::Caret => (InfixOp::Exponentiate, EXPONENT),
        Token::Concat => (InfixOp::Concat, JSON),
        Token::Arrow => (InfixOp::JsonGet, JSON),
        Token::LongArrow => (InfixOp::JsonGetText, JSON),
        Token::HashArrow => (InfixOp::JsonPath, JSON),
        Token::HashLongArrow => (InfixOp::JsonPathText, JSON),
        Token::HashMinus => (InfixOp::JsonDelete, JSON),
        Token::AtArrow => (InfixOp::JsonContains, JSON),
        Token::ArrowAt => (InfixOp::JsonContained, JSON),
        Token::Question => (InfixOp::JsonHasKey, JSON),
        Token::QuestionPipe => (InfixOp::JsonHasAny, JSON),
        Token::QuestionAnd => (InfixOp::JsonHasAll, JSON),
        Token::AmpAmp => (InfixOp::Overlaps, JSON),
        _ => return None,
    };
    Some((op, precedence))
}
