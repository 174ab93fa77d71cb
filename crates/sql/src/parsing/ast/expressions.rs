//! SQL expressions and operators

use std::fmt;

use rust_decimal::Decimal;

use super::common::{Clause, CommandTag, Direction, NullsOrder};
use super::dml::SelectCore;

/// A SQL expression. Every expression carries the clause and command tag it
/// was parsed under, plus an optional trailing type cast. Expressions are
/// built once by the parser and never mutated afterward, except for the
/// single `set_cast` call made immediately after a trailing `::type` is
/// recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub kind: ExprKind,
    pub clause: Clause,
    pub command: CommandTag,
    pub cast: Option<String>,
}

impl Expression {
    pub fn new(kind: ExprKind, clause: Clause, command: CommandTag) -> Self {
        Expression {
            kind,
            clause,
            command,
            cast: None,
        }
    }

    /// Attaches a trailing `::type` cast. A cast can trail any expression
    /// and is only known after the expression itself has been parsed.
    pub fn set_cast(&mut self, datatype: String) {
        self.cast = Some(datatype);
    }

    /// The literal of the token this expression originates from.
    pub fn token_literal(&self) -> String {
        match &self.kind {
            ExprKind::All => "*".into(),
            ExprKind::Identifier(parts) => parts
                .first()
                .map(|p| p.to_string())
                .unwrap_or_default(),
            ExprKind::Literal { value, .. } => value.to_string(),
            ExprKind::Keyword(word) => word.clone(),
            ExprKind::Prefix { op, .. } => op.to_string(),
            ExprKind::Infix { op, .. } => op.to_string(),
            ExprKind::Between { .. } => "BETWEEN".into(),
            ExprKind::In { .. } => "IN".into(),
            ExprKind::Call { name, .. } => name.clone(),
            ExprKind::Grouped(_) => "(".into(),
            ExprKind::Array(_) => "ARRAY".into(),
            ExprKind::Index { .. } => "[".into(),
            ExprKind::Case { .. } => "CASE".into(),
            ExprKind::Window { .. } => "OVER".into(),
            ExprKind::Sort { expr, .. } => expr.token_literal(),
            ExprKind::Fetch { .. } => "FETCH".into(),
            ExprKind::Typed { kind, .. } => kind.to_string(),
            ExprKind::Select(_) => "SELECT".into(),
            ExprKind::SetOp { op, .. } => op.to_string(),
            ExprKind::Values(_) => "VALUES".into(),
            ExprKind::Error(token) => token.clone(),
        }
    }
}

/// One segment of a dotted identifier path. Quoted segments render with
/// their double quotes restored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentPart {
    pub name: String,
    pub quoted: bool,
}

impl IdentPart {
    pub fn bare(name: impl Into<String>) -> Self {
        IdentPart {
            name: name.into(),
            quoted: false,
        }
    }
}

impl fmt::Display for IdentPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// The closed set of expression node kinds. The printer and the extractor
/// both dispatch on this with exhaustive matches, so adding a kind is a
/// compile-time obligation for each of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// `*`
    All,
    /// A dotted identifier path: `column`, `table.column`,
    /// `schema.table.column`, or `table.*`.
    Identifier(Vec<IdentPart>),
    /// A literal with its parse-time parameter offset, used for masked
    /// rendering. The offset is identical regardless of whether masking is
    /// requested.
    Literal { value: Literal, param: usize },
    /// A bare keyword operand that is part of an operator phrase and never
    /// masked, e.g. the NULL in `IS NOT NULL` or DEFAULT in a VALUES row.
    Keyword(String),
    /// A prefix operator: `NOT a`, `EXISTS (…)`, `-a`, `+a`.
    Prefix { op: PrefixOp, expr: Box<Expression> },
    /// A binary operator: `a + b`, `a AND b`, `payload -> 'id'`, ….
    Infix {
        op: InfixOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `a [NOT] BETWEEN low AND high`
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        negated: bool,
    },
    /// `a [NOT] IN (list…)` — the list holds a single select expression for
    /// `IN (SELECT …)`.
    In {
        expr: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
    },
    /// A function call, with an optional DISTINCT/ALL qualifier on the
    /// argument list and an optional OVER window.
    Call {
        name: String,
        quantifier: Option<SetQuantifier>,
        args: Vec<Expression>,
        over: Option<Box<Expression>>,
    },
    /// A parenthesized expression list.
    Grouped(Vec<Expression>),
    /// `ARRAY[…]`
    Array(Vec<Expression>),
    /// Array element or slice access: `a[1]`, `a[2:5]`.
    Index {
        base: Box<Expression>,
        lower: Option<Box<Expression>>,
        upper: Option<Box<Expression>>,
        slice: bool,
    },
    /// Simple or searched CASE.
    Case {
        operand: Option<Box<Expression>>,
        when_clauses: Vec<(Expression, Expression)>,
        else_clause: Option<Box<Expression>>,
    },
    /// A window specification: `PARTITION BY … ORDER BY …`.
    Window {
        partition_by: Vec<Expression>,
        order_by: Vec<Expression>,
    },
    /// An ORDER BY element with direction and nulls ordering.
    Sort {
        expr: Box<Expression>,
        direction: Option<Direction>,
        nulls: Option<NullsOrder>,
    },
    /// `FETCH FIRST n ROWS ONLY`
    Fetch { count: Option<Box<Expression>> },
    /// A typed literal: `TIMESTAMP '…'`, `INTERVAL '…'`.
    Typed {
        kind: TypedKind,
        value: Box<Expression>,
    },
    /// A SELECT expression. SELECT is an expression so that set operators
    /// can combine whole selects and subqueries can appear anywhere an
    /// expression can.
    Select(Box<SelectCore>),
    /// `left UNION [ALL] right` and friends, combining select expressions
    /// at the lowest binding level.
    SetOp {
        left: Box<Expression>,
        op: SetOperator,
        all: bool,
        right: Box<Expression>,
    },
    /// `VALUES (…), (…)`
    Values(Vec<Vec<Expression>>),
    /// A placeholder for a sub-expression that failed to parse. Rendering
    /// produces a placeholder token; callers must check the parser's error
    /// list before treating output containing one as usable.
    Error(String),
}

/// Expression literal values. Floats keep their source scale via Decimal so
/// canonical text reproduces them exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Integer(i128),
    Float(Decimal),
    String(String),
    Boolean(bool),
    Null,
    /// A literal the parser cannot classify further, e.g. a `$1`
    /// placeholder already present in the source text.
    Unknown(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(d) => write!(f, "{}", d),
            Literal::String(s) => {
                f.write_str("'")?;
                for ch in s.chars() {
                    match ch {
                        '\'' => f.write_str("''")?,
                        '\\' => f.write_str("\\\\")?,
                        ch => write!(f, "{}", ch)?,
                    }
                }
                f.write_str("'")
            }
            Literal::Boolean(true) => f.write_str("TRUE"),
            Literal::Boolean(false) => f.write_str("FALSE"),
            Literal::Null => f.write_str("NULL"),
            Literal::Unknown(text) => f.write_str(text),
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixOp {
    Not,    // NOT a
    Exists, // EXISTS (…)
    Minus,  // -a
    Plus,   // +a
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrefixOp::Not => "NOT",
            PrefixOp::Exists => "EXISTS",
            PrefixOp::Minus => "-",
            PrefixOp::Plus => "+",
        })
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOp {
    Or,
    And,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Is,
    IsNot,
    Like,
    NotLike,
    Ilike,
    NotIlike,
    SimilarTo,
    NotSimilarTo,
    RegexMatch,     // ~
    RegexIMatch,    // ~*
    NotRegexMatch,  // !~
    NotRegexIMatch, // !~*
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponentiate,
    Concat,        // ||
    JsonGet,       // ->
    JsonGetText,   // ->>
    JsonPath,      // #>
    JsonPathText,  // #>>
    JsonDelete,    // #-
    JsonContains,  // @>
    JsonContained, // <@
    JsonHasKey,    // ?
    JsonHasAny,    // ?|
    JsonHasAll,    // ?&
    Overlaps,      // &&
    AtTimeZone,
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InfixOp::Or => "OR",
            InfixOp::And => "AND",
            InfixOp::Equal => "=",
            InfixOp::NotEqual => "!=",
            InfixOp::LessThan => "<",
            InfixOp::LessThanOrEqual => "<=",
            InfixOp::GreaterThan => ">",
            InfixOp::GreaterThanOrEqual => ">=",
            InfixOp::Is => "IS",
            InfixOp::IsNot => "IS NOT",
            InfixOp::Like => "LIKE",
            InfixOp::NotLike => "NOT LIKE",
            InfixOp::Ilike => "ILIKE",
            InfixOp::NotIlike => "NOT ILIKE",
            InfixOp::SimilarTo => "SIMILAR TO",
            InfixOp::NotSimilarTo => "NOT SIMILAR TO",
            InfixOp::RegexMatch => "~",
            InfixOp::RegexIMatch => "~*",
            InfixOp::NotRegexMatch => "!~",
            InfixOp::NotRegexIMatch => "!~*",
            InfixOp::Add => "+",
            InfixOp::Subtract => "-",
            InfixOp::Multiply => "*",
            InfixOp::Divide => "/",
            InfixOp::Remainder => "%",
            InfixOp::Exponentiate => "^",
            InfixOp::Concat => "||",
            InfixOp::JsonGet => "->",
            InfixOp::JsonGetText => "->>",
            InfixOp::JsonPath => "#>",
            InfixOp::JsonPathText => "#>>",
            InfixOp::JsonDelete => "#-",
            InfixOp::JsonContains => "@>",
            InfixOp::JsonContained => "<@",
            InfixOp::JsonHasKey => "?",
            InfixOp::JsonHasAny => "?|",
            InfixOp::JsonHasAll => "?&",
            InfixOp::Overlaps => "&&",
            InfixOp::AtTimeZone => "AT TIME ZONE",
        })
    }
}

/// DISTINCT/ALL qualifier on a function-call argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetQuantifier {
    All,
    Distinct,
}

impl fmt::Display for SetQuantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SetQuantifier::All => "ALL",
            SetQuantifier::Distinct => "DISTINCT",
        })
    }
}

/// Set operators over select expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SetOperator::Union => "UNION",
            SetOperator::Intersect => "INTERSECT",
            SetOperator::Except => "EXCEPT",
        })
    }
}

/// Typed literal markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedKind {
    Timestamp,
    Interval,
}

impl fmt::Display for TypedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypedKind::Timestamp => "TIMESTAMP",
            TypedKind::Interval => "INTERVAL",
        })
    }
}
