//! Common structures shared across AST modules

use std::fmt;

use super::expressions::Expression;

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        })
    }
}

/// NULLS FIRST / NULLS LAST ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullsOrder {
    First,
    Last,
}

impl fmt::Display for NullsOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NullsOrder::First => "NULLS FIRST",
            NullsOrder::Last => "NULLS LAST",
        })
    }
}

/// Join types. INNER renders as plain JOIN, the canonical spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinType::Inner => "JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        })
    }
}

/// A FROM item: a table reference, a subquery, or a (possibly nested) join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromItem {
    /// A table reference. The name is an identifier expression so dotted
    /// `schema.table` paths and quoted names flow through unchanged.
    Table {
        name: Expression,
        alias: Option<String>,
    },
    /// A parenthesized subquery with an optional alias.
    Subquery {
        query: Expression,
        alias: Option<String>,
    },
    /// A join of two items. `predicate` is None for CROSS JOIN.
    Join {
        left: Box<FromItem>,
        right: Box<FromItem>,
        join: JoinType,
        predicate: Option<Expression>,
    },
}

/// A row-locking clause, e.g. `FOR UPDATE OF users NOWAIT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockClause {
    pub mode: LockMode,
    pub tables: Vec<Expression>,
    pub wait: LockWait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Update,
    NoKeyUpdate,
    Share,
    KeyShare,
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LockMode::Update => "UPDATE",
            LockMode::NoKeyUpdate => "NO KEY UPDATE",
            LockMode::Share => "SHARE",
            LockMode::KeyShare => "KEY SHARE",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockWait {
    Block,
    Nowait,
    SkipLocked,
}

/// One common table expression in a WITH statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cte {
    pub name: String,
    pub columns: Vec<String>,
    pub query: Expression,
}

/// Which part of its statement an expression was parsed from. Attached to
/// every expression at construction time so the extractor can classify
/// facts without re-deriving structural context from the tree shape.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Clause {
    None,
    Select,
    From,
    Join,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
    Fetch,
    Lock,
    CallArg,
    Set,
    Values,
    Returning,
    Columns,
    Conflict,
    With,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Clause::None => "NONE",
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Join => "JOIN",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP_BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER_BY",
            Clause::Limit => "LIMIT",
            Clause::Offset => "OFFSET",
            Clause::Fetch => "FETCH",
            Clause::Lock => "LOCK",
            Clause::CallArg => "CALL_ARG",
            Clause::Set => "SET",
            Clause::Values => "VALUES",
            Clause::Returning => "RETURNING",
            Clause::Columns => "COLUMNS",
            Clause::Conflict => "CONFLICT",
            Clause::With => "WITH",
        })
    }
}

/// The top-level statement kind an expression belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CommandTag {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Analyze,
    Set,
    With,
    Begin,
    Commit,
    Rollback,
    Savepoint,
    Show,
    Expression,
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CommandTag::Select => "SELECT",
            CommandTag::Insert => "INSERT",
            CommandTag::Update => "UPDATE",
            CommandTag::Delete => "DELETE",
            CommandTag::Create => "CREATE",
            CommandTag::Drop => "DROP",
            CommandTag::Analyze => "ANALYZE",
            CommandTag::Set => "SET",
            CommandTag::With => "WITH",
            CommandTag::Begin => "BEGIN",
            CommandTag::Commit => "COMMIT",
            CommandTag::Rollback => "ROLLBACK",
            CommandTag::Savepoint => "SAVEPOINT",
            CommandTag::Show => "SHOW",
            CommandTag::Expression => "EXPRESSION",
        })
    }
}
