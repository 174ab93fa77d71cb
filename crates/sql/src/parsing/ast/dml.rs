//! Data manipulation statements: SELECT, INSERT, UPDATE, DELETE

use super::common::{FromItem, LockClause};
use super::expressions::Expression;

/// DML statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmlStatement {
    /// SELECT: the expression is a Select, SetOp, or Values expression.
    Select(Expression),
    /// INSERT INTO: inserts new rows into a table.
    Insert {
        /// Table to insert into, as an identifier expression.
        table: Expression,
        /// Columns to insert values into. Empty when unspecified.
        columns: Vec<Expression>,
        /// Source of the inserted rows.
        source: InsertSource,
        /// ON CONFLICT clause, if present.
        on_conflict: Option<OnConflict>,
        /// RETURNING expressions. Empty when absent.
        returning: Vec<Expression>,
    },
    /// UPDATE: updates rows in a table.
    Update {
        table: Expression,
        /// column → value assignments, in source order.
        assignments: Vec<(Expression, Expression)>,
        from: Vec<FromItem>,
        r#where: Option<Expression>,
        returning: Vec<Expression>,
    },
    /// DELETE FROM: deletes rows from a table.
    Delete {
        table: Expression,
        using: Vec<FromItem>,
        r#where: Option<Expression>,
        returning: Vec<Expression>,
    },
}

/// Source of data for INSERT statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertSource {
    /// VALUES: a Values expression.
    Values(Expression),
    /// SELECT: a select expression.
    Select(Expression),
    /// DEFAULT VALUES: a row of all defaults.
    DefaultValues,
}

/// ON CONFLICT clause of an INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnConflict {
    /// Conflict target columns. Empty when unspecified.
    pub target: Vec<Expression>,
    pub action: ConflictAction,
    /// Condition on a DO UPDATE action.
    pub r#where: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictAction {
    DoNothing,
    DoUpdate(Vec<(Expression, Expression)>),
}

/// The body of one SELECT, before any set operators are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectCore {
    /// DISTINCT / DISTINCT ON (…), if present.
    pub distinct: Option<DistinctClause>,
    /// Expressions to select, with an optional column alias.
    pub select: Vec<(Expression, Option<String>)>,
    /// FROM: tables, subqueries, and joins to select from.
    pub from: Vec<FromItem>,
    /// WHERE: optional condition to filter rows.
    pub r#where: Option<Expression>,
    /// GROUP BY: expressions to group and aggregate by.
    pub group_by: Vec<Expression>,
    /// HAVING: expression to filter groups by.
    pub having: Option<Expression>,
    /// ORDER BY: Sort expressions.
    pub order_by: Vec<Expression>,
    /// LIMIT: maximum number of rows to return.
    pub limit: Option<Expression>,
    /// OFFSET: row offset to start from.
    pub offset: Option<Expression>,
    /// FETCH FIRST n ROWS ONLY, as a Fetch expression.
    pub fetch: Option<Expression>,
    /// FOR UPDATE/SHARE row locking.
    pub lock: Option<LockClause>,
}

impl SelectCore {
    /// An empty core for the parser to fill in clause by clause.
    pub fn new() -> Self {
        SelectCore {
            distinct: None,
            select: Vec::new(),
            from: Vec::new(),
            r#where: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            fetch: None,
            lock: None,
        }
    }
}

impl Default for SelectCore {
    fn default() -> Self {
        Self::new()
    }
}

/// DISTINCT clause variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistinctClause {
    /// Plain DISTINCT.
    All,
    /// DISTINCT ON (expr, …), a PostgreSQL extension.
    On(Vec<Expression>),
}
