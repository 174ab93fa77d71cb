//! Abstract Syntax Tree for the PostgreSQL dialect subset.
//!
//! Statements are the root nodes, built from raw SQL by the parser. The
//! tree only reflects syntactic structure: it does not know whether a table
//! or column exists — that is the extractor's and its consumers' concern.
//! The canonicalizing printer in `display` is the only externally consumed
//! output of the tree besides the nodes themselves.

pub mod common;
pub mod ddl;
mod display;
pub mod dml;
pub mod expressions;

pub use common::{
    Clause, CommandTag, Cte, Direction, FromItem, JoinType, LockClause, LockMode, LockWait,
    NullsOrder,
};
pub use ddl::{ColumnDef, ColumnOption, DdlStatement, LikeClause, LikeOption, TypeName};
pub use dml::{
    ConflictAction, DistinctClause, DmlStatement, InsertSource, OnConflict, SelectCore,
};
pub use expressions::{
    ExprKind, Expression, IdentPart, InfixOp, Literal, PrefixOp, SetOperator, SetQuantifier,
    TypedKind,
};

/// A SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// DDL statements (CREATE, DROP).
    Ddl(DdlStatement),
    /// DML statements (SELECT, INSERT, UPDATE, DELETE).
    Dml(DmlStatement),
    /// Transaction control (BEGIN, COMMIT, ROLLBACK, SAVEPOINT).
    Transaction(TransactionStatement),
    /// Session utilities (ANALYZE, SET, SHOW).
    Utility(UtilityStatement),
    /// WITH: common table expressions over a DML body.
    With(WithStatement),
    /// A bare expression statement.
    Expression(Expression),
}

impl Statement {
    /// The command tag identifying this statement's kind.
    pub fn command(&self) -> CommandTag {
        match self {
            Statement::Ddl(DdlStatement::CreateTable { .. })
            | Statement::Ddl(DdlStatement::CreateIndex { .. }) => CommandTag::Create,
            Statement::Ddl(DdlStatement::DropTable { .. })
            | Statement::Ddl(DdlStatement::DropIndex { .. }) => CommandTag::Drop,
            Statement::Dml(DmlStatement::Select(_)) => CommandTag::Select,
            Statement::Dml(DmlStatement::Insert { .. }) => CommandTag::Insert,
            Statement::Dml(DmlStatement::Update { .. }) => CommandTag::Update,
            Statement::Dml(DmlStatement::Delete { .. }) => CommandTag::Delete,
            Statement::Transaction(TransactionStatement::Begin) => CommandTag::Begin,
            Statement::Transaction(TransactionStatement::Commit) => CommandTag::Commit,
            Statement::Transaction(TransactionStatement::Rollback { .. }) => CommandTag::Rollback,
            Statement::Transaction(TransactionStatement::Savepoint { .. }) => CommandTag::Savepoint,
            Statement::Utility(UtilityStatement::Analyze { .. }) => CommandTag::Analyze,
            Statement::Utility(UtilityStatement::Set { .. }) => CommandTag::Set,
            Statement::Utility(UtilityStatement::Show { .. }) => CommandTag::Show,
            Statement::With(_) => CommandTag::With,
            Statement::Expression(_) => CommandTag::Expression,
        }
    }
}

/// Transaction control statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatement {
    Begin,
    Commit,
    Rollback { savepoint: Option<String> },
    Savepoint { name: String },
}

/// Session utility statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtilityStatement {
    /// ANALYZE [table [(columns)]].
    Analyze {
        table: Option<Expression>,
        columns: Vec<Expression>,
    },
    /// SET [LOCAL|SESSION] name = value. A None value is DEFAULT.
    Set {
        scope: Option<SetScope>,
        name: String,
        value: Option<Expression>,
    },
    /// SHOW name (or SHOW ALL, with name "ALL").
    Show { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetScope {
    Local,
    Session,
}

/// A WITH statement: CTE definitions over a statement body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithStatement {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
    pub body: Box<Statement>,
}

/// An ordered sequence of statements, in source order. Order is append-only
/// and is the reporting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Self {
        Program {
            statements: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Renders every statement, one per line, in source order.
    pub fn render(&self, mask: bool) -> String {
        self.statements
            .iter()
            .map(|statement| statement.render(mask))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
