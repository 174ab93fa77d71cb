//! Data definition statements: CREATE and DROP

use std::fmt;

use super::expressions::Expression;

/// DDL statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlStatement {
    /// CREATE TABLE with column definitions and/or a LIKE clause.
    CreateTable {
        name: Expression,
        if_not_exists: bool,
        columns: Vec<ColumnDef>,
        like: Option<LikeClause>,
    },
    /// CREATE [UNIQUE] INDEX … ON table (columns).
    CreateIndex {
        name: String,
        unique: bool,
        table: Expression,
        columns: Vec<Expression>,
    },
    /// DROP TABLE [IF EXISTS] with one or more table names.
    DropTable {
        names: Vec<Expression>,
        if_exists: bool,
    },
    /// DROP INDEX [IF EXISTS].
    DropIndex {
        names: Vec<String>,
        if_exists: bool,
    },
}

/// A CREATE TABLE column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub datatype: TypeName,
    pub options: Vec<ColumnOption>,
}

/// A data type reference: free-form name, optional parameters, optional
/// array suffix. The name is upper-cased for canonical rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub name: String,
    pub params: Vec<String>,
    pub array: bool,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name.to_uppercase())?;
        if !self.params.is_empty() {
            write!(f, "({})", self.params.join(", "))?;
        }
        if self.array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// Column options in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOption {
    PrimaryKey,
    NotNull,
    Null,
    Unique,
    Default(Expression),
    References {
        table: Expression,
        column: Option<String>,
    },
    Check(Expression),
}

/// `LIKE parent INCLUDING/EXCLUDING …` inside CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeClause {
    pub source: Expression,
    pub options: Vec<LikeOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeOption {
    pub including: bool,
    pub property: String,
}
