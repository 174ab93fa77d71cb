//! Fact extraction: scoped alias resolution over parsed statements.

mod extractor;
mod facts;
mod scope;

pub use extractor::Extractor;
pub use facts::{ColumnInQuery, Table, TableInQuery, TableJoin};
pub use scope::Scope;
