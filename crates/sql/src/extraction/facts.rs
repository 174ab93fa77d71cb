//! Extracted fact records.
//!
//! Each fact carries a deterministic uuid-v5 content key so repeated
//! references de-duplicate within a statement and upserts stay idempotent
//! across runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::parsing::ast::{Clause, JoinType};

/// A referenced table. The schema defaults to `public` when the reference
/// is unqualified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
}

impl Table {
    pub fn new(schema: Option<String>, name: impl Into<String>) -> Self {
        Table {
            schema: schema.unwrap_or_else(|| "public".to_string()),
            name: name.into(),
        }
    }

    /// The schema-qualified name.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Deterministic content key.
    pub fn id(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.qualified().as_bytes())
    }
}

/// Association between a table and the query it appears in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInQuery {
    pub table: Table,
    pub query: Uuid,
}

impl TableInQuery {
    pub fn id(&self) -> Uuid {
        let content = format!("{}|{}", self.table.qualified(), self.query);
        Uuid::new_v5(&Uuid::NAMESPACE_OID, content.as_bytes())
    }
}

/// One join edge: both table identities, the join type, and the canonical
/// text of the ON condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableJoin {
    pub table_a: Table,
    pub table_b: Table,
    pub join_type: JoinType,
    pub condition: String,
}

impl TableJoin {
    pub fn id(&self) -> Uuid {
        let content = format!(
            "{}|{}|{}|{}",
            self.table_a.qualified(),
            self.table_b.qualified(),
            self.join_type,
            self.condition
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, content.as_bytes())
    }
}

/// One column reference, tagged with the clause it was found in. Keyed so
/// the same column referenced twice in the same clause of the same query
/// collapses to one fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInQuery {
    pub table: Table,
    pub column: String,
    pub clause: Clause,
    pub query: Uuid,
}

impl ColumnInQuery {
    pub fn id(&self) -> Uuid {
        let content = format!(
            "{}|{}|{}|{}",
            self.table.qualified(),
            self.column,
            self.clause,
            self.query
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, content.as_bytes())
    }
}
