//! The fact extractor.
//!
//! Walks a parsed statement, resolving table aliases through nested
//! [`Scope`]s, and emits de-duplicated table, join, and column facts. The
//! walk dispatches exhaustively on every node kind, so adding an AST kind
//! without updating the extractor fails to compile instead of silently
//! dropping facts. Extraction never mutates the tree: consumed aliases live
//! only in the scope, which is what prevents them from being double-counted
//! as tables.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::facts::{ColumnInQuery, Table, TableInQuery, TableJoin};
use super::scope::Scope;
use crate::error::Error;
use crate::fingerprint::Fingerprint;
use crate::parsing::ast::{
    Clause, ColumnOption, ConflictAction, DdlStatement, DistinctClause, DmlStatement, ExprKind,
    Expression, FromItem, IdentPart, InsertSource, SelectCore, Statement, TransactionStatement,
    UtilityStatement,
};

/// Accumulates facts across one or more statements. Fact maps are keyed by
/// deterministic content ids, so iteration order and de-duplication are
/// stable. Holds mutable state; give each worker its own instance.
#[derive(Debug, Default)]
pub struct Extractor {
    pub tables: BTreeMap<Uuid, Table>,
    pub tables_in_queries: BTreeMap<Uuid, TableInQuery>,
    pub table_joins: BTreeMap<Uuid, TableJoin>,
    pub columns_in_queries: BTreeMap<Uuid, ColumnInQuery>,
    errors: Vec<Error>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extraction failures. The walk continues over sibling nodes after a
    /// failure, so check this alongside the fact collections.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Extracts facts from one statement. The statement's masked
    /// fingerprint id identifies the query in the emitted associations.
    pub fn extract(&mut self, statement: &Statement) {
        let query = Fingerprint::of(statement).id;
        self.extract_statement(statement, query);
        tracing::debug!(
            %query,
            tables = self.tables.len(),
            columns = self.columns_in_queries.len(),
            "extracted statement facts"
        );
    }

    fn extract_statement(&mut self, statement: &Statement, query: Uuid) {
        match statement {
            Statement::Ddl(ddl) => self.extract_ddl(ddl, query),
            Statement::Dml(dml) => self.extract_dml(dml, query),
            Statement::Transaction(
                TransactionStatement::Begin
                | TransactionStatement::Commit
                | TransactionStatement::Rollback { .. }
                | TransactionStatement::Savepoint { .. },
            ) => {}
            Statement::Utility(utility) => self.extract_utility(utility, query),
            Statement::With(with) => {
                let root = Scope::root();
                for cte in &with.ctes {
                    self.extract_expression(&cte.query, &root, query);
                }
                self.extract_statement(&with.body, query);
            }
            Statement::Expression(expr) => {
                let root = Scope::root();
                self.extract_expression(expr, &root, query);
            }
        }
    }

    fn extract_ddl(&mut self, ddl: &DdlStatement, query: Uuid) {
        match ddl {
            DdlStatement::CreateTable {
                name,
                columns,
                like,
                if_not_exists: _,
            } => {
                let mut scope = Scope::root();
                if let Some(table) = table_from_identifier(name) {
                    self.record_table(table.clone(), query);
                    scope.define(table.name.clone(), table);
                }
                for column in columns {
                    for option in &column.options {
                        match option {
                            ColumnOption::Default(expr) | ColumnOption::Check(expr) => {
                                self.extract_expression(expr, &scope, query);
                            }
                            ColumnOption::References { table, .. } => {
                                if let Some(table) = table_from_identifier(table) {
                                    self.record_table(table, query);
                                }
                            }
                            ColumnOption::PrimaryKey
                            | ColumnOption::NotNull
                            | ColumnOption::Null
                            | ColumnOption::Unique => {}
                        }
                    }
                }
                if let Some(like) = like {
                    if let Some(table) = table_from_identifier(&like.source) {
                        self.record_table(table, query);
                    }
                }
            }
            DdlStatement::CreateIndex {
                table,
                columns,
                name: _,
                unique: _,
            } => {
                let mut scope = Scope::root();
                if let Some(table) = table_from_identifier(table) {
                    self.record_table(table.clone(), query);
                    scope.define(table.name.clone(), table);
                }
                for column in columns {
                    self.extract_expression(column, &scope, query);
                }
            }
            DdlStatement::DropTable { names, if_exists: _ } => {
                for name in names {
                    if let Some(table) = table_from_identifier(name) {
                        self.record_table(table, query);
                    }
                }
            }
            DdlStatement::DropIndex { .. } => {}
        }
    }

    fn extract_dml(&mut self, dml: &DmlStatement, query: Uuid) {
        match dml {
            DmlStatement::Select(expr) => {
                let root = Scope::root();
                self.extract_expression(expr, &root, query);
            }
            DmlStatement::Insert {
                table,
                columns,
                source,
                on_conflict,
                returning,
            } => {
                let mut scope = Scope::root();
                if let Some(table) = table_from_identifier(table) {
                    self.record_table(table.clone(), query);
                    scope.define(table.name.clone(), table);
                }
                for column in columns {
                    self.extract_expression(column, &scope, query);
                }
                match source {
                    InsertSource::Values(values) | InsertSource::Select(values) => {
                        self.extract_expression(values, &scope, query);
                    }
                    InsertSource::DefaultValues => {}
                }
                if let Some(on_conflict) = on_conflict {
                    for target in &on_conflict.target {
                        self.extract_expression(target, &scope, query);
                    }
                    match &on_conflict.action {
                        ConflictAction::DoNothing => {}
                        ConflictAction::DoUpdate(assignments) => {
                            for (column, value) in assignments {
                                self.extract_expression(column, &scope, query);
                                self.extract_expression(value, &scope, query);
                            }
                        }
                    }
                    if let Some(filter) = &on_conflict.r#where {
                        self.extract_expression(filter, &scope, query);
                    }
                }
                for expr in returning {
                    self.extract_expression(expr, &scope, query);
                }
            }
            DmlStatement::Update {
                table,
                assignments,
                from,
                r#where,
                returning,
            } => {
                let mut scope = Scope::root();
                if let Some(table) = table_from_identifier(table) {
                    self.record_table(table.clone(), query);
                    scope.define(table.name.clone(), table);
                }
                for item in from {
                    self.bind_from_item(item, &mut scope, query);
                }
                for item in from {
                    self.walk_from_item(item, &scope, query);
                }
                for (column, value) in assignments {
                    self.extract_expression(column, &scope, query);
                    self.extract_expression(value, &scope, query);
                }
                if let Some(filter) = r#where {
                    self.extract_expression(filter, &scope, query);
                }
                for expr in returning {
                    self.extract_expression(expr, &scope, query);
                }
            }
            DmlStatement::Delete {
                table,
                using,
                r#where,
                returning,
            } => {
                let mut scope = Scope::root();
                if let Some(table) = table_from_identifier(table) {
                    self.record_table(table.clone(), query);
                    scope.define(table.name.clone(), table);
                }
                for item in using {
                    self.bind_from_item(item, &mut scope, query);
                }
                for item in using {
                    self.walk_from_item(item, &scope, query);
                }
                if let Some(filter) = r#where {
                    self.extract_expression(filter, &scope, query);
                }
                for expr in returning {
                    self.extract_expression(expr, &scope, query);
                }
            }
        }
    }

    fn extract_utility(&mut self, utility: &UtilityStatement, query: Uuid) {
        match utility {
            UtilityStatement::Analyze { table, columns } => {
                let mut scope = Scope::root();
                if let Some(table) = table.as_ref().and_then(table_from_identifier) {
                    self.record_table(table.clone(), query);
                    scope.define(table.name.clone(), table);
                }
                for column in columns {
                    self.extract_expression(column, &scope, query);
                }
            }
            UtilityStatement::Set { value, .. } => {
                if let Some(value) = value {
                    let root = Scope::root();
                    self.extract_expression(value, &root, query);
                }
            }
            UtilityStatement::Show { .. } => {}
        }
    }

    /// Walks one SELECT body in a fresh child scope built from its own
    /// FROM/JOIN list. Nested subqueries recurse with their own children
    /// and never leak aliases back out.
    fn extract_select(&mut self, core: &SelectCore, parent: &Scope<'_>, query: Uuid) {
        let mut scope = parent.child();
        for item in &core.from {
            self.bind_from_item(item, &mut scope, query);
        }
        for item in &core.from {
            self.walk_from_item(item, &scope, query);
        }
        if let Some(DistinctClause::On(exprs)) = &core.distinct {
            for expr in exprs {
                self.extract_expression(expr, &scope, query);
            }
        }
        for (expr, _alias) in &core.select {
            self.extract_expression(expr, &scope, query);
        }
        if let Some(filter) = &core.r#where {
            self.extract_expression(filter, &scope, query);
        }
        for expr in &core.group_by {
            self.extract_expression(expr, &scope, query);
        }
        if let Some(having) = &core.having {
            self.extract_expression(having, &scope, query);
        }
        for expr in &core.order_by {
            self.extract_expression(expr, &scope, query);
        }
        if let Some(limit) = &core.limit {
            self.extract_expression(limit, &scope, query);
        }
        if let Some(offset) = &core.offset {
            self.extract_expression(offset, &scope, query);
        }
        if let Some(fetch) = &core.fetch {
            self.extract_expression(fetch, &scope, query);
        }
        if let Some(lock) = &core.lock {
            for table in &lock.tables {
                self.extract_expression(table, &scope, query);
            }
        }
    }

    /// First pass over a FROM item: record table facts and bind aliases.
    /// The alias is consumed here, into the scope, and nowhere else.
    fn bind_from_item(&mut self, item: &FromItem, scope: &mut Scope<'_>, query: Uuid) {
        match item {
            FromItem::Table { name, alias } => {
                if let Some(table) = table_from_identifier(name) {
                    self.record_table(table.clone(), query);
                    let key = alias.clone().unwrap_or_else(|| table.name.clone());
                    scope.define(key, table);
                }
            }
            FromItem::Subquery { .. } => {}
            FromItem::Join { left, right, .. } => {
                self.bind_from_item(left, scope, query);
                self.bind_from_item(right, scope, query);
            }
        }
    }

    /// Second pass: join edges and nested expressions, resolved against the
    /// fully built scope.
    fn walk_from_item(&mut self, item: &FromItem, scope: &Scope<'_>, query: Uuid) {
        match item {
            FromItem::Table { .. } => {}
            FromItem::Subquery { query: subquery, .. } => {
                self.extract_expression(subquery, scope, query);
            }
            FromItem::Join {
                left,
                right,
                join,
                predicate,
            } => {
                self.walk_from_item(left, scope, query);
                self.walk_from_item(right, scope, query);
                if let (Some(table_a), Some(table_b)) = (primary_table(left), primary_table(right))
                {
                    let condition = predicate
                        .as_ref()
                        .map(|p| p.render(false))
                        .unwrap_or_default();
                    let fact = TableJoin {
                        table_a,
                        table_b,
                        join_type: *join,
                        condition,
                    };
                    self.table_joins.insert(fact.id(), fact);
                }
                if let Some(predicate) = predicate {
                    self.extract_expression(predicate, scope, query);
                }
            }
        }
    }

    /// Exhaustive expression walk. Every kind is handled explicitly; error
    /// placeholders are reported, never silently skipped.
    fn extract_expression(&mut self, expr: &Expression, scope: &Scope<'_>, query: Uuid) {
        match &expr.kind {
            ExprKind::All => {}
            ExprKind::Identifier(parts) => self.record_column(parts, expr.clause, scope, query),
            ExprKind::Literal { .. } => {}
            ExprKind::Keyword(_) => {}
            ExprKind::Prefix { expr: operand, .. } => {
                self.extract_expression(operand, scope, query);
            }
            ExprKind::Infix { left, right, .. } => {
                self.extract_expression(left, scope, query);
                self.extract_expression(right, scope, query);
            }
            ExprKind::Between {
                expr: operand,
                low,
                high,
                negated: _,
            } => {
                self.extract_expression(operand, scope, query);
                self.extract_expression(low, scope, query);
                self.extract_expression(high, scope, query);
            }
            ExprKind::In {
                expr: operand,
                list,
                negated: _,
            } => {
                self.extract_expression(operand, scope, query);
                for item in list {
                    self.extract_expression(item, scope, query);
                }
            }
            ExprKind::Call { args, over, .. } => {
                for arg in args {
                    self.extract_expression(arg, scope, query);
                }
                if let Some(window) = over {
                    self.extract_expression(window, scope, query);
                }
            }
            ExprKind::Grouped(items) | ExprKind::Array(items) => {
                for item in items {
                    self.extract_expression(item, scope, query);
                }
            }
            ExprKind::Index {
                base,
                lower,
                upper,
                slice: _,
            } => {
                self.extract_expression(base, scope, query);
                if let Some(lower) = lower {
                    self.extract_expression(lower, scope, query);
                }
                if let Some(upper) = upper {
                    self.extract_expression(upper, scope, query);
                }
            }
            ExprKind::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                if let Some(operand) = operand {
                    self.extract_expression(operand, scope, query);
                }
                for (condition, result) in when_clauses {
                    self.extract_expression(condition, scope, query);
                    self.extract_expression(result, scope, query);
                }
                if let Some(else_clause) = else_clause {
                    self.extract_expression(else_clause, scope, query);
                }
            }
            ExprKind::Window {
                partition_by,
                order_by,
            } => {
                for expr in partition_by {
                    self.extract_expression(expr, scope, query);
                }
                for expr in order_by {
                    self.extract_expression(expr, scope, query);
                }
            }
            ExprKind::Sort {
                expr: operand,
                direction: _,
                nulls: _,
            } => self.extract_expression(operand, scope, query),
            ExprKind::Fetch { count } => {
                if let Some(count) = count {
                    self.extract_expression(count, scope, query);
                }
            }
            ExprKind::Typed { value, kind: _ } => self.extract_expression(value, scope, query),
            ExprKind::Select(core) => self.extract_select(core, scope, query),
            ExprKind::SetOp {
                left,
                right,
                op: _,
                all: _,
            } => {
                self.extract_expression(left, scope, query);
                self.extract_expression(right, scope, query);
            }
            ExprKind::Values(rows) => {
                for row in rows {
                    for value in row {
                        self.extract_expression(value, scope, query);
                    }
                }
            }
            ExprKind::Error(token) => {
                self.errors.push(Error::ErrorNode(token.clone()));
            }
        }
    }

    /// Records a column reference, resolving its qualifier through the
    /// scope. Unqualified references are attributed only when the scope has
    /// exactly one candidate table; star references carry no column fact.
    fn record_column(&mut self, parts: &[IdentPart], clause: Clause, scope: &Scope<'_>, query: Uuid) {
        match parts {
            [column] => {
                if column.name == "*" {
                    return;
                }
                let Some(table) = scope.sole_table().cloned() else {
                    return;
                };
                self.push_column(table, column.name.clone(), clause, query);
            }
            [qualifier, column] => {
                if column.name == "*" {
                    return;
                }
                let table = scope
                    .resolve(&qualifier.name)
                    .cloned()
                    .unwrap_or_else(|| Table::new(None, qualifier.name.clone()));
                self.push_column(table, column.name.clone(), clause, query);
            }
            [schema, qualifier, column] => {
                if column.name == "*" {
                    return;
                }
                // The middle part resolves the same way a two-part
                // qualifier does.
                let table = match scope.resolve(&qualifier.name) {
                    Some(resolved) => resolved.clone(),
                    None => Table::new(Some(schema.name.clone()), qualifier.name.clone()),
                };
                self.push_column(table, column.name.clone(), clause, query);
            }
            _ => {}
        }
    }

    fn push_column(&mut self, table: Table, column: String, clause: Clause, query: Uuid) {
        let fact = ColumnInQuery {
            table,
            column,
            clause,
            query,
        };
        self.columns_in_queries.insert(fact.id(), fact);
    }

    fn record_table(&mut self, table: Table, query: Uuid) {
        self.tables.insert(table.id(), table.clone());
        let fact = TableInQuery { table, query };
        self.tables_in_queries.insert(fact.id(), fact);
    }
}

/// The table a dotted identifier names: `users` or `app.users`. Longer
/// paths are column references, not tables.
fn table_from_identifier(expr: &Expression) -> Option<Table> {
    let ExprKind::Identifier(parts) = &expr.kind else {
        return None;
    };
    match parts.as_slice() {
        [name] => Some(Table::new(None, name.name.clone())),
        [schema, name] => Some(Table::new(Some(schema.name.clone()), name.name.clone())),
        _ => None,
    }
}

/// The leftmost concrete table under a FROM item, used as the join edge's
/// left identity.
fn primary_table(item: &FromItem) -> Option<Table> {
    match item {
        FromItem::Table { name, .. } => table_from_identifier(name),
        FromItem::Join { left, .. } => primary_table(left),
        FromItem::Subquery { .. } => None,
    }
}
