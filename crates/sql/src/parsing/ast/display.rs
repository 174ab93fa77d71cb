//! The canonicalizing printer.
//!
//! `render(mask)` produces canonical SQL text for a subtree: keywords
//! upper-cased, comma lists re-joined with `", "`, binary and grouped
//! expressions parenthesized. With `mask` set, every literal is replaced by
//! `$<offset>` using the parameter offset assigned at parse time, so two
//! statements that differ only in literal values render to byte-identical
//! masked text — that masked text is the canonical fingerprint. Rendering
//! must stay stable and deterministic; any change here changes every
//! fingerprint downstream.

use super::common::{FromItem, LockClause, LockWait};
use super::ddl::{ColumnDef, ColumnOption, DdlStatement, LikeClause};
use super::dml::{
    ConflictAction, DistinctClause, DmlStatement, InsertSource, SelectCore,
};
use super::expressions::{ExprKind, Expression, PrefixOp};
use super::{
    SetScope, Statement, TransactionStatement, UtilityStatement, WithStatement,
};

fn join(expressions: &[Expression], mask: bool) -> String {
    expressions
        .iter()
        .map(|e| e.render(mask))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_aliased(items: &[(Expression, Option<String>)], mask: bool) -> String {
    items
        .iter()
        .map(|(expr, alias)| match alias {
            Some(alias) => format!("{} AS {}", expr.render(mask), alias),
            None => expr.render(mask),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_assignments(assignments: &[(Expression, Expression)], mask: bool) -> String {
    assignments
        .iter()
        .map(|(column, value)| format!("{} = {}", column.render(mask), value.render(mask)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_from(items: &[FromItem], mask: bool) -> String {
    items
        .iter()
        .map(|item| render_from_item(item, mask))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_from_item(item: &FromItem, mask: bool) -> String {
    match item {
        FromItem::Table { name, alias } => match alias {
            Some(alias) => format!("{} AS {}", name.render(mask), alias),
            None => name.render(mask),
        },
        FromItem::Subquery { query, alias } => match alias {
            Some(alias) => format!("{} AS {}", query.render(mask), alias),
            None => query.render(mask),
        },
        FromItem::Join {
            left,
            right,
            join,
            predicate,
        } => {
            let mut out = format!(
                "{} {} {}",
                render_from_item(left, mask),
                join,
                render_from_item(right, mask)
            );
            if let Some(predicate) = predicate {
                out.push_str(" ON ");
                out.push_str(&predicate.render(mask));
            }
            out
        }
    }
}

fn render_lock(lock: &LockClause, mask: bool) -> String {
    let mut out = format!("FOR {}", lock.mode);
    if !lock.tables.is_empty() {
        out.push_str(" OF ");
        out.push_str(&join(&lock.tables, mask));
    }
    match lock.wait {
        LockWait::Block => {}
        LockWait::Nowait => out.push_str(" NOWAIT"),
        LockWait::SkipLocked => out.push_str(" SKIP LOCKED"),
    }
    out
}

fn render_select_core(core: &SelectCore, mask: bool) -> String {
    let mut out = String::from("SELECT");
    match &core.distinct {
        Some(DistinctClause::All) => out.push_str(" DISTINCT"),
        Some(DistinctClause::On(exprs)) => {
            out.push_str(" DISTINCT ON (");
            out.push_str(&join(exprs, mask));
            out.push(')');
        }
        None => {}
    }
    if !core.select.is_empty() {
        out.push(' ');
        out.push_str(&join_aliased(&core.select, mask));
    }
    if !core.from.is_empty() {
        out.push_str(" FROM ");
        out.push_str(&join_from(&core.from, mask));
    }
    if let Some(filter) = &core.r#where {
        out.push_str(" WHERE ");
        out.push_str(&filter.render(mask));
    }
    if !core.group_by.is_empty() {
        out.push_str(" GROUP BY ");
        out.push_str(&join(&core.group_by, mask));
    }
    if let Some(having) = &core.having {
        out.push_str(" HAVING ");
        out.push_str(&having.render(mask));
    }
    if !core.order_by.is_empty() {
        out.push_str(" ORDER BY ");
        out.push_str(&join(&core.order_by, mask));
    }
    if let Some(limit) = &core.limit {
        out.push_str(" LIMIT ");
        out.push_str(&limit.render(mask));
    }
    if let Some(offset) = &core.offset {
        out.push_str(" OFFSET ");
        out.push_str(&offset.render(mask));
    }
    if let Some(fetch) = &core.fetch {
        out.push(' ');
        out.push_str(&fetch.render(mask));
    }
    if let Some(lock) = &core.lock {
        out.push(' ');
        out.push_str(&render_lock(lock, mask));
    }
    out
}

impl Expression {
    /// Renders this expression as canonical SQL text, masking literals to
    /// their `$<offset>` placeholders when `mask` is set. A trailing cast
    /// renders as `::TYPE` after the expression's own text.
    pub fn render(&self, mask: bool) -> String {
        let rendered = self.kind.render(mask);
        match &self.cast {
            Some(datatype) => format!("{}::{}", rendered, datatype),
            None => rendered,
        }
    }
}

impl ExprKind {
    fn render(&self, mask: bool) -> String {
        match self {
            ExprKind::All => "*".into(),
            ExprKind::Identifier(parts) => parts
                .iter()
                .map(|part| part.to_string())
                .collect::<Vec<_>>()
                .join("."),
            ExprKind::Literal { value, param } => {
                if mask {
                    format!("${}", param)
                } else {
                    value.to_string()
                }
            }
            ExprKind::Keyword(word) => word.clone(),
            ExprKind::Prefix { op, expr } => match op {
                PrefixOp::Minus | PrefixOp::Plus => format!("{}{}", op, expr.render(mask)),
                PrefixOp::Not | PrefixOp::Exists => format!("{} {}", op, expr.render(mask)),
            },
            ExprKind::Infix { op, left, right } => {
                format!("({} {} {})", left.render(mask), op, right.render(mask))
            }
            ExprKind::Between {
                expr,
                low,
                high,
                negated,
            } => format!(
                "({} {}BETWEEN {} AND {})",
                expr.render(mask),
                if *negated { "NOT " } else { "" },
                low.render(mask),
                high.render(mask)
            ),
            ExprKind::In {
                expr,
                list,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                // A sole subquery brings its own parentheses.
                if let [only] = list.as_slice() {
                    if matches!(only.kind, ExprKind::Select(_) | ExprKind::SetOp { .. }) {
                        return format!("({} {}IN {})", expr.render(mask), not, only.render(mask));
                    }
                }
                format!("({} {}IN ({}))", expr.render(mask), not, join(list, mask))
            }
            ExprKind::Call {
                name,
                quantifier,
                args,
                over,
            } => {
                let mut out = format!("{}(", name);
                if let Some(quantifier) = quantifier {
                    out.push_str(&quantifier.to_string());
                    out.push(' ');
                }
                out.push_str(&join(args, mask));
                out.push(')');
                if let Some(window) = over {
                    out.push_str(" OVER (");
                    out.push_str(&window.render(mask));
                    out.push(')');
                }
                out
            }
            ExprKind::Grouped(exprs) => format!("({})", join(exprs, mask)),
            ExprKind::Array(items) => format!("ARRAY[{}]", join(items, mask)),
            ExprKind::Index {
                base,
                lower,
                upper,
                slice,
            } => {
                let render_bound = |bound: &Option<Box<Expression>>| {
                    bound.as_ref().map(|e| e.render(mask)).unwrap_or_default()
                };
                if *slice {
                    format!(
                        "{}[{}:{}]",
                        base.render(mask),
                        render_bound(lower),
                        render_bound(upper)
                    )
                } else {
                    format!("{}[{}]", base.render(mask), render_bound(lower))
                }
            }
            ExprKind::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let mut out = String::from("CASE");
                if let Some(operand) = operand {
                    out.push(' ');
                    out.push_str(&operand.render(mask));
                }
                for (condition, result) in when_clauses {
                    out.push_str(" WHEN ");
                    out.push_str(&condition.render(mask));
                    out.push_str(" THEN ");
                    out.push_str(&result.render(mask));
                }
                if let Some(else_clause) = else_clause {
                    out.push_str(" ELSE ");
                    out.push_str(&else_clause.render(mask));
                }
                out.push_str(" END");
                out
            }
            ExprKind::Window {
                partition_by,
                order_by,
            } => {
                let mut parts = Vec::new();
                if !partition_by.is_empty() {
                    parts.push(format!("PARTITION BY {}", join(partition_by, mask)));
                }
                if !order_by.is_empty() {
                    parts.push(format!("ORDER BY {}", join(order_by, mask)));
                }
                parts.join(" ")
            }
            ExprKind::Sort {
                expr,
                direction,
                nulls,
            } => {
                let mut out = expr.render(mask);
                if let Some(direction) = direction {
                    out.push(' ');
                    out.push_str(&direction.to_string());
                }
                if let Some(nulls) = nulls {
                    out.push(' ');
                    out.push_str(&nulls.to_string());
                }
                out
            }
            ExprKind::Fetch { count } => match count {
                Some(count) => format!("FETCH FIRST {} ROWS ONLY", count.render(mask)),
                None => "FETCH FIRST ROW ONLY".into(),
            },
            ExprKind::Typed { kind, value } => format!("{} {}", kind, value.render(mask)),
            ExprKind::Select(core) => format!("({})", render_select_core(core, mask)),
            ExprKind::SetOp {
                left,
                op,
                all,
                right,
            } => format!(
                "{} {}{} {}",
                left.render(mask),
                op,
                if *all { " ALL" } else { "" },
                right.render(mask)
            ),
            ExprKind::Values(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| format!("({})", join(row, mask)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("VALUES {}", rows)
            }
            ExprKind::Error(_) => "?error?".into(),
        }
    }
}

fn render_column_def(column: &ColumnDef, mask: bool) -> String {
    let mut out = format!("{} {}", column.name, column.datatype);
    for option in &column.options {
        out.push(' ');
        out.push_str(&match option {
            ColumnOption::PrimaryKey => "PRIMARY KEY".into(),
            ColumnOption::NotNull => "NOT NULL".into(),
            ColumnOption::Null => "NULL".into(),
            ColumnOption::Unique => "UNIQUE".into(),
            ColumnOption::Default(expr) => format!("DEFAULT {}", expr.render(mask)),
            ColumnOption::References { table, column } => match column {
                Some(column) => format!("REFERENCES {} ({})", table.render(mask), column),
                None => format!("REFERENCES {}", table.render(mask)),
            },
            ColumnOption::Check(expr) => format!("CHECK {}", expr.render(mask)),
        });
    }
    out
}

fn render_like(like: &LikeClause, mask: bool) -> String {
    let mut out = format!("LIKE {}", like.source.render(mask));
    for option in &like.options {
        out.push_str(if option.including {
            " INCLUDING "
        } else {
            " EXCLUDING "
        });
        out.push_str(&option.property);
    }
    out
}

impl Statement {
    /// Renders the statement as one canonical line ending in `;`.
    pub fn render(&self, mask: bool) -> String {
        match self {
            // Select and bare expression statements carry their own
            // parentheses where they need them.
            Statement::Dml(DmlStatement::Select(expr)) => format!("{};", expr.render(mask)),
            Statement::Expression(expr) => format!("{};", expr.render(mask)),
            _ => format!("({});", self.render_inner(mask)),
        }
    }

    /// The statement body without the statement-level wrapping, used by
    /// `render` and for WITH bodies.
    pub(crate) fn render_inner(&self, mask: bool) -> String {
        match self {
            Statement::Ddl(ddl) => render_ddl(ddl, mask),
            Statement::Dml(dml) => render_dml(dml, mask),
            Statement::Transaction(txn) => render_transaction(txn),
            Statement::Utility(utility) => render_utility(utility, mask),
            Statement::With(with) => render_with(with, mask),
            Statement::Expression(expr) => expr.render(mask),
        }
    }
}

fn render_dml(dml: &DmlStatement, mask: bool) -> String {
    match dml {
        DmlStatement::Select(expr) => expr.render(mask),
        DmlStatement::Insert {
            table,
            columns,
            source,
            on_conflict,
            returning,
        } => {
            let mut out = format!("INSERT INTO {}", table.render(mask));
            if !columns.is_empty() {
                out.push_str(&format!(" ({})", join(columns, mask)));
            }
            out.push(' ');
            out.push_str(&match source {
                InsertSource::Values(values) => values.render(mask),
                InsertSource::Select(select) => select.render(mask),
                InsertSource::DefaultValues => "DEFAULT VALUES".into(),
            });
            if let Some(on_conflict) = on_conflict {
                out.push_str(" ON CONFLICT");
                if !on_conflict.target.is_empty() {
                    out.push_str(&format!(" ({})", join(&on_conflict.target, mask)));
                }
                match &on_conflict.action {
                    ConflictAction::DoNothing => out.push_str(" DO NOTHING"),
                    ConflictAction::DoUpdate(assignments) => {
                        out.push_str(" DO UPDATE SET ");
                        out.push_str(&join_assignments(assignments, mask));
                    }
                }
                if let Some(filter) = &on_conflict.r#where {
                    out.push_str(" WHERE ");
                    out.push_str(&filter.render(mask));
                }
            }
            if !returning.is_empty() {
                out.push_str(" RETURNING ");
                out.push_str(&join(returning, mask));
            }
            out
        }
        DmlStatement::Update {
            table,
            assignments,
            from,
            r#where,
            returning,
        } => {
            let mut out = format!(
                "UPDATE {} SET {}",
                table.render(mask),
                join_assignments(assignments, mask)
            );
            if !from.is_empty() {
                out.push_str(" FROM ");
                out.push_str(&join_from(from, mask));
            }
            if let Some(filter) = r#where {
                out.push_str(" WHERE ");
                out.push_str(&filter.render(mask));
            }
            if !returning.is_empty() {
                out.push_str(" RETURNING ");
                out.push_str(&join(returning, mask));
            }
            out
        }
        DmlStatement::Delete {
            table,
            using,
            r#where,
            returning,
        } => {
            let mut out = format!("DELETE FROM {}", table.render(mask));
            if !using.is_empty() {
                out.push_str(" USING ");
                out.push_str(&join_from(using, mask));
            }
            if let Some(filter) = r#where {
                out.push_str(" WHERE ");
                out.push_str(&filter.render(mask));
            }
            if !returning.is_empty() {
                out.push_str(" RETURNING ");
                out.push_str(&join(returning, mask));
            }
            out
        }
    }
}

fn render_ddl(ddl: &DdlStatement, mask: bool) -> String {
    match ddl {
        DdlStatement::CreateTable {
            name,
            if_not_exists,
            columns,
            like,
        } => {
            let mut out = String::from("CREATE TABLE ");
            if *if_not_exists {
                out.push_str("IF NOT EXISTS ");
            }
            out.push_str(&name.render(mask));
            let mut elements: Vec<String> = columns
                .iter()
                .map(|column| render_column_def(column, mask))
                .collect();
            if let Some(like) = like {
                elements.push(render_like(like, mask));
            }
            if !elements.is_empty() {
                out.push_str(&format!(" ({})", elements.join(", ")));
            }
            out
        }
        DdlStatement::CreateIndex {
            name,
            unique,
            table,
            columns,
        } => {
            format!(
                "CREATE {}INDEX {} ON {} ({})",
                if *unique { "UNIQUE " } else { "" },
                name,
                table.render(mask),
                join(columns, mask)
            )
        }
        DdlStatement::DropTable { names, if_exists } => {
            format!(
                "DROP TABLE {}{}",
                if *if_exists { "IF EXISTS " } else { "" },
                join(names, mask)
            )
        }
        DdlStatement::DropIndex { names, if_exists } => {
            format!(
                "DROP INDEX {}{}",
                if *if_exists { "IF EXISTS " } else { "" },
                names.join(", ")
            )
        }
    }
}

fn render_transaction(txn: &TransactionStatement) -> String {
    match txn {
        TransactionStatement::Begin => "BEGIN".into(),
        TransactionStatement::Commit => "COMMIT".into(),
        TransactionStatement::Rollback { savepoint: None } => "ROLLBACK".into(),
        TransactionStatement::Rollback {
            savepoint: Some(name),
        } => format!("ROLLBACK TO SAVEPOINT {}", name),
        TransactionStatement::Savepoint { name } => format!("SAVEPOINT {}", name),
    }
}

fn render_utility(utility: &UtilityStatement, mask: bool) -> String {
    match utility {
        UtilityStatement::Analyze { table, columns } => {
            let mut out = String::from("ANALYZE");
            if let Some(table) = table {
                out.push(' ');
                out.push_str(&table.render(mask));
                if !columns.is_empty() {
                    out.push_str(&format!(" ({})", join(columns, mask)));
                }
            }
            out
        }
        UtilityStatement::Set { scope, name, value } => {
            let mut out = String::from("SET ");
            match scope {
                Some(SetScope::Local) => out.push_str("LOCAL "),
                Some(SetScope::Session) => out.push_str("SESSION "),
                None => {}
            }
            out.push_str(name);
            out.push_str(" = ");
            match value {
                Some(value) => out.push_str(&value.render(mask)),
                None => out.push_str("DEFAULT"),
            }
            out
        }
        UtilityStatement::Show { name } => format!("SHOW {}", name),
    }
}

fn render_with(with: &WithStatement, mask: bool) -> String {
    let mut out = String::from("WITH ");
    if with.recursive {
        out.push_str("RECURSIVE ");
    }
    let ctes = with
        .ctes
        .iter()
        .map(|cte| {
            let columns = if cte.columns.is_empty() {
                String::new()
            } else {
                format!(" ({})", cte.columns.join(", "))
            };
            // The query is a select expression, which brings its own
            // parentheses after AS.
            format!("{}{} AS {}", cte.name, columns, cte.query.render(mask))
        })
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&ctes);
    out.push(' ');
    out.push_str(&with.body.render_inner(mask));
    out
}
