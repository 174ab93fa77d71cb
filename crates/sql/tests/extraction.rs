//! Fact extraction: tables, joins, and per-clause column references with
//! alias resolution across nested scopes.

mod common;

use common::extract;
use lantern_sql::ast::{Clause, JoinType};
use lantern_sql::Table;

fn table_names(extractor: &lantern_sql::Extractor) -> Vec<String> {
    let mut names: Vec<String> = extractor
        .tables
        .values()
        .map(|table| table.qualified())
        .collect();
    names.sort();
    names
}

fn columns(extractor: &lantern_sql::Extractor) -> Vec<(String, String, Clause)> {
    let mut facts: Vec<(String, String, Clause)> = extractor
        .columns_in_queries
        .values()
        .map(|fact| (fact.table.qualified(), fact.column.clone(), fact.clause))
        .collect();
    facts.sort();
    facts
}

#[test]
fn unqualified_table_defaults_to_public_schema() {
    let facts = extract("select * from users;");
    assert_eq!(
        facts.tables.values().collect::<Vec<_>>(),
        vec![&Table::new(None, "users")]
    );
    assert_eq!(facts.tables.values().next().unwrap().schema, "public");
}

#[test]
fn schema_qualified_table_keeps_its_schema() {
    let facts = extract("select * from app.users;");
    assert_eq!(table_names(&facts), vec!["app.users"]);
}

#[test]
fn alias_resolves_to_canonical_table() {
    let facts = extract("select u.id from users u;");
    let select_columns: Vec<_> = facts
        .columns_in_queries
        .values()
        .filter(|fact| fact.clause == Clause::Select)
        .collect();
    assert_eq!(select_columns.len(), 1);
    assert_eq!(select_columns[0].table.qualified(), "public.users");
    assert_eq!(select_columns[0].column, "id");
}

#[test]
fn join_produces_one_edge_with_condition_text() {
    let facts =
        extract("select c.id from customers c join addresses a on c.id = a.customer_id;");
    assert_eq!(table_names(&facts), vec!["public.addresses", "public.customers"]);
    assert_eq!(facts.tables_in_queries.len(), 2);

    let joins: Vec<_> = facts.table_joins.values().collect();
    assert_eq!(joins.len(), 1);
    assert_eq!(joins[0].table_a.qualified(), "public.customers");
    assert_eq!(joins[0].table_b.qualified(), "public.addresses");
    assert_eq!(joins[0].join_type, JoinType::Inner);
    assert_eq!(joins[0].condition, "(c.id = a.customer_id)");

    let select_columns: Vec<_> = facts
        .columns_in_queries
        .values()
        .filter(|fact| fact.clause == Clause::Select)
        .collect();
    assert_eq!(select_columns.len(), 1);
    assert_eq!(select_columns[0].table.qualified(), "public.customers");
    assert_eq!(select_columns[0].column, "id");
}

#[test]
fn join_condition_columns_are_tagged_join() {
    let facts =
        extract("select c.id from customers c join addresses a on c.id = a.customer_id;");
    let join_columns: Vec<_> = columns(&facts)
        .into_iter()
        .filter(|(_, _, clause)| *clause == Clause::Join)
        .collect();
    assert_eq!(
        join_columns,
        vec![
            ("public.addresses".into(), "customer_id".into(), Clause::Join),
            ("public.customers".into(), "id".into(), Clause::Join),
        ]
    );
}

#[test]
fn chained_join_edges_link_leftmost_table() {
    let facts = extract(
        "select * from a join b on a.id = b.a_id join c on b.id = c.b_id;",
    );
    let joins: Vec<_> = facts.table_joins.values().collect();
    assert_eq!(joins.len(), 2);
    assert!(joins
        .iter()
        .any(|j| j.table_a.name == "a" && j.table_b.name == "b"));
    assert!(joins
        .iter()
        .any(|j| j.table_a.name == "a" && j.table_b.name == "c"));
}

#[test]
fn clause_tags_cover_where_group_having_order() {
    let facts = extract(
        "select dept from emp where salary > 10 group by dept having count(dept) > 5 order by dept;",
    );
    let facts = columns(&facts);
    assert!(facts.contains(&("public.emp".into(), "dept".into(), Clause::Select)));
    assert!(facts.contains(&("public.emp".into(), "salary".into(), Clause::Where)));
    assert!(facts.contains(&("public.emp".into(), "dept".into(), Clause::GroupBy)));
    assert!(facts.contains(&("public.emp".into(), "dept".into(), Clause::OrderBy)));
    // count(dept) inside HAVING is a call argument by clause.
    assert!(
        facts.contains(&("public.emp".into(), "dept".into(), Clause::Having))
            || facts.contains(&("public.emp".into(), "dept".into(), Clause::CallArg))
    );
}

#[test]
fn duplicate_references_collapse_to_one_fact() {
    let facts = extract("select u.id from users u where u.id = u.id;");
    let all = columns(&facts);
    let where_facts: Vec<_> = all
        .iter()
        .filter(|(_, _, clause)| *clause == Clause::Where)
        .collect();
    assert_eq!(where_facts.len(), 1);
}

#[test]
fn correlated_subquery_scopes_are_isolated() {
    let facts = extract("select u.id from users u where u.id in (select u.id from uploads u);");
    let all = columns(&facts);
    // The inner `u` rebinds to uploads; the outer stays users.
    assert!(all.contains(&("public.users".into(), "id".into(), Clause::Select)));
    assert!(all.contains(&("public.uploads".into(), "id".into(), Clause::Select)));
    assert!(all.contains(&("public.users".into(), "id".into(), Clause::Where)));
    assert!(!all.contains(&("public.uploads".into(), "id".into(), Clause::Where)));
}

#[test]
fn outer_alias_is_visible_to_correlated_subquery() {
    let facts = extract(
        "select * from users u where exists (select 1 from orders o where o.user_id = u.id);",
    );
    let all = columns(&facts);
    assert!(all.contains(&("public.orders".into(), "user_id".into(), Clause::Where)));
    assert!(all.contains(&("public.users".into(), "id".into(), Clause::Where)));
}

#[test]
fn unqualified_column_attributes_to_sole_table() {
    let facts = extract("select name from users where active = true;");
    let all = columns(&facts);
    assert!(all.contains(&("public.users".into(), "name".into(), Clause::Select)));
    assert!(all.contains(&("public.users".into(), "active".into(), Clause::Where)));
}

#[test]
fn unqualified_column_with_two_tables_is_not_guessed() {
    let facts = extract("select name from users, teams;");
    assert!(columns(&facts).is_empty());
    assert_eq!(table_names(&facts), vec!["public.teams", "public.users"]);
}

#[test]
fn three_part_identifier_resolves_middle_part() {
    let facts = extract("select app.u.id from app.users u;");
    let all = columns(&facts);
    assert!(all.contains(&("app.users".into(), "id".into(), Clause::Select)));
}

#[test]
fn insert_facts() {
    let facts = extract("insert into users (name, email) values ('a', 'b');");
    assert_eq!(table_names(&facts), vec!["public.users"]);
    let all = columns(&facts);
    assert!(all.contains(&("public.users".into(), "name".into(), Clause::Columns)));
    assert!(all.contains(&("public.users".into(), "email".into(), Clause::Columns)));
}

#[test]
fn update_facts() {
    let facts = extract("update users set name = 'x' where id = 1;");
    assert_eq!(table_names(&facts), vec!["public.users"]);
    let all = columns(&facts);
    assert!(all.contains(&("public.users".into(), "name".into(), Clause::Set)));
    assert!(all.contains(&("public.users".into(), "id".into(), Clause::Where)));
}

#[test]
fn delete_using_facts() {
    let facts = extract("delete from sessions using users where sessions.user_id = users.id;");
    assert_eq!(table_names(&facts), vec!["public.sessions", "public.users"]);
}

#[test]
fn ddl_tables_are_recorded() {
    let facts = extract("drop table if exists listing;");
    assert_eq!(table_names(&facts), vec!["public.listing"]);

    let facts = extract("create table t2 (like t1 including all);");
    assert_eq!(table_names(&facts), vec!["public.t1", "public.t2"]);

    let facts = extract("create index idx on events (user_id);");
    assert_eq!(table_names(&facts), vec!["public.events"]);
}

#[test]
fn star_references_carry_no_column_fact() {
    let facts = extract("select *, u.* from users u;");
    assert!(columns(&facts).is_empty());
}

#[test]
fn tables_in_queries_share_the_statement_fingerprint() {
    let facts = extract("select c.id from customers c join addresses a on c.id = a.customer_id;");
    let queries: std::collections::BTreeSet<_> = facts
        .tables_in_queries
        .values()
        .map(|fact| fact.query)
        .collect();
    assert_eq!(queries.len(), 1, "one statement, one query id");
}
