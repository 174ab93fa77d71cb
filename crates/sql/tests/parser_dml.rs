//! INSERT, UPDATE, and DELETE parsing.

mod common;

use common::{parse, unmasked};

#[test]
fn insert_values_with_columns() {
    assert_eq!(
        unmasked("insert into users (name, active) values ('x', true);"),
        "(INSERT INTO users (name, active) VALUES ('x', TRUE));"
    );
}

#[test]
fn insert_multi_row_values() {
    assert_eq!(
        unmasked("insert into t values (1, 'a'), (2, 'b');"),
        "(INSERT INTO t VALUES (1, 'a'), (2, 'b'));"
    );
}

#[test]
fn insert_from_select() {
    assert_eq!(
        unmasked("insert into archive select * from events where old = true;"),
        "(INSERT INTO archive (SELECT * FROM events WHERE (old = TRUE)));"
    );
}

#[test]
fn insert_default_values() {
    assert_eq!(
        unmasked("insert into audit default values;"),
        "(INSERT INTO audit DEFAULT VALUES);"
    );
}

#[test]
fn insert_on_conflict_do_nothing() {
    assert_eq!(
        unmasked("insert into t (a) values (1) on conflict do nothing;"),
        "(INSERT INTO t (a) VALUES (1) ON CONFLICT DO NOTHING);"
    );
}

#[test]
fn insert_on_conflict_do_update() {
    assert_eq!(
        unmasked("insert into t (a, b) values (1, 2) on conflict (a) do update set b = 3;"),
        "(INSERT INTO t (a, b) VALUES (1, 2) ON CONFLICT (a) DO UPDATE SET b = 3);"
    );
}

#[test]
fn insert_returning() {
    assert_eq!(
        unmasked("insert into users (name) values ('x') returning id;"),
        "(INSERT INTO users (name) VALUES ('x') RETURNING id);"
    );
}

#[test]
fn insert_default_in_values_row_is_not_masked() {
    assert_eq!(
        common::masked("insert into t (a, b) values (default, 2);"),
        "(INSERT INTO t (a, b) VALUES (DEFAULT, $1));"
    );
}

#[test]
fn update_set_list() {
    assert_eq!(
        unmasked("update users set name = 'x', active = false where id = 1;"),
        "(UPDATE users SET name = 'x', active = FALSE WHERE (id = 1));"
    );
}

#[test]
fn update_preserves_assignment_order() {
    assert_eq!(
        unmasked("update users set b = 2, a = 1;"),
        "(UPDATE users SET b = 2, a = 1);"
    );
}

#[test]
fn update_with_from_and_returning() {
    assert_eq!(
        unmasked(
            "update orders set total = t.sum from totals t where orders.id = t.order_id returning orders.id;"
        ),
        "(UPDATE orders SET total = t.sum FROM totals AS t WHERE (orders.id = t.order_id) RETURNING orders.id);"
    );
}

#[test]
fn update_expression_values() {
    assert_eq!(
        unmasked("update counters set n = n + 1 where id = 3;"),
        "(UPDATE counters SET n = (n + 1) WHERE (id = 3));"
    );
}

#[test]
fn duplicate_set_column_is_an_error_but_parses() {
    let (program, errors) = parse("update t set a = 1, a = 2;");
    assert_eq!(program.len(), 1);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("set multiple times"));
}

#[test]
fn delete_with_where() {
    assert_eq!(
        unmasked("delete from sessions where expires_at < now();"),
        "(DELETE FROM sessions WHERE (expires_at < now()));"
    );
}

#[test]
fn delete_using() {
    assert_eq!(
        unmasked("delete from sessions using users where sessions.user_id = users.id;"),
        "(DELETE FROM sessions USING users WHERE (sessions.user_id = users.id));"
    );
}

#[test]
fn delete_returning() {
    assert_eq!(
        unmasked("delete from jobs where done = true returning id;"),
        "(DELETE FROM jobs WHERE (done = TRUE) RETURNING id);"
    );
}
