//! SELECT parsing: clauses, joins, subqueries, windows, set operators.

mod common;

use common::unmasked;

#[test]
fn select_star_with_where() {
    assert_eq!(
        unmasked("select * from users where id = 42;"),
        "(SELECT * FROM users WHERE (id = 42));"
    );
}

#[test]
fn select_list_aliases() {
    assert_eq!(
        unmasked("select id, name full_name, email as contact from users;"),
        "(SELECT id, name AS full_name, email AS contact FROM users);"
    );
}

#[test]
fn select_distinct() {
    assert_eq!(
        unmasked("select distinct dept from emp;"),
        "(SELECT DISTINCT dept FROM emp);"
    );
}

#[test]
fn select_distinct_on() {
    assert_eq!(
        unmasked("select distinct on (dept) dept, salary from emp;"),
        "(SELECT DISTINCT ON (dept) dept, salary FROM emp);"
    );
}

#[test]
fn join_with_on_condition() {
    assert_eq!(
        unmasked("select c.id from customers c join addresses a on c.id = a.customer_id;"),
        "(SELECT c.id FROM customers AS c JOIN addresses AS a ON (c.id = a.customer_id));"
    );
}

#[test]
fn left_outer_join_normalizes() {
    assert_eq!(
        unmasked("select * from a left outer join b on a.id = b.a_id;"),
        "(SELECT * FROM a LEFT JOIN b ON (a.id = b.a_id));"
    );
}

#[test]
fn cross_join_has_no_predicate() {
    assert_eq!(
        unmasked("select * from a cross join b;"),
        "(SELECT * FROM a CROSS JOIN b);"
    );
}

#[test]
fn chained_joins_nest_left() {
    assert_eq!(
        unmasked(
            "select * from a join b on a.id = b.a_id join c on b.id = c.b_id;"
        ),
        "(SELECT * FROM a JOIN b ON (a.id = b.a_id) JOIN c ON (b.id = c.b_id));"
    );
}

#[test]
fn group_by_having_order_limit_offset() {
    assert_eq!(
        unmasked(
            "select dept, count(*) from emp group by dept having count(*) > 5 \
             order by dept desc nulls last limit 10 offset 20;"
        ),
        "(SELECT dept, count(*) FROM emp GROUP BY dept HAVING (count(*) > 5) \
         ORDER BY dept DESC NULLS LAST LIMIT 10 OFFSET 20);"
    );
}

#[test]
fn fetch_first_rows_only() {
    assert_eq!(
        unmasked("select * from t order by id fetch first 10 rows only;"),
        "(SELECT * FROM t ORDER BY id FETCH FIRST 10 ROWS ONLY);"
    );
}

#[test]
fn row_locking_clause() {
    assert_eq!(
        unmasked("select * from jobs for update skip locked;"),
        "(SELECT * FROM jobs FOR UPDATE SKIP LOCKED);"
    );
    assert_eq!(
        unmasked("select * from jobs for no key update nowait;"),
        "(SELECT * FROM jobs FOR NO KEY UPDATE NOWAIT);"
    );
}

#[test]
fn scalar_subquery_in_where() {
    assert_eq!(
        unmasked("select * from users u where exists (select 1 from orders o where o.user_id = u.id);"),
        "(SELECT * FROM users AS u WHERE EXISTS (SELECT 1 FROM orders AS o WHERE (o.user_id = u.id)));"
    );
}

#[test]
fn in_subquery() {
    assert_eq!(
        unmasked("select * from users where id in (select user_id from admins);"),
        "(SELECT * FROM users WHERE (id IN (SELECT user_id FROM admins)));"
    );
}

#[test]
fn derived_table_with_alias() {
    assert_eq!(
        unmasked("select t.n from (select count(*) n from x) t;"),
        "(SELECT t.n FROM (SELECT count(*) AS n FROM x) AS t);"
    );
}

#[test]
fn union_of_selects() {
    assert_eq!(
        unmasked("select a from t1 union select b from t2;"),
        "(SELECT a FROM t1) UNION (SELECT b FROM t2);"
    );
}

#[test]
fn chained_set_operators() {
    assert_eq!(
        unmasked("select a from t union all select b from u except select c from v;"),
        "(SELECT a FROM t) UNION ALL (SELECT b FROM u) EXCEPT (SELECT c FROM v);"
    );
}

#[test]
fn window_over_partition() {
    assert_eq!(
        unmasked("select rank() over (partition by dept order by salary desc) from emp;"),
        "(SELECT rank() OVER (PARTITION BY dept ORDER BY salary DESC) FROM emp);"
    );
}

#[test]
fn count_distinct_argument() {
    assert_eq!(
        unmasked("select count(distinct user_id) from events;"),
        "(SELECT count(DISTINCT user_id) FROM events);"
    );
}

#[test]
fn case_expression() {
    assert_eq!(
        unmasked("select case when status = 1 then 'a' else 'b' end from orders;"),
        "(SELECT CASE WHEN (status = 1) THEN 'a' ELSE 'b' END FROM orders);"
    );
}

#[test]
fn simple_case_with_operand() {
    assert_eq!(
        unmasked("select case status when 1 then 'a' end from orders;"),
        "(SELECT CASE status WHEN 1 THEN 'a' END FROM orders);"
    );
}

#[test]
fn at_time_zone_folds_only_when_followed_by_time_zone() {
    assert_eq!(
        unmasked("select created_at at time zone 'UTC' from events;"),
        "(SELECT (created_at AT TIME ZONE 'UTC') FROM events);"
    );
    // A column literally named `at` still parses as an identifier.
    assert_eq!(unmasked("select at from t;"), "(SELECT at FROM t);");
}

#[test]
fn json_operators_bind_tighter_than_comparison() {
    assert_eq!(
        unmasked("select payload -> 'id' from events where payload ->> 'type' = 'click';"),
        "(SELECT (payload -> 'id') FROM events WHERE ((payload ->> 'type') = 'click'));"
    );
}

#[test]
fn array_literal_and_overlap() {
    assert_eq!(
        unmasked("select * from posts where tags && array['a', 'b'];"),
        "(SELECT * FROM posts WHERE (tags && ARRAY['a', 'b']));"
    );
}

#[test]
fn array_index_and_slice() {
    assert_eq!(
        unmasked("select items[1], items[1:2] from carts;"),
        "(SELECT items[1], items[1:2] FROM carts);"
    );
}

#[test]
fn between_and_not_between() {
    assert_eq!(
        unmasked("select * from t where a between 1 and 10 and b not between 2 and 3;"),
        "(SELECT * FROM t WHERE ((a BETWEEN 1 AND 10) AND (b NOT BETWEEN 2 AND 3)));"
    );
}

#[test]
fn like_variants() {
    assert_eq!(
        unmasked("select * from t where a like 'x%' and b not ilike '%y' and c similar to 'z';"),
        "(SELECT * FROM t WHERE (((a LIKE 'x%') AND (b NOT ILIKE '%y')) AND (c SIMILAR TO 'z')));"
    );
}

#[test]
fn regex_match_operators() {
    assert_eq!(
        unmasked("select * from t where name ~* 'abc' and slug !~ 'xyz';"),
        "(SELECT * FROM t WHERE ((name ~* 'abc') AND (slug !~ 'xyz')));"
    );
}

#[test]
fn is_null_is_not_masked_material() {
    assert_eq!(
        unmasked("select * from t where deleted_at is not null;"),
        "(SELECT * FROM t WHERE (deleted_at IS NOT NULL));"
    );
}

#[test]
fn casts_render_uppercase_types() {
    assert_eq!(
        unmasked("select id::text, cast(total as numeric(10, 2)) from orders;"),
        "(SELECT id::TEXT, total::NUMERIC(10, 2) FROM orders);"
    );
}

#[test]
fn typed_literals() {
    assert_eq!(
        unmasked("select timestamp '2020-01-01', now() - interval '1 day';"),
        "(SELECT TIMESTAMP '2020-01-01', (now() - INTERVAL '1 day'));"
    );
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(
        unmasked("select 1 + 2 * 3 ^ 2 from t;"),
        "(SELECT (1 + (2 * (3 ^ 2))) FROM t);"
    );
}

#[test]
fn and_binds_tighter_than_or() {
    assert_eq!(
        unmasked("select * from t where a = 1 or b = 2 and c = 3;"),
        "(SELECT * FROM t WHERE ((a = 1) OR ((b = 2) AND (c = 3))));"
    );
}

#[test]
fn quoted_identifiers_keep_their_quotes() {
    assert_eq!(
        unmasked("select \"user\".\"id\" from \"user\";"),
        "(SELECT \"user\".\"id\" FROM \"user\");"
    );
}

#[test]
fn schema_qualified_table_and_star() {
    assert_eq!(
        unmasked("select u.* from app.users u;"),
        "(SELECT u.* FROM app.users AS u);"
    );
}

#[test]
fn positional_params_render_verbatim_unmasked() {
    assert_eq!(
        unmasked("select * from users where id = $1;"),
        "(SELECT * FROM users WHERE (id = $1));"
    );
}

#[test]
fn bare_values_statement() {
    assert_eq!(
        unmasked("values (1, 'a'), (2, 'b');"),
        "VALUES (1, 'a'), (2, 'b');"
    );
}

#[test]
fn comments_are_skipped() {
    assert_eq!(
        unmasked("select /* cols */ id from users -- trailing\n;"),
        "(SELECT id FROM users);"
    );
}
