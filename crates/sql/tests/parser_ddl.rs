//! CREATE and DROP parsing.

mod common;

use common::unmasked;

#[test]
fn create_table_with_columns_and_options() {
    assert_eq!(
        unmasked(
            "create table if not exists products (id bigint primary key, \
             name text not null, price numeric(10, 2) default 0, \
             vendor_id bigint references vendors (id), tags text[]);"
        ),
        "(CREATE TABLE IF NOT EXISTS products (id BIGINT PRIMARY KEY, \
         name TEXT NOT NULL, price NUMERIC(10, 2) DEFAULT 0, \
         vendor_id BIGINT REFERENCES vendors (id), tags TEXT[]));"
    );
}

#[test]
fn create_table_check_constraint() {
    assert_eq!(
        unmasked("create table items (price numeric check (price > 0));"),
        "(CREATE TABLE items (price NUMERIC CHECK (price > 0)));"
    );
}

#[test]
fn create_table_multi_word_types() {
    assert_eq!(
        unmasked("create table m (x double precision, ts timestamp with time zone);"),
        "(CREATE TABLE m (x DOUBLE PRECISION, ts TIMESTAMP WITH TIME ZONE));"
    );
}

#[test]
fn create_table_like_including() {
    assert_eq!(
        unmasked("create table t2 (like t1 including all excluding indexes);"),
        "(CREATE TABLE t2 (LIKE t1 INCLUDING ALL EXCLUDING INDEXES));"
    );
}

#[test]
fn create_unique_index() {
    assert_eq!(
        unmasked("create unique index idx_users_email on users (email);"),
        "(CREATE UNIQUE INDEX idx_users_email ON users (email));"
    );
}

#[test]
fn create_index_multi_column() {
    assert_eq!(
        unmasked("create index idx on events (user_id, created_at);"),
        "(CREATE INDEX idx ON events (user_id, created_at));"
    );
}

#[test]
fn drop_table_if_exists() {
    assert_eq!(
        unmasked("DROP TABLE IF EXISTS listing;"),
        "(DROP TABLE IF EXISTS listing);"
    );
}

#[test]
fn drop_multiple_tables() {
    assert_eq!(unmasked("drop table a, b;"), "(DROP TABLE a, b);");
}

#[test]
fn drop_index() {
    assert_eq!(
        unmasked("drop index if exists idx_old;"),
        "(DROP INDEX IF EXISTS idx_old);"
    );
}
