//! SQL schema for the Potluck SQLite store.
//!
//! Executed once at connection startup. The composite primary keys on
//! `votes` and `category_links` are what arbitrate concurrent writers.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT    NOT NULL UNIQUE,
    password_hash TEXT    NOT NULL,   -- argon2 PHC string
    is_admin      INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT    NOT NULL    -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS recipes (
    recipe_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id  INTEGER NOT NULL REFERENCES users(user_id),
    title      TEXT    NOT NULL,
    created_at TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL UNIQUE
);

-- One row per (voter, recipe). The score is never stored.
CREATE TABLE IF NOT EXISTS votes (
    voter_id  INTEGER NOT NULL REFERENCES users(user_id)     ON DELETE CASCADE,
    recipe_id INTEGER NOT NULL REFERENCES recipes(recipe_id) ON DELETE CASCADE,
    direction INTEGER NOT NULL CHECK (direction IN (-1, 1)),
    cast_at   TEXT    NOT NULL,
    PRIMARY KEY (voter_id, recipe_id)
);

CREATE TABLE IF NOT EXISTS category_links (
    category_id INTEGER NOT NULL REFERENCES categories(category_id) ON DELETE CASCADE,
    recipe_id   INTEGER NOT NULL REFERENCES recipes(recipe_id)      ON DELETE CASCADE,
    linked_at   TEXT    NOT NULL,
    PRIMARY KEY (category_id, recipe_id)
);

CREATE INDEX IF NOT EXISTS votes_recipe_idx ON votes(recipe_id);
CREATE INDEX IF NOT EXISTS links_recipe_idx ON category_links(recipe_id);

PRAGMA user_version = 1;
";
