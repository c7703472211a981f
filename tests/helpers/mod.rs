#![allow(dead_code)]

use rusqlite::{params, Connection};
use sitewipe::db;
use sitewipe::reset::SiteContext;
use std::path::Path;

pub const PREFIX: &str = "wp_";

/// Open a fresh in-memory installation database with the schema reconciled.
pub fn test_db() -> Connection {
    db::open_memory_database(PREFIX).unwrap()
}

/// An authorized, single-site context pointing at the given uploads root.
pub fn test_ctx(uploads: &Path) -> SiteContext {
    SiteContext {
        table_prefix: PREFIX.into(),
        uploads_dir: uploads.to_path_buf(),
        multisite: false,
        authorized: true,
        fallback_title: "My WordPress Site".into(),
        fallback_admin_email: "admin@example.com".into(),
        fallback_public: true,
    }
}

/// Insert an account row directly, with an arbitrary opaque password hash.
/// Bypasses the normal insert path so tests can assert the hash is carried
/// byte-for-byte through a reset.
pub fn seed_user(conn: &Connection, login: &str, email: &str, hash: &str) -> i64 {
    conn.execute(
        "INSERT INTO wp_users \
         (user_login, user_pass, user_nicename, user_email, user_url, user_registered, display_name) \
         VALUES (?1, ?2, ?1, ?3, '', '2023-01-01T00:00:00+00:00', ?1)",
        params![login, hash, email],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn seed_meta(conn: &Connection, user_id: i64, key: &str, value: &str) {
    conn.execute(
        "INSERT INTO wp_usermeta (user_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
        params![user_id, key, value],
    )
    .unwrap();
}

pub fn user_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT count(*) FROM wp_users", [], |r| r.get(0))
        .unwrap()
}

pub fn stored_hash(conn: &Connection, login: &str) -> String {
    conn.query_row(
        "SELECT user_pass FROM wp_users WHERE user_login = ?1",
        [login],
        |r| r.get(0),
    )
    .unwrap()
}

pub fn meta_values(conn: &Connection, login: &str, key: &str) -> Vec<String> {
    conn.prepare(
        "SELECT m.meta_value FROM wp_usermeta m \
         JOIN wp_users u ON u.ID = m.user_id \
         WHERE u.user_login = ?1 AND m.meta_key = ?2 ORDER BY m.umeta_id",
    )
    .unwrap()
    .query_map([login, key], |r| r.get(0))
    .unwrap()
    .collect::<Result<Vec<_>, _>>()
    .unwrap()
}
