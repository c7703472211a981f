pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the installation database at the given path, with the
/// canonical schema reconciled for the given table prefix.
pub fn open_database(path: impl AsRef<Path>, prefix: &str) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // Enable WAL mode for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Enable foreign keys
    conn.pragma_update(None, "foreign_keys", "ON")?;

    schema::reconcile_schema(&conn, prefix).context("failed to reconcile schema")?;

    tracing::info!(path = %path.display(), prefix, "database opened");
    Ok(conn)
}

/// Open an in-memory database with the schema reconciled, for testing.
pub fn open_memory_database(prefix: &str) -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::reconcile_schema(&conn, prefix).context("failed to reconcile schema")?;
    Ok(conn)
}

/// All tables whose names start with the installation prefix.
///
/// The prefix is matched literally: `_` and `%` inside it are escaped so a
/// prefix of `wp_` does not also capture `wpx` tables.
pub fn list_prefixed_tables(conn: &Connection, prefix: &str) -> rusqlite::Result<Vec<String>> {
    let pattern = format!("{}%", escape_like(prefix));
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE ?1 ESCAPE '\\' ORDER BY name",
    )?;
    let tables = stmt
        .query_map([pattern], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tables)
}

/// Drop every table belonging to the installation prefix.
///
/// Destructive and deliberately not wrapped in a transaction: an interruption
/// partway leaves the store half-dropped, which is an accepted limitation of
/// the reset procedure.
pub fn drop_prefixed_tables(conn: &Connection, prefix: &str) -> rusqlite::Result<usize> {
    let tables = list_prefixed_tables(conn, prefix)?;
    for table in &tables {
        conn.execute(&format!("DROP TABLE IF EXISTS \"{table}\""), [])?;
        tracing::debug!(table = %table, "dropped table");
    }
    Ok(tables.len())
}

/// Whether the store looks like a multi-site (network) installation.
///
/// A network install carries a `{prefix}blogs` registry table; the reset
/// procedure is defined only for a single logical site and must refuse to run
/// against one of these.
pub fn is_multisite(conn: &Connection, prefix: &str) -> rusqlite::Result<bool> {
    schema::table_exists(conn, &format!("{prefix}blogs"))
}

/// Escape `%`, `_`, and `\` for use inside a LIKE pattern with `ESCAPE '\'`.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
