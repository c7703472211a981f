//! Canonical schema for a single-site installation.
//!
//! Every table name carries the installation's configured prefix. The schema is
//! expressed declaratively (table name + column declarations) so that
//! [`reconcile_schema`] can compare the declared shape against what actually
//! exists and close the gap: missing tables are created, missing columns are
//! added. Existing columns are never dropped or retyped.

use rusqlite::Connection;
use tracing::{debug, info};

/// One column of a declared table: name plus its full SQL declaration.
pub struct ColumnDef {
    pub name: &'static str,
    pub decl: &'static str,
}

/// A declared table shape, without its prefix.
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

macro_rules! col {
    ($name:literal, $decl:literal) => {
        ColumnDef { name: $name, decl: $decl }
    };
}

/// The canonical tables of a fresh installation.
pub const TABLES: &[TableDef] = &[
    TableDef {
        name: "users",
        columns: &[
            col!("ID", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col!("user_login", "TEXT NOT NULL UNIQUE"),
            col!("user_pass", "TEXT NOT NULL"),
            col!("user_nicename", "TEXT NOT NULL DEFAULT ''"),
            col!("user_email", "TEXT NOT NULL DEFAULT ''"),
            col!("user_url", "TEXT NOT NULL DEFAULT ''"),
            col!("user_registered", "TEXT NOT NULL DEFAULT ''"),
            col!("display_name", "TEXT NOT NULL DEFAULT ''"),
        ],
    },
    TableDef {
        name: "usermeta",
        columns: &[
            col!("umeta_id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col!("user_id", "INTEGER NOT NULL"),
            col!("meta_key", "TEXT NOT NULL"),
            col!("meta_value", "TEXT"),
        ],
    },
    TableDef {
        name: "options",
        columns: &[
            col!("option_id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col!("option_name", "TEXT NOT NULL UNIQUE"),
            col!("option_value", "TEXT NOT NULL"),
            col!("autoload", "TEXT NOT NULL DEFAULT 'yes'"),
        ],
    },
    TableDef {
        name: "posts",
        columns: &[
            col!("ID", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col!("post_author", "INTEGER NOT NULL DEFAULT 0"),
            col!("post_date", "TEXT NOT NULL DEFAULT ''"),
            col!("post_content", "TEXT NOT NULL DEFAULT ''"),
            col!("post_title", "TEXT NOT NULL DEFAULT ''"),
            col!("post_status", "TEXT NOT NULL DEFAULT 'publish'"),
            col!("post_name", "TEXT NOT NULL DEFAULT ''"),
            col!("post_type", "TEXT NOT NULL DEFAULT 'post'"),
            col!("guid", "TEXT NOT NULL DEFAULT ''"),
        ],
    },
    TableDef {
        name: "comments",
        columns: &[
            col!("comment_ID", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col!("comment_post_ID", "INTEGER NOT NULL DEFAULT 0"),
            col!("comment_author", "TEXT NOT NULL DEFAULT ''"),
            col!("comment_author_email", "TEXT NOT NULL DEFAULT ''"),
            col!("comment_date", "TEXT NOT NULL DEFAULT ''"),
            col!("comment_content", "TEXT NOT NULL DEFAULT ''"),
            col!("comment_approved", "TEXT NOT NULL DEFAULT '1'"),
        ],
    },
    TableDef {
        name: "terms",
        columns: &[
            col!("term_id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col!("name", "TEXT NOT NULL"),
            col!("slug", "TEXT NOT NULL"),
            col!("taxonomy", "TEXT NOT NULL DEFAULT 'category'"),
        ],
    },
    TableDef {
        name: "cache",
        columns: &[
            col!("cache_key", "TEXT PRIMARY KEY"),
            col!("cache_value", "TEXT NOT NULL"),
            col!("expires", "TEXT"),
        ],
    },
];

/// Secondary indexes, created after the tables. `{p}` is the table prefix.
const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS \"idx_{p}usermeta_user\" ON \"{p}usermeta\"(user_id)",
    "CREATE INDEX IF NOT EXISTS \"idx_{p}usermeta_key\" ON \"{p}usermeta\"(meta_key)",
    "CREATE INDEX IF NOT EXISTS \"idx_{p}posts_type\" ON \"{p}posts\"(post_type)",
    "CREATE INDEX IF NOT EXISTS \"idx_{p}comments_post\" ON \"{p}comments\"(comment_post_ID)",
];

/// Reconcile the live database against the declared schema: create any missing
/// table, add any missing column to an existing table. Idempotent — a database
/// that already matches is left untouched, and no data-destroying change is
/// ever issued.
pub fn reconcile_schema(conn: &Connection, prefix: &str) -> rusqlite::Result<()> {
    for table in TABLES {
        let full_name = format!("{prefix}{}", table.name);

        if !table_exists(conn, &full_name)? {
            let columns: Vec<String> = table
                .columns
                .iter()
                .map(|c| format!("{} {}", c.name, c.decl))
                .collect();
            let sql = format!(
                "CREATE TABLE \"{full_name}\" ({})",
                columns.join(", ")
            );
            conn.execute(&sql, [])?;
            info!(table = %full_name, "created table");
            continue;
        }

        // Table exists: add any declared column that is absent.
        let existing = existing_columns(conn, &full_name)?;
        for column in table.columns {
            if !existing.iter().any(|c| c == column.name) {
                let sql = format!(
                    "ALTER TABLE \"{full_name}\" ADD COLUMN {} {}",
                    column.name, column.decl
                );
                conn.execute(&sql, [])?;
                info!(table = %full_name, column = column.name, "added missing column");
            }
        }
    }

    for sql in INDEXES {
        conn.execute(&sql.replace("{p}", prefix), [])?;
    }

    debug!(prefix, "schema reconciled");
    Ok(())
}

/// Whether a table with this exact name exists.
pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Column names of an existing table, in declaration order.
fn existing_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{table}\")"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}
