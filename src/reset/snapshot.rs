//! Capture existing accounts (with their full meta) into memory before the
//! destructive steps run.

use rusqlite::Connection;

use crate::reset::types::UserSnapshot;
use crate::site::users;

/// Snapshot every account in the store, including all meta entries in
/// insertion order. The result lives only for the duration of one reset.
pub fn snapshot_users(conn: &Connection, prefix: &str) -> rusqlite::Result<Vec<UserSnapshot>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT ID, user_login, user_email, user_nicename, display_name, user_url, \
                user_registered, user_pass \
         FROM \"{prefix}users\" ORDER BY ID"
    ))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                UserSnapshot {
                    login: row.get(1)?,
                    email: row.get(2)?,
                    nicename: row.get(3)?,
                    display_name: row.get(4)?,
                    url: row.get(5)?,
                    registered: row.get(6)?,
                    password_hash: row.get(7)?,
                    meta: Vec::new(),
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut snapshots = Vec::with_capacity(rows.len());
    for (id, mut snapshot) in rows {
        snapshot.meta = users::get_user_meta(conn, prefix, id)?;
        snapshots.push(snapshot);
    }

    Ok(snapshots)
}
