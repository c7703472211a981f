//! Row-level account operations against the users and usermeta tables.

use anyhow::Result;
use rusqlite::{params, Connection};

use crate::site::password;

/// Fields for creating an account. The password is passed separately so it is
/// obvious at the call site that it is plaintext and will be hashed.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub login: String,
    pub email: String,
    /// URL-safe account slug. Falls back to `login` when empty.
    pub nicename: String,
    pub display_name: String,
    pub url: String,
    /// RFC 3339 registration timestamp. Falls back to "now" when empty.
    pub registered: String,
}

/// Create an account, hashing the given plaintext password. Returns the new
/// user's row id.
pub fn insert_user(
    conn: &Connection,
    prefix: &str,
    user: &NewUser,
    plaintext_password: &str,
) -> Result<i64> {
    let hash = password::hash_password(plaintext_password)?;
    let nicename = if user.nicename.is_empty() {
        user.login.as_str()
    } else {
        user.nicename.as_str()
    };
    let registered = if user.registered.is_empty() {
        chrono::Utc::now().to_rfc3339()
    } else {
        user.registered.clone()
    };

    conn.execute(
        &format!(
            "INSERT INTO \"{prefix}users\" \
             (user_login, user_pass, user_nicename, user_email, user_url, user_registered, display_name) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ),
        params![
            user.login,
            hash,
            nicename,
            user.email,
            user.url,
            registered,
            user.display_name,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Whether an account with this login exists.
pub fn username_exists(conn: &Connection, prefix: &str, login: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        &format!("SELECT count(*) FROM \"{prefix}users\" WHERE user_login = ?1"),
        [login],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Write a stored password hash verbatim into an account row.
///
/// This deliberately bypasses hashing: the value is copied byte-for-byte, so a
/// hash captured from a pre-reset account keeps working without the plaintext
/// ever being known. It is the only way a credential gets into the store
/// without going through [`password::hash_password`]; never use it with
/// plaintext.
pub fn overwrite_password_hash(
    conn: &Connection,
    prefix: &str,
    user_id: i64,
    stored_hash: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        &format!("UPDATE \"{prefix}users\" SET user_pass = ?1 WHERE ID = ?2"),
        params![stored_hash, user_id],
    )?;
    Ok(())
}

/// All meta entries for an account, in insertion order. A key may appear more
/// than once: multiplicity is part of the data model.
pub fn get_user_meta(
    conn: &Connection,
    prefix: &str,
    user_id: i64,
) -> rusqlite::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT meta_key, meta_value FROM \"{prefix}usermeta\" \
         WHERE user_id = ?1 ORDER BY umeta_id"
    ))?;
    let meta = stmt
        .query_map([user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(meta)
}

/// Delete every meta entry under one key for an account.
pub fn delete_user_meta_key(
    conn: &Connection,
    prefix: &str,
    user_id: i64,
    key: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        &format!("DELETE FROM \"{prefix}usermeta\" WHERE user_id = ?1 AND meta_key = ?2"),
        params![user_id, key],
    )
}

/// Append one meta value under a key. Existing values under the same key are
/// kept; call [`delete_user_meta_key`] first for replace semantics.
pub fn add_user_meta(
    conn: &Connection,
    prefix: &str,
    user_id: i64,
    key: &str,
    value: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO \"{prefix}usermeta\" (user_id, meta_key, meta_value) VALUES (?1, ?2, ?3)"
        ),
        params![user_id, key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_db() -> Connection {
        db::open_memory_database("wp_").unwrap()
    }

    fn alice() -> NewUser {
        NewUser {
            login: "alice".into(),
            email: "alice@example.com".into(),
            display_name: "Alice".into(),
            ..Default::default()
        }
    }

    #[test]
    fn insert_user_hashes_password_and_defaults_nicename() {
        let conn = test_db();
        let id = insert_user(&conn, "wp_", &alice(), "s3cret").unwrap();
        assert!(id > 0);

        let (nicename, hash): (String, String) = conn
            .query_row(
                "SELECT user_nicename, user_pass FROM wp_users WHERE ID = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(nicename, "alice");
        assert!(hash.starts_with("$argon2"));
        assert!(password::verify_password("s3cret", &hash).unwrap());
    }

    #[test]
    fn username_exists_reflects_inserts() {
        let conn = test_db();
        assert!(!username_exists(&conn, "wp_", "alice").unwrap());
        insert_user(&conn, "wp_", &alice(), "pw").unwrap();
        assert!(username_exists(&conn, "wp_", "alice").unwrap());
    }

    #[test]
    fn duplicate_login_is_rejected() {
        let conn = test_db();
        insert_user(&conn, "wp_", &alice(), "pw").unwrap();
        assert!(insert_user(&conn, "wp_", &alice(), "pw").is_err());
    }

    #[test]
    fn overwrite_password_hash_is_verbatim() {
        let conn = test_db();
        let id = insert_user(&conn, "wp_", &alice(), "pw").unwrap();

        // An opaque foreign hash (e.g. phpass from an older install) must be
        // stored untouched.
        let foreign = "$P$Bl9yVdYCWM6hjDRIsv2tZ0LvYC7dWG/";
        overwrite_password_hash(&conn, "wp_", id, foreign).unwrap();

        let stored: String = conn
            .query_row("SELECT user_pass FROM wp_users WHERE ID = ?1", [id], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, foreign);
    }

    #[test]
    fn meta_preserves_multiplicity_and_order() {
        let conn = test_db();
        let id = insert_user(&conn, "wp_", &alice(), "pw").unwrap();

        add_user_meta(&conn, "wp_", id, "bookmark", "one").unwrap();
        add_user_meta(&conn, "wp_", id, "bookmark", "two").unwrap();
        add_user_meta(&conn, "wp_", id, "role", "editor").unwrap();
        add_user_meta(&conn, "wp_", id, "bookmark", "three").unwrap();

        let meta = get_user_meta(&conn, "wp_", id).unwrap();
        let bookmarks: Vec<&str> = meta
            .iter()
            .filter(|(k, _)| k == "bookmark")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(bookmarks, vec!["one", "two", "three"]);

        delete_user_meta_key(&conn, "wp_", id, "bookmark").unwrap();
        let meta = get_user_meta(&conn, "wp_", id).unwrap();
        assert_eq!(meta, vec![("role".to_string(), "editor".to_string())]);
    }
}
