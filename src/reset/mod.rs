//! The reset orchestrator.
//!
//! [`execute`] is the single entry point: snapshot optional state, destroy the
//! installation's tables, reinstall the baseline schema and content, replay
//! the snapshot, optionally purge the uploads tree, refresh derived runtime
//! state, and report the outcome. The procedure is linear and irreversible;
//! the caller is responsible for operator confirmation before invoking it.
//!
//! Failure policy per step: capturing metadata, snapshotting, replaying users,
//! purging uploads, and refreshing caches/routes are best-effort (logged,
//! never raised). Dropping tables, reconciling the schema, and the baseline
//! install are fatal — a failure there leaves the installation unusable and
//! surfaces as a hard error with no partial outcome.

pub mod purge;
pub mod snapshot;
pub mod types;

pub use types::{
    ResetError, ResetMode, ResetOutcome, ResetRequest, SiteContext, UserSnapshot,
    RESERVED_ADMIN_LOGIN,
};

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::db;
use crate::site::{install, options, password, users};

const ADMIN_PASSWORD_LEN: usize = 16;
/// Throwaway plaintext used when re-creating a snapshotted account; the row is
/// overwritten with the original hash immediately afterwards.
const THROWAWAY_PASSWORD_LEN: usize = 20;

/// Run the reset. See the module docs for the step-by-step failure policy.
///
/// The table-drop step is intentionally not wrapped in a transaction,
/// matching the procedure's accepted-risk posture: an interruption partway
/// leaves a half-dropped store.
pub fn execute(
    conn: &Connection,
    ctx: &SiteContext,
    request: &ResetRequest,
) -> Result<ResetOutcome, ResetError> {
    if !ctx.authorized {
        return Err(ResetError::Unauthorized);
    }
    if ctx.multisite {
        return Err(ResetError::MultisiteUnsupported);
    }

    let prefix = ctx.table_prefix.as_str();
    info!(
        keep_users = request.keep_users,
        delete_uploads = request.delete_uploads,
        prefix,
        "starting site reset"
    );

    // Step 1: capture pre-reset metadata, falling back to the configured
    // defaults. Missing or unreadable values never abort the run.
    let site_title = read_option_or(conn, prefix, "blogname", &ctx.fallback_title);
    let admin_email = read_option_or(conn, prefix, "admin_email", &ctx.fallback_admin_email);
    let public = match options::get_option(conn, prefix, "blog_public") {
        Ok(Some(v)) => v != "0",
        Ok(None) => ctx.fallback_public,
        Err(e) => {
            warn!(error = %e, "failed to read blog_public, using fallback");
            ctx.fallback_public
        }
    };

    // Step 2: snapshot users, conditionally.
    let snapshot = if request.keep_users {
        match snapshot::snapshot_users(conn, prefix) {
            Ok(users) => {
                info!(count = users.len(), "captured user snapshot");
                users
            }
            Err(e) => {
                warn!(error = %e, "user snapshot failed, continuing without");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    // Step 3: destroy persistent storage. Fatal on failure.
    let dropped = db::drop_prefixed_tables(conn, prefix)?;
    info!(dropped, "dropped installation tables");

    // Step 4: recreate the baseline schema. Fatal on failure.
    db::schema::reconcile_schema(conn, prefix)?;

    // Step 5: baseline install with a fresh admin credential. Fatal on
    // failure. This is the only point where the plaintext exists; it is
    // handed to the caller exactly once via the outcome.
    let admin_password = password::generate_password(ADMIN_PASSWORD_LEN);
    install::install_baseline(
        conn,
        prefix,
        &install::InstallParams {
            site_title: &site_title,
            admin_email: &admin_email,
            public,
            admin_login: RESERVED_ADMIN_LOGIN,
            admin_password: &admin_password,
        },
    )
    .map_err(|e| ResetError::Install(e.into()))?;

    let mut outcome = ResetOutcome {
        mode: if request.keep_users {
            ResetMode::KeepUsers
        } else {
            ResetMode::FreshUsers
        },
        new_admin_login: Some(RESERVED_ADMIN_LOGIN.to_string()),
        new_admin_password: Some(admin_password),
        uploads_purged: false,
    };

    // Step 6: replay the snapshot, conditionally.
    if !snapshot.is_empty() {
        replay_snapshot(conn, prefix, &snapshot);
    }

    // Step 7: purge uploads, conditionally. Best-effort per entry.
    if request.delete_uploads {
        if ctx.uploads_dir.is_dir() {
            let report = purge::purge_contents(&ctx.uploads_dir);
            info!(
                removed = report.removed.len(),
                failed = report.failed.len(),
                skipped = report.skipped.len(),
                root = %ctx.uploads_dir.display(),
                "purged uploads directory"
            );
            outcome.uploads_purged = true;
        } else {
            warn!(root = %ctx.uploads_dir.display(), "uploads root missing, skipping purge");
        }
    }

    // Step 8: refresh derived runtime state. Fire-and-forget.
    if let Err(e) = flush_object_cache(conn, prefix) {
        warn!(error = %e, "failed to flush object cache");
    }
    if let Err(e) = options::regenerate_rewrite_rules(conn, prefix) {
        warn!(error = %e, "failed to regenerate rewrite rules");
    }

    info!(mode = %outcome.mode, "site reset complete");
    Ok(outcome)
}

/// Read an option, swallowing both absence and errors into the fallback.
fn read_option_or(conn: &Connection, prefix: &str, name: &str, fallback: &str) -> String {
    match options::get_option(conn, prefix, name) {
        Ok(Some(v)) if !v.is_empty() => v,
        Ok(_) => fallback.to_string(),
        Err(e) => {
            warn!(option = name, error = %e, "failed to read option, using fallback");
            fallback.to_string()
        }
    }
}

/// Re-create snapshotted accounts on top of the fresh install.
///
/// Skips the reserved admin login and any login that already exists
/// (defensive dedupe — should not normally trigger right after install). Each
/// account is created with a throwaway password and then has its original
/// hash written back verbatim, so the pre-reset credential keeps working
/// without the plaintext ever being known.
fn replay_snapshot(conn: &Connection, prefix: &str, snapshot: &[UserSnapshot]) {
    let mut restored = 0usize;

    for user in snapshot {
        if user.login == RESERVED_ADMIN_LOGIN {
            debug!(login = %user.login, "skipping reserved admin login");
            continue;
        }
        match users::username_exists(conn, prefix, &user.login) {
            Ok(true) => {
                warn!(login = %user.login, "login already exists after install, skipping");
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(login = %user.login, error = %e, "existence check failed, skipping");
                continue;
            }
        }

        let throwaway = password::generate_password(THROWAWAY_PASSWORD_LEN);
        let new_id = match users::insert_user(
            conn,
            prefix,
            &users::NewUser {
                login: user.login.clone(),
                email: user.email.clone(),
                nicename: user.nicename.clone(),
                display_name: user.display_name.clone(),
                url: user.url.clone(),
                registered: user.registered.clone(),
            },
            &throwaway,
        ) {
            Ok(id) => id,
            Err(e) => {
                warn!(login = %user.login, error = %e, "failed to re-create account, skipping");
                continue;
            }
        };

        if let Err(e) = users::overwrite_password_hash(conn, prefix, new_id, &user.password_hash) {
            warn!(login = %user.login, error = %e, "failed to restore password hash");
        }

        restore_meta(conn, prefix, new_id, user);
        restored += 1;
    }

    info!(restored, total = snapshot.len(), "replayed user snapshot");
}

/// Restore an account's meta: for each distinct key (first-seen order), clear
/// whatever account creation auto-added under it, then re-insert every
/// snapshotted value so multiplicity is preserved.
fn restore_meta(conn: &Connection, prefix: &str, user_id: i64, user: &UserSnapshot) {
    let mut distinct_keys: Vec<&str> = Vec::new();
    for (key, _) in &user.meta {
        if !distinct_keys.contains(&key.as_str()) {
            distinct_keys.push(key);
        }
    }

    for key in distinct_keys {
        if let Err(e) = users::delete_user_meta_key(conn, prefix, user_id, key) {
            warn!(login = %user.login, key, error = %e, "failed to clear meta key");
            continue;
        }
        for (k, value) in &user.meta {
            if k == key {
                if let Err(e) = users::add_user_meta(conn, prefix, user_id, key, value) {
                    warn!(login = %user.login, key, error = %e, "failed to restore meta value");
                }
            }
        }
    }
}

/// Drop every entry from the installation's object cache table.
fn flush_object_cache(conn: &Connection, prefix: &str) -> rusqlite::Result<()> {
    conn.execute(&format!("DELETE FROM \"{prefix}cache\""), [])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ctx() -> SiteContext {
        SiteContext {
            table_prefix: "wp_".into(),
            uploads_dir: std::path::PathBuf::from("/nonexistent"),
            multisite: false,
            authorized: true,
            fallback_title: "My WordPress Site".into(),
            fallback_admin_email: "admin@example.com".into(),
            fallback_public: true,
        }
    }

    #[test]
    fn refuses_unauthorized_invocations() {
        let conn = crate::db::open_memory_database("wp_").unwrap();
        let mut ctx = test_ctx();
        ctx.authorized = false;

        let err = execute(&conn, &ctx, &ResetRequest::default()).unwrap_err();
        assert!(matches!(err, ResetError::Unauthorized));
    }

    #[test]
    fn refuses_multisite_stores() {
        let conn = crate::db::open_memory_database("wp_").unwrap();
        let mut ctx = test_ctx();
        ctx.multisite = true;

        let err = execute(&conn, &ctx, &ResetRequest::default()).unwrap_err();
        assert!(matches!(err, ResetError::MultisiteUnsupported));
    }

    #[test]
    fn preserves_site_metadata_across_reset() {
        let conn = crate::db::open_memory_database("wp_").unwrap();
        options::set_option(&conn, "wp_", "blogname", "Existing Blog").unwrap();
        options::set_option(&conn, "wp_", "blog_public", "0").unwrap();

        execute(&conn, &test_ctx(), &ResetRequest::default()).unwrap();

        assert_eq!(
            options::get_option(&conn, "wp_", "blogname").unwrap().as_deref(),
            Some("Existing Blog")
        );
        assert_eq!(
            options::get_option(&conn, "wp_", "blog_public").unwrap().as_deref(),
            Some("0")
        );
    }

    #[test]
    fn falls_back_to_default_metadata_on_empty_store() {
        let conn = crate::db::open_memory_database("wp_").unwrap();
        execute(&conn, &test_ctx(), &ResetRequest::default()).unwrap();
        assert_eq!(
            options::get_option(&conn, "wp_", "blogname").unwrap().as_deref(),
            Some("My WordPress Site")
        );
        assert_eq!(
            options::get_option(&conn, "wp_", "admin_email").unwrap().as_deref(),
            Some("admin@example.com")
        );
    }

    #[test]
    fn reset_flushes_object_cache_and_rebuilds_rewrite_rules() {
        let conn = crate::db::open_memory_database("wp_").unwrap();
        conn.execute(
            "INSERT INTO wp_cache (cache_key, cache_value) VALUES ('k', 'v')",
            [],
        )
        .unwrap();

        execute(&conn, &test_ctx(), &ResetRequest::default()).unwrap();

        let cached: i64 = conn
            .query_row("SELECT count(*) FROM wp_cache", [], |r| r.get(0))
            .unwrap();
        assert_eq!(cached, 0);
        assert!(options::get_option(&conn, "wp_", "rewrite_rules")
            .unwrap()
            .is_some());
    }
}
