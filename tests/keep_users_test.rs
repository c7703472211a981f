mod helpers;

use helpers::{meta_values, seed_meta, seed_user, stored_hash, test_ctx, test_db, user_count};
use sitewipe::reset::{execute, ResetMode, ResetRequest};

fn keep_users() -> ResetRequest {
    ResetRequest { keep_users: true, delete_uploads: false }
}

#[test]
fn keep_users_restores_accounts_with_original_hashes() {
    let conn = test_db();
    seed_user(&conn, "alice", "alice@example.com", "$P$alicehash");
    seed_user(&conn, "bob", "bob@example.com", "$2y$10$bobhash");

    let tmp = tempfile::tempdir().unwrap();
    let outcome = execute(&conn, &test_ctx(tmp.path()), &keep_users()).unwrap();

    assert_eq!(outcome.mode, ResetMode::KeepUsers);
    assert_eq!(outcome.new_admin_login.as_deref(), Some("admin"));
    assert!(outcome.new_admin_password.is_some());

    // admin (generated) + alice + bob
    assert_eq!(user_count(&conn), 3);

    // The stored hashes survive byte-for-byte, whatever scheme produced them.
    assert_eq!(stored_hash(&conn, "alice"), "$P$alicehash");
    assert_eq!(stored_hash(&conn, "bob"), "$2y$10$bobhash");

    let email: String = conn
        .query_row(
            "SELECT user_email FROM wp_users WHERE user_login = 'alice'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(email, "alice@example.com");
}

#[test]
fn meta_multiplicity_is_preserved_exactly() {
    let conn = test_db();
    let alice = seed_user(&conn, "alice", "alice@example.com", "$P$alicehash");
    seed_meta(&conn, alice, "bookmark", "one");
    seed_meta(&conn, alice, "bookmark", "two");
    seed_meta(&conn, alice, "bookmark", "three");
    seed_meta(&conn, alice, "role", "editor");

    let tmp = tempfile::tempdir().unwrap();
    execute(&conn, &test_ctx(tmp.path()), &keep_users()).unwrap();

    // Exactly the three snapshotted values, in order, with nothing extra
    // under the key.
    assert_eq!(meta_values(&conn, "alice", "bookmark"), vec!["one", "two", "three"]);
    assert_eq!(meta_values(&conn, "alice", "role"), vec!["editor"]);
}

#[test]
fn pre_existing_admin_login_is_never_restored() {
    let conn = test_db();
    let old_admin = seed_user(&conn, "admin", "old-admin@example.com", "$P$oldadminhash");
    seed_meta(&conn, old_admin, "role", "administrator");
    seed_user(&conn, "alice", "alice@example.com", "$P$alicehash");

    let tmp = tempfile::tempdir().unwrap();
    let outcome = execute(&conn, &test_ctx(tmp.path()), &keep_users()).unwrap();

    assert_eq!(outcome.mode, ResetMode::KeepUsers);
    // Generated admin + restored alice. The old admin row is gone.
    assert_eq!(user_count(&conn), 2);

    // The reserved login belongs to the freshly generated account, not the
    // snapshot: its hash is new.
    let admin_hash = stored_hash(&conn, "admin");
    assert_ne!(admin_hash, "$P$oldadminhash");
    assert!(admin_hash.starts_with("$argon2"));

    // Its email comes from the preserved site metadata path, not the old row.
    let admin_email: String = conn
        .query_row(
            "SELECT user_email FROM wp_users WHERE user_login = 'admin'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(admin_email, "admin@example.com");
}

#[test]
fn keep_users_with_empty_store_still_reports_keep_mode() {
    let conn = test_db();
    let tmp = tempfile::tempdir().unwrap();

    let outcome = execute(&conn, &test_ctx(tmp.path()), &keep_users()).unwrap();

    assert_eq!(outcome.mode, ResetMode::KeepUsers);
    assert_eq!(user_count(&conn), 1);
}
