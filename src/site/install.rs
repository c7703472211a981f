//! The baseline installer — canonical "first boot" initialization.
//!
//! Given site metadata and admin credentials, writes the default options,
//! creates the default content objects, and creates exactly one administrator
//! account. Run against freshly reconciled (empty) tables this produces the
//! pristine state a brand-new installation would have.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::info;

use crate::site::{options, users};

/// Inputs for a baseline install.
#[derive(Debug, Clone)]
pub struct InstallParams<'a> {
    pub site_title: &'a str,
    pub admin_email: &'a str,
    pub public: bool,
    pub admin_login: &'a str,
    /// Plaintext; hashed on the way in. The caller is responsible for
    /// surfacing it to the operator exactly once.
    pub admin_password: &'a str,
}

/// Perform the baseline install. Returns the administrator's user id.
pub fn install_baseline(conn: &Connection, prefix: &str, params: &InstallParams) -> Result<i64> {
    write_default_options(conn, prefix, params).context("failed to write default options")?;

    let admin_id = users::insert_user(
        conn,
        prefix,
        &users::NewUser {
            login: params.admin_login.to_string(),
            email: params.admin_email.to_string(),
            display_name: params.admin_login.to_string(),
            ..Default::default()
        },
        params.admin_password,
    )
    .context("failed to create administrator account")?;
    users::add_user_meta(conn, prefix, admin_id, "role", "administrator")?;

    create_default_content(conn, prefix, admin_id)
        .context("failed to create default content")?;

    info!(admin_login = params.admin_login, admin_id, "baseline install complete");
    Ok(admin_id)
}

fn write_default_options(conn: &Connection, prefix: &str, params: &InstallParams) -> Result<()> {
    let defaults: &[(&str, String)] = &[
        ("blogname", params.site_title.to_string()),
        ("blogdescription", String::new()),
        ("admin_email", params.admin_email.to_string()),
        ("blog_public", if params.public { "1" } else { "0" }.to_string()),
        ("users_can_register", "0".to_string()),
        ("default_category", "1".to_string()),
        ("permalink_structure", "/%postname%/".to_string()),
        ("site_installed_at", chrono::Utc::now().to_rfc3339()),
    ];
    for (name, value) in defaults {
        options::set_option(conn, prefix, name, value)?;
    }
    Ok(())
}

/// The default content of a fresh site: one category, one post with one
/// comment, and one page.
fn create_default_content(conn: &Connection, prefix: &str, admin_id: i64) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(
        &format!("INSERT INTO \"{prefix}terms\" (name, slug, taxonomy) VALUES (?1, ?2, 'category')"),
        params!["Uncategorized", "uncategorized"],
    )?;

    conn.execute(
        &format!(
            "INSERT INTO \"{prefix}posts\" \
             (post_author, post_date, post_content, post_title, post_status, post_name, post_type, guid) \
             VALUES (?1, ?2, ?3, ?4, 'publish', ?5, 'post', ?6)"
        ),
        params![
            admin_id,
            now,
            "Welcome to your new site. Edit or delete this post, then start writing!",
            "Hello world!",
            "hello-world",
            "/?p=1",
        ],
    )?;
    let post_id = conn.last_insert_rowid();

    conn.execute(
        &format!(
            "INSERT INTO \"{prefix}comments\" \
             (comment_post_ID, comment_author, comment_author_email, comment_date, comment_content, comment_approved) \
             VALUES (?1, ?2, ?3, ?4, ?5, '1')"
        ),
        params![
            post_id,
            "A Commenter",
            "commenter@example.com",
            now,
            "Hi, this is a comment. To get started moderating comments, log in and visit the dashboard.",
        ],
    )?;

    conn.execute(
        &format!(
            "INSERT INTO \"{prefix}posts\" \
             (post_author, post_date, post_content, post_title, post_status, post_name, post_type, guid) \
             VALUES (?1, ?2, ?3, ?4, 'publish', ?5, 'page', ?6)"
        ),
        params![
            admin_id,
            now,
            "This is an example page. Edit it to tell visitors about yourself.",
            "Sample Page",
            "sample-page",
            "/?page_id=2",
        ],
    )?;

    Ok(())
}
