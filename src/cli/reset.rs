//! CLI `reset` command — run the full reset after typed confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use crate::config::SitewipeConfig;
use crate::db;
use crate::reset::{self, ResetMode, ResetRequest, SiteContext};

/// Collect operator confirmation, then run the reset and render the outcome.
pub fn reset(config: &SitewipeConfig, keep_users: bool, delete_uploads: bool) -> Result<()> {
    let db_path = config.resolved_db_path();
    if !db_path.exists() {
        bail!("no installation database at {}", db_path.display());
    }

    println!("WARNING: This will reset the site to a fresh install.");
    println!("  - All content (posts, pages, terms, comments) will be deleted.");
    println!("  - All options and settings will be reset to fresh-install defaults.");
    if keep_users {
        println!("  - Existing users will be preserved and re-created after the reset.");
    } else {
        println!("  - All existing users will be removed; a new administrator will be created.");
    }
    if delete_uploads {
        println!(
            "  - All files under {} will be permanently deleted.",
            config.resolved_uploads_dir().display()
        );
    }
    println!("Database: {}", db_path.display());
    println!("\nThis action cannot be undone. Make a full backup before continuing.");
    print!("\nType RESET to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "RESET" {
        bail!("reset cancelled");
    }

    let conn = db::open_database(&db_path, &config.storage.table_prefix)?;
    let multisite = db::is_multisite(&conn, &config.storage.table_prefix)?;

    // Confirmation collected above is the authorization this context asserts.
    let ctx = SiteContext::from_config(config, true, multisite);
    let request = ResetRequest { keep_users, delete_uploads };

    let outcome = reset::execute(&conn, &ctx, &request)?;

    println!("\nThe site has been reset to a fresh install.");
    match outcome.mode {
        ResetMode::FreshUsers => {
            println!("All previous users have been removed.");
        }
        ResetMode::KeepUsers => {
            println!("Existing users were preserved and re-created. You may need to log in again.");
        }
    }
    if let (Some(login), Some(password)) =
        (&outcome.new_admin_login, &outcome.new_admin_password)
    {
        println!("\nA new administrator account has been created:");
        println!("  Username: {login}");
        println!("  Password: {password}");
        println!("Write this down now — it will not be shown again.");
    }
    if outcome.uploads_purged {
        println!("\nAll files in the uploads directory were deleted.");
    }

    Ok(())
}
