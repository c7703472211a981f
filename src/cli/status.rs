//! CLI `status` command — print an installation report.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::config::SitewipeConfig;
use crate::db;
use crate::site::options;

#[derive(Debug, Serialize)]
struct StatusReport {
    db_path: String,
    db_bytes: u64,
    table_prefix: String,
    tables: usize,
    multisite: bool,
    site_title: Option<String>,
    users: i64,
    posts: i64,
    uploads_dir: String,
    upload_files: u64,
    upload_bytes: u64,
}

/// Gather and print an installation report, as text or JSON.
pub fn status(config: &SitewipeConfig, json: bool) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Check [storage] db_path in the config, or SITEWIPE_DB.");
        return Ok(());
    }

    let db_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);
    let prefix = config.storage.table_prefix.as_str();

    let conn = db::open_database(&db_path, prefix)
        .context("failed to open database (may be corrupt)")?;

    let tables = db::list_prefixed_tables(&conn, prefix)?.len();
    let multisite = db::is_multisite(&conn, prefix)?;
    let site_title = options::get_option(&conn, prefix, "blogname")?;
    let users: i64 = conn.query_row(
        &format!("SELECT count(*) FROM \"{prefix}users\""),
        [],
        |r| r.get(0),
    )?;
    let posts: i64 = conn.query_row(
        &format!("SELECT count(*) FROM \"{prefix}posts\""),
        [],
        |r| r.get(0),
    )?;

    let uploads_dir = config.resolved_uploads_dir();
    let (upload_files, upload_bytes) = tree_size(&uploads_dir);

    let report = StatusReport {
        db_path: db_path.display().to_string(),
        db_bytes,
        table_prefix: prefix.to_string(),
        tables,
        multisite,
        site_title,
        users,
        posts,
        uploads_dir: uploads_dir.display().to_string(),
        upload_files,
        upload_bytes,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Sitewipe Status");
    println!("===============");
    println!();
    println!("Database:      {}", report.db_path);
    println!("File size:     {}", format_bytes(report.db_bytes));
    println!("Table prefix:  {}", report.table_prefix);
    println!("Tables:        {}", report.tables);
    if report.multisite {
        println!("Topology:      MULTI-SITE (reset will refuse to run)");
    } else {
        println!("Topology:      single site");
    }
    println!();
    println!("Site title:    {}", report.site_title.as_deref().unwrap_or("(not set)"));
    println!("Users:         {}", report.users);
    println!("Posts:         {}", report.posts);
    println!();
    println!("Uploads:       {}", report.uploads_dir);
    println!(
        "               {} files, {}",
        report.upload_files,
        format_bytes(report.upload_bytes)
    );

    Ok(())
}

/// File count and total byte size of a directory tree. Missing or unreadable
/// entries count as zero; this is informational only.
fn tree_size(root: &Path) -> (u64, u64) {
    let mut files = 0u64;
    let mut bytes = 0u64;
    let Ok(entries) = std::fs::read_dir(root) else {
        return (0, 0);
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else { continue };
        if file_type.is_dir() {
            let (f, b) = tree_size(&entry.path());
            files += f;
            bytes += b;
        } else if file_type.is_file() {
            files += 1;
            bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    (files, bytes)
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
