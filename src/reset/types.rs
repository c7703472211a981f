//! Types for the reset procedure: the request, the invocation-scoped user
//! snapshot, the outcome returned to the caller, and the fatal error taxonomy.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::SitewipeConfig;

/// The administrator login the baseline install always creates. Reserved: a
/// snapshotted account under this login is never replayed.
pub const RESERVED_ADMIN_LOGIN: &str = "admin";

/// One invocation's intent. Immutable once constructed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetRequest {
    /// Snapshot existing accounts before the wipe and re-create them after.
    pub keep_users: bool,
    /// Recursively delete the contents of the uploads root.
    pub delete_uploads: bool,
}

/// Explicit installation context, passed into the orchestrator instead of
/// being looked up from ambient globals.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub table_prefix: String,
    pub uploads_dir: PathBuf,
    /// Whether the store is a multi-site (network) installation. The reset is
    /// defined only for a single logical site and refuses to run otherwise.
    pub multisite: bool,
    /// Set by the caller after its own privilege and confirmation checks. The
    /// core does not re-verify either, but refuses to start when this is false.
    pub authorized: bool,
    pub fallback_title: String,
    pub fallback_admin_email: String,
    pub fallback_public: bool,
}

impl SiteContext {
    pub fn from_config(config: &SitewipeConfig, authorized: bool, multisite: bool) -> Self {
        Self {
            table_prefix: config.storage.table_prefix.clone(),
            uploads_dir: config.resolved_uploads_dir(),
            multisite,
            authorized,
            fallback_title: config.site.title.clone(),
            fallback_admin_email: config.site.admin_email.clone(),
            fallback_public: config.site.public,
        }
    }
}

/// An account captured before the wipe. Held in memory only for the duration
/// of one invocation.
#[derive(Debug, Clone)]
pub struct UserSnapshot {
    pub login: String,
    pub email: String,
    pub nicename: String,
    pub display_name: String,
    pub url: String,
    pub registered: String,
    /// Opaque stored hash, copied byte-for-byte on restore. Never decoded,
    /// validated, or regenerated.
    pub password_hash: String,
    /// Meta entries in insertion order. Keys may repeat.
    pub meta: Vec<(String, String)>,
}

/// Whether pre-existing accounts were carried across the reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    FreshUsers,
    KeepUsers,
}

impl ResetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreshUsers => "fresh_users",
            Self::KeepUsers => "keep_users",
        }
    }
}

impl std::fmt::Display for ResetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome summary returned to the caller on success.
#[derive(Debug, Clone, Serialize)]
pub struct ResetOutcome {
    pub mode: ResetMode,
    pub new_admin_login: Option<String>,
    /// The only time the generated plaintext exists. Surfaced exactly once.
    pub new_admin_password: Option<String>,
    /// True when the purge step ran. Best-effort: individual entries may still
    /// have survived, see the purge report in the logs.
    pub uploads_purged: bool,
}

/// Fatal failures. Everything else in the procedure is logged and skipped.
#[derive(Debug, Error)]
pub enum ResetError {
    #[error("operation is not authorized")]
    Unauthorized,
    #[error("multi-site installations are not supported")]
    MultisiteUnsupported,
    #[error("storage operation failed: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("baseline install failed: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}
