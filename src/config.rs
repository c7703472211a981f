use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SitewipeConfig {
    pub storage: StorageConfig,
    pub site: SiteDefaults,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the installation's SQLite database.
    pub db_path: String,
    /// Naming prefix identifying which tables belong to this installation.
    pub table_prefix: String,
    /// Root of the uploads (media) directory.
    pub uploads_dir: String,
}

/// Fallback site metadata used by the baseline install when the pre-reset
/// values cannot be read from the options table.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SiteDefaults {
    pub title: String,
    pub admin_email: String,
    pub public: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for SitewipeConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            site: SiteDefaults::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "./site.db".into(),
            table_prefix: "wp_".into(),
            uploads_dir: "./uploads".into(),
        }
    }
}

impl Default for SiteDefaults {
    fn default() -> Self {
        Self {
            title: "My WordPress Site".into(),
            admin_email: "admin@example.com".into(),
            public: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

/// Returns `~/.sitewipe/`
pub fn default_sitewipe_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".sitewipe")
}

/// Returns the default config file path: `~/.sitewipe/config.toml`
pub fn default_config_path() -> PathBuf {
    default_sitewipe_dir().join("config.toml")
}

impl SitewipeConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            SitewipeConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (SITEWIPE_DB, SITEWIPE_PREFIX,
    /// SITEWIPE_UPLOADS, SITEWIPE_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SITEWIPE_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("SITEWIPE_PREFIX") {
            self.storage.table_prefix = val;
        }
        if let Ok(val) = std::env::var("SITEWIPE_UPLOADS") {
            self.storage.uploads_dir = val;
        }
        if let Ok(val) = std::env::var("SITEWIPE_LOG_LEVEL") {
            self.log.level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Resolve the uploads root, expanding `~` if needed.
    pub fn resolved_uploads_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.uploads_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
