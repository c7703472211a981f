//! Reset a CMS installation to a pristine fresh-install state.
//!
//! `sitewipe` tears an installation's database down to nothing, reinstalls the
//! canonical baseline (default options, default content, one generated
//! administrator), and can optionally carry existing user accounts across the
//! wipe and purge the uploads directory. The operation is linear and
//! irreversible — the CLI front end gates it behind a typed confirmation.
//!
//! # Architecture
//!
//! - **Storage**: a single SQLite database (rusqlite, bundled) holding the
//!   installation's tables under a configurable naming prefix
//! - **Schema**: declared shape reconciled against the live database — missing
//!   tables are created, missing columns added, nothing destructive
//! - **Credentials**: Argon2 PHC hashes; snapshot restore copies stored hashes
//!   verbatim so original passwords survive without the plaintext
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — Database open/reconcile, prefix-scoped table enumeration and drop
//! - [`site`] — Installation primitives: options, accounts, baseline installer
//! - [`reset`] — The orchestrated reset procedure and its outcome types

pub mod config;
pub mod db;
pub mod reset;
pub mod site;
