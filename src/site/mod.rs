//! Installation primitives: options, accounts, credentials, and the baseline
//! installer. These are the store-level collaborators the reset procedure is
//! built on.

pub mod install;
pub mod options;
pub mod password;
pub mod users;
