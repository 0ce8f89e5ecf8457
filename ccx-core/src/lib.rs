//! ccx Core Library
//!
//! Shared business logic for profile management: the JSON profile store,
//! credential obfuscation, and shell activation script generation. Used
//! by the `ccx` CLI.

pub mod config;
pub mod crypto;
pub mod error;
pub mod profile;
pub mod shell;
pub mod store;

// Re-export commonly used types
pub use config::get_app_config_dir;
pub use crypto::CredentialCipher;
pub use error::{CoreError, Result};
pub use profile::{EnvVar, Profile, ProfileDocument, StoreSettings};
pub use shell::ShellKind;
pub use store::ProfileStore;
