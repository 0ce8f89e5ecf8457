//! Profile types for ccx
//!
//! Core profile structure plus the persisted document layout shared
//! between the store and the CLI.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::shell::ShellKind;

/// One extra environment variable carried by a profile.
///
/// Kept as an ordered list rather than a map so activation scripts
/// emit the entries in the order the user defined them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// Named provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub provider: String,
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Encrypted on disk (`ivHex:cipherHex`), plaintext only in memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    /// Whether activation must also unset the ambient `ANTHROPIC_API_KEY`.
    #[serde(default)]
    #[serde(rename = "clearAnthropicKey")]
    pub clear_anthropic_key: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "extraEnv")]
    pub extra_env: Vec<EnvVar>,
    #[serde(default)]
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(default)]
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl Profile {
    pub fn new(name: String, provider: String, base_url: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            name,
            description: None,
            provider,
            base_url,
            model: None,
            api_key: None,
            clear_anthropic_key: false,
            extra_env: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Profile names created interactively are restricted to a safe charset.
pub fn is_valid_profile_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Store-wide settings persisted alongside the profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(rename = "encryptionEnabled")]
    pub encryption_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "defaultShell")]
    pub default_shell: Option<ShellKind>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            encryption_enabled: true,
            default_shell: None,
        }
    }
}

/// The whole on-disk document: profiles, active pointer, settings.
///
/// `active_profile` is a weak reference by name; it may point at a
/// deleted profile until the store corrects it on the next delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDocument {
    #[serde(default)]
    pub profiles: IndexMap<String, Profile>,
    #[serde(default)]
    #[serde(rename = "activeProfile")]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub settings: StoreSettings,
}
