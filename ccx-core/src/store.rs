//! Profile store - JSON document persistence
//!
//! One document owns every profile plus the active-profile pointer and
//! store-wide settings. Each operation re-reads the document from disk
//! and mutators write the whole document back, so concurrent invocations
//! race only on the pointer (last write wins) and never corrupt a
//! profile record.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::config::get_profiles_path;
use crate::crypto::CredentialCipher;
use crate::error::{CoreError, Result};
use crate::profile::{Profile, ProfileDocument, StoreSettings};

/// Handle on the persisted profile document.
///
/// Constructed with an explicit path so tests can point it at a temp
/// directory; no process-wide singleton.
pub struct ProfileStore {
    path: PathBuf,
    cipher: CredentialCipher,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>, cipher: CredentialCipher) -> Self {
        Self {
            path: path.into(),
            cipher,
        }
    }

    /// Store over the per-user config path with the machine-derived key.
    pub fn open_default() -> Self {
        Self::new(get_profiles_path(), CredentialCipher::new())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<ProfileDocument> {
        if !self.path.exists() {
            return Ok(ProfileDocument::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn persist(&self, doc: &ProfileDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// All profiles as persisted, credentials left in encrypted form.
    pub fn get_profiles(&self) -> Result<IndexMap<String, Profile>> {
        Ok(self.load()?.profiles)
    }

    /// Exact lookup; the returned copy carries the decrypted credential.
    pub fn get_profile(&self, name: &str) -> Result<Option<Profile>> {
        let doc = self.load()?;
        Ok(doc.profiles.get(name).map(|p| {
            let mut profile = p.clone();
            if let Some(record) = &profile.api_key {
                profile.api_key = Some(self.cipher.decrypt(record));
            }
            profile
        }))
    }

    /// Upsert by name. Full-record replace: the stored entry becomes
    /// exactly `profile` (credential encrypted when enabled) with a fresh
    /// `updatedAt` stamp.
    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        if profile.name.is_empty() {
            return Err(CoreError::Validation("profile name is required".into()));
        }
        if profile.base_url.is_empty() {
            return Err(CoreError::Validation("baseUrl is required".into()));
        }
        if profile.extra_env.iter().any(|e| e.name.is_empty()) {
            return Err(CoreError::Validation(
                "extraEnv entries must have a non-empty name".into(),
            ));
        }

        let mut doc = self.load()?;
        let mut stored = profile.clone();
        if let Some(plaintext) = &stored.api_key {
            if doc.settings.encryption_enabled {
                stored.api_key = Some(self.cipher.encrypt(plaintext));
            }
        }
        stored.updated_at = chrono::Utc::now().timestamp_millis();
        doc.profiles.insert(stored.name.clone(), stored);
        self.persist(&doc)
    }

    /// Remove the named profile. Clears the active pointer when it named
    /// the deleted profile. Returns whether a deletion occurred.
    pub fn delete_profile(&self, name: &str) -> Result<bool> {
        let mut doc = self.load()?;
        let removed = doc.profiles.shift_remove(name).is_some();
        if removed {
            if doc.active_profile.as_deref() == Some(name) {
                doc.active_profile = None;
            }
            self.persist(&doc)?;
        }
        Ok(removed)
    }

    pub fn profile_exists(&self, name: &str) -> Result<bool> {
        Ok(self.load()?.profiles.contains_key(name))
    }

    pub fn get_active_profile(&self) -> Result<Option<String>> {
        Ok(self.load()?.active_profile)
    }

    /// Set or clear the active pointer. The pointer is a weak by-name
    /// reference; callers are expected to have checked existence.
    pub fn set_active_profile(&self, name: Option<&str>) -> Result<()> {
        let mut doc = self.load()?;
        doc.active_profile = name.map(str::to_string);
        self.persist(&doc)
    }

    pub fn settings(&self) -> Result<StoreSettings> {
        Ok(self.load()?.settings)
    }

    /// Persist new store-wide settings, leaving profiles untouched.
    pub fn save_settings(&self, settings: StoreSettings) -> Result<()> {
        let mut doc = self.load()?;
        doc.settings = settings;
        self.persist(&doc)
    }
}
