use ccx_core::{
    CoreError, CredentialCipher, EnvVar, Profile, ProfileStore, ShellKind, StoreSettings,
};
use tempfile::TempDir;

fn temp_store() -> (TempDir, ProfileStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProfileStore::new(
        dir.path().join("profiles.json"),
        CredentialCipher::with_key([42u8; 32]),
    );
    (dir, store)
}

fn sample_profile(name: &str) -> Profile {
    let mut p = Profile::new(
        name.to_string(),
        "anthropic".to_string(),
        "https://api.anthropic.com".to_string(),
    );
    p.description = Some("test profile".to_string());
    p.model = Some("claude-sonnet-4".to_string());
    p.api_key = Some("sk-ant-plaintext".to_string());
    p.clear_anthropic_key = true;
    p
}

#[test]
fn test_empty_store() {
    let (_dir, store) = temp_store();
    assert!(store.get_profiles().unwrap().is_empty());
    assert!(store.get_profile("missing").unwrap().is_none());
    assert!(store.get_active_profile().unwrap().is_none());
    assert!(!store.profile_exists("missing").unwrap());
}

#[test]
fn test_save_and_get_round_trip() {
    let (_dir, store) = temp_store();
    let profile = sample_profile("work");
    let before = chrono::Utc::now().timestamp_millis();

    store.save_profile(&profile).unwrap();

    let got = store.get_profile("work").unwrap().expect("profile missing");
    assert_eq!(got.name, profile.name);
    assert_eq!(got.description, profile.description);
    assert_eq!(got.provider, profile.provider);
    assert_eq!(got.base_url, profile.base_url);
    assert_eq!(got.model, profile.model);
    assert_eq!(got.api_key.as_deref(), Some("sk-ant-plaintext"));
    assert_eq!(got.clear_anthropic_key, profile.clear_anthropic_key);
    assert_eq!(got.created_at, profile.created_at);
    assert!(got.updated_at >= before);
}

#[test]
fn test_credential_encrypted_at_rest() {
    let (_dir, store) = temp_store();
    store.save_profile(&sample_profile("work")).unwrap();

    // get_profiles leaves the credential in its stored form.
    let raw = store.get_profiles().unwrap();
    let record = raw["work"].api_key.as_deref().unwrap();
    assert_ne!(record, "sk-ant-plaintext");
    assert!(record.contains(':'));

    // The plaintext never appears in the document on disk.
    let on_disk = std::fs::read_to_string(store.path()).unwrap();
    assert!(!on_disk.contains("sk-ant-plaintext"));
}

#[test]
fn test_save_is_full_record_replace() {
    let (_dir, store) = temp_store();
    store.save_profile(&sample_profile("work")).unwrap();

    let mut replacement = Profile::new(
        "work".to_string(),
        "deepseek".to_string(),
        "https://api.deepseek.com/anthropic".to_string(),
    );
    replacement.api_key = None;
    store.save_profile(&replacement).unwrap();

    let got = store.get_profile("work").unwrap().unwrap();
    assert_eq!(got.provider, "deepseek");
    assert!(got.api_key.is_none());
    assert!(got.description.is_none());
    assert!(got.model.is_none());
    assert!(!got.clear_anthropic_key);
}

#[test]
fn test_delete_clears_active_pointer() {
    let (_dir, store) = temp_store();
    store.save_profile(&sample_profile("x")).unwrap();
    store.set_active_profile(Some("x")).unwrap();
    assert_eq!(store.get_active_profile().unwrap().as_deref(), Some("x"));

    assert!(store.delete_profile("x").unwrap());
    assert!(store.get_active_profile().unwrap().is_none());
    assert!(!store.profile_exists("x").unwrap());

    // Second delete reports nothing removed.
    assert!(!store.delete_profile("x").unwrap());
}

#[test]
fn test_delete_keeps_unrelated_active_pointer() {
    let (_dir, store) = temp_store();
    store.save_profile(&sample_profile("a")).unwrap();
    store.save_profile(&sample_profile("b")).unwrap();
    store.set_active_profile(Some("a")).unwrap();

    assert!(store.delete_profile("b").unwrap());
    assert_eq!(store.get_active_profile().unwrap().as_deref(), Some("a"));
}

#[test]
fn test_set_active_profile_none_clears() {
    let (_dir, store) = temp_store();
    store.save_profile(&sample_profile("a")).unwrap();
    store.set_active_profile(Some("a")).unwrap();
    store.set_active_profile(None).unwrap();
    assert!(store.get_active_profile().unwrap().is_none());
}

#[test]
fn test_legacy_plaintext_credential_tolerated() {
    let (_dir, store) = temp_store();

    // A document written before encryption existed holds the raw key.
    let doc = serde_json::json!({
        "profiles": {
            "old": {
                "name": "old",
                "provider": "anthropic",
                "baseUrl": "https://api.anthropic.com",
                "apiKey": "sk-legacy-raw",
                "clearAnthropicKey": false,
                "createdAt": 0,
                "updatedAt": 0
            }
        },
        "activeProfile": null,
        "settings": {"encryptionEnabled": true}
    });
    std::fs::write(store.path(), serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    let got = store.get_profile("old").unwrap().unwrap();
    assert_eq!(got.api_key.as_deref(), Some("sk-legacy-raw"));
}

#[test]
fn test_encryption_disabled_stores_plaintext() {
    let (_dir, store) = temp_store();
    store
        .save_settings(StoreSettings {
            encryption_enabled: false,
            default_shell: Some(ShellKind::Fish),
        })
        .unwrap();

    store.save_profile(&sample_profile("work")).unwrap();

    let raw = store.get_profiles().unwrap();
    assert_eq!(raw["work"].api_key.as_deref(), Some("sk-ant-plaintext"));

    let settings = store.settings().unwrap();
    assert!(!settings.encryption_enabled);
    assert_eq!(settings.default_shell, Some(ShellKind::Fish));
}

#[test]
fn test_save_validation() {
    let (_dir, store) = temp_store();

    let mut no_name = sample_profile("x");
    no_name.name = String::new();
    assert!(matches!(
        store.save_profile(&no_name),
        Err(CoreError::Validation(_))
    ));

    let mut no_url = sample_profile("x");
    no_url.base_url = String::new();
    assert!(matches!(
        store.save_profile(&no_url),
        Err(CoreError::Validation(_))
    ));

    let mut bad_env = sample_profile("x");
    bad_env.extra_env.push(EnvVar {
        name: String::new(),
        value: "v".to_string(),
    });
    assert!(matches!(
        store.save_profile(&bad_env),
        Err(CoreError::Validation(_))
    ));

    // Nothing was persisted.
    assert!(store.get_profiles().unwrap().is_empty());
}

#[test]
fn test_profiles_keep_insertion_order() {
    let (_dir, store) = temp_store();
    for name in ["zeta", "alpha", "mid"] {
        store.save_profile(&sample_profile(name)).unwrap();
    }
    let names: Vec<String> = store.get_profiles().unwrap().keys().cloned().collect();
    assert_eq!(names, ["zeta", "alpha", "mid"]);
}
