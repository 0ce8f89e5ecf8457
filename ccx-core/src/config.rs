use std::path::PathBuf;

/// Per-user configuration directory, e.g. `~/.config/ccx` on Linux.
///
/// `CCX_CONFIG_DIR` overrides the location, mainly for tests and
/// sandboxed setups.
pub fn get_app_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CCX_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir().unwrap_or_default().join("ccx")
}

/// Path of the persisted profile document.
pub fn get_profiles_path() -> PathBuf {
    get_app_config_dir().join("profiles.json")
}
