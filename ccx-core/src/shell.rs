//! Shell dialects and activation script generation.
//!
//! Five output syntaxes are supported. Each dialect is one row of
//! data-driven rules (escape function, assign form, unset form) so the
//! generator itself stays branch-free.

use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// Variables written by an activation script.
pub const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
pub const AUTH_TOKEN_VAR: &str = "ANTHROPIC_AUTH_TOKEN";
pub const MODEL_VAR: &str = "ANTHROPIC_MODEL";
/// Ambient credential variable. Only ever cleared, never set.
pub const DEFAULT_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// Tracks, inside a live shell, which profile that shell last activated.
/// Distinct from the store's on-disk active pointer; the two can diverge
/// across open shells.
pub const ACTIVE_PROFILE_VAR: &str = "CCX_ACTIVE_PROFILE";

/// Variables a reset script clears. `extraEnv` entries are unknown at
/// reset time and are deliberately left alone.
const TRACKED_VARS: [&str; 4] = [BASE_URL_VAR, AUTH_TOKEN_VAR, MODEL_VAR, ACTIVE_PROFILE_VAR];

/// Supported command-interpreter output syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Cmd,
}

/// Per-dialect rendering rules.
struct DialectRules {
    escape: fn(&str) -> String,
    assign: fn(&str, &str) -> String,
    unset: fn(&str) -> String,
}

fn escape_posix(value: &str) -> String {
    value.replace('\'', r"'\''")
}

fn escape_fish(value: &str) -> String {
    value.replace('\'', r"\'")
}

fn escape_powershell(value: &str) -> String {
    value.replace('\'', "''")
}

// cmd has no quoting; values must not contain newlines.
fn escape_cmd(value: &str) -> String {
    value.to_string()
}

const POSIX_RULES: DialectRules = DialectRules {
    escape: escape_posix,
    assign: |name, value| format!("export {name}='{value}'"),
    unset: |name| format!("unset {name}"),
};

const FISH_RULES: DialectRules = DialectRules {
    escape: escape_fish,
    assign: |name, value| format!("set -gx {name} '{value}'"),
    unset: |name| format!("set -e {name}"),
};

const POWERSHELL_RULES: DialectRules = DialectRules {
    escape: escape_powershell,
    assign: |name, value| format!("$env:{name} = '{value}'"),
    unset: |name| format!("Remove-Item Env:{name} -ErrorAction SilentlyContinue"),
};

const CMD_RULES: DialectRules = DialectRules {
    escape: escape_cmd,
    assign: |name, value| format!("set {name}={value}"),
    unset: |name| format!("set {name}="),
};

impl ShellKind {
    pub fn as_str(&self) -> &str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
            ShellKind::PowerShell => "powershell",
            ShellKind::Cmd => "cmd",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bash" => Some(ShellKind::Bash),
            "zsh" => Some(ShellKind::Zsh),
            "fish" => Some(ShellKind::Fish),
            "powershell" | "pwsh" => Some(ShellKind::PowerShell),
            "cmd" => Some(ShellKind::Cmd),
            _ => None,
        }
    }

    fn rules(&self) -> &'static DialectRules {
        match self {
            ShellKind::Bash | ShellKind::Zsh => &POSIX_RULES,
            ShellKind::Fish => &FISH_RULES,
            ShellKind::PowerShell => &POWERSHELL_RULES,
            ShellKind::Cmd => &CMD_RULES,
        }
    }

    fn assign_line(&self, name: &str, value: &str) -> String {
        let rules = self.rules();
        (rules.assign)(name, &(rules.escape)(value))
    }

    fn unset_line(&self, name: &str) -> String {
        (self.rules().unset)(name)
    }

    /// Match a shell-path-like value (`$SHELL`) against known dialects.
    pub fn from_path(path: &str) -> Option<Self> {
        // Priority order matters: a path like /opt/fish-zsh-wrapper should
        // resolve to the first recognized token.
        const HINTS: [(&str, ShellKind); 5] = [
            ("fish", ShellKind::Fish),
            ("zsh", ShellKind::Zsh),
            ("bash", ShellKind::Bash),
            ("pwsh", ShellKind::PowerShell),
            ("powershell", ShellKind::PowerShell),
        ];
        HINTS
            .iter()
            .find(|(token, _)| path.contains(token))
            .map(|(_, kind)| *kind)
    }

    /// Infer the caller's dialect from ambient signals.
    ///
    /// Never fails: `$SHELL` substrings first, then the OS platform,
    /// then bash as the global default. An explicit caller-supplied
    /// dialect always takes precedence over this.
    pub fn detect() -> Self {
        if let Ok(shell_path) = std::env::var("SHELL") {
            if let Some(kind) = Self::from_path(&shell_path) {
                return kind;
            }
        }
        if cfg!(windows) {
            ShellKind::PowerShell
        } else {
            ShellKind::Bash
        }
    }
}

/// Render the activation script for a profile.
///
/// `profile` must carry the decrypted credential; the auth-token line is
/// emitted only when one is present. The final line always records the
/// profile name in [`ACTIVE_PROFILE_VAR`] so a live shell can be asked
/// later which profile it activated.
pub fn generate(profile: &Profile, shell: ShellKind) -> String {
    let mut lines = Vec::new();
    lines.push(shell.assign_line(BASE_URL_VAR, &profile.base_url));
    if let Some(api_key) = &profile.api_key {
        lines.push(shell.assign_line(AUTH_TOKEN_VAR, api_key));
    }
    if let Some(model) = &profile.model {
        lines.push(shell.assign_line(MODEL_VAR, model));
    }
    if profile.clear_anthropic_key {
        lines.push(shell.unset_line(DEFAULT_KEY_VAR));
    }
    for entry in &profile.extra_env {
        lines.push(shell.assign_line(&entry.name, &entry.value));
    }
    lines.push(shell.assign_line(ACTIVE_PROFILE_VAR, &profile.name));
    lines.join("\n") + "\n"
}

/// Render the script that clears every tracked variable.
///
/// `extraEnv` entries are not touched: at reset time the store is not
/// consulted and the extra variables of a previous activation are unknown.
pub fn generate_reset(shell: ShellKind) -> String {
    TRACKED_VARS
        .iter()
        .map(|name| shell.unset_line(name))
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}
