use std::io::{self, Write};

use anyhow::Result;
use ccx_core::profile::is_valid_profile_name;
use ccx_core::{shell, CoreError, EnvVar, Profile, ProfileStore, ShellKind};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Select};

use crate::output::{active_marker, create_table};
use crate::templates;

#[derive(Args)]
pub struct CreateArgs {
    /// Profile name (prompted if omitted)
    pub name: Option<String>,

    /// Start from a builtin template: anthropic, deepseek, glm, kimi, openrouter
    #[arg(short, long)]
    pub template: Option<String>,

    /// Provider tag, e.g. anthropic or deepseek
    #[arg(long)]
    pub provider: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// API key (prompted if omitted; leave empty to store none)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,

    /// Unset the ambient ANTHROPIC_API_KEY on activation
    #[arg(long)]
    pub clear_default_key: bool,

    /// Extra environment variable, NAME=VALUE (repeatable)
    #[arg(long = "env", value_name = "NAME=VALUE")]
    pub env: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Profile name
    pub name: String,

    #[arg(long)]
    pub provider: Option<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Model identifier (empty string removes it)
    #[arg(long)]
    pub model: Option<String>,

    /// API key (empty string removes the stored credential)
    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Whether activation unsets the ambient ANTHROPIC_API_KEY
    #[arg(long, value_name = "BOOL")]
    pub clear_default_key: Option<bool>,

    /// Replace the extra environment list, NAME=VALUE (repeatable)
    #[arg(long = "env", value_name = "NAME=VALUE")]
    pub env: Option<Vec<String>>,
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{}: ", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_optional(message: &str, default: &str) -> io::Result<String> {
    print!("{} [{}]: ", message, default);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();

    if trimmed.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn parse_env_pairs(pairs: &[String]) -> Result<Vec<EnvVar>> {
    pairs
        .iter()
        .map(|raw| {
            let (name, value) = raw.split_once('=').ok_or_else(|| {
                CoreError::Validation(format!("expected NAME=VALUE, got '{}'", raw))
            })?;
            if name.is_empty() {
                return Err(
                    CoreError::Validation(format!("empty variable name in '{}'", raw)).into(),
                );
            }
            Ok(EnvVar {
                name: name.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Resolve the output dialect: explicit flag, then the store's
/// configured default, then ambient detection.
fn resolve_shell(flag: Option<String>, store: &ProfileStore) -> Result<ShellKind> {
    if let Some(s) = flag {
        return ShellKind::from_str(&s)
            .ok_or_else(|| anyhow::anyhow!("Invalid shell: {} (expected bash, zsh, fish, powershell or cmd)", s));
    }
    if let Some(kind) = store.settings()?.default_shell {
        return Ok(kind);
    }
    Ok(ShellKind::detect())
}

pub fn create(args: CreateArgs) -> Result<()> {
    let store = ProfileStore::open_default();

    let template = match args.template.as_deref() {
        Some(name) => Some(
            templates::find(name)
                .ok_or_else(|| CoreError::TemplateNotFound(name.to_string()))?,
        ),
        None => None,
    };

    let name = match args.name {
        Some(name) => name,
        None => prompt("Profile name")?,
    };
    if !is_valid_profile_name(&name) {
        anyhow::bail!(CoreError::Validation(format!(
            "invalid profile name '{}' (allowed: letters, digits, '.', '_', '-')",
            name
        )));
    }
    if store.profile_exists(&name)? {
        anyhow::bail!(CoreError::Validation(format!(
            "profile '{}' already exists, use 'ccx edit'",
            name
        )));
    }

    let provider = match args.provider {
        Some(p) => p,
        None => match template {
            Some(t) => t.provider.to_string(),
            None => prompt_optional("Provider tag", "anthropic")?,
        },
    };

    let base_url = match args.base_url {
        Some(u) => u,
        None => match template {
            Some(t) => t.base_url.to_string(),
            None => prompt_optional("Base URL", "https://api.anthropic.com")?,
        },
    };

    let api_key = match args.api_key {
        Some(k) => Some(k),
        None => {
            let entered = prompt("API key (leave empty to skip)")?;
            if entered.is_empty() {
                None
            } else {
                Some(entered)
            }
        }
    };

    let mut profile = Profile::new(name.clone(), provider, base_url);
    profile.description = args.description;
    profile.model = args
        .model
        .or_else(|| template.and_then(|t| t.model.map(str::to_string)));
    profile.api_key = api_key;
    profile.clear_anthropic_key =
        args.clear_default_key || template.map(|t| t.clear_anthropic_key).unwrap_or(false);
    profile.extra_env = parse_env_pairs(&args.env)?;

    store.save_profile(&profile)?;
    println!("✓ Created profile: {}", name);
    Ok(())
}

pub fn edit(args: EditArgs) -> Result<()> {
    let store = ProfileStore::open_default();

    // Loaded decrypted so an untouched credential re-encrypts to the
    // same plaintext on the full-record save.
    let mut profile = store
        .get_profile(&args.name)?
        .ok_or_else(|| CoreError::ProfileNotFound(args.name.clone()))?;

    if let Some(provider) = args.provider {
        profile.provider = provider;
    }
    if let Some(base_url) = args.base_url {
        profile.base_url = base_url;
    }
    if let Some(model) = args.model {
        profile.model = if model.is_empty() { None } else { Some(model) };
    }
    if let Some(api_key) = args.api_key {
        profile.api_key = if api_key.is_empty() {
            None
        } else {
            Some(api_key)
        };
    }
    if let Some(description) = args.description {
        profile.description = if description.is_empty() {
            None
        } else {
            Some(description)
        };
    }
    if let Some(clear) = args.clear_default_key {
        profile.clear_anthropic_key = clear;
    }
    if let Some(env) = args.env {
        profile.extra_env = parse_env_pairs(&env)?;
    }

    store.save_profile(&profile)?;
    println!("✓ Updated profile: {}", args.name);
    Ok(())
}

pub fn delete(name: String, yes: bool) -> Result<()> {
    let store = ProfileStore::open_default();

    if !store.profile_exists(&name)? {
        anyhow::bail!(CoreError::ProfileNotFound(name));
    }

    if !yes {
        print!("Delete profile '{}'? [y/N]: ", name);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete_profile(&name)?;
    println!("✓ Deleted profile: {}", name);
    Ok(())
}

/// Activate a profile: record it as active and print the activation
/// script to stdout for the invoking shell to eval.
pub fn activate(name: Option<String>, shell_flag: Option<String>) -> Result<()> {
    let store = ProfileStore::open_default();
    let dialect = resolve_shell(shell_flag, &store)?;

    let name = match name {
        Some(name) => name,
        None => select_profile(&store)?,
    };

    let profile = store
        .get_profile(&name)?
        .ok_or_else(|| CoreError::ProfileNotFound(name.clone()))?;

    store.set_active_profile(Some(&name))?;

    print!("{}", shell::generate(&profile, dialect));
    eprintln!("✓ Activated profile: {} ({})", name, dialect.as_str());
    eprintln!("  Run inside eval to apply, e.g. eval \"$(ccx use {})\"", name);
    Ok(())
}

/// Interactive selection with arrow keys; plain listing when stdin is
/// not a terminal.
fn select_profile(store: &ProfileStore) -> Result<String> {
    let profiles = store.get_profiles()?;
    let active = store.get_active_profile()?;

    if profiles.is_empty() {
        anyhow::bail!("No profiles found. Use 'ccx create' to add one.");
    }

    let items: Vec<String> = profiles
        .iter()
        .map(|(name, p)| {
            let marker = if active.as_deref() == Some(name) {
                " ✓"
            } else {
                ""
            };
            format!("{} [{}]{}", name, p.provider, marker)
        })
        .collect();

    let names: Vec<&String> = profiles.keys().collect();
    let default = active
        .as_ref()
        .and_then(|a| names.iter().position(|n| *n == a))
        .unwrap_or(0);

    match Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select profile (↑↓ to move, Enter to select)")
        .items(&items)
        .default(default)
        .interact()
    {
        Ok(idx) => Ok(names[idx].clone()),
        Err(e) => {
            anyhow::bail!(
                "Interactive mode not available ({}). Run 'ccx use <name>' with one of: {}",
                e,
                names
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    }
}

/// Print the reset script and clear the on-disk active pointer.
pub fn reset(shell_flag: Option<String>) -> Result<()> {
    let store = ProfileStore::open_default();
    let dialect = resolve_shell(shell_flag, &store)?;

    store.set_active_profile(None)?;

    print!("{}", shell::generate_reset(dialect));
    eprintln!("✓ Environment reset ({})", dialect.as_str());
    Ok(())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 6 {
        "***".to_string()
    } else {
        format!("{}…", chars[..4].iter().collect::<String>())
    }
}

pub fn show(name: String) -> Result<()> {
    let store = ProfileStore::open_default();

    let profile = store
        .get_profile(&name)?
        .ok_or_else(|| CoreError::ProfileNotFound(name))?;

    println!("Name: {}", profile.name);
    if let Some(description) = &profile.description {
        println!("Description: {}", description);
    }
    println!("Provider: {}", profile.provider);
    println!("Base URL: {}", profile.base_url);
    if let Some(model) = &profile.model {
        println!("Model: {}", model);
    }
    match &profile.api_key {
        Some(key) => println!("API key: {}", mask_key(key)),
        None => println!("API key: (none)"),
    }
    println!(
        "Clears ANTHROPIC_API_KEY: {}",
        if profile.clear_anthropic_key { "yes" } else { "no" }
    );
    for entry in &profile.extra_env {
        println!("Extra env: {}={}", entry.name, entry.value);
    }
    println!(
        "Updated: {}",
        chrono::DateTime::from_timestamp_millis(profile.updated_at)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string())
    );

    Ok(())
}

pub fn list(format: Option<String>) -> Result<()> {
    let store = ProfileStore::open_default();
    let profiles = store.get_profiles()?;
    let active = store.get_active_profile()?;

    if profiles.is_empty() {
        println!("No profiles found. Use 'ccx create' to add one.");
        return Ok(());
    }

    if format.as_deref() == Some("json") {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    let mut table = create_table(vec!["", "Name", "Provider", "Base URL", "Model"]);
    for (name, profile) in &profiles {
        table.add_row(vec![
            active_marker(active.as_deref(), name),
            name.as_str(),
            profile.provider.as_str(),
            profile.base_url.as_str(),
            profile.model.as_deref().unwrap_or("-"),
        ]);
    }
    println!("{table}");

    Ok(())
}

pub fn export(output: Option<String>) -> Result<()> {
    let store = ProfileStore::open_default();

    // Credentials never leave the store, not even in encrypted form.
    let mut profiles = store.get_profiles()?;
    for profile in profiles.values_mut() {
        profile.api_key = None;
    }

    let json = serde_json::to_string_pretty(&profiles)?;
    if let Some(path) = output {
        std::fs::write(&path, json)?;
        println!("✓ Exported {} profiles to {}", profiles.len(), path);
    } else {
        println!("{}", json);
    }

    Ok(())
}

pub fn import(input: Option<String>) -> Result<()> {
    let store = ProfileStore::open_default();

    let json = if let Some(path) = input {
        std::fs::read_to_string(&path)?
    } else {
        use std::io::Read;
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let value: serde_json::Value =
        serde_json::from_str(&json).map_err(|e| CoreError::Validation(format!("invalid JSON: {e}")))?;

    // Accept a single profile object or the name→profile map `export`
    // emits.
    let is_single = value
        .as_object()
        .and_then(|obj| obj.get("name"))
        .map(serde_json::Value::is_string)
        .unwrap_or(false);
    let entries: Vec<serde_json::Value> = if is_single {
        vec![value]
    } else if let serde_json::Value::Object(obj) = value {
        obj.into_iter().map(|(_, v)| v).collect()
    } else {
        anyhow::bail!(CoreError::Validation(
            "expected a profile object or a map of profiles".into()
        ))
    };

    // Validate everything before the first write so a bad entry leaves
    // the store untouched.
    let mut profiles = Vec::with_capacity(entries.len());
    for entry in entries {
        let profile: Profile = serde_json::from_value(entry)
            .map_err(|e| CoreError::Validation(format!("invalid profile: {e}")))?;
        if profile.name.is_empty() {
            anyhow::bail!(CoreError::Validation("profile name is required".into()));
        }
        if profile.base_url.is_empty() {
            anyhow::bail!(CoreError::Validation(format!(
                "profile '{}' is missing baseUrl",
                profile.name
            )));
        }
        if profile.extra_env.iter().any(|e| e.name.is_empty()) {
            anyhow::bail!(CoreError::Validation(format!(
                "profile '{}' has an extraEnv entry without a name",
                profile.name
            )));
        }
        profiles.push(profile);
    }

    let count = profiles.len();
    for profile in profiles {
        store.save_profile(&profile)?;
    }

    println!("✓ Imported {} profiles", count);
    Ok(())
}

/// Print the store's active pointer. A live shell may disagree: its
/// CCX_ACTIVE_PROFILE reflects whatever that shell last eval'd, so both
/// views are shown when available.
pub fn current() -> Result<()> {
    let store = ProfileStore::open_default();

    match store.get_active_profile()? {
        Some(name) => println!("Active profile (store): {}", name),
        None => println!("Active profile (store): (none)"),
    }

    if let Ok(live) = std::env::var(shell::ACTIVE_PROFILE_VAR) {
        if !live.is_empty() {
            println!("This shell: {}", live);
        }
    }

    Ok(())
}
