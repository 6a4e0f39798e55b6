//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::PathBuf;

use secrecy::SecretString;
use tidyhaus_config::Config;
use tidyhaus_core::BackendConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the backend connection settings and overrides file path from
/// the config file, the selected profile, and CLI flag overrides.
pub fn resolve_backend(global: &GlobalOpts) -> Result<(BackendConfig, PathBuf), CliError> {
    let cfg = tidyhaus_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = cfg.profiles.get(&profile_name).cloned().unwrap_or_default();

    // CLI flags override the profile.
    if let Some(url) = &global.url {
        profile.url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    profile.timeout = Some(global.timeout);

    if profile.url.is_empty() {
        return Err(CliError::NoConfig {
            path: tidyhaus_config::config_path().display().to_string(),
        });
    }

    if let Some(token) = &global.token {
        profile.token = Some(token.clone());
    }

    let mut backend = tidyhaus_config::profile_to_backend_config(&profile, &profile_name)?;
    // An explicit --token wins over keyring and env lookups.
    if let Some(token) = &global.token {
        backend.token = SecretString::from(token.clone());
    }

    let overrides_path = tidyhaus_config::overrides_path(&profile);
    Ok((backend, overrides_path))
}

/// The profile name in effect: `--profile`, then the config default.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".to_string())
}

/// Ask for confirmation unless `--yes` was given.
///
/// In a non-interactive context without `--yes` the operation is
/// refused rather than silently applied.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: prompt.to_string(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}
