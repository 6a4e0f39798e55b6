//! Config subcommand handlers. These run without a backend connection.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::IsTerminal;

use dialoguer::{Input, Password};
use tidyhaus_config::{self, Config, Defaults, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking the token.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "enable_disabled = {}", cfg.defaults.enable_disabled);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref path) = p.overrides_path {
            let _ = writeln!(out, "overrides_path = \"{}\"", path.display());
        }
    }

    out.trim_end().to_string()
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { url } => {
            let config_path = tidyhaus_config::config_path();
            let interactive = std::io::stdin().is_terminal();

            let url = match url {
                Some(url) => url,
                None if interactive => Input::new()
                    .with_prompt("Home Assistant URL")
                    .default("http://homeassistant.local:8123".into())
                    .interact_text()
                    .map_err(prompt_err)?,
                None => {
                    return Err(CliError::Validation {
                        field: "url".into(),
                        reason: "pass --url when running non-interactively".into(),
                    });
                }
            };

            let mut profile = Profile {
                url,
                ..Profile::default()
            };

            if interactive {
                let token = Password::new()
                    .with_prompt("Long-lived access token (empty to skip)")
                    .allow_empty_password(true)
                    .interact()
                    .map_err(prompt_err)?;
                if !token.is_empty() {
                    // Keyring first; fall back to the config file.
                    match tidyhaus_config::store_token("default", &token) {
                        Ok(()) => eprintln!("✓ Token stored in system keyring"),
                        Err(_) => {
                            eprintln!("Keyring unavailable; storing token in the config file");
                            profile.token = Some(token);
                        }
                    }
                }
            }

            let mut profiles = HashMap::new();
            profiles.insert("default".to_string(), profile);
            let cfg = Config {
                default_profile: Some("default".into()),
                defaults: Defaults::default(),
                profiles,
            };
            tidyhaus_config::save_config(&cfg)?;

            eprintln!("✓ Configuration written to {}", config_path.display());
            eprintln!("  Test it: tidyhaus areas");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = tidyhaus_config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", tidyhaus_config::config_path().display());
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken => {
            let cfg = tidyhaus_config::load_config_or_default();
            let profile_name = util::active_profile_name(global, &cfg);

            let token = Password::new()
                .with_prompt("Long-lived access token")
                .interact()
                .map_err(prompt_err)?;
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token cannot be empty".into(),
                });
            }

            tidyhaus_config::store_token(&profile_name, &token)?;
            eprintln!("✓ Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
