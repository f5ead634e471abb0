//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// The config with plaintext passwords masked, for display.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    cfg
}

fn show_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            output::show(global, &cfg, show_toml, |c| {
                c.default_profile_name().to_owned()
            })
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let active = config::active_profile_name(global, &cfg);
            let lines: Vec<String> = cfg
                .profiles
                .keys()
                .map(|name| {
                    let marker = if *name == active { "*" } else { " " };
                    format!("{marker} {name}")
                })
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(global, &format!("Default profile set to '{name}'"));
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            let password = rpassword::prompt_password(format!("Password for '{name}': "))?;
            if password.is_empty() {
                return Err(CliError::InvalidValue {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            config::store_password(&name, &password)?;
            output::notice(global, &format!("Password for '{name}' stored in system keyring"));
            Ok(())
        }
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("Mapper CLI configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config_or_default();
    let defaults = Profile::default();

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(config::active_profile_name(global, &cfg))
        .interact_text()?;

    let api_url: String = Input::new()
        .with_prompt("API URL")
        .default(defaults.api_url)
        .interact_text()?;

    let ws_url: String = Input::new()
        .with_prompt("Notification socket URL")
        .default(defaults.ws_url)
        .interact_text()?;

    let username: String = Input::new()
        .with_prompt("Username (blank to enter at login)")
        .allow_empty(true)
        .interact_text()?;

    let mut password = None;
    if !username.is_empty() {
        let choices = &[
            "Store password in system keyring (recommended)",
            "Save to config file (plaintext)",
            "Ask at every login",
        ];
        let selection = Select::new()
            .with_prompt("Where to keep the password?")
            .items(choices)
            .default(0)
            .interact()?;

        if selection < 2 {
            let pass = rpassword::prompt_password("Password: ")?;
            if pass.is_empty() {
                return Err(CliError::InvalidValue {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            if selection == 0 {
                config::store_password(&profile_name, &pass)?;
                eprintln!("   Password stored in system keyring");
            } else {
                password = Some(pass);
            }
        }
    }

    let profile = Profile {
        api_url,
        ws_url,
        username: (!username.is_empty()).then_some(username),
        password,
        ..Profile::default()
    };

    // Validate before writing anything.
    mapper_config::profile_to_studio_config(&profile, &profile_name, &cfg.defaults)?;

    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    let written = config::save_config(&cfg)?;

    eprintln!("\nConfiguration written to {}", written.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Sign in with: mapper login");
    Ok(())
}
