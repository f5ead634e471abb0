//! CLI configuration -- thin wrapper around `mapper_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--api-url,
//! --ws-url, --insecure, --timeout) on top of the active profile.

use std::time::Duration;

use mapper_api::TlsMode;
use mapper_core::StudioConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use mapper_config::{
    Config, Profile, config_path, load_config_or_default, resolve_password, save_config,
    store_password,
};

const DEFAULT_PROFILE: &str = "default";

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.into())
}

/// The active profile. A missing `default` profile falls back to built-in
/// defaults; any other missing name is an error.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    match config.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None if name == DEFAULT_PROFILE => Ok((name, Profile::default())),
        None => Err(CliError::ProfileNotFound {
            available: available_profiles(config),
            name,
        }),
    }
}

pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Translate the active profile plus global flags into a `StudioConfig`.
///
/// Flags and their env vars take priority over profile values.
pub fn build_studio_config(global: &GlobalOpts) -> Result<StudioConfig, CliError> {
    let cfg = load_config_or_default();
    let (name, mut profile) = active_profile(global, &cfg)?;

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if let Some(ref url) = global.ws_url {
        profile.ws_url.clone_from(url);
    }

    let mut studio = mapper_config::profile_to_studio_config(&profile, &name, &cfg.defaults)?;

    if global.insecure {
        studio.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        studio.timeout = Duration::from_secs(secs);
    }

    Ok(studio)
}
