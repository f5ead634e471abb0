//! Shared configuration for the Mapper console.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), the
//! durable storage location, and translation to `mapper_core::StudioConfig`.
//! The CLI layers its global flags on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mapper_api::{DEFAULT_API_URL, DEFAULT_WS_URL, ReconnectConfig, TlsMode};
use mapper_core::StudioConfig;

const KEYRING_SERVICE: &str = "mapper";
const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to store credentials in keyring: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The profile the CLI uses when `--profile` is not given.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// REST base URL (e.g., "http://localhost:8000/api").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Notification socket base URL.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Username to sign in with.
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Reconnect the notification socket after it drops.
    #[serde(default)]
    pub reconnect: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            ws_url: default_ws_url(),
            username: None,
            password: None,
            password_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            reconnect: false,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_ws_url() -> String {
    DEFAULT_WS_URL.into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "mapper", "mapper")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Durable storage file for a profile's session and UI preferences.
///
/// The default profile uses `storage.json`; other profiles get their own
/// file so their sessions never overwrite each other.
pub fn storage_path(profile_name: &str) -> PathBuf {
    let dir = project_dirs().map_or_else(dirs_fallback, |dirs| dirs.data_dir().to_path_buf());
    if profile_name == DEFAULT_PROFILE {
        dir.join("storage.json")
    } else {
        dir.join(format!("storage-{profile_name}.json"))
    }
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("mapper");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + `MAPPER_*` environment variables.
///
/// Nested keys use a double underscore: `MAPPER_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MAPPER_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Resolve the sign-in password: env var, then keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `StudioConfig` from a profile, without CLI flag overrides.
pub fn profile_to_studio_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<StudioConfig, ConfigError> {
    validate_url("api_url", &profile.api_url, &["http", "https"])?;
    validate_url("ws_url", &profile.ws_url, &["ws", "wss"])?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let reconnect = if profile.reconnect {
        ReconnectConfig::forever()
    } else {
        ReconnectConfig::disabled()
    };

    Ok(StudioConfig {
        api_url: profile.api_url.clone(),
        ws_url: profile.ws_url.clone(),
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        reconnect,
        storage_path: Some(storage_path(profile_name)),
    })
}

fn validate_url(field: &str, raw: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected {} URL, got '{raw}'", schemes.join(" or ")),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn toml_profiles_load_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[defaults]
output = "json"

[profiles.lab]
api_url = "https://mapper.lab.example.net/api"
username = "netops"
timeout = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile_name(), "lab");
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.timeout, 30);

        let lab = cfg.profile("lab").unwrap();
        assert_eq!(lab.ws_url, "ws://localhost:8000/ws");
        assert_eq!(lab.username.as_deref(), Some("netops"));
        assert!(matches!(
            cfg.profile("prod"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile_name(), "default");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                username: Some("alice".into()),
                insecure: Some(true),
                ..Profile::default()
            },
        );

        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn profile_translates_to_studio_config() {
        let profile = Profile {
            ca_cert: Some(PathBuf::from("/etc/mapper/ca.pem")),
            timeout: Some(10),
            reconnect: true,
            ..Profile::default()
        };
        let studio = profile_to_studio_config(&profile, "default", &Defaults::default()).unwrap();

        assert_eq!(studio.api_url, "http://localhost:8000/api");
        assert_eq!(studio.tls, TlsMode::CustomCa(PathBuf::from("/etc/mapper/ca.pem")));
        assert_eq!(studio.timeout, Duration::from_secs(10));
        assert!(studio.reconnect.is_enabled());
        assert!(
            studio
                .storage_path
                .is_some_and(|p| p.ends_with("storage.json"))
        );
    }

    #[test]
    fn insecure_default_applies_when_profile_is_silent() {
        let defaults = Defaults {
            insecure: true,
            ..Defaults::default()
        };
        let studio = profile_to_studio_config(&Profile::default(), "lab", &defaults).unwrap();
        assert_eq!(studio.tls, TlsMode::DangerAcceptInvalid);
        assert!(!studio.reconnect.is_enabled());
        assert!(
            studio
                .storage_path
                .is_some_and(|p| p.ends_with("storage-lab.json"))
        );
    }

    #[test]
    fn urls_are_validated_by_scheme() {
        let profile = Profile {
            ws_url: "http://localhost:8000/ws".into(),
            ..Profile::default()
        };
        let err = profile_to_studio_config(&profile, "default", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "ws_url"));

        let profile = Profile {
            api_url: "not a url".into(),
            ..Profile::default()
        };
        assert!(profile_to_studio_config(&profile, "default", &Defaults::default()).is_err());
    }

    #[test]
    fn plaintext_password_is_the_last_resort() {
        let profile = Profile {
            password: Some("from-config".into()),
            password_env: Some("MAPPER_TEST_PASSWORD_THAT_IS_NEVER_SET".into()),
            ..Profile::default()
        };
        let secret = resolve_password(&profile, "mapper-config-test-profile").unwrap();
        assert_eq!(secrecy::ExposeSecret::expose_secret(&secret), "from-config");

        let err = resolve_password(&Profile::default(), "mapper-config-test-profile").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }
}
