use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use client_core::{ValidationPolicy, DEFAULT_BASE_PATH, DEFAULT_REQUEST_TIMEOUT};
use serde::Deserialize;
use tracing::{info, warn};

use crate::Args;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub base_path: String,
    pub request_timeout: Duration,
    pub validation: ValidationPolicy,
    pub offline: bool,
    pub database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3001".into(),
            base_path: DEFAULT_BASE_PATH.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            validation: ValidationPolicy::default(),
            offline: false,
            database_url: "sqlite://./data/phonebook.db".into(),
        }
    }
}

/// Keys accepted in `phonebook.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    base_path: Option<String>,
    request_timeout_secs: Option<u64>,
    validation: Option<String>,
    offline: Option<bool>,
    database_url: Option<String>,
}

/// Defaults, then the settings file, then `PHONEBOOK_*` variables, then
/// command-line flags.
pub fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = read_settings_file(&args.config)? {
        apply_file_settings(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", args.config.display()))?;
    }
    apply_env_settings(&mut settings, |key| std::env::var(key).ok());
    apply_args(&mut settings, args);
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            info!(path = %path.display(), "loaded settings file");
            Ok(Some(raw))
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(anyhow::Error::new(error)
            .context(format!("failed to read settings file '{}'", path.display()))),
    }
}

fn apply_file_settings(settings: &mut Settings, raw: &str) -> Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file.base_path {
        settings.base_path = v;
    }
    if let Some(timeout) = file
        .request_timeout_secs
        .and_then(|secs| request_timeout(secs, "request_timeout_secs"))
    {
        settings.request_timeout = timeout;
    }
    if let Some(v) = file.validation {
        settings.validation = v.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(v) = file.offline {
        settings.offline = v;
    }
    if let Some(v) = file.database_url {
        settings.database_url = v;
    }
    Ok(())
}

fn apply_env_settings(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("PHONEBOOK_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("PHONEBOOK_BASE_PATH") {
        settings.base_path = v;
    }
    if let Some(v) = var("PHONEBOOK_REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(secs) => {
                if let Some(timeout) = request_timeout(secs, "PHONEBOOK_REQUEST_TIMEOUT_SECS") {
                    settings.request_timeout = timeout;
                }
            }
            Err(error) => warn!(value = %v, %error, "invalid PHONEBOOK_REQUEST_TIMEOUT_SECS"),
        }
    }
    if let Some(v) = var("PHONEBOOK_VALIDATION") {
        match v.parse::<ValidationPolicy>() {
            Ok(policy) => settings.validation = policy,
            Err(error) => warn!(value = %v, %error, "invalid PHONEBOOK_VALIDATION"),
        }
    }
    if let Some(v) = var("PHONEBOOK_DATABASE_URL") {
        settings.database_url = v;
    }
}

fn apply_args(settings: &mut Settings, args: &Args) {
    if let Some(v) = &args.server_url {
        settings.server_url = v.clone();
    }
    if let Some(v) = &args.base_path {
        settings.base_path = v.clone();
    }
    if let Some(timeout) = args
        .timeout_secs
        .and_then(|secs| request_timeout(secs, "--timeout-secs"))
    {
        settings.request_timeout = timeout;
    }
    if let Some(policy) = args.validation {
        settings.validation = policy;
    }
    if args.offline {
        settings.offline = true;
    }
    if let Some(v) = &args.database_url {
        settings.database_url = v.clone();
    }
}

/// A zero timeout would fail every request before it is sent.
fn request_timeout(secs: u64, source: &str) -> Option<Duration> {
    if secs == 0 {
        warn!(source, "request timeout must be at least one second; ignoring 0");
        return None;
    }
    Some(Duration::from_secs(secs))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
