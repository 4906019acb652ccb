use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use toml::{Table, Value};
use url::Url;

use crate::calendar::Locale;

pub const SETTINGS_FILE: &str = "booking.toml";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub service_url: String,
    pub company_id: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub locale: Locale,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:54321/functions/v1".into(),
            company_id: String::new(),
            api_key: None,
            request_timeout_secs: 15,
            locale: Locale::Nl,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(file_cfg) = read_settings_file(path) {
        apply_file_settings(&mut settings, &file_cfg);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn read_settings_file(path: &Path) -> Option<Table> {
    let raw = fs::read_to_string(path).ok()?;
    match raw.parse::<Table>() {
        Ok(file_cfg) => Some(file_cfg),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
            None
        }
    }
}

/// Applies every recognised key on its own; a badly typed value is skipped with a
/// warning instead of discarding the rest of the file.
fn apply_file_settings(settings: &mut ClientSettings, file_cfg: &Table) {
    if let Some(v) = file_string(file_cfg, "service_url") {
        settings.service_url = v;
    }
    if let Some(v) = file_string(file_cfg, "company_id") {
        settings.company_id = v;
    }
    if let Some(v) = file_string(file_cfg, "api_key") {
        settings.api_key = Some(v);
    }
    if let Some(v) = file_string(file_cfg, "locale") {
        settings.locale = Locale::from_tag(&v);
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        let parsed = match v {
            Value::Integer(secs) => u64::try_from(*secs).ok(),
            Value::String(secs) => secs.trim().parse::<u64>().ok(),
            _ => None,
        };
        match parsed {
            Some(secs) => settings.request_timeout_secs = secs,
            None => {
                tracing::warn!(key = "request_timeout_secs", value = %v, "expected a whole number of seconds")
            }
        }
    }
}

fn file_string(file_cfg: &Table, key: &str) -> Option<String> {
    match file_cfg.get(key)? {
        Value::String(v) => Some(v.clone()),
        other => {
            tracing::warn!(key, value = %other, "expected a string setting");
            None
        }
    }
}

fn apply_env_overrides(settings: &mut ClientSettings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("BOOKING_SERVICE_URL") {
        settings.service_url = v;
    }
    if let Some(v) = env("APP__SERVICE_URL") {
        settings.service_url = v;
    }

    if let Some(v) = env("BOOKING_COMPANY_ID") {
        settings.company_id = v;
    }
    if let Some(v) = env("APP__COMPANY_ID") {
        settings.company_id = v;
    }

    if let Some(v) = env("BOOKING_API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = env("APP__API_KEY") {
        settings.api_key = Some(v);
    }

    if let Some(v) = env("BOOKING_LOCALE") {
        settings.locale = Locale::from_tag(&v);
    }
    if let Some(v) = env("APP__LOCALE") {
        settings.locale = Locale::from_tag(&v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

/// Normalizes and validates the scheduling service base URL.
pub fn prepare_service_url(raw_service_url: &str) -> anyhow::Result<String> {
    let normalized = normalize_service_url(raw_service_url);
    let parsed = Url::parse(&normalized)
        .with_context(|| format!("invalid scheduling service url '{raw_service_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "scheduling service url must use http or https, got '{}'",
            parsed.scheme()
        );
    }
    if parsed.host_str().is_none() {
        bail!("scheduling service url '{raw_service_url}' has no host");
    }
    Ok(normalized)
}

fn normalize_service_url(raw_service_url: &str) -> String {
    let raw_service_url = raw_service_url.trim();

    if raw_service_url.is_empty() {
        return ClientSettings::default().service_url;
    }

    let with_scheme = if raw_service_url.contains("://") {
        raw_service_url.to_string()
    } else {
        format!("https://{raw_service_url}")
    };

    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
