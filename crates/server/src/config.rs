use std::{collections::HashMap, fs};

use serde::Deserialize;
use shared::domain::{DEFAULT_BIND_ADDR, DEFAULT_DELAY_MS, DELAY_STEP_MS};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub initial_delay_ms: u64,
    pub delay_step_ms: u64,
    pub console: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            initial_delay_ms: DEFAULT_DELAY_MS,
            delay_step_ms: DELAY_STEP_MS,
            console: true,
        }
    }
}

/// Defaults, then `server.toml`, then environment. Later sources win; values
/// that fail to parse are skipped.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        match parse_file_overrides(&raw) {
            Ok(file_cfg) => settings.apply_overrides(|key| file_cfg.get(key).cloned()),
            Err(error) => warn!(%error, "ignoring unreadable server.toml"),
        }
    }

    settings.apply_overrides(|key| env_override(key, |name| std::env::var(name).ok()));
    settings
}

impl Settings {
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("bind_addr") {
            self.bind_addr = v;
        }
        if let Some(v) = lookup("initial_delay_ms").and_then(|v| v.trim().parse().ok()) {
            self.initial_delay_ms = v;
        }
        if let Some(v) = lookup("delay_step_ms").and_then(|v| v.trim().parse().ok()) {
            self.delay_step_ms = v;
        }
        if let Some(v) = lookup("console").and_then(|v| parse_flag(&v)) {
            self.console = v;
        }
    }
}

fn parse_file_overrides(raw: &str) -> Result<HashMap<String, String>, toml::de::Error> {
    let table = toml::from_str::<HashMap<String, toml::Value>>(raw)?;
    Ok(table
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                _ => return None,
            };
            Some((key, value))
        })
        .collect())
}

/// `APP__<KEY>` first, then the bare `SERVER_BIND` name for the bind address.
fn env_override(key: &str, var: impl Fn(&str) -> Option<String>) -> Option<String> {
    let prefixed = format!("APP__{}", key.to_ascii_uppercase());
    var(&prefixed).or_else(|| match key {
        "bind_addr" => var("SERVER_BIND"),
        _ => None,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
