use std::{collections::HashMap, fs};

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".into(),
            max_body_bytes: 64 * 1024,
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    resolve_settings(file.as_deref(), |key| std::env::var(key).ok())
}

/// `server.toml` values override the defaults and `APP__*` variables
/// override both. Unparseable values are skipped.
pub fn resolve_settings(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(file_cfg) = file.and_then(|raw| toml::from_str::<HashMap<String, String>>(raw).ok()) {
        if let Some(v) = file_cfg.get("bind_addr") {
            settings.bind_addr = v.clone();
        }
        if let Some(v) = file_cfg.get("max_body_bytes").and_then(|v| v.parse().ok()) {
            settings.max_body_bytes = v;
        }
    }

    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__MAX_BODY_BYTES").and_then(|v| v.parse().ok()) {
        settings.max_body_bytes = v;
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
