use std::{collections::HashMap, fs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub project_id: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            project_id: None,
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("editor.toml").ok();
    resolve_settings(file.as_deref(), |key| std::env::var(key).ok())
}

pub fn resolve_settings(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(file_cfg) = file.and_then(|raw| toml::from_str::<HashMap<String, String>>(raw).ok()) {
        if let Some(v) = file_cfg.get("server_url") {
            settings.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("project_id").and_then(|v| v.parse().ok()) {
            settings.project_id = Some(v);
        }
    }

    if let Some(v) = env("EDITOR__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("EDITOR__PROJECT_ID").and_then(|v| v.parse().ok()) {
        settings.project_id = Some(v);
    }

    settings
}
