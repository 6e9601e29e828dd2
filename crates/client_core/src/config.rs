use std::{collections::HashMap, fmt, fs, path::Path};

use anyhow::Context;
use shared::locale::Locale;
use url::Url;

const CLIENT_CONFIG_FILE: &str = "client.toml";

/// Bearer token attached to every remote request. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn bearer_token(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub image_base_url: String,
    pub api_token: ApiCredential,
    pub language: String,
    pub scratch_pad_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.themoviedb.org/3".into(),
            image_base_url: "https://image.tmdb.org/t/p".into(),
            api_token: ApiCredential::new(""),
            language: "en-US".into(),
            scratch_pad_url: "sqlite://./data/scratch.db".into(),
        }
    }
}

impl ClientSettings {
    pub fn api_base(&self) -> anyhow::Result<Url> {
        parse_base_url(&self.api_base_url)
            .with_context(|| format!("invalid api base url '{}'", self.api_base_url))
    }

    pub fn image_base(&self) -> anyhow::Result<Url> {
        parse_base_url(&self.image_base_url)
            .with_context(|| format!("invalid image base url '{}'", self.image_base_url))
    }

    /// Language of user-facing messages, derived from `language`.
    pub fn locale(&self) -> Locale {
        Locale::from_language(&self.language)
    }
}

/// Defaults, then `client.toml` in the working directory, then environment overrides.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(CLIENT_CONFIG_FILE))
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file_overrides(&mut settings, &file_cfg);
        }
    }

    if let Ok(v) = std::env::var("TMDB_API_TOKEN") {
        settings.api_token = ApiCredential::new(v);
    }
    if let Ok(v) = std::env::var("APP__API_TOKEN") {
        settings.api_token = ApiCredential::new(v);
    }

    if let Ok(v) = std::env::var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("APP__IMAGE_BASE_URL") {
        settings.image_base_url = v;
    }
    if let Ok(v) = std::env::var("APP__LANGUAGE") {
        settings.language = v;
    }
    if let Ok(v) = std::env::var("APP__SCRATCH_PAD_URL") {
        settings.scratch_pad_url = v;
    }

    settings
}

fn apply_file_overrides(settings: &mut ClientSettings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("image_base_url") {
        settings.image_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("api_token") {
        settings.api_token = ApiCredential::new(v.clone());
    }
    if let Some(v) = file_cfg.get("language") {
        settings.language = v.clone();
    }
    if let Some(v) = file_cfg.get("scratch_pad_url") {
        settings.scratch_pad_url = v.clone();
    }
}

pub fn prepare_scratch_pad_url(raw: &str) -> String {
    let raw = raw.trim();

    if raw.is_empty() {
        return ClientSettings::default().scratch_pad_url;
    }

    if raw.starts_with("sqlite:") || raw.contains("://") {
        return raw.to_string();
    }

    format!("sqlite://{}", raw.replace('\\', "/"))
}

// `Url::join` drops the last segment unless the base ends with a slash.
fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
