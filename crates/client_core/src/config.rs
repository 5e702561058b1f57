use std::{fs, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::warn;

use crate::{
    explorer::CoreOptions,
    l10n::DEFAULT_LANG,
    refresh::{DEFAULT_TIP_INTERVAL, DEFAULT_TIP_MIN_SPACING},
};

pub const SETTINGS_FILE: &str = "explorer.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_url: String,
    pub default_lang: String,
    pub tip_refresh_secs: u64,
    pub tip_min_spacing_secs: u64,
    pub preferences_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "https://blockstream.info/api".into(),
            default_lang: DEFAULT_LANG.into(),
            tip_refresh_secs: DEFAULT_TIP_INTERVAL.as_secs(),
            tip_min_spacing_secs: DEFAULT_TIP_MIN_SPACING.as_secs(),
            preferences_path: None,
        }
    }
}

impl Settings {
    pub fn tip_interval(&self) -> Duration {
        Duration::from_secs(self.tip_refresh_secs.max(1))
    }

    pub fn tip_min_spacing(&self) -> Duration {
        Duration::from_secs(self.tip_min_spacing_secs)
    }

    pub fn core_options(&self) -> CoreOptions {
        CoreOptions {
            default_lang: self.default_lang.clone(),
            tip_interval: self.tip_interval(),
            tip_min_spacing: self.tip_min_spacing(),
            ..CoreOptions::default()
        }
    }
}

/// Keys accepted in `explorer.toml`. Absent keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    default_lang: Option<String>,
    tip_refresh_secs: Option<u64>,
    tip_min_spacing_secs: Option<u64>,
    preferences_path: Option<PathBuf>,
}

impl FileSettings {
    fn apply(self, settings: &mut Settings) {
        if let Some(v) = self.api_url {
            settings.api_url = v;
        }
        if let Some(v) = self.default_lang {
            settings.default_lang = v;
        }
        if let Some(v) = self.tip_refresh_secs {
            settings.tip_refresh_secs = v;
        }
        if let Some(v) = self.tip_min_spacing_secs {
            settings.tip_min_spacing_secs = v;
        }
        if let Some(v) = self.preferences_path {
            settings.preferences_path = Some(v);
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then `path` if it exists, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => file_cfg.apply(&mut settings),
            Err(err) => warn!(path = %path.display(), "ignoring malformed settings file: {err}"),
        }
    }

    if let Some(v) = env("API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("APP__DEFAULT_LANG") {
        settings.default_lang = v;
    }

    if let Some(v) = env("APP__TIP_REFRESH_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.tip_refresh_secs = parsed;
        }
    }
    if let Some(v) = env("APP__TIP_MIN_SPACING_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.tip_min_spacing_secs = parsed;
        }
    }

    if let Some(v) = env("APP__PREFERENCES_PATH") {
        settings.preferences_path = Some(PathBuf::from(v));
    }

    settings
}
