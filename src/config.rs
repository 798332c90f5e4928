#![forbid(unsafe_code)]

use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_MEDIA_API_BASE: &str = "https://fast.wistia.com/embed/medias";
pub const DEFAULT_DOWNLOAD_DIR: &str = "wistia_downloads";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.6 Safari/605.1.15";
pub const DEFAULT_PACING_MS: u64 = 1000;

const MEDIA_API_BASE_VAR: &str = "WISTIA_MEDIA_API_BASE";
const DOWNLOAD_DIR_VAR: &str = "WISTIA_DOWNLOAD_DIR";
const USER_AGENT_VAR: &str = "WISTIA_USER_AGENT";
const PACING_MS_VAR: &str = "WISTIA_PACING_MS";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Prefix of the public per-media JSON endpoint, without trailing slash.
    pub media_api_base: String,
    /// Directory that channel runs write into, relative to the working dir.
    pub download_dir: PathBuf,
    pub user_agent: String,
    /// Pause inserted after every attempted channel download.
    pub pacing_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            media_api_base: DEFAULT_MEDIA_API_BASE.to_string(),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pacing_delay: Duration::from_millis(DEFAULT_PACING_MS),
        }
    }
}

impl Settings {
    pub fn media_json_url(&self, media_id: &str) -> String {
        format!(
            "{}/{}.json",
            self.media_api_base.trim_end_matches('/'),
            media_id
        )
    }
}

pub fn load_settings() -> Settings {
    resolve_settings(SettingsOverrides::default())
}

#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub media_api_base: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub pacing_delay: Option<Duration>,
}

pub fn resolve_settings(overrides: SettingsOverrides) -> Settings {
    build_settings(env_var_string, overrides)
}

fn build_settings(
    env_lookup: impl Fn(&str) -> Option<String>,
    overrides: SettingsOverrides,
) -> Settings {
    let media_api_base = non_blank(overrides.media_api_base)
        .or_else(|| env_lookup(MEDIA_API_BASE_VAR))
        .unwrap_or_else(|| DEFAULT_MEDIA_API_BASE.to_string());
    let download_dir = overrides
        .download_dir
        .or_else(|| env_lookup(DOWNLOAD_DIR_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR));
    let user_agent = non_blank(overrides.user_agent)
        .or_else(|| env_lookup(USER_AGENT_VAR))
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let pacing_delay = overrides
        .pacing_delay
        .or_else(|| {
            env_lookup(PACING_MS_VAR)
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_millis)
        })
        .unwrap_or(Duration::from_millis(DEFAULT_PACING_MS));
    Settings {
        media_api_base,
        download_dir,
        user_agent,
        pacing_delay,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_var_string(key: &str) -> Option<String> {
    non_blank(env::var(key).ok())
}
