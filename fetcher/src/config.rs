use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::spotify::DEFAULT_LIMIT;

use crate::consts::*;

/// Everything a run needs from the environment, read once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub http: HttpConfig,
    pub sample_dir: PathBuf,
    pub github: GithubConfig,
    pub wakatime: WakaTimeConfig,
    pub monkeytype: MonkeytypeConfig,
    pub spotify: SpotifyConfig,
}

/// `FETCH_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// `GITHUB_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    #[serde(default = "default_github_out_dir")]
    pub out_dir: PathBuf,
}

/// `WAKATIME_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct WakaTimeConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_wakatime_api_base")]
    pub api_base: String,
    #[serde(default = "default_wakatime_out_path")]
    pub out_path: PathBuf,
}

/// `MONKEYTYPE_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct MonkeytypeConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_monkeytype_api_base")]
    pub api_base: String,
    #[serde(default = "default_monkeytype_out_path")]
    pub out_path: PathBuf,
}

/// `SPOTIFY_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default = "default_spotify_api_base")]
    pub api_base: String,
    #[serde(default = "default_spotify_accounts_base")]
    pub accounts_base: String,
    #[serde(default = "default_top_limit")]
    pub top_limit: u32,
    #[serde(default = "default_spotify_out_path")]
    pub out_path: PathBuf,
}

#[derive(Deserialize)]
struct GeneralEnv {
    #[serde(default = "default_sample_dir")]
    sample_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> anyhow::Result<Self> {
        // Blank values fall back to defaults, the way an unset variable does.
        let vars: Vec<(String, String)> = vars
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();
        let general: GeneralEnv =
            envy::from_iter(vars.clone()).context("Failed to read SAMPLE_DIR")?;

        Ok(Self {
            http: envy::prefixed("FETCH_")
                .from_iter(vars.clone())
                .context("Failed to read FETCH_* variables")?,
            sample_dir: general.sample_dir,
            github: envy::prefixed("GITHUB_")
                .from_iter(vars.clone())
                .context("Failed to read GITHUB_* variables")?,
            wakatime: envy::prefixed("WAKATIME_")
                .from_iter(vars.clone())
                .context("Failed to read WAKATIME_* variables")?,
            monkeytype: envy::prefixed("MONKEYTYPE_")
                .from_iter(vars.clone())
                .context("Failed to read MONKEYTYPE_* variables")?,
            spotify: envy::prefixed("SPOTIFY_")
                .from_iter(vars)
                .context("Failed to read SPOTIFY_* variables")?,
        })
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl GithubConfig {
    pub fn manifest_path(&self) -> PathBuf {
        self.out_dir.join(GITHUB_MANIFEST_FILE)
    }

    pub fn year_path(&self, year: i32) -> PathBuf {
        self.out_dir.join(format!("{year}.json"))
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_sample_dir() -> PathBuf {
    SAMPLE_DIR.into()
}

fn default_github_api_base() -> String {
    GITHUB_API_BASE.to_string()
}

fn default_github_out_dir() -> PathBuf {
    GITHUB_OUT_DIR.into()
}

fn default_wakatime_api_base() -> String {
    WAKATIME_API_BASE.to_string()
}

fn default_wakatime_out_path() -> PathBuf {
    WAKATIME_OUT_PATH.into()
}

fn default_monkeytype_api_base() -> String {
    MONKEYTYPE_API_BASE.to_string()
}

fn default_monkeytype_out_path() -> PathBuf {
    MONKEYTYPE_OUT_PATH.into()
}

fn default_spotify_api_base() -> String {
    SPOTIFY_API_BASE.to_string()
}

fn default_spotify_accounts_base() -> String {
    SPOTIFY_ACCOUNTS_BASE.to_string()
}

fn default_top_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_spotify_out_path() -> PathBuf {
    SPOTIFY_OUT_PATH.into()
}
