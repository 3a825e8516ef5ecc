#![allow(dead_code)]

use std::path::{Path, PathBuf};

use httpmock::MockServer;
use portfolio_stats_fetcher::{config::Config, Source};
use serde_json::Value;
use tempfile::TempDir;

/// Every upstream pointed at one mock server, every artifact inside a
/// temporary directory.
pub struct Harness {
    pub dir: TempDir,
    pub config: Config,
}

impl Harness {
    pub fn new(server: &MockServer, vars: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let base = server.base_url();
        let path = |name: &str| root.join(name).display().to_string();

        let mut pairs = vec![
            ("GITHUB_API_BASE".to_string(), base.clone()),
            ("WAKATIME_API_BASE".to_string(), base.clone()),
            ("MONKEYTYPE_API_BASE".to_string(), base.clone()),
            ("SPOTIFY_API_BASE".to_string(), base.clone()),
            ("SPOTIFY_ACCOUNTS_BASE".to_string(), base),
            ("GITHUB_OUT_DIR".to_string(), path("github")),
            ("WAKATIME_OUT_PATH".to_string(), path("wakatime.json")),
            ("MONKEYTYPE_OUT_PATH".to_string(), path("monkeytype.json")),
            ("SPOTIFY_OUT_PATH".to_string(), path("spotify.json")),
            ("SAMPLE_DIR".to_string(), path("samples")),
            ("FETCH_TIMEOUT_SECS".to_string(), "5".to_string()),
            ("FETCH_RETRY_DELAY_MS".to_string(), "0".to_string()),
        ];
        pairs.extend(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let config = Config::from_vars(pairs).unwrap();
        Self { dir, config }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_sample(&self, source: Source, body: &str) {
        let samples = self.path("samples");
        std::fs::create_dir_all(&samples).unwrap();
        std::fs::write(samples.join(source.sample_file_name()), body).unwrap();
    }
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}
