use std::{io::ErrorKind, path::PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{spotify::SpotifyDocument, wakatime::WakaTimeDocument, Source};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FallbackOrigin {
    Sample,
    Stub,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fallback {
    pub body: Value,
    pub origin: FallbackOrigin,
}

/// Stand-in documents for runs that cannot produce live data.
#[derive(Debug, Clone)]
pub struct FallbackProvider {
    sample_dir: PathBuf,
}

impl FallbackProvider {
    pub fn new(sample_dir: impl Into<PathBuf>) -> Self {
        Self {
            sample_dir: sample_dir.into(),
        }
    }

    pub fn sample_path(&self, source: Source) -> PathBuf {
        self.sample_dir.join(source.sample_file_name())
    }

    /// The bundled sample as stored, or `None` when the source has none.
    pub async fn load_sample(&self, source: Source) -> anyhow::Result<Option<Value>> {
        let path = self.sample_path(source);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let sample = serde_json::from_slice(&bytes)
            .with_context(|| format!("Sample {} is not valid JSON", path.display()))?;
        Ok(Some(sample))
    }

    /// Sample first, then an empty document for sources that can render one.
    /// Contribution calendars and typing stats have no meaningful empty form.
    pub async fn provide(
        &self,
        source: Source,
        fetched_at: DateTime<Utc>,
    ) -> anyhow::Result<Fallback> {
        if source != Source::GitHub {
            if let Some(body) = self.load_sample(source).await? {
                return Ok(Fallback {
                    body,
                    origin: FallbackOrigin::Sample,
                });
            }
        }

        let stub = match source {
            Source::WakaTime => serde_json::to_value(WakaTimeDocument::empty(fetched_at))?,
            Source::Spotify => serde_json::to_value(SpotifyDocument::empty(fetched_at))?,
            Source::GitHub | Source::Monkeytype => bail!(
                "No fallback available for {source}: {} is missing and there is no stub",
                self.sample_path(source).display()
            ),
        };

        Ok(Fallback {
            body: stub,
            origin: FallbackOrigin::Stub,
        })
    }
}

/// Item count reported for a fallback document, read off its list fields.
pub fn item_count(source: Source, body: &Value) -> usize {
    let pointers: &[&str] = match source {
        Source::GitHub => &["/years"],
        Source::WakaTime => &["/languages", "/projects", "/editors"],
        Source::Monkeytype => &["/recent"],
        Source::Spotify => &["/top/tracks/medium_term", "/top/artists/medium_term"],
    };

    pointers
        .iter()
        .filter_map(|pointer| body.pointer(pointer))
        .filter_map(Value::as_array)
        .map(Vec::len)
        .sum()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn sample_is_returned_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{"summary":{"tests":3,"timeTyping":90},"profile":null,"recent":[{},{}]}"#;
        std::fs::write(dir.path().join("monkeytype.sample.json"), raw).unwrap();

        let provider = FallbackProvider::new(dir.path());
        let fallback = provider.provide(Source::Monkeytype, Utc::now()).await.unwrap();
        assert_eq!(fallback.origin, FallbackOrigin::Sample);
        assert_eq!(serde_json::to_string(&fallback.body).unwrap(), raw);
        assert_eq!(item_count(Source::Monkeytype, &fallback.body), 2);
    }

    #[tokio::test]
    async fn stub_is_used_without_sample() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FallbackProvider::new(dir.path());

        let fallback = provider.provide(Source::Spotify, Utc::now()).await.unwrap();
        assert_eq!(fallback.origin, FallbackOrigin::Stub);
        assert_eq!(fallback.body["top"]["artists"]["medium_term"], json!([]));

        let fallback = provider.provide(Source::WakaTime, Utc::now()).await.unwrap();
        assert_eq!(fallback.body["totalSeconds"], json!(0.0));
        assert_eq!(item_count(Source::WakaTime, &fallback.body), 0);
    }

    #[tokio::test]
    async fn sources_without_stub_fail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("github.sample.json"), "{}").unwrap();
        let provider = FallbackProvider::new(dir.path());

        assert!(provider.provide(Source::Monkeytype, Utc::now()).await.is_err());
        assert!(provider.provide(Source::GitHub, Utc::now()).await.is_err());
    }

    #[tokio::test]
    async fn malformed_sample_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wakatime.sample.json"), "{ nope").unwrap();
        let provider = FallbackProvider::new(dir.path());

        assert!(provider.load_sample(Source::WakaTime).await.is_err());
        assert_eq!(provider.load_sample(Source::Spotify).await.unwrap(), None);
    }
}
