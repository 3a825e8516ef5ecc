use serde_json::Value;
use shared::{monkeytype::unwrap_envelope, Source};
use tracing::instrument;

use super::{endpoint, ApiClient, Auth, HttpError};

/// Ape-key authenticated client. Every response has its `{ message, data }`
/// envelope removed before it is returned.
#[derive(Clone)]
pub struct MonkeytypeClient {
    api: ApiClient,
    base: String,
    ape_key: String,
}

impl MonkeytypeClient {
    pub fn new(api: ApiClient, base: impl Into<String>, ape_key: impl Into<String>) -> Self {
        Self {
            api,
            base: base.into(),
            ape_key: ape_key.into(),
        }
    }

    #[instrument(skip(self))]
    pub async fn results(&self) -> Result<Value, HttpError> {
        self.fetch(&["results"], &[]).await
    }

    #[instrument(skip(self))]
    pub async fn personal_bests(&self) -> Result<Value, HttpError> {
        self.fetch(&["users", "personalBests"], &[("mode", "time".to_string())])
            .await
    }

    /// `uid_or_name` is either an account uid or a public username.
    #[instrument(skip(self))]
    pub async fn profile(&self, uid_or_name: &str) -> Result<Value, HttpError> {
        self.fetch(&["users", uid_or_name, "profile"], &[]).await
    }

    async fn fetch(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value, HttpError> {
        let url = endpoint(Source::Monkeytype, &self.base, segments)?;
        let raw = self
            .api
            .get(Source::Monkeytype, url, Auth::ApeKey(&self.ape_key), query)
            .await?;
        Ok(unwrap_envelope(raw))
    }
}
