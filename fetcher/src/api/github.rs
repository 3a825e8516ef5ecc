use serde_json::Value;
use shared::Source;
use tracing::instrument;

use super::{endpoint, ApiClient, Auth, HttpError};

/// Public contributions proxy, one calendar per GitHub user.
#[derive(Clone, Debug)]
pub struct ContributionsClient {
    api: ApiClient,
    base: String,
    username: String,
}

impl ContributionsClient {
    pub fn new(api: ApiClient, base: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            api,
            base: base.into(),
            username: username.into(),
        }
    }

    /// Yearless calendar, used for its `total` per-year counts.
    #[instrument(skip(self), fields(username = %self.username))]
    pub async fn total(&self) -> Result<Value, HttpError> {
        self.fetch(&[]).await
    }

    #[instrument(skip(self), fields(username = %self.username))]
    pub async fn year(&self, year: i32) -> Result<Value, HttpError> {
        self.fetch(&[("y", year.to_string())]).await
    }

    async fn fetch(&self, query: &[(&str, String)]) -> Result<Value, HttpError> {
        let url = endpoint(Source::GitHub, &self.base, &[&self.username])?;
        self.api.get(Source::GitHub, url, Auth::None, query).await
    }
}
