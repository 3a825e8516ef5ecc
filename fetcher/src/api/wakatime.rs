use serde_json::Value;
use shared::Source;
use tracing::instrument;

use super::{endpoint, ApiClient, Auth, HttpError};

#[derive(Clone)]
pub struct WakaTimeClient {
    api: ApiClient,
    base: String,
    api_key: String,
}

impl WakaTimeClient {
    pub fn new(api: ApiClient, base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api,
            base: base.into(),
            api_key: api_key.into(),
        }
    }

    /// The key is sent as the Basic auth user with an empty password.
    #[instrument(skip(self))]
    pub async fn last_7_days(&self) -> Result<Value, HttpError> {
        let url = endpoint(
            Source::WakaTime,
            &self.base,
            &["users", "current", "stats", "last_7_days"],
        )?;
        let auth = Auth::Basic {
            user: &self.api_key,
            password: "",
        };
        self.api.get(Source::WakaTime, url, auth, &[]).await
    }
}
