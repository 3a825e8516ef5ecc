use serde_json::Value;
use shared::{spotify::MEDIUM_TERM, Source};
use tracing::instrument;

use super::{endpoint, ApiClient, Auth, HttpError};
use crate::credentials::SpotifyCredentials;

#[derive(Debug, thiserror::Error)]
pub enum TokenRefreshError {
    #[error("Spotify token refresh failed: {0}")]
    Http(#[from] HttpError),
    #[error("Spotify token response carried no access_token")]
    MissingAccessToken,
}

#[derive(Clone)]
pub struct SpotifyClient {
    api: ApiClient,
    api_base: String,
    accounts_base: String,
}

impl SpotifyClient {
    pub fn new(
        api: ApiClient,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
    ) -> Self {
        Self {
            api,
            api_base: api_base.into(),
            accounts_base: accounts_base.into(),
        }
    }

    /// Exchanges the long-lived refresh token for a short-lived access token.
    #[instrument(skip_all)]
    pub async fn refresh_access_token(
        &self,
        credentials: &SpotifyCredentials,
    ) -> Result<String, TokenRefreshError> {
        let url = endpoint(Source::Spotify, &self.accounts_base, &["api", "token"])?;
        let auth = Auth::Basic {
            user: &credentials.client_id,
            password: &credentials.client_secret,
        };
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", credentials.refresh_token.as_str()),
        ];

        let response = self.api.post_form(Source::Spotify, url, auth, &form).await?;
        response
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(ToString::to_string)
            .ok_or(TokenRefreshError::MissingAccessToken)
    }

    #[instrument(skip(self, token))]
    pub async fn top_tracks(&self, token: &str, limit: u32) -> Result<Value, HttpError> {
        self.top("tracks", token, limit).await
    }

    #[instrument(skip(self, token))]
    pub async fn top_artists(&self, token: &str, limit: u32) -> Result<Value, HttpError> {
        self.top("artists", token, limit).await
    }

    async fn top(&self, kind: &str, token: &str, limit: u32) -> Result<Value, HttpError> {
        let url = endpoint(Source::Spotify, &self.api_base, &["me", "top", kind])?;
        let query = [
            ("limit", limit.to_string()),
            ("time_range", MEDIUM_TERM.to_string()),
        ];
        self.api
            .get(Source::Spotify, url, Auth::Bearer(token), &query)
            .await
    }
}
