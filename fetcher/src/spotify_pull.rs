use std::path::Path;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{
    spotify::{self, clamp_limit, SpotifyDocument},
    Source,
};
use tracing::{instrument, warn};

use crate::{
    api::{spotify::SpotifyClient, ApiClient, HttpError},
    artifact::Artifact,
    config::SpotifyConfig,
    credentials::{ServiceCredentials, SpotifyCredentials},
    pipeline::{Collector, Retrieval},
};

pub struct SpotifyPull {
    api: ApiClient,
    config: SpotifyConfig,
}

impl SpotifyPull {
    pub fn new(api: ApiClient, config: SpotifyConfig) -> Self {
        Self { api, config }
    }

    #[instrument(skip_all)]
    async fn pull(
        &self,
        credentials: &SpotifyCredentials,
        fetched_at: DateTime<Utc>,
    ) -> anyhow::Result<Retrieval> {
        let client = SpotifyClient::new(
            self.api.clone(),
            &self.config.api_base,
            &self.config.accounts_base,
        );
        let token = client.refresh_access_token(credentials).await?;

        let limit = clamp_limit(self.config.top_limit);
        let (tracks, artists) = tokio::join!(
            client.top_tracks(&token, limit),
            client.top_artists(&token, limit)
        );

        // Sections degrade independently: a failed list is published empty.
        let tracks = section("top tracks", tracks);
        let artists = section("top artists", artists);
        let partial = tracks.is_none() || artists.is_none();

        let document = SpotifyDocument::new(
            fetched_at,
            tracks
                .map(|raw| spotify::normalize_tracks(&raw, limit))
                .unwrap_or_default(),
            artists
                .map(|raw| spotify::normalize_artists(&raw, limit))
                .unwrap_or_default(),
        );
        let artifact = Artifact::new(&self.config.out_path, &document, document.item_count())?;

        Ok(if partial {
            Retrieval::PartialSuccess(vec![artifact])
        } else {
            Retrieval::Success(vec![artifact])
        })
    }
}

fn section(what: &str, result: Result<Value, HttpError>) -> Option<Value> {
    result
        .map_err(|e| warn!("Failed to fetch Spotify {what}, publishing it empty: {e}"))
        .ok()
}

#[async_trait]
impl Collector for SpotifyPull {
    fn source(&self) -> Source {
        Source::Spotify
    }

    fn output_path(&self) -> &Path {
        &self.config.out_path
    }

    async fn collect(
        &self,
        credentials: ServiceCredentials,
        fetched_at: DateTime<Utc>,
    ) -> Retrieval {
        let ServiceCredentials::SpotifyOAuth(credentials) = credentials else {
            return Retrieval::Failed(anyhow!("Spotify needs OAuth client credentials"));
        };

        self.pull(&credentials, fetched_at)
            .await
            .unwrap_or_else(Retrieval::Failed)
    }
}
