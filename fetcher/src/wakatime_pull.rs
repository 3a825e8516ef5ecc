use std::path::Path;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{wakatime, Source};
use tracing::instrument;

use crate::{
    api::{wakatime::WakaTimeClient, ApiClient},
    artifact::Artifact,
    config::WakaTimeConfig,
    credentials::ServiceCredentials,
    pipeline::{Collector, Retrieval},
};

pub struct WakaTimePull {
    api: ApiClient,
    config: WakaTimeConfig,
}

impl WakaTimePull {
    pub fn new(api: ApiClient, config: WakaTimeConfig) -> Self {
        Self { api, config }
    }

    #[instrument(skip_all)]
    async fn pull(
        &self,
        client: &WakaTimeClient,
        fetched_at: DateTime<Utc>,
    ) -> anyhow::Result<Artifact> {
        let raw = client.last_7_days().await?;
        let document = wakatime::normalize(&raw, fetched_at)
            .ok_or_else(|| anyhow!("WakaTime stats response has no data object"))?;
        Artifact::new(&self.config.out_path, &document, document.bucket_count())
    }
}

#[async_trait]
impl Collector for WakaTimePull {
    fn source(&self) -> Source {
        Source::WakaTime
    }

    fn output_path(&self) -> &Path {
        &self.config.out_path
    }

    async fn collect(
        &self,
        credentials: ServiceCredentials,
        fetched_at: DateTime<Utc>,
    ) -> Retrieval {
        let ServiceCredentials::ApiKey(api_key) = credentials else {
            return Retrieval::Failed(anyhow!("WakaTime needs an API key"));
        };

        let client = WakaTimeClient::new(self.api.clone(), &self.config.api_base, api_key);
        match self.pull(&client, fetched_at).await {
            Ok(artifact) => Retrieval::Success(vec![artifact]),
            Err(e) => Retrieval::Failed(e),
        }
    }
}
