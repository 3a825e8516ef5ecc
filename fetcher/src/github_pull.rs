use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use futures::future::join_all;
use shared::{
    github::{discover_years, normalize_year, Manifest},
    Source,
};
use tracing::{info, instrument, warn};

use crate::{
    api::{github::ContributionsClient, ApiClient},
    artifact::Artifact,
    config::GithubConfig,
    credentials::ServiceCredentials,
    pipeline::{Collector, Retrieval},
};

pub struct GithubPull {
    api: ApiClient,
    config: GithubConfig,
    manifest_path: PathBuf,
}

impl GithubPull {
    pub fn new(api: ApiClient, config: GithubConfig) -> Self {
        let manifest_path = config.manifest_path();
        Self {
            api,
            config,
            manifest_path,
        }
    }

    #[instrument(skip(self, client))]
    async fn pull(
        &self,
        client: &ContributionsClient,
        fetched_at: DateTime<Utc>,
    ) -> anyhow::Result<Retrieval> {
        let total = client
            .total()
            .await
            .context("Failed to discover contribution years")?;
        let years = discover_years(&total, fetched_at.year());
        info!("Fetching contribution calendars for {years:?}");

        let fetches = years.iter().map(|&year| async move {
            let raw = client.year(year).await?;
            anyhow::Ok(normalize_year(&raw, year, fetched_at)?)
        });
        let results = join_all(fetches).await;

        let mut artifacts = Vec::with_capacity(years.len() + 1);
        let mut partial = false;
        for (year, result) in years.iter().zip(results) {
            match result {
                Ok(document) => {
                    let days = document.contributions.len();
                    let path = self.config.year_path(*year);
                    artifacts.push(Artifact::new(path, &document, days)?);
                }
                Err(e) => {
                    warn!("Skipping contributions for {year}: {e:#}");
                    partial = true;
                }
            }
        }

        // The manifest lists every requested year, fetched or not, and goes last.
        let manifest = Manifest { years, fetched_at };
        artifacts.push(Artifact::new(
            &self.manifest_path,
            &manifest,
            manifest.years.len(),
        )?);

        Ok(if partial {
            Retrieval::PartialSuccess(artifacts)
        } else {
            Retrieval::Success(artifacts)
        })
    }
}

#[async_trait]
impl Collector for GithubPull {
    fn source(&self) -> Source {
        Source::GitHub
    }

    fn output_path(&self) -> &Path {
        &self.manifest_path
    }

    async fn collect(
        &self,
        credentials: ServiceCredentials,
        fetched_at: DateTime<Utc>,
    ) -> Retrieval {
        let ServiceCredentials::Public { username } = credentials else {
            return Retrieval::Failed(anyhow::anyhow!("GitHub needs a username"));
        };

        let client = ContributionsClient::new(self.api.clone(), &self.config.api_base, username);
        self.pull(&client, fetched_at)
            .await
            .unwrap_or_else(Retrieval::Failed)
    }
}
