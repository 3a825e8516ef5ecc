use std::path::Path;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{
    monkeytype::{self, MonkeytypeSource},
    Source,
};
use tracing::{instrument, warn};

use crate::{
    api::{monkeytype::MonkeytypeClient, ApiClient, HttpError},
    artifact::Artifact,
    config::MonkeytypeConfig,
    credentials::ServiceCredentials,
    pipeline::{Collector, Retrieval},
};

pub struct MonkeytypePull {
    api: ApiClient,
    config: MonkeytypeConfig,
}

impl MonkeytypePull {
    pub fn new(api: ApiClient, config: MonkeytypeConfig) -> Self {
        Self { api, config }
    }

    /// Each call stands alone: a failure leaves its slot empty and the others
    /// still run.
    #[instrument(skip_all)]
    async fn gather(&self, client: &MonkeytypeClient) -> MonkeytypeSource {
        let (results, personal_bests) = tokio::join!(client.results(), client.personal_bests());
        let results = settle("recent results", results);
        let personal_bests = settle("personal bests", personal_bests);

        let uid = results.as_ref().and_then(monkeytype::uid_of_latest);
        let id = uid.as_deref().unwrap_or(&self.config.username);
        let profile = if id.is_empty() {
            None
        } else {
            settle("profile", client.profile(id).await)
        };

        MonkeytypeSource {
            profile,
            personal_bests,
            results,
        }
    }
}

fn settle(what: &str, result: Result<Value, HttpError>) -> Option<Value> {
    result
        .map_err(|e| warn!("Failed to fetch Monkeytype {what}: {e}"))
        .ok()
        .filter(|value| !value.is_null())
}

#[async_trait]
impl Collector for MonkeytypePull {
    fn source(&self) -> Source {
        Source::Monkeytype
    }

    fn output_path(&self) -> &Path {
        &self.config.out_path
    }

    async fn collect(&self, credentials: ServiceCredentials, _: DateTime<Utc>) -> Retrieval {
        let ServiceCredentials::ApiKey(ape_key) = credentials else {
            return Retrieval::Failed(anyhow!("Monkeytype needs an ApeKey"));
        };

        let client = MonkeytypeClient::new(self.api.clone(), &self.config.api_base, ape_key);
        let source = self.gather(&client).await;
        if source.is_empty() {
            return Retrieval::Failed(anyhow!("Every Monkeytype request failed"));
        }

        let document = monkeytype::normalize(&source);
        let items = document.recent.len();
        let artifact = match Artifact::new(&self.config.out_path, &document, items) {
            Ok(artifact) => artifact,
            Err(e) => return Retrieval::Failed(e),
        };

        if source.is_complete() {
            Retrieval::Success(vec![artifact])
        } else {
            Retrieval::PartialSuccess(vec![artifact])
        }
    }
}
