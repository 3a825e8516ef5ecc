use std::path::{Path, PathBuf};

use anyhow::ensure;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::Source;
use strum::Display;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    artifact::Artifact,
    config::Config,
    credentials::{self, Resolution, ServiceCredentials},
    fallback::{self, FallbackOrigin, FallbackProvider},
};

/// Where one source's run currently stands.
///
/// `NotAttempted -> (Unavailable | InFlight) -> (Success | PartialSuccess | Failed)
/// -> (Written | FallbackWritten | FatalAborted)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    NotAttempted,
    Unavailable,
    InFlight,
    Success,
    PartialSuccess,
    Failed,
    Written,
    FallbackWritten,
    FatalAborted,
}

impl Stage {
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;

        matches!(
            (self, next),
            (NotAttempted, Unavailable | InFlight)
                | (InFlight, Success | PartialSuccess | Failed)
                | (Success | PartialSuccess, Written | FatalAborted)
                | (Unavailable | Failed, FallbackWritten | FatalAborted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Stage::Written | Stage::FallbackWritten | Stage::FatalAborted
        )
    }
}

#[derive(Debug)]
pub struct RunState {
    source: Source,
    stage: Stage,
}

impl RunState {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            stage: Stage::NotAttempted,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn advance(&mut self, next: Stage) -> anyhow::Result<()> {
        ensure!(
            self.stage.can_advance_to(next),
            "Illegal {} run transition {} -> {next}",
            self.source,
            self.stage
        );
        debug!(source = %self.source, "{} -> {next}", self.stage);
        self.stage = next;
        Ok(())
    }
}

/// What a collector brought back from the network.
#[derive(Debug)]
pub enum Retrieval {
    Success(Vec<Artifact>),
    /// Some sub-fetches failed, the artifacts are still publishable.
    PartialSuccess(Vec<Artifact>),
    Failed(anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub path: PathBuf,
    pub items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Written {
        published: Vec<Published>,
        partial: bool,
    },
    FallbackWritten {
        published: Published,
        origin: FallbackOrigin,
    },
}

impl Completion {
    fn stage(&self) -> Stage {
        match self {
            Completion::Written { .. } => Stage::Written,
            Completion::FallbackWritten { .. } => Stage::FallbackWritten,
        }
    }

    pub fn published(&self) -> Vec<&Published> {
        match self {
            Completion::Written { published, .. } => published.iter().collect(),
            Completion::FallbackWritten { published, .. } => vec![published],
        }
    }
}

/// One data source's fetch-and-normalize step.
#[async_trait]
pub trait Collector: Send + Sync {
    fn source(&self) -> Source;

    /// Target of a fallback document.
    fn output_path(&self) -> &Path;

    /// Artifacts are published in the order returned.
    async fn collect(&self, credentials: ServiceCredentials, fetched_at: DateTime<Utc>)
        -> Retrieval;
}

#[instrument(skip_all, fields(source = %collector.source()))]
pub async fn run(collector: &dyn Collector, config: &Config) -> anyhow::Result<Completion> {
    let source = collector.source();
    let fetched_at = Utc::now();
    let mut state = RunState::new(source);

    let retrieval = match credentials::resolve(source, config) {
        Resolution::Unavailable { missing } => {
            state.advance(Stage::Unavailable)?;
            info!("{source} is not configured, missing {}", missing.join(", "));
            None
        }
        Resolution::Available(credentials) => {
            state.advance(Stage::InFlight)?;
            Some(collector.collect(credentials, fetched_at).await)
        }
    };

    let fallback = FallbackProvider::new(&config.sample_dir);
    let outcome = match retrieval {
        Some(Retrieval::Success(artifacts)) => {
            state.advance(Stage::Success)?;
            publish(artifacts, false).await
        }
        Some(Retrieval::PartialSuccess(artifacts)) => {
            state.advance(Stage::PartialSuccess)?;
            warn!("{source} data is incomplete, publishing what was retrieved");
            publish(artifacts, true).await
        }
        Some(Retrieval::Failed(e)) => {
            state.advance(Stage::Failed)?;
            error!("Failed to retrieve {source} data: {e:#}");
            fall_back(&fallback, collector, fetched_at).await
        }
        None => fall_back(&fallback, collector, fetched_at).await,
    };

    match outcome {
        Ok(completion) => {
            state.advance(completion.stage())?;
            Ok(completion)
        }
        Err(e) => {
            state.advance(Stage::FatalAborted)?;
            error!("Aborting {source} run: {e:#}");
            Err(e)
        }
    }
}

async fn publish(artifacts: Vec<Artifact>, partial: bool) -> anyhow::Result<Completion> {
    let mut published = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        artifact.write().await?;
        published.push(Published {
            path: artifact.path,
            items: artifact.items,
        });
    }
    Ok(Completion::Written { published, partial })
}

async fn fall_back(
    provider: &FallbackProvider,
    collector: &dyn Collector,
    fetched_at: DateTime<Utc>,
) -> anyhow::Result<Completion> {
    let source = collector.source();
    let fallback = provider.provide(source, fetched_at).await?;
    let items = fallback::item_count(source, &fallback.body);
    info!("Using {} fallback for {source}", fallback.origin);

    let artifact = Artifact {
        path: collector.output_path().to_path_buf(),
        body: fallback.body,
        items,
    };
    artifact.write().await?;

    Ok(Completion::FallbackWritten {
        published: Published {
            path: artifact.path,
            items,
        },
        origin: fallback.origin,
    })
}
