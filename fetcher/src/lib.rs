use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

pub mod api;
pub mod artifact;
pub mod config;
pub mod consts;
pub mod credentials;
pub mod fallback;
pub mod github_pull;
pub mod monkeytype_pull;
pub mod pipeline;
pub mod spotify_pull;
pub mod wakatime_pull;

pub use shared::Source;

use crate::{
    api::ApiClient,
    config::Config,
    github_pull::GithubPull,
    monkeytype_pull::MonkeytypePull,
    pipeline::{Collector, Completion},
    spotify_pull::SpotifyPull,
    wakatime_pull::WakaTimePull,
};

/// Logs go to stderr so the artifact path line is the only thing a scheduler
/// needs to read. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

pub fn collector_for(source: Source, config: &Config, api: ApiClient) -> Box<dyn Collector> {
    match source {
        Source::GitHub => Box::new(GithubPull::new(api, config.github.clone())),
        Source::WakaTime => Box::new(WakaTimePull::new(api, config.wakatime.clone())),
        Source::Monkeytype => Box::new(MonkeytypePull::new(api, config.monkeytype.clone())),
        Source::Spotify => Box::new(SpotifyPull::new(api, config.spotify.clone())),
    }
}

/// Fetches, normalizes and publishes one source with an explicit config.
pub async fn run_with(source: Source, config: &Config) -> anyhow::Result<Completion> {
    let api = ApiClient::new(&config.http)?;
    let collector = collector_for(source, config, api);
    let completion = pipeline::run(collector.as_ref(), config).await?;

    for published in completion.published() {
        info!(
            "Wrote {} ({} items)",
            published.path.display(),
            published.items
        );
    }
    Ok(completion)
}

/// Entry point shared by the `fetch-*` binaries.
pub async fn run(source: Source) -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;

    let config = Config::from_env()?;
    run_with(source, &config).await?;
    Ok(())
}
