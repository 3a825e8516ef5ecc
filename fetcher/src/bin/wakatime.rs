use portfolio_stats_fetcher::Source;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    portfolio_stats_fetcher::run(Source::WakaTime).await
}
