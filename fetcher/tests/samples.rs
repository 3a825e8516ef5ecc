use std::path::PathBuf;

use portfolio_stats_fetcher::{fallback::FallbackProvider, Source};
use shared::{
    monkeytype::MonkeytypeDocument, spotify::SpotifyDocument, wakatime::WakaTimeDocument,
};

fn provider() -> FallbackProvider {
    FallbackProvider::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../samples"))
}

// Bundled samples are published verbatim, so they must already have the live shape.
#[tokio::test]
async fn bundled_samples_match_document_shapes() {
    let provider = provider();

    let wakatime = provider.load_sample(Source::WakaTime).await.unwrap().unwrap();
    let wakatime: WakaTimeDocument = serde_json::from_value(wakatime).unwrap();
    assert!(wakatime.languages.len() <= shared::wakatime::TOP_LANGUAGES);

    let monkeytype = provider.load_sample(Source::Monkeytype).await.unwrap().unwrap();
    let monkeytype: MonkeytypeDocument = serde_json::from_value(monkeytype).unwrap();
    assert!(monkeytype.pbs.time15.is_some());

    let spotify = provider.load_sample(Source::Spotify).await.unwrap().unwrap();
    let spotify: SpotifyDocument = serde_json::from_value(spotify).unwrap();
    assert!(spotify.item_count() > 0);

    assert_eq!(provider.load_sample(Source::GitHub).await.unwrap(), None);
}
