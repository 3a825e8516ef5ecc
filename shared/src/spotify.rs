use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{extract_f64, extract_str, fetched_at, truncate_list};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 50;
/// Roughly the last six months of listening.
pub const MEDIUM_TERM: &str = "medium_term";

const ID: &[&str] = &["id"];
const NAME: &[&str] = &["name"];
const URL: &[&str] = &["/external_urls/spotify"];
const ALBUM: &[&str] = &["/album/name"];
const ALBUM_IMAGE: &[&str] = &["/album/images/0/url"];
const ARTIST_IMAGE: &[&str] = &["/images/0/url"];
const DURATION_MS: &[&str] = &["duration_ms"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub album: String,
    pub url: Option<String>,
    pub image: Option<String>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
    pub url: Option<String>,
    pub image: Option<String>,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindows<T> {
    pub medium_term: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopItems {
    pub tracks: TimeWindows<Track>,
    pub artists: TimeWindows<Artist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyDocument {
    #[serde(with = "fetched_at")]
    pub fetched_at: DateTime<Utc>,
    pub top: TopItems,
}

impl SpotifyDocument {
    pub fn new(fetched_at: DateTime<Utc>, tracks: Vec<Track>, artists: Vec<Artist>) -> Self {
        Self {
            fetched_at,
            top: TopItems {
                tracks: TimeWindows {
                    medium_term: tracks,
                },
                artists: TimeWindows {
                    medium_term: artists,
                },
            },
        }
    }

    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self::new(fetched_at, vec![], vec![])
    }

    pub fn item_count(&self) -> usize {
        self.top.tracks.medium_term.len() + self.top.artists.medium_term.len()
    }
}

/// Clamps a requested page size into what the top-items endpoints accept.
pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIMIT)
}

pub fn normalize_tracks(raw: &Value, limit: u32) -> Vec<Track> {
    truncate_list(items(raw).filter_map(track), clamp_limit(limit) as usize)
}

pub fn normalize_artists(raw: &Value, limit: u32) -> Vec<Artist> {
    truncate_list(items(raw).filter_map(artist), clamp_limit(limit) as usize)
}

fn items(raw: &Value) -> impl Iterator<Item = &Value> {
    raw.get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn text(item: &Value, candidates: &[&str]) -> Option<String> {
    extract_str(item, candidates).map(ToString::to_string)
}

fn track(item: &Value) -> Option<Track> {
    if !item.is_object() {
        return None;
    }

    let artists = item
        .get("artists")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|artist| ArtistRef {
            id: text(artist, ID),
            name: text(artist, NAME).unwrap_or_default(),
        })
        .collect();

    Some(Track {
        id: text(item, ID),
        name: text(item, NAME).unwrap_or_default(),
        artists,
        album: text(item, ALBUM).unwrap_or_default(),
        url: text(item, URL),
        image: text(item, ALBUM_IMAGE),
        duration_ms: extract_f64(item, DURATION_MS)
            .filter(|ms| *ms > 0.0)
            .map(|ms| ms as u64),
    })
}

fn artist(item: &Value) -> Option<Artist> {
    if !item.is_object() {
        return None;
    }

    let genres = item
        .get("genres")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(ToString::to_string)
        .collect();

    Some(Artist {
        id: text(item, ID),
        name: text(item, NAME).unwrap_or_default(),
        url: text(item, URL),
        image: text(item, ARTIST_IMAGE),
        genres,
    })
}
