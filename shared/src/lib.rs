use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

mod normalize;
mod timestamp;

pub mod github;
pub mod monkeytype;
pub mod spotify;
pub mod wakatime;

pub use normalize::*;
pub use timestamp::*;

pub use strum::IntoEnumIterator;

/// External service a stats widget is fed from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    GitHub,
    WakaTime,
    Monkeytype,
    Spotify,
}

impl Source {
    /// File name of the bundled fallback document for this source.
    pub fn sample_file_name(&self) -> String {
        format!("{self}.sample.json")
    }
}
