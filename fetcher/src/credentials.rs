use shared::Source;

use crate::{config::Config, consts::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Secrets a source needs before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCredentials {
    /// Public endpoint addressed by username.
    Public { username: String },
    ApiKey(String),
    SpotifyOAuth(SpotifyCredentials),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Available(ServiceCredentials),
    Unavailable { missing: Vec<&'static str> },
}

/// All-or-nothing: a source with any required variable unset or empty is
/// unavailable, and nothing is sent to the network for it.
pub fn resolve(source: Source, config: &Config) -> Resolution {
    let credentials = match source {
        Source::GitHub => required(&[(GITHUB_USERNAME_VAR, Some(&config.github.username))])
            .map(|[username]| ServiceCredentials::Public { username }),
        Source::WakaTime => required(&[(WAKATIME_API_KEY_VAR, config.wakatime.api_key.as_ref())])
            .map(|[key]| ServiceCredentials::ApiKey(key)),
        Source::Monkeytype => {
            required(&[(MONKEYTYPE_API_KEY_VAR, config.monkeytype.api_key.as_ref())])
                .map(|[key]| ServiceCredentials::ApiKey(key))
        }
        Source::Spotify => required(&[
            (SPOTIFY_CLIENT_ID_VAR, config.spotify.client_id.as_ref()),
            (SPOTIFY_CLIENT_SECRET_VAR, config.spotify.client_secret.as_ref()),
            (SPOTIFY_REFRESH_TOKEN_VAR, config.spotify.refresh_token.as_ref()),
        ])
        .map(|[client_id, client_secret, refresh_token]| {
            ServiceCredentials::SpotifyOAuth(SpotifyCredentials {
                client_id,
                client_secret,
                refresh_token,
            })
        }),
    };

    match credentials {
        Ok(credentials) => Resolution::Available(credentials),
        Err(missing) => Resolution::Unavailable { missing },
    }
}

fn required<const N: usize>(
    vars: &[(&'static str, Option<&String>); N],
) -> Result<[String; N], Vec<&'static str>> {
    let missing: Vec<&'static str> = vars
        .iter()
        .filter(|(_, value)| value.map_or(true, |value| value.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(vars.map(|(_, value)| value.cloned().unwrap_or_default()))
}
