use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{header::AUTHORIZATION, RequestBuilder, Url};
use serde_json::Value;
use shared::Source;
use tracing::{instrument, warn};

use crate::{config::HttpConfig, consts::MAX_RETRIES};

pub mod github;
pub mod monkeytype;
pub mod spotify;
pub mod wakatime;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("{service} responded with {status} {status_text}: {body}")]
    Status {
        service: Source,
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("{service} request failed: {source}")]
    Transport {
        service: Source,
        source: reqwest::Error,
    },
    #[error("{service} returned a body that is not JSON: {source}")]
    Decode {
        service: Source,
        source: serde_json::Error,
    },
    #[error("invalid {service} endpoint {url}: {reason}")]
    InvalidUrl {
        service: Source,
        url: String,
        reason: String,
    },
}

impl HttpError {
    /// Server errors and transport failures (timeouts included) may succeed on
    /// a second attempt. Client errors and undecodable bodies will not.
    pub fn is_transient(&self) -> bool {
        match self {
            HttpError::Status { status, .. } => *status >= 500,
            HttpError::Transport { .. } => true,
            HttpError::Decode { .. } | HttpError::InvalidUrl { .. } => false,
        }
    }
}

#[derive(Clone, Copy)]
pub enum Auth<'a> {
    None,
    Basic { user: &'a str, password: &'a str },
    Bearer(&'a str),
    ApeKey(&'a str),
}

impl Auth<'_> {
    fn apply(self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Auth::None => request,
            Auth::Basic { user, password } => {
                request.header(AUTHORIZATION, basic_authorization(user, password))
            }
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::ApeKey(key) => request.header(AUTHORIZATION, format!("ApeKey {key}")),
        }
    }
}

pub fn basic_authorization(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

/// Joins path segments onto a base URL, percent-encoding each segment.
pub fn endpoint(service: Source, base: &str, segments: &[&str]) -> Result<Url, HttpError> {
    let invalid = |reason: String| HttpError::InvalidUrl {
        service,
        url: base.to_string(),
        reason,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    retry_delay: Duration,
}

impl ApiClient {
    pub fn new(config: &HttpConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            retry_delay: config.retry_delay(),
        })
    }

    #[instrument(skip(self, auth))]
    pub async fn get(
        &self,
        service: Source,
        url: Url,
        auth: Auth<'_>,
        query: &[(&str, String)],
    ) -> Result<Value, HttpError> {
        self.send(service, || auth.apply(self.client.get(url.clone()).query(query)))
            .await
    }

    #[instrument(skip(self, auth, form))]
    pub async fn post_form(
        &self,
        service: Source,
        url: Url,
        auth: Auth<'_>,
        form: &[(&str, &str)],
    ) -> Result<Value, HttpError> {
        self.send(service, || auth.apply(self.client.post(url.clone()).form(form)))
            .await
    }

    async fn send(
        &self,
        service: Source,
        request: impl Fn() -> RequestBuilder,
    ) -> Result<Value, HttpError> {
        let mut attempt = 0;
        loop {
            match send_once(service, request()).await {
                Err(e) if e.is_transient() && attempt < MAX_RETRIES => {
                    attempt += 1;
                    warn!(
                        "Retrying {service} request in {:?} after transient failure: {e}",
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                result => return result,
            }
        }
    }
}

async fn send_once(service: Source, request: RequestBuilder) -> Result<Value, HttpError> {
    let transport = |source| HttpError::Transport { service, source };

    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HttpError::Status {
            service,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&bytes).map_err(|source| HttpError::Decode { service, source })
}
