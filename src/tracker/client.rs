//! Gazelle HTTP client
//!
//! Talks to the JSON API (`ajax.php`) exposed by Gazelle-based music trackers.
//!
//! ## Authentication
//!
//! - **API token**: sent verbatim in the `Authorization` header on every
//!   request. Downloads go through `ajax.php?action=download`.
//! - **Username / password**: `POST login.php` establishes a session cookie,
//!   then `ajax.php?action=index` yields the `authkey` and `passkey` needed by
//!   the classic `torrents.php?action=download` endpoint. Some forks restrict
//!   API endpoints to token holders, so this mode is a fallback.
//!
//! Every remote call (login included) first passes through the tracker's
//! [`RateLimiter`].

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::adapter;
use super::domain::{SearchGroup, TorrentFile, TorrentId, TrackerError};
use super::dto;
use super::rate_limit::RateLimiter;
use crate::config::{AuthMode, TrackerConfig};

/// User agent string sent to trackers
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// How the client authorizes downloads
enum Session {
    /// Token in the default headers
    Token,
    /// Cookie session plus the keys from `action=index`
    Cookie { authkey: String, passkey: String },
}

/// Client for one Gazelle tracker
pub struct GazelleClient {
    name: String,
    http_client: reqwest::Client,
    base_url: String,
    session: Session,
    limiter: RateLimiter,
}

impl GazelleClient {
    /// Build a client for the tracker and authenticate.
    ///
    /// For token auth nothing is sent until the first search; for credentials
    /// this performs the login round-trip.
    pub async fn connect(config: &TrackerConfig) -> Result<Self, TrackerError> {
        let limiter = RateLimiter::new(
            config.rate_limit.requests,
            Duration::from_secs(config.rate_limit.per_seconds),
        );
        info!(
            "Setting up throttler for {} at {} requests every {} seconds maximum",
            config.name, config.rate_limit.requests, config.rate_limit.per_seconds
        );

        let base_url = config.url.trim_end_matches('/').to_string();

        match &config.auth {
            AuthMode::Token(token) => {
                info!("{} tracker connection will use API token authentication", config.name);
                let mut value = HeaderValue::from_str(token)
                    .map_err(|e| TrackerError::Login(format!("invalid API token: {}", e)))?;
                value.set_sensitive(true);

                let mut headers = HeaderMap::new();
                headers.insert(AUTHORIZATION, value);

                let http_client = reqwest::Client::builder()
                    .gzip(true)
                    .user_agent(USER_AGENT)
                    .default_headers(headers)
                    .build()
                    .map_err(|e| TrackerError::Network(e.to_string()))?;

                Ok(Self {
                    name: config.name.clone(),
                    http_client,
                    base_url,
                    session: Session::Token,
                    limiter,
                })
            }
            AuthMode::Credentials { username, password } => {
                warn!(
                    "{} tracker connection will use username / password authentication. \
                     Some endpoints may only be accessible with an API token",
                    config.name
                );

                let http_client = reqwest::Client::builder()
                    .gzip(true)
                    .user_agent(USER_AGENT)
                    .cookie_store(true)
                    .build()
                    .map_err(|e| TrackerError::Network(e.to_string()))?;

                let mut client = Self {
                    name: config.name.clone(),
                    http_client,
                    base_url,
                    session: Session::Token,
                    limiter,
                };
                client.login(username, password).await?;
                Ok(client)
            }
        }
    }

    /// Create a token client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            session: Session::Token,
            limiter: RateLimiter::new(5, Duration::from_secs(10)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Search torrent groups matching free text
    pub async fn search(&self, query: &str) -> Result<Vec<SearchGroup>, TrackerError> {
        let response: dto::BrowseResponse = self
            .ajax(&[("action", "browse"), ("searchstr", query)])
            .await?;
        Ok(adapter::to_search_groups(response))
    }

    /// Download the `.torrent` file of a torrent
    pub async fn fetch_torrent(&self, torrent_id: &TorrentId) -> Result<TorrentFile, TrackerError> {
        let request = match &self.session {
            Session::Token => self
                .http_client
                .get(format!("{}/ajax.php", self.base_url))
                .query(&[("action", "download"), ("id", torrent_id.as_str())]),
            Session::Cookie { authkey, passkey } => self
                .http_client
                .get(format!("{}/torrents.php", self.base_url))
                .query(&[
                    ("action", "download"),
                    ("id", torrent_id.as_str()),
                    ("authkey", authkey.as_str()),
                    ("torrent_pass", passkey.as_str()),
                ]),
        };

        self.limiter.acquire().await;
        debug!("Downloading torrent {} from {}", torrent_id, self.name);

        let response = request
            .send()
            .await
            .map_err(|e| TrackerError::Network(e.to_string()))?;
        let response = check_status(response).await?;

        // Gazelle answers download errors with a JSON envelope instead of a file
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));

        let suggested_filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TrackerError::Network(e.to_string()))?;

        if is_json {
            let envelope: dto::Envelope<serde_json::Value> = serde_json::from_slice(&bytes)
                .map_err(|e| TrackerError::Parse(e.to_string()))?;
            adapter::unwrap_envelope(envelope)?;
            return Err(TrackerError::Api(
                "expected a torrent file, got a JSON response".to_string(),
            ));
        }

        Ok(TorrentFile {
            suggested_filename,
            bytes: bytes.to_vec(),
        })
    }

    /// Establish a cookie session and fetch the download keys
    async fn login(&mut self, username: &str, password: &str) -> Result<(), TrackerError> {
        self.limiter.acquire().await;
        debug!("Logging in to {} as {}", self.name, username);

        let response = self
            .http_client
            .post(format!("{}/login.php", self.base_url))
            .form(&[
                ("username", username),
                ("password", password),
                ("keeplogged", "1"),
            ])
            .send()
            .await
            .map_err(|e| TrackerError::Network(e.to_string()))?;
        check_status(response).await?;

        // A failed login lands back on the HTML login page, so the index
        // call is what actually proves the session works.
        let index: dto::IndexResponse = self
            .ajax(&[("action", "index")])
            .await
            .map_err(|e| TrackerError::Login(format!("login to {} failed: {}", self.name, e)))?;

        self.session = Session::Cookie {
            authkey: index.authkey,
            passkey: index.passkey,
        };
        Ok(())
    }

    /// Call an `ajax.php` action and unwrap the JSON envelope
    async fn ajax<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, TrackerError> {
        self.limiter.acquire().await;

        let url = format!("{}/ajax.php", self.base_url);
        debug!("{} GET {} {:?}", self.name, url, params);

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| TrackerError::Network(e.to_string()))?;
        let response = check_status(response).await?;

        let envelope = response
            .json::<dto::Envelope<T>>()
            .await
            .map_err(|e| TrackerError::Parse(e.to_string()))?;

        adapter::unwrap_envelope(envelope)
    }
}

/// Map non-success HTTP statuses to errors
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TrackerError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(TrackerError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TrackerError::Http {
            status: status.as_u16(),
            message: format!(
                "{} - {}",
                status.canonical_reason().unwrap_or("Unknown"),
                body.chars().take(200).collect::<String>()
            ),
        });
    }

    Ok(response)
}

/// Extract the filename from a `Content-Disposition` header value.
///
/// The RFC 5987 `filename*=` form wins over the plain `filename=` form.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in header.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        if key == "filename*" {
            // charset'language'percent-encoded
            let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
            extended = urlencoding::decode(encoded).ok().map(|s| s.into_owned());
        } else if key == "filename" {
            plain = Some(value.trim_matches('"').to_string());
        }
    }

    extended.or(plain).filter(|name| !name.is_empty())
}
