// Yahoo Fantasy Sports API client.
//
// Issues authenticated GETs against the v2 REST API and hands back raw JSON
// documents for the decoder. Token acquisition and refresh happen elsewhere;
// this client only carries a bearer token.

use std::fmt;

use async_trait::async_trait;
use dynasty_core::EndpointKind;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const YAHOO_API_BASE: &str = "https://fantasysports.yahooapis.com/fantasy/v2";

/// NFL game keys by season. Yahoo assigns a new key every year.
pub const NFL_GAME_KEYS: &[(u16, u32)] = &[
    (2005, 101),
    (2006, 124),
    (2007, 147),
    (2008, 175),
    (2009, 199),
    (2010, 222),
    (2011, 242),
    (2012, 257),
    (2013, 273),
    (2014, 314),
    (2015, 331),
    (2016, 348),
    (2017, 359),
    (2018, 371),
    (2019, 380),
    (2020, 390),
    (2021, 399),
    (2022, 406),
    (2023, 414),
    (2024, 423),
    (2025, 449),
];

pub fn nfl_game_key(season: u16) -> Option<u32> {
    NFL_GAME_KEYS
        .iter()
        .find(|(year, _)| *year == season)
        .map(|(_, key)| *key)
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// One API resource the pipeline knows how to request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// The logged-in user's leagues for one game (season).
    Leagues { game_key: u32 },
    Standings { league_key: String },
    Scoreboard { league_key: String, week: u32 },
    Transactions { league_key: String },
    DraftResults { league_key: String },
}

impl Endpoint {
    /// Resource path relative to the API base, without query string.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Leagues { game_key } => {
                format!("/users;use_login=1/games;game_keys={game_key}/leagues")
            }
            Endpoint::Standings { league_key } => format!("/league/{league_key}/standings"),
            Endpoint::Scoreboard { league_key, week } => {
                format!("/league/{league_key}/scoreboard;week={week}")
            }
            Endpoint::Transactions { league_key } => format!("/league/{league_key}/transactions"),
            Endpoint::DraftResults { league_key } => format!("/league/{league_key}/draftresults"),
        }
    }

    /// Response shape family, used to pick a decoder.
    pub fn kind(&self) -> EndpointKind {
        match self {
            Endpoint::Leagues { .. } => EndpointKind::Leagues,
            Endpoint::Standings { .. } => EndpointKind::Standings,
            Endpoint::Scoreboard { .. } => EndpointKind::Scoreboard,
            Endpoint::Transactions { .. } => EndpointKind::Transactions,
            Endpoint::DraftResults { .. } => EndpointKind::DraftResults,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// ---------------------------------------------------------------------------
// Fetch seam
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no access token configured (set DYNASTY_ACCESS_TOKEN or config/credentials.toml)")]
    MissingToken,

    #[error("access token rejected for {path}")]
    Unauthorized { path: String },

    #[error("HTTP {status} from {path}")]
    Http { status: u16, path: String },

    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        source: reqwest::Error,
    },

    #[error("response from {path} is not valid JSON: {source}")]
    InvalidJson {
        path: String,
        source: serde_json::Error,
    },
}

/// Anything that can turn an endpoint into a raw JSON document.
#[async_trait]
pub trait FetchJson: Send + Sync {
    async fn fetch_json(&self, endpoint: &Endpoint) -> Result<Value, FetchError>;
}

// ---------------------------------------------------------------------------
// YahooClient
// ---------------------------------------------------------------------------

pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let token = config.access_token().ok_or(FetchError::MissingToken)?;
        Ok(Self::new(config.yahoo.base_url.clone(), token))
    }

    pub fn url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}?format=json", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl FetchJson for YahooClient {
    async fn fetch_json(&self, endpoint: &Endpoint) -> Result<Value, FetchError> {
        let path = endpoint.path();
        let url = self.url(endpoint);
        debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized { path });
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                path,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Transport {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| FetchError::InvalidJson { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(
            Endpoint::Leagues { game_key: 423 }.path(),
            "/users;use_login=1/games;game_keys=423/leagues"
        );
        assert_eq!(
            Endpoint::Scoreboard {
                league_key: "423.l.1".into(),
                week: 7
            }
            .path(),
            "/league/423.l.1/scoreboard;week=7"
        );
        assert_eq!(
            Endpoint::DraftResults {
                league_key: "423.l.1".into()
            }
            .kind(),
            EndpointKind::DraftResults
        );
    }

    #[test]
    fn url_appends_json_format() {
        let client = YahooClient::new("https://example.invalid/v2/", "token");
        let url = client.url(&Endpoint::Standings {
            league_key: "414.l.9".into(),
        });
        assert_eq!(url, "https://example.invalid/v2/league/414.l.9/standings?format=json");
    }

    #[test]
    fn game_key_table_is_ascending_and_complete() {
        assert_eq!(nfl_game_key(2005), Some(101));
        assert_eq!(nfl_game_key(2024), Some(423));
        assert_eq!(nfl_game_key(1999), None);
        assert!(NFL_GAME_KEYS.windows(2).all(|w| w[0].0 + 1 == w[1].0 && w[0].1 < w[1].1));
    }
}
