//! Spotify Web API: client-credentials token, artist info, related artists, top tracks.

use super::{ApiError, ensure_ok};
use crate::config::SitecheckConfig;
use crate::report::{CheckOutcome, ScenarioReport, Severity};
use serde::Deserialize;
use std::fmt;
use tracing::{info, warn};

pub const SUITE: &str = "spotify";

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedArtists {
    #[serde(default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub release_date_precision: Option<String>,
}

impl Album {
    /// Year the album came out, `"Unknown"` without a release date.
    pub fn release_year(&self) -> &str {
        let date = match self.release_date.as_deref() {
            Some(date) if !date.is_empty() => date,
            _ => return "Unknown",
        };
        if self.release_date_precision.as_deref() == Some("year") {
            return date;
        }
        date.split('-').next().unwrap_or(date)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub album: Album,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopTracks {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

fn or_none<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "None".to_string())
}

impl Artist {
    /// Lines printed for the artist-info scenario.
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("Name: {}", self.name),
            format!("Genres: {}", self.genres.join(", ")),
            format!("Popularity: {}", or_none(&self.popularity)),
            format!("Followers: {}", or_none(&self.followers.total)),
            format!("Spotify URL: {}", or_none(&self.external_urls.spotify)),
        ]
    }
}

impl Track {
    pub fn describe(&self, rank: usize) -> String {
        format!(
            "{}. {} from album '{}' released in {}. Popularity rating: {}",
            rank,
            self.name,
            self.album.name,
            self.album.release_year(),
            or_none(&self.popularity)
        )
    }
}

/// Authenticated Web API client.
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl SpotifyClient {
    /// Exchange client id and secret for an access token (client-credentials grant).
    pub async fn authenticate(
        http: reqwest::Client,
        token_url: &str,
        api_base: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, ApiError> {
        let response = http
            .post(token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: TokenResponse = ensure_ok(response).await?.json().await?;
        info!(
            "Obtained {} token valid for {} s",
            token.token_type, token.expires_in
        );
        Ok(Self::with_token(http, api_base, token.access_token))
    }

    pub fn with_token(http: reqwest::Client, api_base: &str, token: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.api_base, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        Ok(ensure_ok(response).await?.json().await?)
    }

    pub async fn artist(&self, id: &str) -> Result<Artist, ApiError> {
        self.get(&format!("/artists/{}", id), &[]).await
    }

    pub async fn related_artists(&self, id: &str) -> Result<RelatedArtists, ApiError> {
        self.get(&format!("/artists/{}/related-artists", id), &[])
            .await
    }

    pub async fn top_tracks(&self, id: &str, market: &str) -> Result<TopTracks, ApiError> {
        self.get(&format!("/artists/{}/top-tracks", id), &[("market", market)])
            .await
    }
}

/// Record a non-200 answer as a failed check; other errors abort the scenario.
fn status_check<T>(
    report: &mut ScenarioReport,
    label: &str,
    result: Result<T, ApiError>,
) -> Result<Option<T>, ApiError> {
    match result {
        Ok(value) => {
            report.record(label, Severity::Hard, CheckOutcome::Pass);
            Ok(Some(value))
        }
        Err(ApiError::Status { status, .. }) => {
            report.record(
                label,
                Severity::Hard,
                CheckOutcome::fail(format!("Unexpected status code: {}", status)),
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn artist_info(client: &SpotifyClient, artist_id: &str) -> ScenarioReport {
    let mut report = ScenarioReport::new(SUITE, "artist info");
    let result = async {
        if let Some(artist) = status_check(&mut report, "artist returns 200", client.artist(artist_id).await)? {
            for line in artist.describe() {
                report.note(line);
            }
        }
        Ok::<(), ApiError>(())
    }
    .await;
    report.finish(result)
}

async fn related_artists(client: &SpotifyClient, artist_id: &str) -> ScenarioReport {
    let mut report = ScenarioReport::new(SUITE, "related artists");
    let result = async {
        let related = client.related_artists(artist_id).await;
        if let Some(related) = status_check(&mut report, "related artists return 200", related)? {
            if related.artists.is_empty() {
                report.note("No related artists found.");
            }
            for (i, artist) in related.artists.iter().enumerate() {
                report.note(format!("{}. {}", i + 1, artist.name));
            }
        }
        Ok::<(), ApiError>(())
    }
    .await;
    report.finish(result)
}

async fn top_tracks(client: &SpotifyClient, artist_id: &str, market: &str) -> ScenarioReport {
    let mut report = ScenarioReport::new(SUITE, "top tracks");
    let result = async {
        let tracks = client.top_tracks(artist_id, market).await;
        if let Some(top) = status_check(&mut report, "top tracks return 200", tracks)? {
            for (i, track) in top.tracks.iter().enumerate() {
                report.note(track.describe(i + 1));
            }
            report.record(
                "tracks returned",
                Severity::Hard,
                CheckOutcome::check(!top.tracks.is_empty(), || {
                    "No tracks returned in response".to_string()
                }),
            );
        }
        Ok::<(), ApiError>(())
    }
    .await;
    report.finish(result)
}

const SCENARIOS: [&str; 3] = ["artist info", "related artists", "top tracks"];

pub async fn run_suite(http: &reqwest::Client, config: &SitecheckConfig) -> Vec<ScenarioReport> {
    let credentials = &config.credentials;
    let (Some(client_id), Some(client_secret)) = (
        credentials.spotify_client_id.as_deref(),
        credentials.spotify_client_secret.as_deref(),
    ) else {
        warn!("Skipping Spotify checks: client credentials are not configured");
        return SCENARIOS
            .iter()
            .map(|name| ScenarioReport::skipped(SUITE, *name, "Spotify client credentials are not configured"))
            .collect();
    };

    let client = match SpotifyClient::authenticate(
        http.clone(),
        &config.sites.spotify_token,
        &config.sites.spotify_api,
        client_id,
        client_secret,
    )
    .await
    {
        Ok(client) => client,
        Err(e) => {
            return vec![ScenarioReport::new(SUITE, "authenticate").finish(Err(e))];
        }
    };

    let spotify = &config.spotify;
    vec![
        artist_info(&client, &spotify.artist_id).await,
        related_artists(&client, &spotify.artist_id).await,
        top_tracks(&client, &spotify.artist_id, &spotify.market).await,
    ]
}
