use serde_json::json;
use sitecheck_engine::api::spotify::{SpotifyClient, run_suite};
use sitecheck_engine::api::{ApiError, http_client};
use sitecheck_engine::config::{Credentials, SitecheckConfig};
use std::time::Duration;
use wiremock::matchers::{basic_auth, bearer_token, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTIST: &str = "3F2lwRt2FQ30q32nj35oHq";

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(basic_auth("client-id", "client-secret"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-123",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer, with_credentials: bool) -> SitecheckConfig {
    let mut config = SitecheckConfig::default();
    config.sites.spotify_token = format!("{}/api/token", server.uri());
    config.sites.spotify_api = format!("{}/v1", server.uri());
    if with_credentials {
        config.credentials = Credentials {
            spotify_client_id: Some("client-id".into()),
            spotify_client_secret: Some("client-secret".into()),
            ..Credentials::default()
        };
    }
    config
}

#[tokio::test]
async fn test_authenticate_and_fetch_artist() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/artists/{}", ARTIST)))
        .and(bearer_token("token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": ARTIST,
            "name": "Red Hot Chili Peppers",
            "genres": ["alternative rock", "funk rock"],
            "popularity": 82,
            "followers": {"total": 21000000},
            "external_urls": {"spotify": "https://open.spotify.com/artist/3F2l"}
        })))
        .mount(&server)
        .await;

    let http = http_client(Duration::from_secs(5)).unwrap();
    let client = SpotifyClient::authenticate(
        http,
        &format!("{}/api/token", server.uri()),
        &format!("{}/v1", server.uri()),
        "client-id",
        "client-secret",
    )
    .await
    .unwrap();

    let artist = client.artist(ARTIST).await.unwrap();
    assert_eq!(
        artist.describe(),
        vec![
            "Name: Red Hot Chili Peppers",
            "Genres: alternative rock, funk rock",
            "Popularity: 82",
            "Followers: 21000000",
            "Spotify URL: https://open.spotify.com/artist/3F2l",
        ]
    );
}

#[tokio::test]
async fn test_rejected_token_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let http = http_client(Duration::from_secs(5)).unwrap();
    let err = SpotifyClient::authenticate(
        http,
        &format!("{}/api/token", server.uri()),
        &server.uri(),
        "bad",
        "bad",
    )
    .await
    .unwrap_err();
    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 400);
            assert_eq!(body, "invalid_client");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_suite_checks_each_response_status() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/artists/{}", ARTIST)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "RHCP"})))
        .mount(&server)
        .await;
    // the related-artists endpoint is gone for client-credential apps
    Mock::given(method("GET"))
        .and(path(format!("/v1/artists/{}/related-artists", ARTIST)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/artists/{}/top-tracks", ARTIST)))
        .and(query_param("market", "US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": [{
                "name": "Californication",
                "popularity": 80,
                "album": {
                    "name": "Californication",
                    "release_date": "1999-06-08",
                    "release_date_precision": "day"
                }
            }]
        })))
        .mount(&server)
        .await;

    let http = http_client(Duration::from_secs(5)).unwrap();
    let reports = run_suite(&http, &config_for(&server, true)).await;
    let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["artist info", "related artists", "top tracks"]);

    assert!(reports[0].passed());
    assert_eq!(reports[0].notes[0], "Name: RHCP");
    assert!(!reports[1].passed());
    assert_eq!(reports[1].hard_failures(), 1);
    assert!(reports[2].passed());
    assert_eq!(
        reports[2].notes,
        vec!["1. Californication from album 'Californication' released in 1999. Popularity rating: 80"]
    );
}

#[tokio::test]
async fn test_empty_top_tracks_fail() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/artists/{}/top-tracks", ARTIST)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tracks": []})))
        .mount(&server)
        .await;

    let http = http_client(Duration::from_secs(5)).unwrap();
    let reports = run_suite(&http, &config_for(&server, true)).await;
    let top = reports.iter().find(|r| r.name == "top tracks").unwrap();
    assert!(!top.passed());
    assert!(top.checks.iter().any(|c| c.label == "tracks returned" && !c.outcome.is_pass()));
}

#[tokio::test]
async fn test_missing_credentials_skip_the_suite() {
    let server = MockServer::start().await;
    let http = http_client(Duration::from_secs(5)).unwrap();
    let reports = run_suite(&http, &config_for(&server, false)).await;

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.skipped.is_some()));
    assert!(server.received_requests().await.unwrap().is_empty());
}
