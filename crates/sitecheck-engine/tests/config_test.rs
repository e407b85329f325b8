use sitecheck_engine::config::schema::{ENV_KITNER_EMAIL, ENV_KITNER_PASSWORD, ENV_SPOTIFY_CLIENT_ID};
use sitecheck_engine::config::{ConfigError, ConfigLoader, Credentials, ShoppingItem};
use std::collections::HashMap;
use std::io::Write;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_partial_config_keeps_defaults() {
    let file = write_config(
        r#"
timeouts:
  expect_ms: 1500
sites:
  catalog: "http://localhost:4200/"
cart:
  shopping_list:
    - name: Pliers
      quantity: 2
"#,
    );
    let config = ConfigLoader::load_from(file.path()).await.unwrap();

    assert_eq!(config.timeouts.expect_ms, 1500);
    assert_eq!(config.timeouts.action_ms, 30000);
    assert_eq!(config.timeouts.pacing_ms, 500);
    assert_eq!(config.sites.catalog, "http://localhost:4200/");
    assert_eq!(config.sites.todomvc, "https://demo.playwright.dev/todomvc#/");
    assert_eq!(
        config.cart.shopping_list,
        vec![ShoppingItem {
            name: "Pliers".into(),
            quantity: 2
        }]
    );
    assert!(config.login.soft_checks);
    assert_eq!(config.spotify.market, "US");
}

#[tokio::test]
async fn test_empty_file_means_defaults() {
    let file = write_config("");
    let config = ConfigLoader::load_from(file.path()).await.unwrap();
    assert_eq!(config.cart.shopping_list.len(), 8);
    assert_eq!(config.cart.shopping_list[4].name, "Thor Hammer");
    assert_eq!(config.cart.shopping_list[4].quantity, 12);
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    let file = write_config("sites:\n  registration: \"not a url\"\n");
    let err = ConfigLoader::load_from(file.path()).await.unwrap_err();
    match err {
        ConfigError::InvalidUrl { key, .. } => assert_eq!(key, "registration"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_yaml_is_a_parse_error() {
    let file = write_config("timeouts: [1, 2");
    let err = ConfigLoader::load_from(file.path()).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[tokio::test]
async fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigLoader::load_from(&dir.path().join("nope.yaml"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[tokio::test]
async fn test_credentials_are_not_read_from_file() {
    let file = write_config("credentials:\n  kitner_password: leaked\n");
    let config = ConfigLoader::load_from(file.path()).await.unwrap();
    assert!(!format!("{:?}", config).contains("leaked"));
}

#[test]
fn test_credentials_from_lookup() {
    let env: HashMap<&str, &str> = HashMap::from([
        (ENV_KITNER_EMAIL, "tester@example.com"),
        (ENV_KITNER_PASSWORD, "s3cret"),
        (ENV_SPOTIFY_CLIENT_ID, "   "),
    ]);
    let credentials = Credentials::from_lookup(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(credentials.kitner_email.as_deref(), Some("tester@example.com"));
    assert_eq!(credentials.kitner_password.as_deref(), Some("s3cret"));
    assert_eq!(credentials.spotify_client_id, None);
    assert_eq!(credentials.najada_user, None);

    let printed = format!("{:?}", credentials);
    assert!(!printed.contains("s3cret"));
    assert!(!printed.contains("tester@example.com"));
    assert!(printed.contains("kitner_password: \"<set>\""));
    assert!(printed.contains("najada_user: \"<unset>\""));
}
