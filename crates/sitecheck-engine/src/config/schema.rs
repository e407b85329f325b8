use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitecheckConfig {
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub sites: SitesConfig,
    #[serde(default)]
    pub cart: CartConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub login: LoginConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// Secrets only ever come from the environment.
    #[serde(skip)]
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_expect_ms")]
    pub expect_ms: u64,
    #[serde(default = "default_action_ms")]
    pub action_ms: u64,
    #[serde(default = "default_load_ms")]
    pub load_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    #[serde(default = "default_cart_rows_ms")]
    pub cart_rows_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            expect_ms: default_expect_ms(),
            action_ms: default_action_ms(),
            load_ms: default_load_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            pacing_ms: default_pacing_ms(),
            cart_rows_ms: default_cart_rows_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn expect(&self) -> Duration {
        Duration::from_millis(self.expect_ms)
    }

    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    pub fn load(&self) -> Duration {
        Duration::from_millis(self.load_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn cart_rows(&self) -> Duration {
        Duration::from_millis(self.cart_rows_ms)
    }
}

fn default_expect_ms() -> u64 {
    5000
}

fn default_action_ms() -> u64 {
    30000
}

fn default_load_ms() -> u64 {
    30000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_pacing_ms() -> u64 {
    500
}

fn default_cart_rows_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesConfig {
    #[serde(default = "default_todomvc")]
    pub todomvc: String,
    #[serde(default = "default_catalog")]
    pub catalog: String,
    #[serde(default = "default_najada")]
    pub najada: String,
    #[serde(default = "default_rohlik")]
    pub rohlik: String,
    #[serde(default = "default_kitner_login")]
    pub kitner_login: String,
    #[serde(default = "default_registration")]
    pub registration: String,
    #[serde(default = "default_spotify_api")]
    pub spotify_api: String,
    #[serde(default = "default_spotify_token")]
    pub spotify_token: String,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            todomvc: default_todomvc(),
            catalog: default_catalog(),
            najada: default_najada(),
            rohlik: default_rohlik(),
            kitner_login: default_kitner_login(),
            registration: default_registration(),
            spotify_api: default_spotify_api(),
            spotify_token: default_spotify_token(),
        }
    }
}

impl SitesConfig {
    /// All configured endpoints with their key, for validation.
    pub fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("todomvc", self.todomvc.as_str()),
            ("catalog", self.catalog.as_str()),
            ("najada", self.najada.as_str()),
            ("rohlik", self.rohlik.as_str()),
            ("kitner_login", self.kitner_login.as_str()),
            ("registration", self.registration.as_str()),
            ("spotify_api", self.spotify_api.as_str()),
            ("spotify_token", self.spotify_token.as_str()),
        ]
    }
}

fn default_todomvc() -> String {
    "https://demo.playwright.dev/todomvc#/".to_string()
}

fn default_catalog() -> String {
    "https://practicesoftwaretesting.com/".to_string()
}

fn default_najada() -> String {
    "https://www.najada.games/".to_string()
}

fn default_rohlik() -> String {
    "https://www.rohlik.cz/".to_string()
}

fn default_kitner_login() -> String {
    "http://testovani.kitner.cz/login".to_string()
}

fn default_registration() -> String {
    "http://testovani.kitner.cz/regkurz/formsave.php".to_string()
}

fn default_spotify_api() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_spotify_token() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default = "default_shopping_list")]
    pub shopping_list: Vec<ShoppingItem>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            shopping_list: default_shopping_list(),
        }
    }
}

fn default_shopping_list() -> Vec<ShoppingItem> {
    [
        // no product is called exactly "Bolt", several contain it
        ("Bolt", 2),
        ("Pliers", 2),
        // out of stock
        ("Long Nose Pliers", 2),
        ("Plieasdrs", 2),
        // capped at one per cart
        ("Thor Hammer", 12),
        ("Claw Hammer with Shock Reduction Grip", 4),
        ("Mini Screwdriver", 4),
        ("Cordless Drill 24V", 1),
    ]
    .into_iter()
    .map(|(name, quantity)| ShoppingItem {
        name: name.to_string(),
        quantity,
    })
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default = "default_artist_id")]
    pub artist_id: String,
    #[serde(default = "default_market")]
    pub market: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            artist_id: default_artist_id(),
            market: default_market(),
        }
    }
}

fn default_artist_id() -> String {
    "3F2lwRt2FQ30q32nj35oHq".to_string()
}

fn default_market() -> String {
    "US".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    #[serde(default = "default_soft_checks")]
    pub soft_checks: bool,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            soft_checks: default_soft_checks(),
            settle_ms: default_settle_ms(),
        }
    }
}

fn default_soft_checks() -> bool {
    true
}

fn default_settle_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("./screenshots")
}

pub const ENV_SPOTIFY_CLIENT_ID: &str = "SITECHECK_SPOTIFY_CLIENT_ID";
pub const ENV_SPOTIFY_CLIENT_SECRET: &str = "SITECHECK_SPOTIFY_CLIENT_SECRET";
pub const ENV_NAJADA_USER: &str = "SITECHECK_NAJADA_USER";
pub const ENV_NAJADA_PASSWORD: &str = "SITECHECK_NAJADA_PASSWORD";
pub const ENV_KITNER_EMAIL: &str = "SITECHECK_KITNER_EMAIL";
pub const ENV_KITNER_PASSWORD: &str = "SITECHECK_KITNER_PASSWORD";

#[derive(Clone, Default)]
pub struct Credentials {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub najada_user: Option<String>,
    pub najada_password: Option<String>,
    pub kitner_email: Option<String>,
    pub kitner_password: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            spotify_client_id: get(ENV_SPOTIFY_CLIENT_ID),
            spotify_client_secret: get(ENV_SPOTIFY_CLIENT_SECRET),
            najada_user: get(ENV_NAJADA_USER),
            najada_password: get(ENV_NAJADA_PASSWORD),
            kitner_email: get(ENV_KITNER_EMAIL),
            kitner_password: get(ENV_KITNER_PASSWORD),
        }
    }
}

fn presence(value: &Option<String>) -> &'static str {
    if value.is_some() { "<set>" } else { "<unset>" }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("spotify_client_id", &presence(&self.spotify_client_id))
            .field("spotify_client_secret", &presence(&self.spotify_client_secret))
            .field("najada_user", &presence(&self.najada_user))
            .field("najada_password", &presence(&self.najada_password))
            .field("kitner_email", &presence(&self.kitner_email))
            .field("kitner_password", &presence(&self.kitner_password))
            .finish()
    }
}
