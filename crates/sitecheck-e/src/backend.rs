use crate::webdriver::WebDriverClient;
use async_trait::async_trait;
use fantoccini::actions::{InputSource, KeyAction, KeyActions};
use fantoccini::key::Key;
use serde_json::{Map, Value};
use sitecheck_engine::config::TimeoutConfig;
use sitecheck_engine::dom::{Dom, ScriptHost};
use sitecheck_engine::driver::{Driver, DriverError, NavigationResult};
use sitecheck_engine::locator::Locator;
use tracing::info;

/// A browser behind an external W3C WebDriver server (chromedriver, geckodriver,
/// WPEWebDriver, ...).
pub struct EmbeddedDriver {
    client: Option<WebDriverClient>,
    webdriver_url: String,
    capabilities: Option<Map<String, Value>>,
    timeouts: TimeoutConfig,
}

impl EmbeddedDriver {
    pub fn with_url(webdriver_url: impl Into<String>, timeouts: TimeoutConfig) -> Self {
        Self {
            client: None,
            webdriver_url: webdriver_url.into(),
            capabilities: None,
            timeouts,
        }
    }

    /// Capabilities sent when the session is created, e.g. `goog:chromeOptions`.
    pub fn with_capabilities(mut self, capabilities: Map<String, Value>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    fn client(&self) -> Result<&WebDriverClient, DriverError> {
        self.client.as_ref().ok_or(DriverError::NotReady)
    }

    fn dom(&self) -> Dom<'_, Self> {
        Dom::new(self, self.timeouts)
    }

    async fn navigation_result(&self) -> Result<NavigationResult, DriverError> {
        let client = &self.client()?.client;
        let title = client.title().await.unwrap_or_default();
        let url = client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();

        Ok(NavigationResult {
            url,
            title,
            status: 200,
        })
    }
}

const CLEAR_STORAGE_JS: &str =
    "(() => { try { localStorage.clear(); sessionStorage.clear(); } catch (e) {} return true; })()";

fn webdriver_key(key: &str) -> Result<char, DriverError> {
    let key = match key {
        "Enter" => Key::Enter,
        "Tab" => Key::Tab,
        "Escape" => Key::Escape,
        "Backspace" => Key::Backspace,
        other => {
            let mut chars = other.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(DriverError::NotSupported(format!("key {}", other))),
            };
        }
    };
    Ok(key.into())
}

#[async_trait]
impl ScriptHost for EmbeddedDriver {
    async fn eval(&self, expression: &str) -> Result<Value, DriverError> {
        let script = format!("return ({});", expression);
        self.client()?
            .client
            .execute(&script, vec![])
            .await
            .map_err(|e| DriverError::ScriptError(e.to_string()))
    }
}

#[async_trait]
impl Driver for EmbeddedDriver {
    async fn launch(&mut self) -> Result<(), DriverError> {
        info!("Connecting to WebDriver at {}...", self.webdriver_url);
        let client = WebDriverClient::connect(&self.webdriver_url, self.capabilities.clone())
            .await
            .map_err(|e| DriverError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| DriverError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, DriverError> {
        info!("Navigating to: {}", url);
        self.client()?
            .client
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        self.navigation_result().await
    }

    async fn go_back(&mut self) -> Result<NavigationResult, DriverError> {
        self.client()?
            .client
            .back()
            .await
            .map_err(|e| DriverError::Navigation(format!("go_back failed: {}", e)))?;
        self.dom().wait_for_load().await?;
        self.navigation_result().await
    }

    async fn reload(&mut self) -> Result<NavigationResult, DriverError> {
        self.client()?
            .client
            .refresh()
            .await
            .map_err(|e| DriverError::Navigation(format!("reload failed: {}", e)))?;
        self.navigation_result().await
    }

    async fn wait_for_load(&mut self) -> Result<(), DriverError> {
        self.dom().wait_for_load().await
    }

    async fn count(&mut self, locator: &Locator) -> Result<usize, DriverError> {
        self.dom().count(locator).await
    }

    async fn is_visible(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        self.dom().is_visible(locator).await
    }

    async fn is_enabled(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        self.dom().is_enabled(locator).await
    }

    async fn inner_text(&mut self, locator: &Locator) -> Result<String, DriverError> {
        self.dom().inner_text(locator).await
    }

    async fn input_value(&mut self, locator: &Locator) -> Result<String, DriverError> {
        self.dom().input_value(locator).await
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.dom().click(locator).await
    }

    async fn dblclick(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.dom().dblclick(locator).await
    }

    async fn fill(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        self.dom().fill(locator, text).await
    }

    /// Focus through the resolver, then press through the Actions API.
    async fn press(&mut self, locator: &Locator, key: &str) -> Result<(), DriverError> {
        let value = webdriver_key(key)?;
        self.dom().focus(locator).await?;
        let actions = KeyActions::new("keyboard".to_string())
            .then(KeyAction::Down { value })
            .then(KeyAction::Up { value });
        self.client()?
            .client
            .perform_actions(actions)
            .await
            .map_err(|e| DriverError::Other(format!("press {} failed: {}", key, e)))
    }

    async fn set_checked(&mut self, locator: &Locator, checked: bool) -> Result<(), DriverError> {
        self.dom().set_checked(locator, checked).await
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, DriverError> {
        self.client()?
            .client
            .screenshot()
            .await
            .map_err(|e| DriverError::Other(format!("Screenshot failed: {}", e)))
    }

    async fn execute_script(&mut self, script: &str) -> Result<Value, DriverError> {
        self.eval(script).await
    }

    async fn clear_session(&mut self) -> Result<(), DriverError> {
        self.client()?
            .client
            .delete_all_cookies()
            .await
            .map_err(|e| DriverError::Other(format!("clearing cookies failed: {}", e)))?;
        self.eval(CLEAR_STORAGE_JS).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys_map_to_webdriver_codepoints() {
        assert_eq!(webdriver_key("Enter").unwrap(), '\u{E007}');
        assert_eq!(webdriver_key("x").unwrap(), 'x');
        assert!(matches!(
            webdriver_key("Hyper"),
            Err(DriverError::NotSupported(_))
        ));
    }
}
