use crate::cdp::CdpClient;
use crate::eval::evaluate;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::network::ClearBrowserCookiesParams;
use chromiumoxide::page::ScreenshotParams;
use serde_json::Value;
use sitecheck_engine::config::TimeoutConfig;
use sitecheck_engine::dom::{Dom, ScriptHost};
use sitecheck_engine::driver::{Driver, DriverError, NavigationResult};
use sitecheck_engine::locator::Locator;
use sitecheck_engine::wait::poll_until;
use tracing::info;

/// Chromium over the DevTools protocol, headless unless asked otherwise.
pub struct HeadlessDriver {
    client: Option<CdpClient>,
    visible: bool,
    timeouts: TimeoutConfig,
}

impl HeadlessDriver {
    pub fn new(timeouts: TimeoutConfig) -> Self {
        Self::new_with_visibility(false, timeouts)
    }

    pub fn new_with_visibility(visible: bool, timeouts: TimeoutConfig) -> Self {
        Self {
            client: None,
            visible,
            timeouts,
        }
    }

    pub fn get_client(&self) -> Option<&CdpClient> {
        self.client.as_ref()
    }

    fn client(&self) -> Result<&CdpClient, DriverError> {
        self.client.as_ref().ok_or(DriverError::NotReady)
    }

    fn dom(&self) -> Dom<'_, Self> {
        Dom::new(self, self.timeouts)
    }

    async fn navigation_result(&self) -> Result<NavigationResult, DriverError> {
        let page = &self.client()?.page;
        let title = page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = page
            .url()
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult {
            url,
            title,
            status: 200,
        })
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let value = self.eval("location.href").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn dispatch_key(&self, kind: DispatchKeyEventType, key: &str) -> Result<(), DriverError> {
        let (code, virtual_key, text) = key_definition(key);
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind.clone())
            .key(key)
            .code(code)
            .windows_virtual_key_code(virtual_key)
            .native_virtual_key_code(virtual_key);
        if kind == DispatchKeyEventType::KeyDown {
            if let Some(text) = text {
                builder = builder.text(text);
            }
        }
        let event = builder
            .build()
            .map_err(|e| DriverError::Other(format!("Failed to build key event: {:?}", e)))?;

        self.client()?
            .page
            .execute(event)
            .await
            .map_err(|e| DriverError::Other(format!("press {} failed: {}", key, e)))?;
        Ok(())
    }
}

/// Storage access throws on opaque origins such as about:blank.
const CLEAR_STORAGE_JS: &str =
    "(() => { try { localStorage.clear(); sessionStorage.clear(); } catch (e) {} return true; })()";

/// `(code, virtual key code, text)` for the keys the flows press.
fn key_definition(key: &str) -> (String, i64, Option<String>) {
    match key {
        "Enter" => ("Enter".into(), 13, Some("\r".into())),
        "Tab" => ("Tab".into(), 9, None),
        "Escape" => ("Escape".into(), 27, None),
        "Backspace" => ("Backspace".into(), 8, None),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    let upper = c.to_ascii_uppercase();
                    let code = if upper.is_ascii_alphabetic() {
                        format!("Key{}", upper)
                    } else if c.is_ascii_digit() {
                        format!("Digit{}", c)
                    } else {
                        String::new()
                    };
                    (code, upper as i64, Some(c.to_string()))
                }
                _ => (other.to_string(), 0, None),
            }
        }
    }
}

#[async_trait]
impl ScriptHost for HeadlessDriver {
    async fn eval(&self, expression: &str) -> Result<Value, DriverError> {
        evaluate(&self.client()?.page, expression).await
    }
}

#[async_trait]
impl Driver for HeadlessDriver {
    async fn launch(&mut self) -> Result<(), DriverError> {
        info!("Launching headless driver (Chromium)...");
        let client = CdpClient::launch(self.visible)
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
            .page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        self.navigation_result().await
    }

    async fn go_back(&mut self) -> Result<NavigationResult, DriverError> {
        let before = self.current_url().await?;
        self.eval("history.back(), true")
            .await
            .map_err(|e| DriverError::Navigation(format!("go_back failed: {}", e)))?;

        // same-document navigations fire no load event, so watch the URL instead
        let driver = &*self;
        let before = before.as_str();
        poll_until(
            "history back",
            self.timeouts.load(),
            self.timeouts.poll_interval(),
            || async move {
                let now = driver.current_url().await?;
                Ok((now != before).then_some(()))
            },
        )
        .await?;
        self.dom().wait_for_load().await?;
        self.navigation_result().await
    }

    async fn reload(&mut self) -> Result<NavigationResult, DriverError> {
        self.client()?
            .page
            .reload()
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

    /// Focus through the resolver, then send real key events so default actions run.
    async fn press(&mut self, locator: &Locator, key: &str) -> Result<(), DriverError> {
        self.dom().focus(locator).await?;
        self.dispatch_key(DispatchKeyEventType::KeyDown, key).await?;
        self.dispatch_key(DispatchKeyEventType::KeyUp, key).await
    }

    async fn set_checked(&mut self, locator: &Locator, checked: bool) -> Result<(), DriverError> {
        self.dom().set_checked(locator, checked).await
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, DriverError> {
        self.client()?
            .page
            .screenshot(ScreenshotParams::builder().build())
            .await
            .map_err(|e| DriverError::Other(format!("Screenshot failed: {}", e)))
    }

    async fn execute_script(&mut self, script: &str) -> Result<Value, DriverError> {
        self.eval(script).await
    }

    async fn clear_session(&mut self) -> Result<(), DriverError> {
        self.client()?
            .page
            .execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(|e| DriverError::Other(format!("clearing cookies failed: {}", e)))?;
        self.eval(CLEAR_STORAGE_JS).await?;
        Ok(())
    }
}
