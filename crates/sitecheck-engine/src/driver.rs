use crate::locator::Locator;
use async_trait::async_trait;
pub use crate::error::DriverError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
    pub status: u16, // generic status code (e.g. 200)
}

/// The Driver trait is the browser capability every flow is written against.
///
/// Element operations take a [`Locator`]. Actions (`click`, `fill`, ...) wait until the
/// first match is visible and enabled; queries (`count`, `is_visible`, ...) answer for
/// the page as it is right now.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Launch the driver (start browser, open a WebDriver session, etc.)
    async fn launch(&mut self) -> Result<(), DriverError>;

    /// Close the driver and cleanup resources.
    async fn close(&mut self) -> Result<(), DriverError>;

    /// Check if the driver is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a specific URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, DriverError>;

    /// Navigate back in browser history.
    async fn go_back(&mut self) -> Result<NavigationResult, DriverError>;

    /// Reload the current page.
    async fn reload(&mut self) -> Result<NavigationResult, DriverError>;

    /// Wait until the document reports `readyState == "complete"`.
    async fn wait_for_load(&mut self) -> Result<(), DriverError>;

    async fn count(&mut self, locator: &Locator) -> Result<usize, DriverError>;

    /// True when any match is rendered and not hidden.
    async fn is_visible(&mut self, locator: &Locator) -> Result<bool, DriverError>;

    /// True when the first match exists and is not disabled.
    async fn is_enabled(&mut self, locator: &Locator) -> Result<bool, DriverError>;

    async fn inner_text(&mut self, locator: &Locator) -> Result<String, DriverError>;

    async fn input_value(&mut self, locator: &Locator) -> Result<String, DriverError>;

    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError>;

    async fn dblclick(&mut self, locator: &Locator) -> Result<(), DriverError>;

    /// Replace the value of an input and fire `input`/`change`.
    async fn fill(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError>;

    /// Focus the element and press a key (e.g. `"Enter"`).
    async fn press(&mut self, locator: &Locator, key: &str) -> Result<(), DriverError>;

    async fn set_checked(&mut self, locator: &Locator, checked: bool)
    -> Result<(), DriverError>;

    /// Capture a PNG screenshot of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>, DriverError>;

    /// Evaluate a JavaScript expression in the page.
    async fn execute_script(&mut self, _script: &str) -> Result<serde_json::Value, DriverError> {
        Err(DriverError::NotSupported("execute_script".into()))
    }

    /// Drop cookies and the current origin's web storage, as a fresh browser context would.
    async fn clear_session(&mut self) -> Result<(), DriverError> {
        Err(DriverError::NotSupported("clear_session".into()))
    }

    /// Sleep without touching the page. Only used for pacing between clicks.
    async fn pause(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
