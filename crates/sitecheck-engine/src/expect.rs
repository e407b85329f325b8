use crate::config::TimeoutConfig;
use crate::driver::Driver;
use crate::error::DriverError;
use crate::locator::Locator;
use crate::report::CheckOutcome;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// What an [`Expectation`] waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Visible,
    Hidden,
    Count(usize),
    Text(String),
    ContainsText(String),
    NotContainsText(String),
}

impl Condition {
    fn describe(&self) -> String {
        match self {
            Condition::Visible => "to be visible".to_string(),
            Condition::Hidden => "to be hidden".to_string(),
            Condition::Count(n) => format!("to have count {}", n),
            Condition::Text(text) => format!("to have text \"{}\"", text),
            Condition::ContainsText(text) => format!("to contain text \"{}\"", text),
            Condition::NotContainsText(text) => format!("not to contain text \"{}\"", text),
        }
    }
}

/// A polling assertion on a locator.
///
/// ```ignore
/// let outcome = expect(driver, Locator::css(".validation-message"))
///     .with_timeout(timeouts.expect())
///     .to_be_visible()
///     .await?;
/// ```
pub struct Expectation<'a, D: Driver + ?Sized> {
    driver: &'a mut D,
    locator: Locator,
    timeout: Duration,
    interval: Duration,
    message: Option<String>,
}

/// Start an expectation with the default 5 s timeout and 100 ms polling.
pub fn expect<D: Driver + ?Sized>(driver: &mut D, locator: Locator) -> Expectation<'_, D> {
    let defaults = TimeoutConfig::default();
    Expectation {
        driver,
        locator,
        timeout: defaults.expect(),
        interval: defaults.poll_interval(),
        message: None,
    }
}

impl<'a, D: Driver + ?Sized> Expectation<'a, D> {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Use the expect timeout and polling interval from configuration.
    pub fn with_timeouts(self, timeouts: &TimeoutConfig) -> Self {
        self.with_timeout(timeouts.expect())
            .with_interval(timeouts.poll_interval())
    }

    /// Message reported instead of the generated one when the expectation fails.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub async fn to_be_visible(self) -> Result<CheckOutcome, DriverError> {
        self.run(Condition::Visible).await
    }

    pub async fn to_be_hidden(self) -> Result<CheckOutcome, DriverError> {
        self.run(Condition::Hidden).await
    }

    pub async fn to_have_count(self, count: usize) -> Result<CheckOutcome, DriverError> {
        self.run(Condition::Count(count)).await
    }

    pub async fn to_have_text(self, text: impl Into<String>) -> Result<CheckOutcome, DriverError> {
        self.run(Condition::Text(text.into())).await
    }

    pub async fn to_contain_text(
        self,
        text: impl Into<String>,
    ) -> Result<CheckOutcome, DriverError> {
        self.run(Condition::ContainsText(text.into())).await
    }

    pub async fn not_to_contain_text(
        self,
        text: impl Into<String>,
    ) -> Result<CheckOutcome, DriverError> {
        self.run(Condition::NotContainsText(text.into())).await
    }

    /// Returns `(satisfied, observed)` for one poll.
    async fn poll_once(&mut self, condition: &Condition) -> Result<(bool, String), DriverError> {
        match condition {
            Condition::Visible => {
                let visible = self.driver.is_visible(&self.locator).await?;
                Ok((visible, if visible { "visible" } else { "not visible" }.into()))
            }
            Condition::Hidden => {
                let visible = self.driver.is_visible(&self.locator).await?;
                Ok((!visible, if visible { "visible" } else { "hidden" }.into()))
            }
            Condition::Count(expected) => {
                let count = self.driver.count(&self.locator).await?;
                Ok((count == *expected, format!("count {}", count)))
            }
            Condition::Text(_) | Condition::ContainsText(_) | Condition::NotContainsText(_) => {
                let text = match self.current_text().await? {
                    Some(text) => text,
                    // a missing element contains nothing
                    None => {
                        let ok = matches!(condition, Condition::NotContainsText(_));
                        return Ok((ok, "no element".into()));
                    }
                };
                let ok = match condition {
                    Condition::Text(expected) => text == expected.trim(),
                    Condition::ContainsText(expected) => text.contains(expected.as_str()),
                    Condition::NotContainsText(expected) => !text.contains(expected.as_str()),
                    _ => unreachable!(),
                };
                Ok((ok, format!("text \"{}\"", text)))
            }
        }
    }

    /// Text of the first match without the action auto-wait, `None` when nothing matches.
    async fn current_text(&mut self) -> Result<Option<String>, DriverError> {
        if self.driver.count(&self.locator).await? == 0 {
            return Ok(None);
        }
        match self.driver.inner_text(&self.locator).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_retryable() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn run(mut self, condition: Condition) -> Result<CheckOutcome, DriverError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let (ok, observed) = self.poll_once(&condition).await?;
            if ok {
                return Ok(CheckOutcome::Pass);
            }
            if Instant::now() >= deadline {
                let reason = self.message.take().unwrap_or_else(|| {
                    format!(
                        "expected {} {}, got {} after {:?}",
                        self.locator,
                        condition.describe(),
                        observed,
                        self.timeout
                    )
                });
                return Ok(CheckOutcome::fail(reason));
            }
            debug!(
                "waiting for {} {} ({})",
                self.locator,
                condition.describe(),
                observed
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}
