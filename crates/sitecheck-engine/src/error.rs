/// Errors raised by a [`Driver`](crate::driver::Driver) while talking to the browser.
#[derive(thiserror::Error, Debug, Clone)]
pub enum DriverError {
    // ============================================================
    // Navigation Errors
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // Element Errors
    // ============================================================
    #[error("No element matches {locator}")]
    ElementNotFound { locator: String },

    #[error("Element {locator} is not visible")]
    ElementNotVisible { locator: String },

    #[error("Element {locator} is disabled")]
    ElementDisabled { locator: String },

    #[error("Element {locator} is not interactable: {reason}")]
    ElementNotInteractable { locator: String, reason: String },

    // ============================================================
    // Execution Errors
    // ============================================================
    #[error("Script execution error: {0}")]
    ScriptError(String),

    #[error("Timeout: {operation}")]
    TimeoutWithContext { operation: String },

    #[error("Expectation failed: {0}")]
    Expectation(String),

    // ============================================================
    // System Errors
    // ============================================================
    #[error("Not ready")]
    NotReady,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Other: {0}")]
    Other(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        DriverError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(err: serde_json::Error) -> Self {
        DriverError::Serialization(err.to_string())
    }
}

impl DriverError {
    /// Stable error code, used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::Navigation(_) => "NAVIGATION_ERROR",
            DriverError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            DriverError::ElementNotVisible { .. } => "ELEMENT_NOT_VISIBLE",
            DriverError::ElementDisabled { .. } => "ELEMENT_DISABLED",
            DriverError::ElementNotInteractable { .. } => "ELEMENT_NOT_INTERACTABLE",
            DriverError::ScriptError(_) => "SCRIPT_ERROR",
            DriverError::TimeoutWithContext { .. } => "TIMEOUT",
            DriverError::Expectation(_) => "EXPECTATION_FAILED",
            DriverError::NotReady => "NOT_READY",
            DriverError::Io(_) => "IO_ERROR",
            DriverError::Serialization(_) => "SERIALIZATION_ERROR",
            DriverError::Other(_) => "INTERNAL_ERROR",
            DriverError::NotSupported(_) => "NOT_SUPPORTED",
        }
    }

    /// Element states that may resolve by themselves while the page settles.
    /// Actions keep polling on these until their deadline.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DriverError::ElementNotFound { .. }
                | DriverError::ElementNotVisible { .. }
                | DriverError::ElementDisabled { .. }
        )
    }

    /// Returns a recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            DriverError::ElementNotFound { .. } => "Check the locator against the live page",
            DriverError::ElementNotVisible { .. } => "Scroll element into view or wait",
            DriverError::ElementDisabled { .. } => "Wait for element to become enabled",
            DriverError::ElementNotInteractable { .. } => "Wait for overlays to close",
            DriverError::TimeoutWithContext { .. } => "Increase timeout or verify condition",
            DriverError::Navigation(_) => "Check URL and network connectivity",
            _ => "Check command parameters",
        }
    }
}
