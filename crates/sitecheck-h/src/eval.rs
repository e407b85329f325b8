use chromiumoxide::Page;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use serde_json::Value;
use sitecheck_engine::DriverError;
use std::time::Duration;

/// Upper bound for one evaluation. A dialog that slips past the auto-acceptor would
/// otherwise block the JS thread forever.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries while the execution context is being replaced by a navigation.
const MAX_CONTEXT_RETRIES: u32 = 10;

const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// True when the error means the page context is gone (e.g. mid-navigation).
pub fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

async fn evaluate_with_timeout(page: &Page, expression: &str) -> Result<Value, EvalError> {
    let params = EvaluateParams::builder()
        .expression(expression)
        .return_by_value(true)
        .await_promise(true)
        .build()
        .map_err(EvalError::Other)?;

    match tokio::time::timeout(EVAL_TIMEOUT, page.evaluate_expression(params)).await {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        Ok(Ok(result)) => Ok(result.value().cloned().unwrap_or(Value::Null)),
    }
}

/// Evaluate `expression` in the page, riding out context swaps caused by navigation.
pub async fn evaluate(page: &Page, expression: &str) -> Result<Value, DriverError> {
    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        match evaluate_with_timeout(page, expression).await {
            Ok(value) => return Ok(value),
            Err(EvalError::Timeout) => {
                return Err(DriverError::TimeoutWithContext {
                    operation: "script evaluation (blocked by a dialog?)".into(),
                });
            }
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "Context error during evaluation (attempt {}/{}), retrying",
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Other(err_str)) => return Err(DriverError::ScriptError(err_str)),
        }
    }

    Err(DriverError::ScriptError(last_error.unwrap_or_else(|| {
        "evaluation failed after retries".to_string()
    })))
}
