//! Bridge between [`Locator`] queries and the page.
//!
//! Every element operation is one evaluation of `resolver.js`, called with the serialized
//! locator, an operation name and an optional argument. The script answers with
//! `{ "ok": value }` or `{ "error": code, "detail": text }`. Concrete drivers only need to
//! evaluate an expression ([`ScriptHost`]); [`Dom`] adds auto-waiting on top.

use crate::config::TimeoutConfig;
use crate::error::DriverError;
use crate::locator::Locator;
use crate::wait::poll_until;
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

const RESOLVER_JS: &str = include_str!("resolver.js");

const READY_STATE_JS: &str = "document.readyState";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomOp {
    Count,
    Visible,
    Enabled,
    Text,
    Value,
    Focus,
    Click,
    DblClick,
    Fill,
    Press,
    SetChecked,
}

impl DomOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomOp::Count => "count",
            DomOp::Visible => "visible",
            DomOp::Enabled => "enabled",
            DomOp::Text => "text",
            DomOp::Value => "value",
            DomOp::Focus => "focus",
            DomOp::Click => "click",
            DomOp::DblClick => "dblclick",
            DomOp::Fill => "fill",
            DomOp::Press => "press",
            DomOp::SetChecked => "set_checked",
        }
    }
}

/// Build the JavaScript expression performing `op` on `locator`.
pub fn script(op: DomOp, locator: &Locator, arg: &Value) -> Result<String, DriverError> {
    let query = serde_json::to_string(locator)?;
    let arg = serde_json::to_string(arg)?;
    Ok(format!(
        "({})({}, {}, {})",
        RESOLVER_JS.trim_end(),
        query,
        json!(op.as_str()),
        arg
    ))
}

/// Turn the resolver's reply into the operation's value or a typed error.
pub fn parse_reply(locator: &Locator, reply: Value) -> Result<Value, DriverError> {
    if let Some(value) = reply.get("ok") {
        return Ok(value.clone());
    }

    let detail = reply
        .get("detail")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let locator = locator.to_string();
    match reply.get("error").and_then(Value::as_str) {
        Some("not_found") => Err(DriverError::ElementNotFound { locator }),
        Some("not_visible") => Err(DriverError::ElementNotVisible { locator }),
        Some("disabled") => Err(DriverError::ElementDisabled { locator }),
        Some("script") => Err(DriverError::ScriptError(detail)),
        Some(other) => Err(DriverError::ElementNotInteractable {
            locator,
            reason: format!("{} {}", other, detail).trim().to_string(),
        }),
        None => Err(DriverError::Serialization(format!(
            "unexpected resolver reply: {}",
            reply
        ))),
    }
}

/// Something that can evaluate a JavaScript expression in the current page.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    async fn eval(&self, expression: &str) -> Result<Value, DriverError>;
}

/// Element operations for any [`ScriptHost`], with auto-waiting actions.
pub struct Dom<'a, H: ScriptHost + ?Sized> {
    host: &'a H,
    timeouts: TimeoutConfig,
}

impl<'a, H: ScriptHost + ?Sized> Dom<'a, H> {
    pub fn new(host: &'a H, timeouts: TimeoutConfig) -> Self {
        Self { host, timeouts }
    }

    async fn run_once(&self, op: DomOp, locator: &Locator, arg: &Value) -> Result<Value, DriverError> {
        let expression = script(op, locator, arg)?;
        let reply = self.host.eval(&expression).await?;
        parse_reply(locator, reply)
    }

    /// Repeat `op` until it succeeds or the action timeout passes.
    async fn run_waiting(&self, op: DomOp, locator: &Locator, arg: Value) -> Result<Value, DriverError> {
        let operation = format!("{} {}", op.as_str(), locator);
        let arg = &arg;
        poll_until(
            &operation,
            self.timeouts.action(),
            self.timeouts.poll_interval(),
            || async move {
                let result = self.run_once(op, locator, arg).await;
                if let Err(e) = &result {
                    debug!("{} not ready: {}", op.as_str(), e);
                }
                result.map(Some)
            },
        )
        .await
    }

    pub async fn count(&self, locator: &Locator) -> Result<usize, DriverError> {
        let value = self.run_once(DomOp::Count, locator, &Value::Null).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| DriverError::Serialization(format!("count is not a number: {}", value)))
    }

    pub async fn is_visible(&self, locator: &Locator) -> Result<bool, DriverError> {
        let value = self.run_once(DomOp::Visible, locator, &Value::Null).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn is_enabled(&self, locator: &Locator) -> Result<bool, DriverError> {
        let value = self.run_once(DomOp::Enabled, locator, &Value::Null).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn inner_text(&self, locator: &Locator) -> Result<String, DriverError> {
        let value = self.run_waiting(DomOp::Text, locator, Value::Null).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn input_value(&self, locator: &Locator) -> Result<String, DriverError> {
        let value = self.run_waiting(DomOp::Value, locator, Value::Null).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn focus(&self, locator: &Locator) -> Result<(), DriverError> {
        self.run_waiting(DomOp::Focus, locator, Value::Null).await?;
        Ok(())
    }

    pub async fn click(&self, locator: &Locator) -> Result<(), DriverError> {
        self.run_waiting(DomOp::Click, locator, Value::Null).await?;
        Ok(())
    }

    pub async fn dblclick(&self, locator: &Locator) -> Result<(), DriverError> {
        self.run_waiting(DomOp::DblClick, locator, Value::Null).await?;
        Ok(())
    }

    pub async fn fill(&self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        self.run_waiting(DomOp::Fill, locator, json!(text)).await?;
        Ok(())
    }

    /// Key press through synthetic keyboard events.
    pub async fn press(&self, locator: &Locator, key: &str) -> Result<(), DriverError> {
        self.run_waiting(DomOp::Press, locator, json!(key)).await?;
        Ok(())
    }

    pub async fn set_checked(&self, locator: &Locator, checked: bool) -> Result<(), DriverError> {
        let value = self.run_waiting(DomOp::SetChecked, locator, json!(checked)).await?;
        if value.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(DriverError::ElementNotInteractable {
                locator: locator.to_string(),
                reason: format!("checked state did not change to {}", checked),
            })
        }
    }

    pub async fn wait_for_load(&self) -> Result<(), DriverError> {
        poll_until(
            "load state",
            self.timeouts.load(),
            self.timeouts.poll_interval(),
            || async move {
                let state = self.host.eval(READY_STATE_JS).await?;
                Ok((state.as_str() == Some("complete")).then_some(()))
            },
        )
        .await
    }
}
