use crate::error::DriverError;
use serde::Serialize;
use std::fmt;

/// Result of a single check. Checks never panic or swallow failures; the caller
/// decides what a failure means through [`Severity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    Pass,
    Fail { reason: String },
}

impl CheckOutcome {
    pub fn fail(reason: impl Into<String>) -> Self {
        CheckOutcome::Fail {
            reason: reason.into(),
        }
    }

    /// Pass when `condition` holds, otherwise fail with `reason`.
    pub fn check(condition: bool, reason: impl FnOnce() -> String) -> Self {
        if condition {
            CheckOutcome::Pass
        } else {
            CheckOutcome::fail(reason())
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, CheckOutcome::Pass)
    }

    /// Treat a failure as fatal.
    pub fn into_result(self) -> Result<(), DriverError> {
        match self {
            CheckOutcome::Pass => Ok(()),
            CheckOutcome::Fail { reason } => Err(DriverError::Expectation(reason)),
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Pass => write!(f, "pass"),
            CheckOutcome::Fail { reason } => write!(f, "fail: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A failure fails the run.
    Hard,
    /// A failure is reported as a warning only.
    Soft,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckRecord {
    pub label: String,
    pub severity: Severity,
    pub outcome: CheckOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub suite: String,
    pub name: String,
    pub checks: Vec<CheckRecord>,
    /// Free-form lines collected during the scenario (cart contents, API data).
    pub notes: Vec<String>,
    pub error: Option<String>,
    pub skipped: Option<String>,
}

impl ScenarioReport {
    pub fn new(suite: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
            checks: Vec::new(),
            notes: Vec::new(),
            error: None,
            skipped: None,
        }
    }

    pub fn skipped(suite: impl Into<String>, name: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut report = Self::new(suite, name);
        report.skipped = Some(reason.into());
        report
    }

    pub fn record(&mut self, label: impl Into<String>, severity: Severity, outcome: CheckOutcome) {
        let label = label.into();
        match (&outcome, severity) {
            (CheckOutcome::Pass, _) => tracing::debug!("[{}] {}: pass", self.name, label),
            (CheckOutcome::Fail { reason }, Severity::Hard) => {
                tracing::error!("[{}] {}: {}", self.name, label, reason)
            }
            (CheckOutcome::Fail { reason }, Severity::Soft) => {
                tracing::warn!("[{}] {}: {}", self.name, label, reason)
            }
        }
        self.checks.push(CheckRecord {
            label,
            severity,
            outcome,
        });
    }

    pub fn note(&mut self, line: impl Into<String>) {
        self.notes.push(line.into());
    }

    /// Record an error that aborted the scenario.
    pub fn abort(&mut self, error: impl fmt::Display) {
        tracing::error!("[{}] aborted: {}", self.name, error);
        self.error = Some(error.to_string());
    }

    /// Close the scenario with the result of its body.
    pub fn finish<E: fmt::Display>(mut self, result: Result<(), E>) -> Self {
        if let Err(e) = result {
            self.abort(e);
        }
        self
    }

    pub fn hard_failures(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.severity == Severity::Hard && !c.outcome.is_pass())
            .count()
    }

    pub fn warnings(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.severity == Severity::Soft && !c.outcome.is_pass())
            .count()
    }

    pub fn passed(&self) -> bool {
        self.error.is_none() && self.hard_failures() == 0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub scenarios: Vec<ScenarioReport>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub warnings: usize,
}

impl RunReport {
    pub fn extend(&mut self, scenarios: impl IntoIterator<Item = ScenarioReport>) {
        self.scenarios.extend(scenarios);
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for scenario in &self.scenarios {
            summary.warnings += scenario.warnings();
            if scenario.skipped.is_some() {
                summary.skipped += 1;
            } else if scenario.passed() {
                summary.passed += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    pub fn passed(&self) -> bool {
        self.summary().failed == 0
    }
}
