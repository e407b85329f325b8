use crate::error::DriverError;
use crate::report::{CheckOutcome, RunReport, ScenarioReport, Severity};

/// Driver error with its code and a recovery hint.
pub fn format_driver_error(err: &DriverError) -> String {
    format!("[{}] {}\nHint: {}", err.code(), err, err.recovery_hint())
}

fn status(scenario: &ScenarioReport) -> &'static str {
    if scenario.skipped.is_some() {
        "SKIP"
    } else if !scenario.passed() {
        "FAIL"
    } else if scenario.warnings() > 0 {
        "WARN"
    } else {
        "PASS"
    }
}

pub fn format_scenario(scenario: &ScenarioReport) -> String {
    let mut output = format!("{} {}: {}", status(scenario), scenario.suite, scenario.name);

    if let Some(reason) = &scenario.skipped {
        output.push_str(&format!("\n    skipped: {}", reason));
        return output;
    }

    for note in &scenario.notes {
        output.push_str(&format!("\n    {}", note));
    }
    for check in &scenario.checks {
        if let CheckOutcome::Fail { reason } = &check.outcome {
            let tag = match check.severity {
                Severity::Hard => "failed",
                Severity::Soft => "warning",
            };
            output.push_str(&format!("\n    {} {}: {}", tag, check.label, reason));
        }
    }
    if let Some(error) = &scenario.error {
        output.push_str(&format!("\n    error: {}", error));
    }
    output
}

pub fn format_report(report: &RunReport) -> String {
    let mut output = String::new();
    for scenario in &report.scenarios {
        output.push_str(&format_scenario(scenario));
        output.push('\n');
    }

    let summary = report.summary();
    output.push_str(&format!(
        "\n{} passed, {} failed, {} skipped, {} warnings",
        summary.passed, summary.failed, summary.skipped, summary.warnings
    ));
    output
}
