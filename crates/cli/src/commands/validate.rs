use crate::commands::{block_on, CommandResult};
use consulty_agent::{AccuracyValidator, AgentRuntime, ClassifierStack, InMemorySessionStore};
use consulty_db::{InMemoryAppointmentStore, InMemoryProviderCatalog};

/// Runs the fixed labeled suite against the deterministic pipeline: the
/// rule classifier over the seeded demo catalog. The oracle is deliberately
/// excluded so two runs always grade identically.
pub fn run(json: bool) -> CommandResult {
    let report = match block_on(async {
        let runtime = AgentRuntime::new(
            ClassifierStack::rules_only(),
            InMemoryProviderCatalog::seeded(),
            InMemorySessionStore::new(),
            InMemoryAppointmentStore::default(),
        );
        AccuracyValidator::with_default_cases().run(&runtime).await
    }) {
        Ok(report) => report,
        Err(failure) => return failure,
    };

    let all_passed = report.results.iter().all(|result| result.passed);

    if json {
        let output = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("{{\"error\":\"{error}\"}}"));
        return CommandResult { exit_code: u8::from(!all_passed), output };
    }

    let mut lines = Vec::new();
    for result in &report.results {
        let status = if result.passed { "PASS" } else { "FAIL" };
        lines.push(format!("  [{status}] {:.2}  {}", result.score, result.input));
        for issue in &result.issues {
            lines.push(format!("         - {issue}"));
        }
    }
    lines.push(format!(
        "overall {:.0}% | intent {:.0}% | categories {:.0}% | confidence {:.0}%",
        report.overall_accuracy * 100.0,
        report.intent_accuracy * 100.0,
        report.category_accuracy * 100.0,
        report.confidence_accuracy * 100.0,
    ));
    for recommendation in &report.recommendations {
        lines.push(format!("recommendation: {recommendation}"));
    }

    CommandResult { exit_code: u8::from(!all_passed), output: lines.join("\n") }
}

#[cfg(test)]
mod tests {
    #[test]
    fn human_output_runs_and_reports_all_sections() {
        let result = super::run(false);
        assert_eq!(result.exit_code, 0, "default suite must pass: {}", result.output);
        assert!(result.output.contains("overall"));
        assert!(result.output.contains("[PASS]"));
    }

    #[test]
    fn json_output_is_parseable() {
        let result = super::run(true);
        assert_eq!(result.exit_code, 0);
        let parsed: serde_json::Value =
            serde_json::from_str(&result.output).expect("valid JSON report");
        assert!(parsed.get("overall_accuracy").is_some());
    }
}
