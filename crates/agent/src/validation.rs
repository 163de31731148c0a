//! The executable acceptance suite: a fixed labeled set of messages run
//! through the full pipeline and graded against expected intent,
//! categories, and confidence. Run against a rules-only classifier stack
//! so two runs over the same pipeline version produce identical reports.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use consulty_core::booking::AppointmentStore;
use consulty_core::domain::category::Category;
use consulty_core::domain::session::SessionId;
use consulty_core::domain::turn::{ActionType, TurnRequest};
use consulty_core::ranking::ProviderCatalog;

use crate::context::SessionStore;
use crate::runtime::AgentRuntime;

const PASS_THRESHOLD: f64 = 0.70;
const INTENT_WEIGHT: f64 = 0.4;
const CATEGORY_WEIGHT: f64 = 0.3;
const CONFIDENCE_WEIGHT: f64 = 0.2;
const QUALITY_WEIGHT: f64 = 0.1;
/// Confidence deltas at or beyond this score zero.
const CONFIDENCE_TOLERANCE: f64 = 0.5;
const MIN_RESPONSE_LENGTH: usize = 40;

#[derive(Clone, Debug)]
pub struct ValidationCase {
    pub input: &'static str,
    pub expected_action: ActionType,
    pub expected_categories: &'static [Category],
    pub expected_confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CaseResult {
    pub input: String,
    pub expected_action: ActionType,
    pub actual_action: ActionType,
    pub intent_score: f64,
    pub category_score: f64,
    pub confidence_score: f64,
    pub quality_score: f64,
    pub score: f64,
    pub passed: bool,
    pub issues: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationReport {
    pub results: Vec<CaseResult>,
    /// Fraction of cases at or above the pass threshold.
    pub overall_accuracy: f64,
    /// Fraction of exact intent matches.
    pub intent_accuracy: f64,
    /// Mean category Jaccard similarity.
    pub category_accuracy: f64,
    /// Mean confidence closeness.
    pub confidence_accuracy: f64,
    pub recommendations: Vec<String>,
}

const DEFAULT_CASES: &[ValidationCase] = &[
    ValidationCase {
        input: "Hi there",
        expected_action: ActionType::Greeting,
        expected_categories: &[],
        expected_confidence: 0.7,
    },
    ValidationCase {
        input: "hello!",
        expected_action: ActionType::Greeting,
        expected_categories: &[],
        expected_confidence: 0.7,
    },
    ValidationCase {
        input: "I need a lawyer for contract review",
        expected_action: ActionType::Search,
        expected_categories: &[Category::Legal],
        expected_confidence: 0.9,
    },
    ValidationCase {
        input: "Looking for an accountant to handle my taxes",
        expected_action: ActionType::Search,
        expected_categories: &[Category::Finance],
        expected_confidence: 0.9,
    },
    ValidationCase {
        input: "Find me a business consultant under $150",
        expected_action: ActionType::Search,
        expected_categories: &[Category::Business],
        expected_confidence: 0.9,
    },
    ValidationCase {
        input: "Can you recommend a good tutor for math?",
        expected_action: ActionType::Search,
        expected_categories: &[Category::Education],
        expected_confidence: 0.7,
    },
    ValidationCase {
        input: "I need an experienced attorney in New York urgently",
        expected_action: ActionType::Search,
        expected_categories: &[Category::Legal],
        expected_confidence: 0.9,
    },
    ValidationCase {
        input: "I want to book an appointment with a therapist",
        expected_action: ActionType::Book,
        expected_categories: &[Category::Health],
        expected_confidence: 0.9,
    },
    ValidationCase {
        input: "Schedule a session with a career coach next week",
        expected_action: ActionType::Book,
        expected_categories: &[Category::Career],
        expected_confidence: 0.9,
    },
    ValidationCase {
        input: "How does this work?",
        expected_action: ActionType::Info,
        expected_categories: &[],
        expected_confidence: 0.6,
    },
    ValidationCase {
        input: "This service is terrible, I want a refund",
        expected_action: ActionType::Complaint,
        expected_categories: &[],
        expected_confidence: 0.65,
    },
    ValidationCase {
        input: "I failed my interview",
        expected_action: ActionType::ProblemSolving,
        expected_categories: &[Category::Career],
        expected_confidence: 0.8,
    },
    ValidationCase {
        input: "I'm struggling to get clients for my startup",
        expected_action: ActionType::ProblemSolving,
        expected_categories: &[Category::Business],
        expected_confidence: 0.8,
    },
    ValidationCase {
        input: "My website keeps crashing and I can't figure out why",
        expected_action: ActionType::ProblemSolving,
        expected_categories: &[Category::Technology],
        expected_confidence: 0.8,
    },
    ValidationCase {
        input: "xyzzy",
        expected_action: ActionType::Clarification,
        expected_categories: &[],
        expected_confidence: 0.5,
    },
];

pub struct AccuracyValidator {
    cases: Vec<ValidationCase>,
    run_counter: AtomicUsize,
}

impl Default for AccuracyValidator {
    fn default() -> Self {
        Self::with_default_cases()
    }
}

impl AccuracyValidator {
    pub fn with_default_cases() -> Self {
        Self { cases: DEFAULT_CASES.to_vec(), run_counter: AtomicUsize::new(0) }
    }

    pub fn with_cases(cases: Vec<ValidationCase>) -> Self {
        Self { cases, run_counter: AtomicUsize::new(0) }
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    /// Run every case through the pipeline. Cases are independent and each
    /// gets its own synthetic session, so repeated runs never share state.
    pub async fn run<C, S, A>(&self, runtime: &AgentRuntime<C, S, A>) -> ValidationReport
    where
        C: ProviderCatalog,
        S: SessionStore,
        A: AppointmentStore,
    {
        let run = self.run_counter.fetch_add(1, Ordering::SeqCst);
        let mut results = Vec::with_capacity(self.cases.len());

        for (index, case) in self.cases.iter().enumerate() {
            let request = TurnRequest {
                message: case.input.to_string(),
                user_id: None,
                session_id: SessionId(format!("validation-{run}-{index}")),
                history: Vec::new(),
            };

            let analysis = runtime.classify(&request).await;
            let response = runtime.handle_turn(&request).await;

            results.push(grade_case(case, &analysis.categories, &response));
        }

        let total = results.len().max(1) as f64;
        let overall_accuracy =
            results.iter().filter(|result| result.passed).count() as f64 / total;
        let intent_accuracy =
            results.iter().map(|result| result.intent_score).sum::<f64>() / total;
        let category_accuracy =
            results.iter().map(|result| result.category_score).sum::<f64>() / total;
        let confidence_accuracy =
            results.iter().map(|result| result.confidence_score).sum::<f64>() / total;
        let recommendations = build_recommendations(&results);

        ValidationReport {
            results,
            overall_accuracy,
            intent_accuracy,
            category_accuracy,
            confidence_accuracy,
            recommendations,
        }
    }
}

fn grade_case(
    case: &ValidationCase,
    actual_categories: &[Category],
    response: &consulty_core::domain::turn::TurnResponse,
) -> CaseResult {
    let intent_score = if response.action == case.expected_action { 1.0 } else { 0.0 };
    let category_score = jaccard(case.expected_categories, actual_categories);
    let delta = (response.confidence - case.expected_confidence).abs();
    let confidence_score = (1.0 - delta / CONFIDENCE_TOLERANCE).max(0.0);
    let quality_score = response_quality(&response.text, case.expected_categories);

    let score = INTENT_WEIGHT * intent_score
        + CATEGORY_WEIGHT * category_score
        + CONFIDENCE_WEIGHT * confidence_score
        + QUALITY_WEIGHT * quality_score;
    let passed = score >= PASS_THRESHOLD;

    let mut issues = Vec::new();
    if intent_score < 1.0 {
        issues.push(format!(
            "intent mismatch: expected {:?}, got {:?}",
            case.expected_action, response.action
        ));
    }
    if category_score < 1.0 {
        issues.push(format!(
            "category divergence: expected {:?}, got {actual_categories:?}",
            case.expected_categories
        ));
    }
    if confidence_score < 0.8 {
        issues.push(format!(
            "confidence off by {delta:.2} (expected {:.2}, got {:.2})",
            case.expected_confidence, response.confidence
        ));
    }
    if quality_score < 1.0 {
        issues.push("response quality below heuristic".to_string());
    }

    CaseResult {
        input: case.input.to_string(),
        expected_action: case.expected_action,
        actual_action: response.action,
        intent_score,
        category_score,
        confidence_score,
        quality_score,
        score,
        passed,
        issues,
    }
}

/// Jaccard similarity over category sets; two empty sets count as a
/// perfect match.
fn jaccard(expected: &[Category], actual: &[Category]) -> f64 {
    if expected.is_empty() && actual.is_empty() {
        return 1.0;
    }

    let intersection =
        expected.iter().filter(|category| actual.contains(category)).count() as f64;
    let mut union: Vec<Category> = expected.to_vec();
    for category in actual {
        if !union.contains(category) {
            union.push(*category);
        }
    }
    intersection / union.len() as f64
}

/// Length/keyword heuristic: a useful reply is long enough to say
/// something and names the expected service domain when there is one.
fn response_quality(text: &str, expected_categories: &[Category]) -> f64 {
    let mut quality = 0.0;
    if text.len() >= MIN_RESPONSE_LENGTH {
        quality += 0.5;
    }

    let lowered = text.to_ascii_lowercase();
    let mentions_domain = expected_categories.is_empty()
        || expected_categories.iter().any(|category| lowered.contains(category.label()));
    if mentions_domain {
        quality += 0.5;
    }
    quality
}

/// Group failing cases by their weakest scoring term and emit one
/// recommendation per cluster, largest first.
fn build_recommendations(results: &[CaseResult]) -> Vec<String> {
    let mut clusters = [0usize; 4];
    for result in results.iter().filter(|result| !result.passed) {
        let components = [
            result.intent_score,
            result.category_score,
            result.confidence_score,
            result.quality_score,
        ];
        let weakest = components
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(index, _)| index)
            .unwrap_or(0);
        clusters[weakest] += 1;
    }

    let labels = [
        "intent match - revisit the action-type rule order",
        "category detection - extend the keyword lexicon",
        "confidence calibration - adjust the scoring formula weights",
        "response quality - revisit the response templates",
    ];

    let mut ranked: Vec<(usize, &str)> = clusters
        .into_iter()
        .zip(labels)
        .filter(|(count, _)| *count > 0)
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    ranked
        .into_iter()
        .map(|(count, label)| format!("{count} failing case(s) weakest on {label}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use consulty_db::{InMemoryAppointmentStore, InMemoryProviderCatalog};

    use crate::classifier::ClassifierStack;
    use crate::context::InMemorySessionStore;
    use crate::runtime::AgentRuntime;

    use super::{jaccard, AccuracyValidator};
    use consulty_core::domain::category::Category;

    fn runtime() -> AgentRuntime<InMemoryProviderCatalog, InMemorySessionStore, InMemoryAppointmentStore>
    {
        AgentRuntime::new(
            ClassifierStack::rules_only(),
            InMemoryProviderCatalog::seeded(),
            InMemorySessionStore::new(),
            InMemoryAppointmentStore::default(),
        )
    }

    #[test]
    fn jaccard_handles_empty_and_partial_overlap() {
        assert_eq!(jaccard(&[], &[]), 1.0);
        assert_eq!(jaccard(&[Category::Legal], &[Category::Legal]), 1.0);
        assert_eq!(jaccard(&[Category::Legal], &[]), 0.0);
        assert!((jaccard(&[Category::Legal, Category::Finance], &[Category::Legal]) - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn default_suite_passes_against_the_deterministic_pipeline() {
        let runtime = runtime();
        let validator = AccuracyValidator::with_default_cases();
        let report = validator.run(&runtime).await;

        for result in &report.results {
            assert!(
                result.passed,
                "case `{}` failed with score {:.2}: {:?}",
                result.input, result.score, result.issues
            );
        }
        assert_eq!(report.overall_accuracy, 1.0);
        assert_eq!(report.intent_accuracy, 1.0);
        assert!(report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn repeated_runs_produce_identical_reports() {
        let runtime = runtime();
        let validator = AccuracyValidator::with_default_cases();

        let first = validator.run(&runtime).await;
        let second = validator.run(&runtime).await;

        assert_eq!(first.overall_accuracy, second.overall_accuracy);
        assert_eq!(first.results, second.results);
    }
}
