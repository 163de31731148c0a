//! Empathy-first triage for messages that describe a problem rather than a
//! direct request. The advisor offers self-help guidance before any paid
//! expert is suggested; escalation to provider search happens only when the
//! user asks for it or reports that self-help failed.

use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::turn::{ActionType, HistoryEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    Career,
    Business,
    Legal,
    Financial,
    Technical,
    Health,
    General,
}

impl ProblemType {
    pub fn label(&self) -> &'static str {
        match self {
            ProblemType::Career => "career",
            ProblemType::Business => "business",
            ProblemType::Legal => "legal",
            ProblemType::Financial => "financial",
            ProblemType::Technical => "technical",
            ProblemType::Health => "health",
            ProblemType::General => "general",
        }
    }

    /// The catalog category searched when the user escalates.
    pub fn search_category(&self) -> Option<Category> {
        match self {
            ProblemType::Career => Some(Category::Career),
            ProblemType::Business => Some(Category::Business),
            ProblemType::Legal => Some(Category::Legal),
            ProblemType::Financial => Some(Category::Finance),
            ProblemType::Technical => Some(Category::Technology),
            ProblemType::Health => Some(Category::Health),
            ProblemType::General => None,
        }
    }

    fn from_category(category: Category) -> Option<ProblemType> {
        match category {
            Category::Career => Some(ProblemType::Career),
            Category::Business => Some(ProblemType::Business),
            Category::Legal => Some(ProblemType::Legal),
            Category::Finance => Some(ProblemType::Financial),
            Category::Technology => Some(ProblemType::Technical),
            Category::Health => Some(ProblemType::Health),
            Category::Marketing | Category::Education => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemAnalysis {
    pub problem_type: ProblemType,
    pub severity: Severity,
    pub can_self_solve: bool,
    pub solution_steps: Vec<String>,
    pub follow_up_questions: Vec<String>,
}

/// Vocabulary that makes a message a problem statement in the first place.
const PROBLEM_INDICATORS: &[&str] = &[
    "failed",
    "failing",
    "stuck",
    "struggling",
    "rejected",
    "overwhelmed",
    "lost my",
    "can't figure",
    "cannot figure",
    "don't know what to do",
    "went wrong",
    "not working",
    "desperate",
    "crisis",
];

/// Ranked severity tiers; the first tier that matches wins.
const HIGH_SEVERITY: &[&str] =
    &["crisis", "emergency", "desperate", "urgent", "lawsuit", "fired", "eviction", "shut down"];
const MEDIUM_SEVERITY: &[&str] =
    &["worried", "struggling", "stuck", "failing", "failed", "losing", "rejected"];

/// Escalation phrasing in a follow-up turn: an explicit ask for a
/// professional, or a report that self-help did not work.
const ESCALATION_REQUESTS: &[&str] = &[
    "professional",
    "expert",
    "specialist",
    "find me",
    "find someone",
    "connect me",
    "hire",
    "talk to someone",
];
const SELF_HELP_FAILED: &[&str] = &[
    "didn't work",
    "did not work",
    "didnt work",
    "tried that",
    "already tried",
    "still stuck",
    "still not",
    "no luck",
    "didn't help",
];
const AFFIRMATIVE_STARTS: &[&str] = &["yes", "yeah", "yep", "sure", "ok", "okay", "please do"];

/// Problem-type keyword table, first match wins in declared order.
const PROBLEM_KEYWORDS: &[(ProblemType, &[&str])] = &[
    (
        ProblemType::Career,
        &["interview", "job", "fired", "laid off", "resume", "promotion", "boss", "career"],
    ),
    (
        ProblemType::Business,
        &["startup", "business", "clients", "sales", "revenue", "customers", "cofounder"],
    ),
    (ProblemType::Legal, &["sued", "lawsuit", "contract", "legal", "court", "fine"]),
    (ProblemType::Financial, &["debt", "money", "broke", "loan", "taxes", "bills", "rent"]),
    (
        ProblemType::Technical,
        &["website", "bug", "crash", "hacked", "server", "app", "computer"],
    ),
    (ProblemType::Health, &["sick", "pain", "stress", "sleep", "anxious", "burnout", "health"]),
];

#[derive(Clone, Debug, Default)]
pub struct ProblemSolver;

impl ProblemSolver {
    pub fn new() -> Self {
        Self
    }

    /// Whether a message should be triaged here before generic intent
    /// routing.
    pub fn is_problem_statement(&self, message: &str) -> bool {
        let message = message.to_ascii_lowercase();
        PROBLEM_INDICATORS.iter().any(|indicator| message.contains(indicator))
    }

    /// Whether a follow-up reply asks to be handed to a professional.
    pub fn wants_escalation(&self, message: &str) -> bool {
        let message = message.trim().to_ascii_lowercase();
        ESCALATION_REQUESTS.iter().any(|phrase| message.contains(phrase))
            || SELF_HELP_FAILED.iter().any(|phrase| message.contains(phrase))
            || AFFIRMATIVE_STARTS
                .iter()
                .any(|start| message == *start || message.starts_with(&format!("{start} ")) || message.starts_with(&format!("{start},")))
    }

    pub fn analyze(&self, message: &str, history: &[HistoryEntry]) -> ProblemAnalysis {
        let message = message.to_ascii_lowercase();

        let problem_type = self
            .resolve_type(&message)
            .or_else(|| recall_type_from_history(history))
            .unwrap_or(ProblemType::General);
        let severity = resolve_severity(&message);
        let solution_steps = solution_steps(problem_type);
        let follow_up_questions = follow_up_questions(problem_type);
        let can_self_solve = !solution_steps.is_empty() && severity != Severity::High;

        ProblemAnalysis {
            problem_type,
            severity,
            can_self_solve,
            solution_steps,
            follow_up_questions,
        }
    }

    /// Empathetic opening line for the first encounter with a problem.
    pub fn acknowledgment(&self, analysis: &ProblemAnalysis) -> String {
        let opening = match analysis.severity {
            Severity::High => "I'm really sorry you're dealing with this - that sounds serious.",
            Severity::Medium => "I'm sorry to hear that, it sounds stressful.",
            Severity::Low => "Thanks for sharing that - let's work through it.",
        };
        format!(
            "{opening} Here are a few things you can try for this {} situation:",
            analysis.problem_type.label()
        )
    }

    fn resolve_type(&self, message: &str) -> Option<ProblemType> {
        PROBLEM_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| message.contains(keyword)))
            .map(|(problem_type, _)| *problem_type)
    }
}

/// A follow-up with no keywords of its own inherits the problem type the
/// conversation already established, via the suggested category stored on
/// the prior problem turn.
fn recall_type_from_history(history: &[HistoryEntry]) -> Option<ProblemType> {
    history.iter().rev().find_map(|entry| {
        let is_problem_turn = matches!(
            entry.metadata.action,
            Some(ActionType::ProblemSolving) | Some(ActionType::ProblemFollowup)
        );
        is_problem_turn
            .then_some(entry.metadata.suggested_category)
            .flatten()
            .and_then(ProblemType::from_category)
    })
}

fn resolve_severity(message: &str) -> Severity {
    if HIGH_SEVERITY.iter().any(|term| message.contains(term)) {
        return Severity::High;
    }
    if MEDIUM_SEVERITY.iter().any(|term| message.contains(term)) {
        return Severity::Medium;
    }
    Severity::Low
}

fn solution_steps(problem_type: ProblemType) -> Vec<String> {
    let steps: &[&str] = match problem_type {
        ProblemType::Career => &[
            "Write down what went well and what did not in the last attempt",
            "Rehearse answers to the three questions that tripped you up",
            "Ask one person in your target role to review your materials",
        ],
        ProblemType::Business => &[
            "List your ten most recent customer conversations and what stalled",
            "Pick one acquisition channel and commit to it for two weeks",
            "Cut any expense that has not produced revenue in 90 days",
        ],
        ProblemType::Legal => &[
            "Collect every document and message related to the dispute",
            "Write a dated timeline of events while they are fresh",
            "Check deadlines - many legal responses are time-boxed",
        ],
        ProblemType::Financial => &[
            "List all debts with amounts, rates, and minimum payments",
            "Separate essential from discretionary spending for one month",
            "Contact creditors early - payment plans beat missed payments",
        ],
        ProblemType::Technical => &[
            "Reproduce the failure and note the exact error output",
            "Roll back the most recent change and retest",
            "Search the error text verbatim - most failures are not unique",
        ],
        ProblemType::Health => &[
            "Track symptoms, sleep, and stress for a few days",
            "Reduce the single biggest stressor you control",
            "Book a routine check-up rather than waiting for a crisis",
        ],
        ProblemType::General => &[
            "Write the problem down in one sentence",
            "Split it into parts you control and parts you do not",
            "Pick the smallest next step and do it today",
        ],
    };
    steps.iter().map(|step| (*step).to_string()).collect()
}

fn follow_up_questions(problem_type: ProblemType) -> Vec<String> {
    let questions: &[&str] = match problem_type {
        ProblemType::Career => &[
            "Was this a screening round or a final interview?",
            "How many applications have you sent in the last month?",
        ],
        ProblemType::Business => &[
            "Is the problem finding customers or keeping them?",
            "How many months of runway do you have?",
        ],
        ProblemType::Legal => &[
            "Have you received any formal notice or deadline?",
            "Is there a signed agreement involved?",
        ],
        ProblemType::Financial => &[
            "Is this a cash-flow gap or long-term debt?",
            "Do you have any income arriving in the next 30 days?",
        ],
        ProblemType::Technical => &[
            "When did it last work correctly?",
            "What changed right before it broke?",
        ],
        ProblemType::Health => &[
            "How long has this been going on?",
            "Is it affecting your sleep or work?",
        ],
        ProblemType::General => &[
            "What have you already tried?",
            "What would a good outcome look like for you?",
        ],
    };
    questions.iter().map(|question| (*question).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use crate::domain::category::Category;
    use crate::domain::turn::{ActionType, HistoryEntry, TurnMetadata};

    use super::{ProblemSolver, ProblemType, Severity};

    fn solver() -> ProblemSolver {
        ProblemSolver::new()
    }

    #[test]
    fn problem_indicators_trigger_triage() {
        assert!(solver().is_problem_statement("I failed my interview"));
        assert!(solver().is_problem_statement("we're struggling with sales"));
        assert!(!solver().is_problem_statement("find me a lawyer"));
    }

    #[test]
    fn failed_interview_is_a_medium_career_problem() {
        let analysis = solver().analyze("I failed my interview", &[]);
        assert_eq!(analysis.problem_type, ProblemType::Career);
        assert_eq!(analysis.severity, Severity::Medium);
        assert!(analysis.can_self_solve);
        assert!(!analysis.solution_steps.is_empty());
        assert!(!analysis.follow_up_questions.is_empty());
    }

    #[test]
    fn high_severity_disables_self_solve() {
        let analysis = solver().analyze("I got fired and it's a crisis", &[]);
        assert_eq!(analysis.severity, Severity::High);
        assert!(!analysis.can_self_solve);
    }

    #[test]
    fn unmatched_problems_fall_back_to_general() {
        let analysis = solver().analyze("everything went wrong today", &[]);
        assert_eq!(analysis.problem_type, ProblemType::General);
        assert_eq!(analysis.severity, Severity::Low);
    }

    #[test]
    fn keywordless_follow_up_inherits_type_from_history() {
        let history = vec![HistoryEntry {
            user_message: "I failed my interview".to_string(),
            bot_response: "Here are some steps".to_string(),
            metadata: TurnMetadata {
                action: Some(ActionType::ProblemSolving),
                suggested_category: Some(Category::Career),
                ..TurnMetadata::default()
            },
        }];

        let analysis = solver().analyze("it keeps happening", &history);
        assert_eq!(analysis.problem_type, ProblemType::Career);
    }

    #[test]
    fn escalation_phrasing_is_detected() {
        assert!(solver().wants_escalation("yes, find me someone"));
        assert!(solver().wants_escalation("I think I need a professional"));
        assert!(solver().wants_escalation("tried that already, still stuck"));
        assert!(!solver().wants_escalation("what would a good outcome look like"));
    }

    #[test]
    fn acknowledgment_scales_with_severity() {
        let solver = solver();
        let high = solver.analyze("this is a crisis with my startup", &[]);
        let low = solver.analyze("everything went wrong today", &[]);
        assert!(solver.acknowledgment(&high).contains("serious"));
        assert!(solver.acknowledgment(&low).contains("work through"));
    }
}
