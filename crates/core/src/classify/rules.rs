use regex::Regex;

use crate::classify::lexicon::{
    BOOKING_WORDS, CATEGORY_LEXICONS, CONSULTATION_OFFLINE, CONSULTATION_ONLINE,
    CONTEXTUAL_WEIGHT, HIGH_URGENCY, LOCATION_STOPWORDS, MEDIUM_URGENCY, NEED_STOPWORDS,
    NEGATIVE_WORDS, POSITIVE_WORDS, PRIMARY_WEIGHT, SECONDARY_WEIGHT, SENIORITY_MIN_YEARS,
    SENIORITY_WORDS, TIMEFRAME_PHRASES,
};
use crate::classify::{ClassifyInput, IntentClassifier};
use crate::domain::analysis::{
    AnalysisSource, ConsultationMode, Entities, Intent, IntentAnalysis, Sentiment, Urgency,
};
use crate::domain::category::Category;

const MAX_CATEGORIES: usize = 2;
const MAX_SPECIFIC_NEEDS: usize = 3;
const CONFIDENCE_FLOOR: f64 = 0.5;
const CONFIDENCE_CAP: f64 = 0.95;
/// Every greeting must classify with at least this confidence, regardless
/// of how little else the message carries.
const GREETING_CONFIDENCE_FLOOR: f64 = 0.7;

/// Deterministic classifier. The whole vocabulary is bounded and declared
/// in `lexicon`; every decision below is an ordered first-match-wins pass
/// so precedence stays explicit and independently testable.
pub struct RuleClassifier {
    greeting: Regex,
    booking: Regex,
    struggle: Regex,
    complaint: Regex,
    info: Regex,
    search_verbs: Regex,
    affirmation: Regex,
    budget_patterns: Vec<Regex>,
    years_pattern: Regex,
    need_problem_patterns: Vec<Regex>,
    need_service_patterns: Vec<Regex>,
    location_pattern: Regex,
}

/// One entry of the action-type cascade: first matching rule wins, and a
/// rule with an `unless` pattern is suppressed when that pattern also hits.
struct IntentRule<'a> {
    intent: Intent,
    pattern: &'a Regex,
    unless: Option<&'a Regex>,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleClassifier {
    pub fn new() -> Self {
        Self {
            greeting: compile(
                r"^\s*(hi|hello|hey|howdy|greetings|good (morning|afternoon|evening))( there| everyone| all| folks)?\s*[!.,]*\s*$",
            ),
            booking: compile(
                r"\b(book|schedule|reserve|appointment|set up (a )?(meeting|call|session))\b",
            ),
            struggle: compile(
                r"\b(stuck|struggling|failed|failing|overwhelmed|having trouble|can.?t (figure|manage|handle))\b",
            ),
            complaint: compile(
                r"\b(complaint|complain|refund|terrible|awful|unacceptable|disappointed|worst)\b",
            ),
            info: compile(
                r"\b(what is|what are|how does|how do|how much|tell me about|explain|who are you|what can you do)\b",
            ),
            search_verbs: compile(r"\b(find|search|looking for|need|want|show me|recommend)\b"),
            affirmation: compile(r"^\s*(yes|yeah|yep|no|nope|ok|okay|sure)\b"),
            budget_patterns: vec![
                compile(r"under\s*\$?\s*([0-9][0-9,]*)"),
                compile(r"below\s*\$?\s*([0-9][0-9,]*)"),
                compile(r"less than\s*\$?\s*([0-9][0-9,]*)"),
                compile(r"budget of\s*\$?\s*([0-9][0-9,]*)"),
                compile(r"around\s*\$?\s*([0-9][0-9,]*)"),
                compile(r"approximately\s*\$?\s*([0-9][0-9,]*)"),
            ],
            years_pattern: compile(r"([0-9]+)\s*\+?\s*years?"),
            need_problem_patterns: vec![
                compile(
                    r"(?:help with|struggling with|problem with|issue with|issues with|trouble with)\s+([a-z0-9][a-z0-9 ]{2,60})",
                ),
                compile(r"(?:stuck on|dealing with)\s+([a-z0-9][a-z0-9 ]{2,60})"),
            ],
            need_service_patterns: vec![
                compile(r"(?:looking for|searching for|seeking)\s+([a-z0-9][a-z0-9 ]{2,60})"),
                compile(r"(?:need|want)\s+([a-z0-9][a-z0-9 ]{2,60})"),
                compile(r"find me\s+([a-z0-9][a-z0-9 ]{2,60})"),
            ],
            location_pattern: compile(r"\b(?:in|near)\s+([a-z][a-z ]{1,40})"),
        }
    }

    fn resolve_intent(&self, message: &str) -> Intent {
        let cascade = [
            IntentRule { intent: Intent::Greeting, pattern: &self.greeting, unless: None },
            IntentRule { intent: Intent::Book, pattern: &self.booking, unless: None },
            IntentRule { intent: Intent::Support, pattern: &self.struggle, unless: None },
            IntentRule { intent: Intent::Complaint, pattern: &self.complaint, unless: None },
            IntentRule {
                intent: Intent::Info,
                pattern: &self.info,
                unless: Some(&self.search_verbs),
            },
        ];

        cascade
            .iter()
            .find(|rule| {
                rule.pattern.is_match(message)
                    && !rule.unless.map(|unless| unless.is_match(message)).unwrap_or(false)
            })
            .map(|rule| rule.intent)
            .unwrap_or(Intent::Search)
    }

    fn score_categories(&self, message: &str) -> Vec<Category> {
        let mut scored: Vec<(Category, u32)> = Vec::new();
        for lexicon in CATEGORY_LEXICONS {
            let mut score = 0;
            for keyword in lexicon.primary {
                if message.contains(keyword) {
                    score += PRIMARY_WEIGHT;
                }
            }
            for keyword in lexicon.secondary {
                if message.contains(keyword) {
                    score += SECONDARY_WEIGHT;
                }
            }
            for keyword in lexicon.contextual {
                if message.contains(keyword) {
                    score += CONTEXTUAL_WEIGHT;
                }
            }
            if score > 0 {
                scored.push((lexicon.category, score));
            }
        }

        // Stable sort keeps the declared lexicon order for equal scores.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().take(MAX_CATEGORIES).map(|(category, _)| category).collect()
    }

    fn resolve_urgency(&self, message: &str) -> Urgency {
        if HIGH_URGENCY.iter().any(|term| message.contains(term)) {
            return Urgency::High;
        }
        if MEDIUM_URGENCY.iter().any(|term| message.contains(term)) {
            return Urgency::Medium;
        }
        if BOOKING_WORDS.iter().any(|term| message.contains(term)) {
            return Urgency::Medium;
        }
        Urgency::Low
    }

    fn extract_budget(&self, message: &str) -> Option<i64> {
        for pattern in &self.budget_patterns {
            if let Some(captures) = pattern.captures(message) {
                if let Some(figure) = captures.get(1) {
                    let digits = figure.as_str().replace(',', "");
                    if let Ok(amount) = digits.parse::<i64>() {
                        return Some(amount);
                    }
                }
            }
        }
        None
    }

    fn extract_experience(&self, message: &str) -> Option<u32> {
        if let Some(captures) = self.years_pattern.captures(message) {
            if let Some(years) = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
                return Some(years);
            }
        }
        SENIORITY_WORDS
            .iter()
            .any(|term| message.contains(term))
            .then_some(SENIORITY_MIN_YEARS)
    }

    fn extract_timeframe(&self, message: &str) -> Option<String> {
        TIMEFRAME_PHRASES
            .iter()
            .find(|phrase| message.contains(**phrase))
            .map(|phrase| (*phrase).to_string())
    }

    fn extract_consultation_mode(&self, message: &str) -> Option<ConsultationMode> {
        let online = CONSULTATION_ONLINE.iter().any(|term| message.contains(term));
        let offline = CONSULTATION_OFFLINE.iter().any(|term| message.contains(term));
        match (online, offline) {
            (true, true) => Some(ConsultationMode::Both),
            (true, false) => Some(ConsultationMode::Online),
            (false, true) => Some(ConsultationMode::Offline),
            (false, false) => None,
        }
    }

    fn extract_location(&self, message: &str) -> Option<String> {
        let captures = self.location_pattern.captures(message)?;
        let raw = captures.get(1)?.as_str();

        let cut = [" for ", " to ", " with ", " who ", " that ", " and ", " by ", " before "]
            .iter()
            .filter_map(|delimiter| raw.find(delimiter))
            .min()
            .map(|index| &raw[..index])
            .unwrap_or(raw);

        let mut words: Vec<&str> = cut.split_whitespace().take(3).collect();
        while words
            .last()
            .map(|word| matches!(*word, "urgently" | "please" | "today" | "soon" | "now" | "asap"))
            .unwrap_or(false)
        {
            words.pop();
        }
        let first = words.first()?;
        if LOCATION_STOPWORDS.contains(first) || TIMEFRAME_PHRASES.contains(&cut.trim()) {
            return None;
        }
        Some(words.join(" "))
    }

    fn extract_specific_needs(&self, message: &str) -> Vec<String> {
        let mut needs: Vec<String> = Vec::new();

        for family in [&self.need_problem_patterns, &self.need_service_patterns] {
            for pattern in family {
                for captures in pattern.captures_iter(message) {
                    if let Some(capture) = captures.get(1) {
                        if let Some(cleaned) = clean_need(capture.as_str()) {
                            let duplicate =
                                needs.iter().any(|existing| existing.eq_ignore_ascii_case(&cleaned));
                            if !duplicate {
                                needs.push(cleaned);
                            }
                        }
                    }
                }
            }
        }

        needs.truncate(MAX_SPECIFIC_NEEDS);
        needs
    }

    fn resolve_sentiment(&self, message: &str) -> Sentiment {
        let tokens: Vec<&str> =
            message.split(|ch: char| !ch.is_ascii_alphanumeric()).filter(|t| !t.is_empty()).collect();

        let positive = tokens.iter().filter(|token| POSITIVE_WORDS.contains(*token)).count();
        let negative = tokens.iter().filter(|token| NEGATIVE_WORDS.contains(*token)).count();

        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }

    fn score_confidence(
        &self,
        intent: Intent,
        categories: &[Category],
        specific_needs: &[String],
    ) -> f64 {
        let mut confidence: f64 = 0.4;

        if !categories.is_empty() {
            confidence += 0.3;
        }
        if categories.len() >= 2 {
            confidence += 0.15;
        }

        confidence += match intent {
            Intent::Greeting => 0.25,
            Intent::Book => 0.2,
            Intent::Info => 0.15,
            Intent::Search => 0.0,
            _ => 0.1,
        };

        if !specific_needs.is_empty() {
            confidence += 0.15;
        }
        if specific_needs.len() > 1 {
            confidence += 0.1;
        }
        if !categories.is_empty() && !specific_needs.is_empty() {
            confidence += 0.1;
        }

        if intent == Intent::Greeting {
            confidence = confidence.max(GREETING_CONFIDENCE_FLOOR);
        }

        confidence.clamp(CONFIDENCE_FLOOR, CONFIDENCE_CAP)
    }
}

impl IntentClassifier for RuleClassifier {
    fn classify(&self, input: &ClassifyInput<'_>) -> IntentAnalysis {
        let message = input.message.trim().to_ascii_lowercase();
        if message.is_empty() {
            return IntentAnalysis::fallback();
        }

        let intent = self.resolve_intent(&message);
        let categories = self.score_categories(&message);
        let specific_needs = self.extract_specific_needs(&message);

        let entities = Entities {
            budget: self.extract_budget(&message),
            location: self.extract_location(&message),
            urgency: self.resolve_urgency(&message),
            timeframe: self.extract_timeframe(&message),
            consultation_mode: self.extract_consultation_mode(&message),
        };

        let word_count = message.split_whitespace().count();
        let is_follow_up = !input.history.is_empty()
            && (word_count <= 3 || self.affirmation.is_match(&message));
        let needs_clarification =
            intent == Intent::Search && categories.is_empty() && specific_needs.is_empty();
        let has_specific_request = !specific_needs.is_empty()
            || entities.budget.is_some()
            || entities.location.is_some()
            || entities.consultation_mode.is_some();

        let confidence = self.score_confidence(intent, &categories, &specific_needs);

        IntentAnalysis {
            intent,
            categories,
            min_experience_years: self.extract_experience(&message),
            specific_needs,
            sentiment: self.resolve_sentiment(&message),
            entities,
            confidence,
            is_follow_up,
            needs_clarification,
            has_specific_request,
            source: AnalysisSource::Rules,
        }
    }
}

fn compile(pattern: &'static str) -> Regex {
    // All patterns are string literals; a failure here is a programming
    // error caught by the test suite, not a runtime condition.
    Regex::new(pattern).unwrap_or_else(|error| panic!("invalid built-in pattern: {error}"))
}

fn clean_need(raw: &str) -> Option<String> {
    let cut = [" and ", " but ", " because ", " so ", " please"]
        .iter()
        .filter_map(|delimiter| raw.find(delimiter))
        .min()
        .map(|index| &raw[..index])
        .unwrap_or(raw);

    let mut words: Vec<&str> = cut.split_whitespace().collect();
    while words.first().map(|word| NEED_STOPWORDS.contains(word)).unwrap_or(false) {
        words.remove(0);
    }
    while words.last().map(|word| NEED_STOPWORDS.contains(word)).unwrap_or(false) {
        words.pop();
    }

    if words.is_empty() {
        return None;
    }
    words.truncate(6);
    Some(words.join(" "))
}
