use serde::{Deserialize, Serialize};

use crate::domain::category::Category;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Search,
    Book,
    Info,
    Complaint,
    Support,
    Clarification,
    ProblemSolving,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationMode {
    Online,
    Offline,
    Both,
}

impl ConsultationMode {
    pub fn label(&self) -> &'static str {
        match self {
            ConsultationMode::Online => "Online",
            ConsultationMode::Offline => "In person",
            ConsultationMode::Both => "Online or in person",
        }
    }

    /// Stable wire/storage token, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationMode::Online => "online",
            ConsultationMode::Offline => "offline",
            ConsultationMode::Both => "both",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Structured values pulled out of a single message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub budget: Option<i64>,
    pub location: Option<String>,
    pub urgency: Urgency,
    pub timeframe: Option<String>,
    pub consultation_mode: Option<ConsultationMode>,
}

impl Entities {
    /// Shallow merge, last write wins per field. Optional fields only move
    /// when the newer turn actually produced a value; urgency is
    /// re-evaluated every turn and always overwrites.
    pub fn merge_from(&mut self, newer: &Entities) {
        if newer.budget.is_some() {
            self.budget = newer.budget;
        }
        if newer.location.is_some() {
            self.location = newer.location.clone();
        }
        self.urgency = newer.urgency;
        if newer.timeframe.is_some() {
            self.timeframe = newer.timeframe.clone();
        }
        if newer.consultation_mode.is_some() {
            self.consultation_mode = newer.consultation_mode;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Oracle,
    Rules,
}

/// One turn's classification output. Produced fresh per message, never
/// persisted beyond the turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub intent: Intent,
    /// At most two categories, strongest first.
    pub categories: Vec<Category>,
    pub entities: Entities,
    pub min_experience_years: Option<u32>,
    /// Deduplicated, stopword-filtered, capped at three.
    pub specific_needs: Vec<String>,
    pub sentiment: Sentiment,
    /// Self-reported certainty in [0, 1]. The rule path caps at 0.95; the
    /// oracle path floors at 0.7.
    pub confidence: f64,
    pub is_follow_up: bool,
    pub needs_clarification: bool,
    pub has_specific_request: bool,
    pub source: AnalysisSource,
}

impl IntentAnalysis {
    /// The degraded result used when classification itself fails. The
    /// pipeline contract is that `classify` never errors, so every internal
    /// failure path lands here.
    pub fn fallback() -> Self {
        Self {
            intent: Intent::Search,
            categories: Vec::new(),
            entities: Entities::default(),
            min_experience_years: None,
            specific_needs: Vec::new(),
            sentiment: Sentiment::Neutral,
            confidence: 0.3,
            is_follow_up: false,
            needs_clarification: true,
            has_specific_request: false,
            source: AnalysisSource::Rules,
        }
    }

    pub fn primary_category(&self) -> Option<Category> {
        self.categories.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConsultationMode, Entities, IntentAnalysis, Intent, Urgency};

    #[test]
    fn entity_merge_is_last_write_wins_per_field() {
        let mut accumulated = Entities {
            budget: Some(500),
            location: Some("Austin".to_string()),
            urgency: Urgency::High,
            timeframe: None,
            consultation_mode: None,
        };

        accumulated.merge_from(&Entities {
            budget: None,
            location: None,
            urgency: Urgency::Low,
            timeframe: Some("next week".to_string()),
            consultation_mode: Some(ConsultationMode::Online),
        });

        assert_eq!(accumulated.budget, Some(500));
        assert_eq!(accumulated.location.as_deref(), Some("Austin"));
        assert_eq!(accumulated.urgency, Urgency::Low);
        assert_eq!(accumulated.timeframe.as_deref(), Some("next week"));
        assert_eq!(accumulated.consultation_mode, Some(ConsultationMode::Online));
    }

    #[test]
    fn fallback_is_a_low_confidence_search() {
        let fallback = IntentAnalysis::fallback();
        assert_eq!(fallback.intent, Intent::Search);
        assert!(fallback.confidence < 0.5);
        assert!(fallback.needs_clarification);
    }
}
