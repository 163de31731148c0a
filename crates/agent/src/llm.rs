//! The generative-model oracle, consumed strictly through a
//! prompt-in/JSON-out contract. The oracle is assumed overconfident by
//! design, so its self-reported confidence is clamped to a floor of 0.7;
//! everything else about its output is distrusted and validated.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use consulty_core::classify::ClassifyInput;
use consulty_core::config::OracleConfig;
use consulty_core::domain::analysis::{
    AnalysisSource, ConsultationMode, Entities, Intent, IntentAnalysis, Sentiment, Urgency,
};
use consulty_core::domain::category::Category;

const ORACLE_CONFIDENCE_FLOOR: f64 = 0.7;
const ORACLE_CONFIDENCE_CAP: f64 = 1.0;
const MAX_HISTORY_LINES: usize = 3;

#[async_trait]
pub trait OracleClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

/// HTTP client for an Ollama-style generate endpoint. Any service that
/// accepts a prompt and returns JSON text in a `response` field works.
pub struct HttpOracleClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl HttpOracleClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, base_url: base_url.into(), model: model.into() }
    }

    pub fn from_config(config: &OracleConfig) -> Self {
        Self::new(
            config.base_url.clone().unwrap_or_else(|| "http://localhost:11434".to_string()),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl OracleClient for HttpOracleClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct GenerateResponse {
            response: String,
        }

        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
        });

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url.trim_end_matches('/')))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: GenerateResponse = response.json().await?;
        Ok(payload.response)
    }
}

/// Classifier that consults the oracle with a structured prompt demanding
/// strict JSON, then validates every field of the reply.
pub struct OracleClassifier {
    client: Box<dyn OracleClient>,
    timeout: Duration,
}

impl OracleClassifier {
    pub fn new(client: Box<dyn OracleClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn classify(
        &self,
        input: &ClassifyInput<'_>,
    ) -> Result<IntentAnalysis, OracleError> {
        let prompt = build_prompt(input);

        let raw = tokio::time::timeout(self.timeout, self.client.complete(&prompt))
            .await
            .map_err(|_| OracleError::Timeout(self.timeout))?
            .map_err(|error| OracleError::Unavailable(error.to_string()))?;

        parse_analysis(&raw)
    }
}

fn build_prompt(input: &ClassifyInput<'_>) -> String {
    let mut prompt = String::from(
        "You classify one user message for a service-provider matching assistant.\n\
         Reply with STRICT JSON only, no prose, matching exactly this shape:\n\
         {\"intent\": \"greeting|search|book|info|complaint|support|clarification|problem_solving\",\n\
          \"categories\": [\"legal|finance|business|career|technology|health|marketing|education\"],\n\
          \"entities\": {\"budget\": null, \"location\": null, \"urgency\": \"low|medium|high\",\n\
                        \"timeframe\": null, \"consultation_type\": null},\n\
          \"specific_needs\": [], \"confidence\": 0.0,\n\
          \"is_follow_up\": false, \"needs_clarification\": false}\n\
         Use at most two categories, strongest first.\n",
    );

    if let Some(reference) = input.context_reference.filter(|r| !r.is_empty()) {
        prompt.push_str(&format!("Conversation context: {reference}\n"));
    }

    for entry in input.history.iter().rev().take(MAX_HISTORY_LINES).rev() {
        prompt.push_str(&format!(
            "Previous turn - user: {} / assistant: {}\n",
            entry.user_message, entry.bot_response
        ));
    }

    prompt.push_str(&format!("Message to classify: {}\n", input.message));
    prompt
}

#[derive(Debug, Default, Deserialize)]
struct OracleEntities {
    budget: Option<i64>,
    location: Option<String>,
    urgency: Option<String>,
    timeframe: Option<String>,
    consultation_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OracleAnalysis {
    intent: String,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    entities: OracleEntities,
    #[serde(default)]
    specific_needs: Vec<String>,
    confidence: f64,
    #[serde(default)]
    is_follow_up: bool,
    #[serde(default)]
    needs_clarification: bool,
}

fn parse_analysis(raw: &str) -> Result<IntentAnalysis, OracleError> {
    let parsed: OracleAnalysis = serde_json::from_str(raw.trim())
        .map_err(|error| OracleError::Malformed(error.to_string()))?;

    let intent = parse_intent(&parsed.intent)?;

    let mut categories: Vec<Category> =
        parsed.categories.iter().filter_map(|value| Category::parse(value)).collect();
    categories.dedup();
    categories.truncate(2);

    let urgency = match parsed.entities.urgency.as_deref() {
        Some("high") => Urgency::High,
        Some("medium") => Urgency::Medium,
        _ => Urgency::Low,
    };
    let consultation_mode = match parsed.entities.consultation_type.as_deref() {
        Some("online") => Some(ConsultationMode::Online),
        Some("offline") => Some(ConsultationMode::Offline),
        Some("both") => Some(ConsultationMode::Both),
        _ => None,
    };

    let mut specific_needs = parsed.specific_needs;
    specific_needs.truncate(3);

    let entities = Entities {
        budget: parsed.entities.budget,
        location: parsed.entities.location,
        urgency,
        timeframe: parsed.entities.timeframe,
        consultation_mode,
    };

    let has_specific_request = !specific_needs.is_empty()
        || entities.budget.is_some()
        || entities.location.is_some()
        || entities.consultation_mode.is_some();

    Ok(IntentAnalysis {
        intent,
        categories,
        entities,
        min_experience_years: None,
        specific_needs,
        sentiment: Sentiment::Neutral,
        confidence: parsed.confidence.clamp(ORACLE_CONFIDENCE_FLOOR, ORACLE_CONFIDENCE_CAP),
        is_follow_up: parsed.is_follow_up,
        needs_clarification: parsed.needs_clarification,
        has_specific_request,
        source: AnalysisSource::Oracle,
    })
}

fn parse_intent(value: &str) -> Result<Intent, OracleError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "greeting" => Ok(Intent::Greeting),
        "search" => Ok(Intent::Search),
        "book" => Ok(Intent::Book),
        "info" => Ok(Intent::Info),
        "complaint" => Ok(Intent::Complaint),
        "support" => Ok(Intent::Support),
        "clarification" => Ok(Intent::Clarification),
        "problem_solving" => Ok(Intent::ProblemSolving),
        other => Err(OracleError::Malformed(format!("unknown intent `{other}`"))),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;
    use async_trait::async_trait;

    use consulty_core::classify::ClassifyInput;
    use consulty_core::domain::analysis::{AnalysisSource, Intent, Urgency};
    use consulty_core::domain::category::Category;

    use super::{parse_analysis, OracleClassifier, OracleClient, OracleError};

    struct CannedOracle {
        reply: String,
    }

    #[async_trait]
    impl OracleClient for CannedOracle {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.reply.clone())
        }
    }

    struct SlowOracle;

    #[async_trait]
    impl OracleClient for SlowOracle {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    #[test]
    fn strict_json_parses_with_confidence_clamped_to_the_floor() {
        let analysis = parse_analysis(
            r#"{"intent":"search","categories":["legal"],"confidence":0.3,
                "entities":{"budget":200,"urgency":"high"}}"#,
        )
        .expect("valid oracle payload");

        assert_eq!(analysis.intent, Intent::Search);
        assert_eq!(analysis.categories, vec![Category::Legal]);
        assert_eq!(analysis.entities.budget, Some(200));
        assert_eq!(analysis.entities.urgency, Urgency::High);
        assert_eq!(analysis.confidence, 0.7);
        assert_eq!(analysis.source, AnalysisSource::Oracle);
    }

    #[test]
    fn unknown_intents_and_broken_json_are_malformed() {
        assert!(matches!(
            parse_analysis(r#"{"intent":"buy_now","confidence":0.9}"#),
            Err(OracleError::Malformed(_))
        ));
        assert!(matches!(
            parse_analysis("here is your intent: search"),
            Err(OracleError::Malformed(_))
        ));
    }

    #[test]
    fn unknown_categories_are_dropped_not_fatal() {
        let analysis = parse_analysis(
            r#"{"intent":"search","categories":["plumbing","finance"],"confidence":0.9}"#,
        )
        .expect("valid payload");
        assert_eq!(analysis.categories, vec![Category::Finance]);
    }

    #[tokio::test]
    async fn oracle_call_times_out() {
        let classifier =
            OracleClassifier::new(Box::new(SlowOracle), Duration::from_millis(20));
        let result = classifier.classify(&ClassifyInput::message_only("hi")).await;
        assert!(matches!(result, Err(OracleError::Timeout(_))));
    }

    #[tokio::test]
    async fn canned_oracle_round_trips_through_the_classifier() {
        let classifier = OracleClassifier::new(
            Box::new(CannedOracle {
                reply: r#"{"intent":"book","categories":["health"],"confidence":0.95}"#
                    .to_string(),
            }),
            Duration::from_secs(1),
        );

        let analysis = classifier
            .classify(&ClassifyInput::message_only("book me a therapist"))
            .await
            .expect("classification");
        assert_eq!(analysis.intent, Intent::Book);
        assert_eq!(analysis.categories, vec![Category::Health]);
    }
}
