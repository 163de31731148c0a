//! The fallback chain over the two classifier implementations: oracle
//! first when one is configured, the deterministic rule engine otherwise
//! or whenever the oracle misbehaves. Selection is silent; callers only
//! see an `IntentAnalysis`.

use consulty_core::classify::{ClassifyInput, IntentClassifier, RuleClassifier};
use consulty_core::domain::analysis::IntentAnalysis;

use crate::llm::OracleClassifier;

pub struct ClassifierStack {
    oracle: Option<OracleClassifier>,
    rules: RuleClassifier,
}

impl ClassifierStack {
    pub fn rules_only() -> Self {
        Self { oracle: None, rules: RuleClassifier::new() }
    }

    pub fn with_oracle(oracle: OracleClassifier) -> Self {
        Self { oracle: Some(oracle), rules: RuleClassifier::new() }
    }

    /// The deterministic implementation, for callers that must never touch
    /// the oracle (context bookkeeping, the accuracy validator).
    pub fn rules(&self) -> &RuleClassifier {
        &self.rules
    }

    /// Never fails. Oracle unavailability, timeout, or malformed JSON all
    /// degrade to the rule engine without surfacing anything.
    pub async fn classify(&self, input: &ClassifyInput<'_>) -> IntentAnalysis {
        if let Some(oracle) = &self.oracle {
            match oracle.classify(input).await {
                Ok(analysis) => return analysis,
                Err(error) => {
                    tracing::warn!(
                        event_name = "classify.oracle_fallback",
                        error = %error,
                        "oracle classification failed, falling back to rules"
                    );
                }
            }
        }

        self.rules.classify(input)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use consulty_core::classify::ClassifyInput;
    use consulty_core::domain::analysis::{AnalysisSource, Intent};

    use crate::llm::{OracleClassifier, OracleClient};

    use super::ClassifierStack;

    struct DeadOracle;

    #[async_trait]
    impl OracleClient for DeadOracle {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("connection refused"))
        }
    }

    struct GarbageOracle;

    #[async_trait]
    impl OracleClient for GarbageOracle {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok("not json at all".to_string())
        }
    }

    #[tokio::test]
    async fn dead_oracle_falls_back_to_rules_silently() {
        let stack = ClassifierStack::with_oracle(OracleClassifier::new(
            Box::new(DeadOracle),
            Duration::from_secs(1),
        ));

        let analysis = stack
            .classify(&ClassifyInput::message_only("I need a lawyer for contract review"))
            .await;
        assert_eq!(analysis.intent, Intent::Search);
        assert_eq!(analysis.source, AnalysisSource::Rules);
        assert!(analysis.confidence >= 0.5);
    }

    #[tokio::test]
    async fn malformed_oracle_json_falls_back_to_rules() {
        let stack = ClassifierStack::with_oracle(OracleClassifier::new(
            Box::new(GarbageOracle),
            Duration::from_secs(1),
        ));

        let analysis = stack.classify(&ClassifyInput::message_only("Hi there")).await;
        assert_eq!(analysis.intent, Intent::Greeting);
        assert_eq!(analysis.source, AnalysisSource::Rules);
    }
}
