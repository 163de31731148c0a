//! Composite relevance scoring for retrieved providers.

use rust_decimal::Decimal;

use crate::domain::category::Category;
use crate::domain::provider::{ProviderRecord, ScoredProvider};

/// Weights for the relevance components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub rating: f64,
    pub review: f64,
    pub review_cap: u32,
    pub experience_cap: u32,
    pub availability: f64,
    pub verified: f64,
    pub category_exact: f64,
    pub query_in_name: f64,
    pub query_in_description: f64,
    pub budget_within: f64,
    pub budget_comfortable: f64,
    pub response_fast: f64,
    pub response_moderate: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            rating: 15.0,
            review: 0.5,
            review_cap: 50,
            experience_cap: 20,
            availability: 12.0,
            verified: 8.0,
            category_exact: 15.0,
            query_in_name: 10.0,
            query_in_description: 5.0,
            budget_within: 10.0,
            budget_comfortable: 5.0,
            response_fast: 8.0,
            response_moderate: 5.0,
        }
    }
}

/// The scoring context carried from the original search parameters.
#[derive(Clone, Debug, Default)]
pub struct ScoringContext {
    pub category: Option<Category>,
    pub budget: Option<i64>,
    /// Lowercased free-text query, when one was given.
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
}

impl RelevanceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, provider: &ProviderRecord, context: &ScoringContext) -> f64 {
        let weights = &self.weights;
        let mut relevance = provider.rating * weights.rating;

        relevance += f64::from(provider.review_count.min(weights.review_cap)) * weights.review;
        relevance += f64::from(provider.experience_years.min(weights.experience_cap));
        relevance += self.budget_fit(provider, context.budget);

        if provider.available {
            relevance += weights.availability;
        }
        relevance += self.response_time_bonus(provider);
        if provider.verified {
            relevance += weights.verified;
        }

        if let Some(category) = context.category {
            if category.matches_text(&provider.category) {
                relevance += weights.category_exact;
            }
        }

        if let Some(query) = &context.query {
            if provider.name.to_ascii_lowercase().contains(query.as_str()) {
                relevance += weights.query_in_name;
            }
            if provider.description.to_ascii_lowercase().contains(query.as_str()) {
                relevance += weights.query_in_description;
            }
        }

        relevance
    }

    /// Rank descending by relevance. The sort is stable so equal scores
    /// keep catalog natural order.
    pub fn rank(
        &self,
        providers: Vec<ProviderRecord>,
        context: &ScoringContext,
        limit: usize,
    ) -> Vec<ScoredProvider> {
        let mut scored: Vec<ScoredProvider> = providers
            .into_iter()
            .map(|provider| {
                let relevance = self.score(&provider, context);
                ScoredProvider { provider, relevance }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.relevance.partial_cmp(&a.relevance).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        scored
    }

    fn budget_fit(&self, provider: &ProviderRecord, budget: Option<i64>) -> f64 {
        let (Some(budget), Some(rate)) = (budget, provider.hourly_rate) else {
            return 0.0;
        };

        let budget = Decimal::from(budget);
        if rate > budget {
            return 0.0;
        }

        let mut bonus = self.weights.budget_within;
        if rate <= budget / Decimal::new(13, 1) {
            bonus += self.weights.budget_comfortable;
        }
        bonus
    }

    fn response_time_bonus(&self, provider: &ProviderRecord) -> f64 {
        match provider.response_time_hours {
            Some(hours) if hours <= 1.0 => self.weights.response_fast,
            Some(hours) if hours <= 4.0 => self.weights.response_moderate,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::category::Category;
    use crate::domain::provider::testing::provider;

    use super::{RelevanceScorer, ScoringContext};

    #[test]
    fn higher_rating_outranks_otherwise_identical_provider() {
        let scorer = RelevanceScorer::new();
        let mut strong = provider("a", "Legal Advisory");
        strong.rating = 4.9;
        let mut weak = provider("b", "Legal Advisory");
        weak.rating = 4.1;

        let ranked = scorer.rank(vec![weak, strong], &ScoringContext::default(), 10);
        assert_eq!(ranked[0].provider.id.0, "a");
        assert!(ranked[0].relevance > ranked[1].relevance);
    }

    #[test]
    fn equal_scores_keep_catalog_natural_order() {
        let scorer = RelevanceScorer::new();
        let first = provider("first", "Legal Advisory");
        let second = provider("second", "Legal Advisory");

        let ranked = scorer.rank(vec![first, second], &ScoringContext::default(), 10);
        assert_eq!(ranked[0].provider.id.0, "first");
        assert_eq!(ranked[0].relevance, ranked[1].relevance);
    }

    #[test]
    fn budget_fit_grants_a_second_bonus_for_comfortable_margins() {
        let scorer = RelevanceScorer::new();
        let context = ScoringContext { budget: Some(130), ..ScoringContext::default() };

        let mut comfortable = provider("a", "Legal Advisory");
        comfortable.hourly_rate = Some(Decimal::new(10_000, 2)); // 100 <= 130/1.3
        let mut within = provider("b", "Legal Advisory");
        within.hourly_rate = Some(Decimal::new(12_500, 2)); // 125 <= 130 only
        let mut over = provider("c", "Legal Advisory");
        over.hourly_rate = Some(Decimal::new(20_000, 2));

        let base = ScoringContext::default();
        let comfortable_bonus =
            scorer.score(&comfortable, &context) - scorer.score(&comfortable, &base);
        let within_bonus = scorer.score(&within, &context) - scorer.score(&within, &base);
        let over_bonus = scorer.score(&over, &context) - scorer.score(&over, &base);

        assert_eq!(comfortable_bonus, 15.0);
        assert_eq!(within_bonus, 10.0);
        assert_eq!(over_bonus, 0.0);
    }

    #[test]
    fn review_count_and_experience_are_capped() {
        let scorer = RelevanceScorer::new();
        let mut capped = provider("a", "Legal Advisory");
        capped.review_count = 500;
        capped.experience_years = 40;
        let mut at_cap = provider("b", "Legal Advisory");
        at_cap.review_count = 50;
        at_cap.experience_years = 20;

        let context = ScoringContext::default();
        assert_eq!(scorer.score(&capped, &context), scorer.score(&at_cap, &context));
    }

    #[test]
    fn category_match_and_query_hits_stack() {
        let scorer = RelevanceScorer::new();
        let mut record = provider("a", "Legal Advisory");
        record.name = "Austin Contract Law".to_string();
        record.description = "Contract review and drafting".to_string();

        let context = ScoringContext {
            category: Some(Category::Legal),
            query: Some("contract".to_string()),
            ..ScoringContext::default()
        };

        let plain = scorer.score(&record, &ScoringContext::default());
        let boosted = scorer.score(&record, &context);
        assert_eq!(boosted - plain, 15.0 + 10.0 + 5.0);
    }

    #[test]
    fn response_time_tiers() {
        let scorer = RelevanceScorer::new();
        let context = ScoringContext::default();

        let mut fast = provider("a", "Legal Advisory");
        fast.response_time_hours = Some(0.5);
        let mut moderate = provider("b", "Legal Advisory");
        moderate.response_time_hours = Some(3.0);
        let mut slow = provider("c", "Legal Advisory");
        slow.response_time_hours = Some(24.0);
        let mut unknown = provider("d", "Legal Advisory");
        unknown.response_time_hours = None;

        let base = scorer.score(&unknown, &context);
        assert_eq!(scorer.score(&fast, &context) - base, 8.0);
        assert_eq!(scorer.score(&moderate, &context) - base, 5.0);
        assert_eq!(scorer.score(&slow, &context) - base, 0.0);
    }
}
