use rust_decimal::Decimal;

use crate::domain::provider::{ProviderRecord, ScoredProvider};
use crate::ranking::scoring::{RelevanceScorer, ScoringContext};
use crate::ranking::{CatalogQuery, ProviderCatalog, SearchParams};

const DEFAULT_MAX_RESULTS: usize = 10;
/// Soft budget filter: rates up to 10% over the stated budget stay in.
const BUDGET_TOLERANCE_PCT: i64 = 10;

/// Multi-criteria retrieval with a monotonic fallback cascade. Each
/// cascade step drops filters from the previous one and runs only when the
/// previous step returned nothing.
pub struct RecommendationEngine<C> {
    catalog: C,
    scorer: RelevanceScorer,
    max_results: usize,
}

impl<C> RecommendationEngine<C>
where
    C: ProviderCatalog,
{
    pub fn new(catalog: C) -> Self {
        Self { catalog, scorer: RelevanceScorer::new(), max_results: DEFAULT_MAX_RESULTS }
    }

    pub fn with_max_results(catalog: C, max_results: usize) -> Self {
        Self { catalog, scorer: RelevanceScorer::new(), max_results: max_results.max(1) }
    }

    pub fn set_max_results(&mut self, max_results: usize) {
        self.max_results = max_results.max(1);
    }

    /// Best-effort search: catalog failures degrade to an empty list.
    pub async fn search(&self, params: &SearchParams) -> Vec<ScoredProvider> {
        let candidates = self.retrieve(params).await;

        let context = ScoringContext {
            category: params.category,
            budget: params.budget,
            query: params.query.as_ref().map(|query| query.trim().to_ascii_lowercase()),
        };

        self.scorer.rank(candidates, &context, self.max_results)
    }

    async fn retrieve(&self, params: &SearchParams) -> Vec<ProviderRecord> {
        let strict = self.fetch_step("strict", self.strict_query(params)).await;
        if !strict.is_empty() {
            return strict;
        }

        if let Some(category) = params.category {
            let by_category = self
                .fetch_step(
                    "category_only",
                    CatalogQuery {
                        category_synonyms: synonym_set(category),
                        limit: self.fetch_limit(),
                        ..CatalogQuery::default()
                    },
                )
                .await;
            if !by_category.is_empty() {
                return by_category;
            }

            let by_text = self
                .fetch_step(
                    "category_text",
                    CatalogQuery {
                        text: Some(category.display_name().to_string()),
                        limit: self.fetch_limit(),
                        ..CatalogQuery::default()
                    },
                )
                .await;
            if !by_text.is_empty() {
                return by_text;
            }
        }

        self.fetch_step(
            "top_rated",
            CatalogQuery { limit: self.fetch_limit(), ..CatalogQuery::default() },
        )
        .await
    }

    fn strict_query(&self, params: &SearchParams) -> CatalogQuery {
        CatalogQuery {
            category_synonyms: params.category.map(synonym_set).unwrap_or_default(),
            max_hourly_rate: params.budget.map(tolerant_budget),
            location: params.location.clone(),
            mode: params.mode,
            text: params.query.clone(),
            min_experience_years: params.min_experience_years,
            min_rating: params.min_rating,
            limit: self.fetch_limit(),
        }
    }

    async fn fetch_step(&self, step: &'static str, query: CatalogQuery) -> Vec<ProviderRecord> {
        match self.catalog.fetch(&query).await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(
                    event_name = "ranking.catalog_fetch_failed",
                    cascade_step = step,
                    error = %error,
                    "catalog query failed, treating step as empty"
                );
                Vec::new()
            }
        }
    }

    /// Fetch wider than the final cap so post-retrieval scoring sees a
    /// meaningful candidate pool.
    fn fetch_limit(&self) -> u32 {
        (self.max_results * 5) as u32
    }
}

fn synonym_set(category: crate::domain::category::Category) -> Vec<String> {
    category.synonyms().iter().map(|synonym| synonym.to_string()).collect()
}

fn tolerant_budget(budget: i64) -> Decimal {
    let budget = Decimal::from(budget);
    budget + budget * Decimal::from(BUDGET_TOLERANCE_PCT) / Decimal::from(100)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use crate::domain::analysis::ConsultationMode;
    use crate::domain::category::Category;
    use crate::domain::provider::testing::provider;
    use crate::domain::provider::ProviderRecord;
    use crate::ranking::{CatalogError, CatalogQuery, ProviderCatalog, SearchParams};

    use super::{tolerant_budget, RecommendationEngine};

    struct VecCatalog {
        records: Vec<ProviderRecord>,
    }

    #[async_trait]
    impl ProviderCatalog for VecCatalog {
        async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<ProviderRecord>, CatalogError> {
            let mut matched: Vec<ProviderRecord> =
                self.records.iter().filter(|record| query.matches(record)).cloned().collect();
            if query.limit > 0 {
                matched.truncate(query.limit as usize);
            }
            Ok(matched)
        }
    }

    struct FailingCatalog;

    #[async_trait]
    impl ProviderCatalog for FailingCatalog {
        async fn fetch(&self, _query: &CatalogQuery) -> Result<Vec<ProviderRecord>, CatalogError> {
            Err(CatalogError::Unavailable("connection refused".to_string()))
        }
    }

    fn legal_catalog() -> VecCatalog {
        let mut expensive = provider("legal-1", "Legal Advisory");
        expensive.hourly_rate = Some(Decimal::new(50_000, 2));
        expensive.rating = 4.8;

        let mut affordable = provider("legal-2", "Legal Advisory");
        affordable.hourly_rate = Some(Decimal::new(9_000, 2));
        affordable.rating = 4.2;

        let mut unrelated = provider("tutor-1", "Tutoring");
        unrelated.rating = 5.0;

        VecCatalog { records: vec![expensive, affordable, unrelated] }
    }

    #[tokio::test]
    async fn strict_search_filters_by_category_and_budget() {
        let engine = RecommendationEngine::new(legal_catalog());
        let results = engine
            .search(&SearchParams {
                category: Some(Category::Legal),
                budget: Some(100),
                ..SearchParams::default()
            })
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].provider.id.0, "legal-2");
    }

    #[tokio::test]
    async fn budget_tolerance_is_ten_percent() {
        assert_eq!(tolerant_budget(100), Decimal::from(110));

        let engine = RecommendationEngine::new(legal_catalog());
        // 90/h provider passes a budget of 82 only through the tolerance.
        let results = engine
            .search(&SearchParams {
                category: Some(Category::Legal),
                budget: Some(82),
                ..SearchParams::default()
            })
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].provider.id.0, "legal-2");
    }

    #[tokio::test]
    async fn zero_strict_results_fall_back_to_category_only() {
        let engine = RecommendationEngine::new(legal_catalog());
        // Impossible experience filter empties the strict step; the
        // category-only step still finds both legal providers.
        let results = engine
            .search(&SearchParams {
                category: Some(Category::Legal),
                min_experience_years: Some(80),
                ..SearchParams::default()
            })
            .await;

        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn unknown_category_falls_back_to_top_rated_verified() {
        let engine = RecommendationEngine::new(legal_catalog());
        let results = engine
            .search(&SearchParams {
                category: Some(Category::Health),
                ..SearchParams::default()
            })
            .await;

        // No health providers anywhere: the final unfiltered step returns
        // every verified provider rather than nothing.
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn cascade_is_monotonic_over_an_unchanged_catalog() {
        let catalog = legal_catalog();
        let strict = catalog
            .fetch(&CatalogQuery {
                category_synonyms: Category::Legal
                    .synonyms()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                max_hourly_rate: Some(Decimal::from(100)),
                mode: Some(ConsultationMode::Online),
                limit: 50,
                ..CatalogQuery::default()
            })
            .await
            .expect("strict fetch");
        let category_only = catalog
            .fetch(&CatalogQuery {
                category_synonyms: Category::Legal
                    .synonyms()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                limit: 50,
                ..CatalogQuery::default()
            })
            .await
            .expect("category fetch");
        let unfiltered =
            catalog.fetch(&CatalogQuery { limit: 50, ..CatalogQuery::default() }).await.expect(
                "unfiltered fetch",
            );

        assert!(strict.len() <= category_only.len());
        assert!(category_only.len() <= unfiltered.len());
    }

    #[tokio::test]
    async fn catalog_failure_degrades_to_empty_results() {
        let engine = RecommendationEngine::new(FailingCatalog);
        let results = engine
            .search(&SearchParams::for_category(Category::Legal))
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn results_are_capped() {
        let records = (0..25).map(|i| provider(&format!("p{i}"), "Legal Advisory")).collect();
        let engine = RecommendationEngine::new(VecCatalog { records });
        let results = engine.search(&SearchParams::for_category(Category::Legal)).await;
        assert_eq!(results.len(), 10);
    }
}
