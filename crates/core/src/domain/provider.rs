use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(pub String);

/// A catalog row. Owned and persisted by the external catalog; read-only
/// here and annotated in memory with a relevance score after retrieval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub id: ProviderId,
    pub name: String,
    pub category: String,
    pub description: String,
    /// 0.0..=5.0 star rating from the catalog.
    pub rating: f64,
    pub review_count: u32,
    pub hourly_rate: Option<Decimal>,
    pub location: String,
    pub service_area: Option<String>,
    pub remote: bool,
    pub experience_years: u32,
    pub response_time_hours: Option<f64>,
    pub available: bool,
    pub verified: bool,
}

/// A provider annotated with the composite relevance assigned after
/// retrieval. The score is never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredProvider {
    pub provider: ProviderRecord,
    pub relevance: f64,
}

#[cfg(test)]
pub mod testing {
    use rust_decimal::Decimal;

    use super::{ProviderId, ProviderRecord};

    /// Baseline verified, available provider for tests; override fields as
    /// each case needs.
    pub fn provider(id: &str, category: &str) -> ProviderRecord {
        ProviderRecord {
            id: ProviderId(id.to_string()),
            name: format!("Provider {id}"),
            category: category.to_string(),
            description: String::new(),
            rating: 4.0,
            review_count: 10,
            hourly_rate: Some(Decimal::new(10_000, 2)),
            location: "Austin, TX".to_string(),
            service_area: None,
            remote: false,
            experience_years: 5,
            response_time_hours: Some(2.0),
            available: true,
            verified: true,
        }
    }
}
