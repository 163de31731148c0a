//! Provider retrieval and ranking.
//!
//! Retrieval goes through the read-only [`ProviderCatalog`] collaborator;
//! ranking happens here, after retrieval, independent of any storage-level
//! sort. The engine is best-effort throughout: a catalog failure produces
//! an empty result set, never an error.

pub mod engine;
pub mod scoring;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::analysis::ConsultationMode;
use crate::domain::category::Category;
use crate::domain::provider::ProviderRecord;

/// Caller-facing search parameters, usually lifted straight out of an
/// `IntentAnalysis`.
#[derive(Clone, Debug, Default)]
pub struct SearchParams {
    pub category: Option<Category>,
    pub budget: Option<i64>,
    pub location: Option<String>,
    pub mode: Option<ConsultationMode>,
    pub query: Option<String>,
    pub min_experience_years: Option<u32>,
    pub min_rating: Option<f64>,
}

impl SearchParams {
    pub fn for_category(category: Category) -> Self {
        Self { category: Some(category), ..Self::default() }
    }
}

/// One catalog fetch. Each fallback-cascade step is expressed by dropping
/// fields from this query, which is what keeps the cascade monotonic: a
/// query with fewer populated fields can never match fewer rows.
#[derive(Clone, Debug, Default)]
pub struct CatalogQuery {
    /// Lowercase synonym set; empty means no category filter.
    pub category_synonyms: Vec<String>,
    /// Already includes the soft-budget tolerance. Rows without a rate are
    /// always eligible.
    pub max_hourly_rate: Option<Decimal>,
    pub location: Option<String>,
    pub mode: Option<ConsultationMode>,
    pub text: Option<String>,
    pub min_experience_years: Option<u32>,
    pub min_rating: Option<f64>,
    pub limit: u32,
}

impl CatalogQuery {
    /// The reference filter semantics. Both the in-memory and the SQL
    /// catalog finish with this predicate, so retrieval semantics cannot
    /// drift between implementations.
    pub fn matches(&self, record: &ProviderRecord) -> bool {
        if !record.verified {
            return false;
        }

        if !self.category_synonyms.is_empty() {
            let category = record.category.trim().to_ascii_lowercase();
            if !self.category_synonyms.iter().any(|synonym| *synonym == category) {
                return false;
            }
        }

        if let (Some(max_rate), Some(rate)) = (self.max_hourly_rate, record.hourly_rate) {
            if rate > max_rate {
                return false;
            }
        }

        if let Some(location) = &self.location {
            let needle = location.trim().to_ascii_lowercase();
            let in_location = record.location.to_ascii_lowercase().contains(&needle);
            let in_service_area = record
                .service_area
                .as_deref()
                .map(|area| area.to_ascii_lowercase().contains(&needle))
                .unwrap_or(false);
            if !(record.remote || in_location || in_service_area) {
                return false;
            }
        }

        if let Some(ConsultationMode::Online) = self.mode {
            if !record.remote {
                return false;
            }
        }

        if let Some(text) = &self.text {
            let needle = text.trim().to_ascii_lowercase();
            let haystacks =
                [&record.name, &record.description, &record.category, &record.location];
            if !haystacks.iter().any(|field| field.to_ascii_lowercase().contains(&needle)) {
                return false;
            }
        }

        if let Some(min_years) = self.min_experience_years {
            if record.experience_years < min_years {
                return false;
            }
        }

        if let Some(min_rating) = self.min_rating {
            if record.rating < min_rating {
                return false;
            }
        }

        true
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("catalog query failed: {0}")]
    Query(String),
}

/// Read-only view of the external provider catalog. Implementations must
/// return rows in catalog natural order; ranking's stable sort relies on
/// it for the deterministic tie-break.
#[async_trait]
pub trait ProviderCatalog: Send + Sync {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<ProviderRecord>, CatalogError>;
}

#[async_trait]
impl<T> ProviderCatalog for Box<T>
where
    T: ProviderCatalog + ?Sized,
{
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<ProviderRecord>, CatalogError> {
        (**self).fetch(query).await
    }
}

#[async_trait]
impl<T> ProviderCatalog for std::sync::Arc<T>
where
    T: ProviderCatalog + ?Sized,
{
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<ProviderRecord>, CatalogError> {
        (**self).fetch(query).await
    }
}
