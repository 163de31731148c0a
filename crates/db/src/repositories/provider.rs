use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::FromRow;

use consulty_core::domain::provider::{ProviderId, ProviderRecord};
use consulty_core::ranking::{CatalogError, CatalogQuery, ProviderCatalog};

use crate::DbPool;

/// Sqlite-backed provider catalog. The database narrows to verified rows
/// in catalog natural order; the shared [`CatalogQuery::matches`] predicate
/// then applies the remaining filters so SQL and in-memory retrieval can
/// never drift apart.
pub struct SqlProviderCatalog {
    pool: DbPool,
}

impl SqlProviderCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderCatalog for SqlProviderCatalog {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<ProviderRecord>, CatalogError> {
        let rows = sqlx::query_as::<_, ProviderRow>(
            "SELECT id, name, category, description, rating, review_count, hourly_rate, \
                    location, service_area, remote, experience_years, response_time_hours, \
                    available, verified \
             FROM provider WHERE verified = 1 ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| CatalogError::Unavailable(error.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(row.into_record()?);
        }

        let mut matched: Vec<ProviderRecord> =
            records.into_iter().filter(|record| query.matches(record)).collect();
        if query.limit > 0 {
            matched.truncate(query.limit as usize);
        }
        Ok(matched)
    }
}

#[derive(Debug, FromRow)]
struct ProviderRow {
    id: String,
    name: String,
    category: String,
    description: String,
    rating: f64,
    review_count: i64,
    hourly_rate: Option<String>,
    location: String,
    service_area: Option<String>,
    remote: bool,
    experience_years: i64,
    response_time_hours: Option<f64>,
    available: bool,
    verified: bool,
}

impl ProviderRow {
    fn into_record(self) -> Result<ProviderRecord, CatalogError> {
        let hourly_rate = match self.hourly_rate {
            Some(raw) => Some(Decimal::from_str(raw.trim()).map_err(|error| {
                CatalogError::Query(format!("invalid hourly_rate for provider {}: {error}", self.id))
            })?),
            None => None,
        };

        Ok(ProviderRecord {
            id: ProviderId(self.id),
            name: self.name,
            category: self.category,
            description: self.description,
            rating: self.rating,
            review_count: self.review_count.max(0) as u32,
            hourly_rate,
            location: self.location,
            service_area: self.service_area,
            remote: self.remote,
            experience_years: self.experience_years.max(0) as u32,
            response_time_hours: self.response_time_hours,
            available: self.available,
            verified: self.verified,
        })
    }
}
