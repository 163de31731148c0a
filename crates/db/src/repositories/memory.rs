use async_trait::async_trait;
use tokio::sync::RwLock;

use consulty_core::booking::states::AppointmentConfirmation;
use consulty_core::booking::{AppointmentStore, AppointmentStoreError};
use consulty_core::domain::provider::ProviderRecord;
use consulty_core::ranking::{CatalogError, CatalogQuery, ProviderCatalog};

/// In-memory catalog over a fixed record list. Record order is the catalog
/// natural order. Used by tests and by the CLI chat loop when no database
/// is configured.
#[derive(Default)]
pub struct InMemoryProviderCatalog {
    records: Vec<ProviderRecord>,
}

impl InMemoryProviderCatalog {
    pub fn new(records: Vec<ProviderRecord>) -> Self {
        Self { records }
    }

    /// The deterministic demo catalog from `fixtures`.
    pub fn seeded() -> Self {
        Self::new(crate::fixtures::seed_providers())
    }
}

#[async_trait]
impl ProviderCatalog for InMemoryProviderCatalog {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<ProviderRecord>, CatalogError> {
        let mut matched: Vec<ProviderRecord> =
            self.records.iter().filter(|record| query.matches(record)).cloned().collect();
        if query.limit > 0 {
            matched.truncate(query.limit as usize);
        }
        Ok(matched)
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<AppointmentConfirmation>>,
}

impl InMemoryAppointmentStore {
    pub async fn recorded(&self) -> Vec<AppointmentConfirmation> {
        self.appointments.read().await.clone()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn record(
        &self,
        confirmation: &AppointmentConfirmation,
    ) -> Result<(), AppointmentStoreError> {
        self.appointments.write().await.push(confirmation.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use consulty_core::domain::category::Category;
    use consulty_core::ranking::{CatalogQuery, ProviderCatalog};

    use super::InMemoryProviderCatalog;

    #[tokio::test]
    async fn seeded_catalog_serves_verified_legal_providers_in_order() {
        let catalog = InMemoryProviderCatalog::seeded();
        let query = CatalogQuery {
            category_synonyms: Category::Legal
                .synonyms()
                .iter()
                .map(|synonym| synonym.to_string())
                .collect(),
            limit: 10,
            ..CatalogQuery::default()
        };

        let records = catalog.fetch(&query).await.expect("fetch");
        assert!(!records.is_empty());
        assert!(records.iter().all(|record| record.verified));
    }

    #[tokio::test]
    async fn unverified_seed_rows_never_surface() {
        let catalog = InMemoryProviderCatalog::seeded();
        let records =
            catalog.fetch(&CatalogQuery { limit: 100, ..CatalogQuery::default() }).await.expect(
                "fetch",
            );
        assert!(records.iter().all(|record| record.verified));
    }
}
