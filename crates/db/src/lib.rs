pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, ping, DbPool};
pub use fixtures::{seed_providers, CatalogSeedDataset, SeedResult, SeedVerification};
pub use repositories::{
    InMemoryAppointmentStore, InMemoryProviderCatalog, RepositoryError, SqlAppointmentStore,
    SqlProviderCatalog,
};
