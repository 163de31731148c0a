use thiserror::Error;

pub mod appointment;
pub mod memory;
pub mod provider;

pub use appointment::SqlAppointmentStore;
pub use memory::{InMemoryAppointmentStore, InMemoryProviderCatalog};
pub use provider::SqlProviderCatalog;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}
