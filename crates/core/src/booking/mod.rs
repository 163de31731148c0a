//! Appointment-booking dialog: an explicit state machine that collects
//! date, time, and consultation type in strict order before emitting a
//! structured confirmation.

pub mod engine;
pub mod states;

use async_trait::async_trait;
use thiserror::Error;

pub use engine::BookingDialog;
pub use states::{
    AppointmentConfirmation, BookingData, BookingState, SlotInput, SlotOutcome,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AppointmentStoreError {
    #[error("appointment store failure: {0}")]
    Store(String),
}

/// Write sink invoked exactly once per confirmed booking. The store itself
/// is an external collaborator; failures are logged, never surfaced.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn record(
        &self,
        confirmation: &AppointmentConfirmation,
    ) -> Result<(), AppointmentStoreError>;
}

#[async_trait]
impl<T> AppointmentStore for std::sync::Arc<T>
where
    T: AppointmentStore + ?Sized,
{
    async fn record(
        &self,
        confirmation: &AppointmentConfirmation,
    ) -> Result<(), AppointmentStoreError> {
        (**self).record(confirmation).await
    }
}

#[async_trait]
impl<T> AppointmentStore for Box<T>
where
    T: AppointmentStore + ?Sized,
{
    async fn record(
        &self,
        confirmation: &AppointmentConfirmation,
    ) -> Result<(), AppointmentStoreError> {
        (**self).record(confirmation).await
    }
}
