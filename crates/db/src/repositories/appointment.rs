use async_trait::async_trait;

use consulty_core::booking::states::AppointmentConfirmation;
use consulty_core::booking::{AppointmentStore, AppointmentStoreError};

use crate::DbPool;

/// Sqlite-backed appointment write sink. Invoked once per confirmed
/// booking; the caller treats failures as log-and-continue.
pub struct SqlAppointmentStore {
    pool: DbPool,
}

impl SqlAppointmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for SqlAppointmentStore {
    async fn record(
        &self,
        confirmation: &AppointmentConfirmation,
    ) -> Result<(), AppointmentStoreError> {
        sqlx::query(
            "INSERT INTO appointment \
                 (id, provider_id, appointment_date, appointment_time, mode, duration_minutes, \
                  status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&confirmation.appointment_id)
        .bind(&confirmation.provider_id.0)
        .bind(&confirmation.date)
        .bind(&confirmation.time)
        .bind(confirmation.mode.as_str())
        .bind(i64::from(confirmation.duration_minutes))
        .bind(confirmation.status.as_str())
        .bind(confirmation.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppointmentStoreError::Store(error.to_string()))?;

        Ok(())
    }
}
