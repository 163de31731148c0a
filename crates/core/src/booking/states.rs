use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::analysis::ConsultationMode;
use crate::domain::provider::ProviderId;

/// Slot-filling states, strictly ordered. No state may be skipped and
/// confirmation requires all three slots filled in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    AwaitingDate,
    AwaitingTime,
    AwaitingType,
    Confirmed,
}

/// The validated shape of one booking-dialog input. Raw text is classified
/// into exactly one of these before the transition table is consulted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotInput {
    Date(String),
    Time(String),
    Mode(ConsultationMode),
    Unrecognized,
}

/// Booking slots accumulated so far. Travels forward attached to response
/// metadata and is read back by the next turn's handler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingData {
    pub provider_id: ProviderId,
    pub state: BookingState,
    pub date: Option<String>,
    pub time: Option<String>,
    pub mode: Option<ConsultationMode>,
}

impl BookingData {
    pub fn new(provider_id: ProviderId) -> Self {
        Self { provider_id, state: BookingState::AwaitingDate, date: None, time: None, mode: None }
    }

    /// Move to the next state, enforcing the strict slot order. A skip or a
    /// transition without its slot filled is a domain error, which the
    /// dialog engine translates into a restart rather than surfacing.
    pub fn advance_to(&mut self, next: BookingState) -> Result<(), crate::errors::DomainError> {
        use BookingState::{AwaitingDate, AwaitingTime, AwaitingType, Confirmed};

        let allowed = match (self.state, next) {
            (AwaitingDate, AwaitingTime) => self.date.is_some(),
            (AwaitingTime, AwaitingType) => self.date.is_some() && self.time.is_some(),
            (AwaitingType, Confirmed) => {
                self.date.is_some() && self.time.is_some() && self.mode.is_some()
            }
            _ => false,
        };

        if !allowed {
            return Err(crate::errors::DomainError::InvalidBookingTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
        }
    }
}

/// Emitted once the dialog reaches `Confirmed`. Writing this to the
/// appointment store is an external collaborator call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentConfirmation {
    pub appointment_id: String,
    pub provider_id: ProviderId,
    pub date: String,
    pub time: String,
    pub mode: ConsultationMode,
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

/// Outcome of feeding one input to the dialog. An unrecognized input keeps
/// `to == from` and carries a re-prompt; it is not an error.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotOutcome {
    pub from: BookingState,
    pub to: BookingState,
    pub data: BookingData,
    pub reply: String,
    pub confirmation: Option<AppointmentConfirmation>,
}
