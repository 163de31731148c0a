use serde::{Deserialize, Serialize};

use crate::booking::states::{AppointmentConfirmation, BookingData};
use crate::domain::analysis::Intent;
use crate::domain::category::Category;
use crate::domain::provider::{ProviderId, ScoredProvider};
use crate::domain::session::SessionId;

/// The tag a turn carries in transcripts. A superset of `Intent`: routing
/// can land on tags no classifier emits directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Greeting,
    Search,
    Book,
    Info,
    Complaint,
    Support,
    Clarification,
    ProblemSolving,
    ProblemFollowup,
    BookingInProgress,
}

impl From<Intent> for ActionType {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Greeting => ActionType::Greeting,
            Intent::Search => ActionType::Search,
            Intent::Book => ActionType::Book,
            Intent::Info => ActionType::Info,
            Intent::Complaint => ActionType::Complaint,
            Intent::Support => ActionType::Support,
            Intent::Clarification => ActionType::Clarification,
            Intent::ProblemSolving => ActionType::ProblemSolving,
        }
    }
}

/// A provider mention small enough to travel in turn metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRef {
    pub id: ProviderId,
    pub name: String,
}

/// Metadata attached to an already-delivered turn, replayed to us inside
/// the caller's recent-history list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnMetadata {
    pub action: Option<ActionType>,
    /// Providers attached to that turn's response, ranked order preserved.
    pub providers: Vec<ProviderRef>,
    pub booking: Option<BookingData>,
    pub suggested_category: Option<Category>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_message: String,
    pub bot_response: String,
    pub metadata: TurnMetadata,
}

/// One inbound turn. History is caller-supplied and already bounded; the
/// session store it comes from is not owned here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnRequest {
    pub message: String,
    pub user_id: Option<String>,
    pub session_id: SessionId,
    pub history: Vec<HistoryEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub text: String,
    /// At most three providers surface per turn.
    pub providers: Vec<ScoredProvider>,
    pub confidence: f64,
    pub action: ActionType,
    pub needs_booking: bool,
    pub next_steps: Vec<String>,
    pub awaiting_consent: bool,
    pub suggested_category: Option<Category>,
    pub booking: Option<BookingData>,
    pub confirmation: Option<AppointmentConfirmation>,
}

impl TurnResponse {
    /// The metadata a caller should attach when appending this turn to the
    /// session transcript.
    pub fn metadata(&self) -> TurnMetadata {
        TurnMetadata {
            action: Some(self.action),
            providers: self
                .providers
                .iter()
                .map(|scored| ProviderRef {
                    id: scored.provider.id.clone(),
                    name: scored.provider.name.clone(),
                })
                .collect(),
            booking: self.booking.clone(),
            suggested_category: self.suggested_category,
        }
    }
}
