pub mod advisor;
pub mod booking;
pub mod classify;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ranking;

pub use advisor::{ProblemAnalysis, ProblemSolver, ProblemType, Severity};
pub use booking::{
    AppointmentConfirmation, AppointmentStore, AppointmentStoreError, BookingData, BookingDialog,
    BookingState, SlotInput, SlotOutcome,
};
pub use classify::{ClassifyInput, IntentClassifier, RuleClassifier};
pub use domain::analysis::{
    AnalysisSource, ConsultationMode, Entities, Intent, IntentAnalysis, Sentiment, Urgency,
};
pub use domain::category::Category;
pub use domain::provider::{ProviderId, ProviderRecord, ScoredProvider};
pub use domain::session::{ConversationContext, SessionId};
pub use domain::turn::{
    ActionType, HistoryEntry, ProviderRef, TurnMetadata, TurnRequest, TurnResponse,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use ranking::engine::RecommendationEngine;
pub use ranking::{CatalogError, CatalogQuery, ProviderCatalog, SearchParams};
