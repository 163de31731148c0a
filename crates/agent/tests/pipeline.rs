//! End-to-end pipeline flows over the seeded in-memory catalog: search,
//! booking to confirmation, and the problem-solving escalation path.

use std::sync::Arc;

use consulty_agent::{AgentRuntime, ClassifierStack, InMemorySessionStore};
use consulty_core::booking::states::BookingState;
use consulty_core::domain::analysis::ConsultationMode;
use consulty_core::domain::category::Category;
use consulty_core::domain::session::SessionId;
use consulty_core::domain::turn::{ActionType, HistoryEntry, TurnRequest, TurnResponse};
use consulty_db::{InMemoryAppointmentStore, InMemoryProviderCatalog};

type TestRuntime =
    AgentRuntime<InMemoryProviderCatalog, InMemorySessionStore, Arc<InMemoryAppointmentStore>>;

fn runtime() -> (TestRuntime, Arc<InMemoryAppointmentStore>) {
    let appointments = Arc::new(InMemoryAppointmentStore::default());
    let runtime = AgentRuntime::new(
        ClassifierStack::rules_only(),
        InMemoryProviderCatalog::seeded(),
        InMemorySessionStore::new(),
        Arc::clone(&appointments),
    );
    (runtime, appointments)
}

fn request(message: &str, session: &str, history: &[HistoryEntry]) -> TurnRequest {
    TurnRequest {
        message: message.to_string(),
        user_id: Some("user-1".to_string()),
        session_id: SessionId(session.to_string()),
        history: history.to_vec(),
    }
}

fn push_turn(history: &mut Vec<HistoryEntry>, message: &str, response: &TurnResponse) {
    history.push(HistoryEntry {
        user_message: message.to_string(),
        bot_response: response.text.clone(),
        metadata: response.metadata(),
    });
}

#[tokio::test]
async fn lawyer_search_returns_legal_providers_with_high_confidence() {
    let (runtime, _) = runtime();
    let response = runtime
        .handle_turn(&request("I need a lawyer for contract review", "e2e-search", &[]))
        .await;

    assert_eq!(response.action, ActionType::Search);
    assert!(response.confidence >= 0.8);
    assert!(!response.providers.is_empty() && response.providers.len() <= 3);
    for scored in &response.providers {
        assert!(
            Category::Legal.matches_text(&scored.provider.category),
            "unexpected category {}",
            scored.provider.category
        );
    }
}

#[tokio::test]
async fn greeting_attaches_nothing_regardless_of_history() {
    let (runtime, _) = runtime();
    let mut history = Vec::new();

    let search =
        runtime.handle_turn(&request("I need a lawyer", "e2e-greeting", &history)).await;
    push_turn(&mut history, "I need a lawyer", &search);

    let response = runtime.handle_turn(&request("Hi there", "e2e-greeting", &history)).await;
    assert_eq!(response.action, ActionType::Greeting);
    assert!(response.providers.is_empty());
    assert!(response.confidence >= 0.7);
}

#[tokio::test]
async fn booking_dialog_runs_to_confirmation() {
    let (runtime, appointments) = runtime();
    let session = "e2e-booking";
    let mut history = Vec::new();

    let search = runtime
        .handle_turn(&request("I need a lawyer for contract review", session, &history))
        .await;
    assert!(!search.providers.is_empty());
    let expected_provider = search.providers[0].provider.id.clone();
    push_turn(&mut history, "I need a lawyer for contract review", &search);

    let entry = runtime.handle_turn(&request("book an appointment", session, &history)).await;
    assert_eq!(entry.action, ActionType::BookingInProgress);
    assert_eq!(
        entry.booking.as_ref().map(|booking| booking.state),
        Some(BookingState::AwaitingDate)
    );
    push_turn(&mut history, "book an appointment", &entry);

    let date_turn = runtime.handle_turn(&request("tomorrow", session, &history)).await;
    assert_eq!(
        date_turn.booking.as_ref().map(|booking| booking.state),
        Some(BookingState::AwaitingTime)
    );
    push_turn(&mut history, "tomorrow", &date_turn);

    let time_turn = runtime.handle_turn(&request("10am", session, &history)).await;
    assert_eq!(
        time_turn.booking.as_ref().map(|booking| booking.state),
        Some(BookingState::AwaitingType)
    );
    push_turn(&mut history, "10am", &time_turn);

    let final_turn = runtime.handle_turn(&request("online", session, &history)).await;
    assert_eq!(final_turn.action, ActionType::Book);
    let booking = final_turn.booking.expect("booking data travels to the end");
    assert_eq!(booking.state, BookingState::Confirmed);
    assert_eq!(booking.date.as_deref(), Some("tomorrow"));
    assert_eq!(booking.time.as_deref(), Some("10am"));
    assert_eq!(booking.mode, Some(ConsultationMode::Online));

    let confirmation = final_turn.confirmation.expect("confirmation emitted");
    assert_eq!(confirmation.provider_id, expected_provider);
    assert_eq!(confirmation.duration_minutes, 60);

    let recorded = appointments.recorded().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].appointment_id, confirmation.appointment_id);
}

#[tokio::test]
async fn invalid_date_input_keeps_the_dialog_in_place() {
    let (runtime, _) = runtime();
    let session = "e2e-invalid-slot";
    let mut history = Vec::new();

    let search = runtime.handle_turn(&request("I need a lawyer", session, &history)).await;
    push_turn(&mut history, "I need a lawyer", &search);
    let entry = runtime.handle_turn(&request("book an appointment", session, &history)).await;
    push_turn(&mut history, "book an appointment", &entry);

    let response = runtime.handle_turn(&request("xyz", session, &history)).await;
    assert_eq!(response.action, ActionType::BookingInProgress);
    assert_eq!(
        response.booking.as_ref().map(|booking| booking.state),
        Some(BookingState::AwaitingDate)
    );
    assert!(response.booking.as_ref().map(|booking| booking.date.is_none()).unwrap_or(false));
}

#[tokio::test]
async fn failed_interview_then_consent_escalates_to_career_search() {
    let (runtime, _) = runtime();
    let session = "e2e-problem";
    let mut history = Vec::new();

    let first = runtime.handle_turn(&request("I failed my interview", session, &history)).await;
    assert_eq!(first.action, ActionType::ProblemSolving);
    assert!(first.awaiting_consent);
    assert_eq!(first.suggested_category, Some(Category::Career));
    assert!(first.providers.is_empty());
    push_turn(&mut history, "I failed my interview", &first);

    let second =
        runtime.handle_turn(&request("yes, find me someone", session, &history)).await;
    assert_eq!(second.action, ActionType::Search);
    assert_eq!(second.suggested_category, Some(Category::Career));
    assert!(!second.providers.is_empty());
    for scored in &second.providers {
        assert!(Category::Career.matches_text(&scored.provider.category));
    }
}

#[tokio::test]
async fn problem_follow_up_without_consent_keeps_advising() {
    let (runtime, _) = runtime();
    let session = "e2e-problem-followup";
    let mut history = Vec::new();

    let first = runtime.handle_turn(&request("I failed my interview", session, &history)).await;
    push_turn(&mut history, "I failed my interview", &first);

    let second = runtime
        .handle_turn(&request("it was a final round for a backend role", session, &history))
        .await;
    assert_eq!(second.action, ActionType::ProblemFollowup);
    assert!(second.awaiting_consent);
    assert!(second.providers.is_empty());
    push_turn(&mut history, "it was a final round for a backend role", &second);

    // The offer stays open: consent on the third turn still escalates.
    let third = runtime.handle_turn(&request("ok, find me an expert", session, &history)).await;
    assert_eq!(third.action, ActionType::Search);
    assert!(!third.providers.is_empty());
}
