//! The per-turn pipeline: classify, route, respond, update context.
//!
//! Routing precedence, most specific first:
//! 1. an in-flight booking dialog from the prior turn's metadata
//! 2. a problem follow-up, decided solely by the prior turn's stored tag
//! 3. the advisor pre-check for fresh problem statements
//! 4. dispatch on the classified intent
//!
//! Every path ends in a well-formed `TurnResponse`; nothing here returns an
//! error to the caller.

use consulty_core::advisor::ProblemSolver;
use consulty_core::booking::engine::opening_prompt;
use consulty_core::booking::states::{BookingData, BookingState};
use consulty_core::booking::{AppointmentStore, BookingDialog};
use consulty_core::classify::{ClassifyInput, IntentClassifier};
use consulty_core::domain::analysis::{Intent, IntentAnalysis};
use consulty_core::domain::provider::{ProviderId, ScoredProvider};
use consulty_core::domain::turn::{
    ActionType, HistoryEntry, ProviderRef, TurnRequest, TurnResponse,
};
use consulty_core::ranking::engine::RecommendationEngine;
use consulty_core::ranking::{ProviderCatalog, SearchParams};

use crate::classifier::ClassifierStack;
use crate::context::SessionStore;

/// Classifier history window.
const RECENT_HISTORY_TURNS: usize = 3;
/// How far back the booking entry condition looks for an attached provider.
const PROVIDER_LOOKBACK_TURNS: usize = 5;
const MAX_ATTACHED_PROVIDERS: usize = 3;
const MAX_SOLUTION_STEPS: usize = 3;
const MAX_FOLLOW_UP_QUESTIONS: usize = 2;
/// Slot-filling turns are deterministic captures, not guesses.
const BOOKING_TURN_CONFIDENCE: f64 = 0.9;
const FOLLOW_UP_CONFIDENCE: f64 = 0.85;

pub struct AgentRuntime<C, S, A> {
    classifier: ClassifierStack,
    engine: RecommendationEngine<C>,
    advisor: ProblemSolver,
    dialog: BookingDialog,
    sessions: S,
    appointments: A,
    attached_providers: usize,
}

impl<C, S, A> AgentRuntime<C, S, A>
where
    C: ProviderCatalog,
    S: SessionStore,
    A: AppointmentStore,
{
    pub fn new(classifier: ClassifierStack, catalog: C, sessions: S, appointments: A) -> Self {
        Self {
            classifier,
            engine: RecommendationEngine::new(catalog),
            advisor: ProblemSolver::new(),
            dialog: BookingDialog::new(),
            sessions,
            appointments,
            attached_providers: MAX_ATTACHED_PROVIDERS,
        }
    }

    /// Apply the `engine` configuration section.
    pub fn with_limits(mut self, max_results: usize, attached_providers: usize) -> Self {
        self.engine.set_max_results(max_results);
        self.attached_providers = attached_providers.clamp(1, max_results.max(1));
        self
    }

    /// Classification only, without routing or context mutation. The
    /// accuracy validator compares this against its labels.
    pub async fn classify(&self, request: &TurnRequest) -> IntentAnalysis {
        let context = self.sessions.get(&request.session_id).await.unwrap_or_default();
        self.classify_with_reference(request, &context.contextual_reference()).await
    }

    pub async fn handle_turn(&self, request: &TurnRequest) -> TurnResponse {
        let context = self.sessions.get(&request.session_id).await.unwrap_or_default();
        let reference = context.contextual_reference();

        if let Some(booking) = in_flight_booking(&request.history) {
            let response = self.continue_booking(request, booking).await;
            self.track_without_classifying(request).await;
            return response;
        }

        if prior_turn_is_problem(&request.history) {
            let response = self.problem_follow_up(request).await;
            self.track_without_classifying(request).await;
            return response;
        }

        let analysis = self.classify_with_reference(request, &reference).await;

        let is_problem = self.advisor.is_problem_statement(&request.message)
            || matches!(analysis.intent, Intent::Support | Intent::ProblemSolving);

        let response = if is_problem {
            self.problem_first_encounter(request, &analysis)
        } else {
            match analysis.intent {
                Intent::Greeting => greeting_response(&analysis),
                Intent::Info => info_response(&analysis),
                Intent::Complaint => complaint_response(&analysis),
                Intent::Clarification => clarification_response(&analysis),
                Intent::Book => self.enter_booking(request, &analysis),
                Intent::Search | Intent::Support | Intent::ProblemSolving => {
                    if analysis.needs_clarification {
                        clarification_response(&analysis)
                    } else {
                        self.search_response(&analysis, &reference).await
                    }
                }
            }
        };

        self.sessions.absorb_turn(&request.session_id, &analysis, &request.message).await;
        response
    }

    async fn classify_with_reference(
        &self,
        request: &TurnRequest,
        reference: &str,
    ) -> IntentAnalysis {
        let input = ClassifyInput {
            message: &request.message,
            history: recent_history(&request.history),
            context_reference: (!reference.is_empty()).then_some(reference),
        };
        self.classifier.classify(&input).await
    }

    /// Booking and problem-follow-up turns skip the full classifier but
    /// the context tracker still absorbs every turn; the deterministic
    /// rule path is enough for that bookkeeping.
    async fn track_without_classifying(&self, request: &TurnRequest) {
        let analysis = self.classifier.rules().classify(&ClassifyInput {
            message: &request.message,
            history: recent_history(&request.history),
            context_reference: None,
        });
        self.sessions.absorb_turn(&request.session_id, &analysis, &request.message).await;
    }

    async fn continue_booking(&self, request: &TurnRequest, data: BookingData) -> TurnResponse {
        let provider_name = provider_name_for(&request.history, &data.provider_id);
        let outcome = self.dialog.apply(data, &request.message, &provider_name);

        if let Some(confirmation) = &outcome.confirmation {
            tracing::info!(
                event_name = "booking.confirmed",
                session_id = %request.session_id.0,
                appointment_id = %confirmation.appointment_id,
                provider_id = %confirmation.provider_id.0,
                "booking dialog reached confirmation"
            );
            if let Err(error) = self.appointments.record(confirmation).await {
                tracing::warn!(
                    event_name = "booking.appointment_store_failed",
                    session_id = %request.session_id.0,
                    error = %error,
                    "appointment write failed; confirmation still returned"
                );
            }
        }

        let confirmed = outcome.to == BookingState::Confirmed;
        TurnResponse {
            text: outcome.reply,
            providers: Vec::new(),
            confidence: BOOKING_TURN_CONFIDENCE,
            action: if confirmed { ActionType::Book } else { ActionType::BookingInProgress },
            needs_booking: !confirmed,
            next_steps: if confirmed {
                vec![
                    "You'll receive the appointment details shortly".to_string(),
                    "Ask me anytime to find another professional".to_string(),
                ]
            } else {
                vec!["Reply with the requested detail to continue booking".to_string()]
            },
            awaiting_consent: false,
            suggested_category: None,
            booking: Some(outcome.data),
            confirmation: outcome.confirmation,
        }
    }

    fn enter_booking(&self, request: &TurnRequest, analysis: &IntentAnalysis) -> TurnResponse {
        match find_recent_provider(&request.history) {
            Some(provider) => TurnResponse {
                text: opening_prompt(&provider.name),
                providers: Vec::new(),
                confidence: analysis.confidence,
                action: ActionType::BookingInProgress,
                needs_booking: true,
                next_steps: vec!["Reply with a date like tomorrow, Friday, or 12/18".to_string()],
                awaiting_consent: false,
                suggested_category: None,
                booking: Some(BookingData::new(provider.id)),
                confirmation: None,
            },
            None => {
                let text = match analysis.primary_category() {
                    Some(category) => format!(
                        "Happy to set that up - first let's pick the right {} professional. \
                         Want me to show you top-rated {} providers?",
                        category.label(),
                        category.label()
                    ),
                    None => "Happy to set that up - first let's find the right professional. \
                             What kind of help do you need (legal, finance, business, career, \
                             technology, health)?"
                        .to_string(),
                };
                TurnResponse {
                    text,
                    providers: Vec::new(),
                    confidence: analysis.confidence,
                    action: ActionType::Book,
                    needs_booking: true,
                    next_steps: vec!["Tell me a category or describe what you need".to_string()],
                    awaiting_consent: false,
                    suggested_category: analysis.primary_category(),
                    booking: None,
                    confirmation: None,
                }
            }
        }
    }

    fn problem_first_encounter(
        &self,
        request: &TurnRequest,
        analysis: &IntentAnalysis,
    ) -> TurnResponse {
        let problem = self.advisor.analyze(&request.message, &request.history);

        let mut text = self.advisor.acknowledgment(&problem);
        for (index, step) in problem.solution_steps.iter().take(MAX_SOLUTION_STEPS).enumerate() {
            text.push_str(&format!("\n{}. {step}", index + 1));
        }
        let follow_ups: Vec<String> = problem
            .follow_up_questions
            .iter()
            .take(MAX_FOLLOW_UP_QUESTIONS)
            .cloned()
            .collect();
        for question in &follow_ups {
            text.push_str(&format!("\n- {question}"));
        }
        text.push_str(
            "\nIf you'd rather talk to a professional about this, just say the word and I'll \
             find you one.",
        );

        TurnResponse {
            text,
            providers: Vec::new(),
            confidence: analysis.confidence,
            action: ActionType::ProblemSolving,
            needs_booking: false,
            next_steps: follow_ups,
            awaiting_consent: true,
            suggested_category: problem.problem_type.search_category(),
            booking: None,
            confirmation: None,
        }
    }

    async fn problem_follow_up(&self, request: &TurnRequest) -> TurnResponse {
        let problem = self.advisor.analyze(&request.message, &request.history);

        if self.advisor.wants_escalation(&request.message) {
            let category = problem.problem_type.search_category();
            let params = SearchParams { category, ..SearchParams::default() };
            let providers = self.attach(self.engine.search(&params).await);

            let text = if providers.is_empty() {
                "Sorry - I couldn't find matching professionals right now. Could you try \
                 again in a moment, or describe what you need differently?"
                    .to_string()
            } else {
                let mut text = match category {
                    Some(category) => format!(
                        "Got it - here are vetted {} professionals who can help:",
                        category.label()
                    ),
                    None => "Got it - here are professionals who can help:".to_string(),
                };
                append_provider_lines(&mut text, &providers);
                text.push_str("\nWant me to book an appointment with one of them?");
                text
            };

            return TurnResponse {
                needs_booking: !providers.is_empty(),
                text,
                providers,
                confidence: FOLLOW_UP_CONFIDENCE,
                action: ActionType::Search,
                next_steps: vec![
                    "Tell me which one you'd like to book".to_string(),
                    "Or give me a budget to narrow it down".to_string(),
                ],
                awaiting_consent: false,
                suggested_category: category,
                booking: None,
                confirmation: None,
            };
        }

        // Deeper, deliberately generic advice; escalation stays on offer.
        let mut text = String::from("Let's keep working on it. A few more things to try:");
        for (index, step) in self
            .advisor
            .analyze("", &[])
            .solution_steps
            .iter()
            .take(MAX_SOLUTION_STEPS)
            .enumerate()
        {
            text.push_str(&format!("\n{}. {step}", index + 1));
        }
        text.push_str(
            "\nAnd if you'd like, I can connect you with a professional - just say yes.",
        );

        TurnResponse {
            text,
            providers: Vec::new(),
            confidence: FOLLOW_UP_CONFIDENCE,
            action: ActionType::ProblemFollowup,
            needs_booking: false,
            next_steps: problem
                .follow_up_questions
                .iter()
                .take(MAX_FOLLOW_UP_QUESTIONS)
                .cloned()
                .collect(),
            awaiting_consent: true,
            suggested_category: problem.problem_type.search_category(),
            booking: None,
            confirmation: None,
        }
    }

    async fn search_response(&self, analysis: &IntentAnalysis, reference: &str) -> TurnResponse {
        // The extracted need only becomes a full-text filter when no
        // category was detected; with a category it would over-constrain
        // the strict step and force the cascade on every search.
        let query = if analysis.primary_category().is_some() {
            None
        } else {
            analysis.specific_needs.first().cloned()
        };
        let params = SearchParams {
            category: analysis.primary_category(),
            budget: analysis.entities.budget,
            location: analysis.entities.location.clone(),
            mode: analysis.entities.consultation_mode,
            query,
            min_experience_years: analysis.min_experience_years,
            min_rating: None,
        };

        let providers = self.attach(self.engine.search(&params).await);

        if providers.is_empty() {
            return TurnResponse {
                text: "Sorry - I couldn't find matching providers right now. Could you try a \
                       different category, budget, or location?"
                    .to_string(),
                providers: Vec::new(),
                confidence: analysis.confidence,
                action: ActionType::Search,
                needs_booking: false,
                next_steps: vec![
                    "Try a broader category".to_string(),
                    "Adjust the budget or location".to_string(),
                ],
                awaiting_consent: false,
                suggested_category: analysis.primary_category(),
                booking: None,
                confirmation: None,
            };
        }

        let mut text = String::new();
        if !reference.is_empty() {
            text.push_str(reference);
            text.push(' ');
        }
        match params.category {
            Some(category) => {
                text.push_str(&format!("Here are the top {} matches:", category.label()));
            }
            None => text.push_str("Here are the top matches:"),
        }
        append_provider_lines(&mut text, &providers);
        text.push_str("\nWant me to book an appointment with one of them?");

        TurnResponse {
            text,
            providers,
            confidence: analysis.confidence,
            action: ActionType::Search,
            needs_booking: true,
            next_steps: vec![
                "Tell me which one you'd like to book".to_string(),
                "Or refine by budget, location, or online/in-person".to_string(),
            ],
            awaiting_consent: false,
            suggested_category: analysis.primary_category(),
            booking: None,
            confirmation: None,
        }
    }

    fn attach(&self, scored: Vec<ScoredProvider>) -> Vec<ScoredProvider> {
        scored.into_iter().take(self.attached_providers).collect()
    }
}

fn recent_history(history: &[HistoryEntry]) -> &[HistoryEntry] {
    let start = history.len().saturating_sub(RECENT_HISTORY_TURNS);
    &history[start..]
}

/// An unfinished booking travels on the immediately preceding turn's
/// metadata; anything older is a fresh start.
fn in_flight_booking(history: &[HistoryEntry]) -> Option<BookingData> {
    history
        .last()
        .and_then(|entry| entry.metadata.booking.clone())
        .filter(|booking| booking.state != BookingState::Confirmed)
}

/// Follow-up routing is an explicit check on the prior turn's stored tag,
/// never inferred from the new message.
fn prior_turn_is_problem(history: &[HistoryEntry]) -> bool {
    matches!(
        history.last().and_then(|entry| entry.metadata.action),
        Some(ActionType::ProblemSolving) | Some(ActionType::ProblemFollowup)
    )
}

/// Booking entry condition: most-recent-first over the last five turns'
/// attached provider lists, first provider found wins.
fn find_recent_provider(history: &[HistoryEntry]) -> Option<ProviderRef> {
    history
        .iter()
        .rev()
        .take(PROVIDER_LOOKBACK_TURNS)
        .find_map(|entry| entry.metadata.providers.first().cloned())
}

fn provider_name_for(history: &[HistoryEntry], id: &ProviderId) -> String {
    history
        .iter()
        .rev()
        .find_map(|entry| {
            entry
                .metadata
                .providers
                .iter()
                .find(|provider| provider.id == *id)
                .map(|provider| provider.name.clone())
        })
        .unwrap_or_else(|| "your selected provider".to_string())
}

fn append_provider_lines(text: &mut String, providers: &[ScoredProvider]) {
    for (index, scored) in providers.iter().enumerate() {
        let provider = &scored.provider;
        let rate = provider
            .hourly_rate
            .map(|rate| format!(", ${rate}/h"))
            .unwrap_or_default();
        text.push_str(&format!(
            "\n{}. {} - {:.1}\u{2605} ({} reviews, {} yrs{rate})",
            index + 1,
            provider.name,
            provider.rating,
            provider.review_count,
            provider.experience_years,
        ));
    }
}

fn greeting_response(analysis: &IntentAnalysis) -> TurnResponse {
    simple_response(
        ActionType::Greeting,
        analysis.confidence,
        "Hello! I can help you find vetted professionals - legal, finance, business, career, \
         technology, health and more - and book appointments with them. What do you need help \
         with today?",
        vec![
            "Describe what you need, e.g. 'I need a lawyer for contract review'".to_string(),
            "Or ask 'what can you do?'".to_string(),
        ],
    )
}

fn info_response(analysis: &IntentAnalysis) -> TurnResponse {
    simple_response(
        ActionType::Info,
        analysis.confidence,
        "I match you with vetted service providers across legal, finance, business, career, \
         technology, health, marketing, and education - and once you pick one, I can book the \
         appointment for you. Tell me what you need and any budget or location constraints.",
        vec!["Describe what you need help with".to_string()],
    )
}

fn complaint_response(analysis: &IntentAnalysis) -> TurnResponse {
    simple_response(
        ActionType::Complaint,
        analysis.confidence,
        "I'm sorry about the poor experience - that's not what we want. I've noted your \
         complaint for our support team to follow up on. Is there something I can do right \
         now, like finding you a different provider?",
        vec![
            "Tell me what went wrong in more detail".to_string(),
            "Or ask for a replacement provider".to_string(),
        ],
    )
}

fn clarification_response(analysis: &IntentAnalysis) -> TurnResponse {
    simple_response(
        ActionType::Clarification,
        analysis.confidence,
        "I want to make sure I find the right people for you. Could you tell me a bit more - \
         what kind of help do you need (legal, finance, business, career, technology, \
         health), and any budget or location preferences?",
        vec!["Name a category or describe your situation".to_string()],
    )
}

fn simple_response(
    action: ActionType,
    confidence: f64,
    text: &str,
    next_steps: Vec<String>,
) -> TurnResponse {
    TurnResponse {
        text: text.to_string(),
        providers: Vec::new(),
        confidence,
        action,
        needs_booking: false,
        next_steps,
        awaiting_consent: false,
        suggested_category: None,
        booking: None,
        confirmation: None,
    }
}
