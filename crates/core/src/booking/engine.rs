use chrono::Utc;
use regex::Regex;
use uuid::Uuid;

use crate::booking::states::{
    AppointmentConfirmation, AppointmentStatus, BookingData, BookingState, SlotInput, SlotOutcome,
};
use crate::domain::analysis::ConsultationMode;

pub const DEFAULT_DURATION_MINUTES: u32 = 60;

const WEEKDAYS: &[&str] =
    &["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];
const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];
const RELATIVE_DATES: &[&str] =
    &["today", "tomorrow", "day after tomorrow", "next week", "next month"];
const COARSE_TIMES: &[&str] = &["morning", "afternoon", "evening", "noon"];
const ONLINE_WORDS: &[&str] = &["online", "video", "virtual", "remote"];
const OFFLINE_WORDS: &[&str] =
    &["offline", "in person", "in-person", "office", "face to face", "on site"];

/// The slot-filling dialog. Transitions are keyed strictly on
/// (current state, validated input kind); anything else re-prompts the same
/// state with examples.
pub struct BookingDialog {
    explicit_date: Regex,
    ordinal_date: Regex,
    clock_time: Regex,
    hour_time: Regex,
}

impl Default for BookingDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingDialog {
    pub fn new() -> Self {
        Self {
            explicit_date: compile(r"\b\d{1,2}[/.-]\d{1,2}([/.-]\d{2,4})?\b"),
            ordinal_date: compile(r"\b\d{1,2}(st|nd|rd|th)\b"),
            clock_time: compile(r"\b\d{1,2}:[0-5]\d\s*(am|pm)?\b"),
            hour_time: compile(r"\b\d{1,2}\s*(am|pm)\b"),
        }
    }

    /// Validate raw text against the shape the current state expects.
    /// Input that would be valid for a *different* state is still
    /// `Unrecognized` here; states cannot be skipped.
    pub fn classify_input(&self, state: BookingState, raw: &str) -> SlotInput {
        let text = raw.trim();
        let lowered = text.to_ascii_lowercase();

        match state {
            BookingState::AwaitingDate if self.looks_like_date(&lowered) => {
                SlotInput::Date(text.to_string())
            }
            BookingState::AwaitingTime if self.looks_like_time(&lowered) => {
                SlotInput::Time(text.to_string())
            }
            BookingState::AwaitingType => match parse_mode(&lowered) {
                Some(mode) => SlotInput::Mode(mode),
                None => SlotInput::Unrecognized,
            },
            _ => SlotInput::Unrecognized,
        }
    }

    /// Feed one user input into the dialog. Never fails: invalid input and
    /// even corrupted slot data produce an outcome with a reply, not an
    /// error.
    pub fn apply(&self, mut data: BookingData, raw: &str, provider_name: &str) -> SlotOutcome {
        let from = data.state;
        let input = self.classify_input(from, raw);

        match (from, input) {
            (BookingState::AwaitingDate, SlotInput::Date(date)) => {
                data.date = Some(date);
                match data.advance_to(BookingState::AwaitingTime) {
                    Ok(()) => SlotOutcome {
                        from,
                        to: data.state,
                        reply: prompt_for(data.state, provider_name),
                        data,
                        confirmation: None,
                    },
                    Err(_) => restart(data.provider_id.clone(), from, provider_name),
                }
            }
            (BookingState::AwaitingTime, SlotInput::Time(time)) => {
                data.time = Some(time);
                match data.advance_to(BookingState::AwaitingType) {
                    Ok(()) => SlotOutcome {
                        from,
                        to: data.state,
                        reply: prompt_for(data.state, provider_name),
                        data,
                        confirmation: None,
                    },
                    Err(_) => restart(data.provider_id.clone(), from, provider_name),
                }
            }
            (BookingState::AwaitingType, SlotInput::Mode(mode)) => {
                data.mode = Some(mode);
                match data.advance_to(BookingState::Confirmed) {
                    Ok(()) => self.confirm(data, from, provider_name),
                    Err(_) => restart(data.provider_id.clone(), from, provider_name),
                }
            }
            (BookingState::Confirmed, _) => SlotOutcome {
                from,
                to: BookingState::Confirmed,
                reply: format!("Your appointment with {provider_name} is already confirmed."),
                data,
                confirmation: None,
            },
            (state, SlotInput::Unrecognized) => SlotOutcome {
                from,
                to: state,
                reply: reprompt_for(state),
                data,
                confirmation: None,
            },
            // classify_input only produces inputs for the current state, so
            // the remaining combinations are unreachable; treat them as
            // unrecognized rather than panicking.
            (state, _) => SlotOutcome {
                from,
                to: state,
                reply: reprompt_for(state),
                data,
                confirmation: None,
            },
        }
    }

    fn confirm(&self, data: BookingData, from: BookingState, provider_name: &str) -> SlotOutcome {
        let (Some(date), Some(time), Some(mode)) =
            (data.date.clone(), data.time.clone(), data.mode)
        else {
            return restart(data.provider_id.clone(), from, provider_name);
        };

        let confirmation = AppointmentConfirmation {
            appointment_id: Uuid::new_v4().to_string(),
            provider_id: data.provider_id.clone(),
            date: date.clone(),
            time: time.clone(),
            mode,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            status: AppointmentStatus::Confirmed,
            created_at: Utc::now(),
        };

        SlotOutcome {
            from,
            to: BookingState::Confirmed,
            reply: format!(
                "All set! Your {} appointment with {provider_name} is confirmed for {date} at {time} (1 hour).",
                mode.label().to_ascii_lowercase()
            ),
            data,
            confirmation: Some(confirmation),
        }
    }

    fn looks_like_date(&self, text: &str) -> bool {
        RELATIVE_DATES.iter().any(|term| text.contains(term))
            || WEEKDAYS.iter().any(|day| text.contains(day))
            || MONTHS.iter().any(|month| text.contains(month))
            || self.explicit_date.is_match(text)
            || self.ordinal_date.is_match(text)
    }

    fn looks_like_time(&self, text: &str) -> bool {
        self.clock_time.is_match(text)
            || self.hour_time.is_match(text)
            || COARSE_TIMES.iter().any(|term| text.contains(term))
    }
}

/// Opening prompt when the dialog is entered with a chosen provider.
pub fn opening_prompt(provider_name: &str) -> String {
    format!(
        "Great, let's book a session with {provider_name}. {}",
        prompt_text(BookingState::AwaitingDate)
    )
}

fn prompt_for(state: BookingState, provider_name: &str) -> String {
    match state {
        BookingState::AwaitingType => format!(
            "Almost done - would you like to meet {provider_name} online or in person?"
        ),
        other => prompt_text(other),
    }
}

fn prompt_text(state: BookingState) -> String {
    match state {
        BookingState::AwaitingDate => {
            "What date works for you? (for example: tomorrow, Friday, or 12/18)".to_string()
        }
        BookingState::AwaitingTime => {
            "What time suits you? (for example: 10am, 2:30 pm, or morning)".to_string()
        }
        BookingState::AwaitingType => {
            "Would you like to meet online or in person?".to_string()
        }
        BookingState::Confirmed => "Your appointment is confirmed.".to_string(),
    }
}

fn reprompt_for(state: BookingState) -> String {
    match state {
        BookingState::AwaitingDate => {
            "I couldn't read that as a date. Try something like tomorrow, Friday, or 12/18."
                .to_string()
        }
        BookingState::AwaitingTime => {
            "I couldn't read that as a time. Try something like 10am, 2:30 pm, or morning."
                .to_string()
        }
        BookingState::AwaitingType => {
            "Please pick one: online (video call) or in person (at the office).".to_string()
        }
        BookingState::Confirmed => "Your appointment is already confirmed.".to_string(),
    }
}

/// Corrupted slot data restarts the dialog from its first state with an
/// explanatory message.
fn restart(
    provider_id: crate::domain::provider::ProviderId,
    from: BookingState,
    provider_name: &str,
) -> SlotOutcome {
    let data = BookingData::new(provider_id);
    SlotOutcome {
        from,
        to: data.state,
        reply: format!(
            "Something went wrong with the booking details for {provider_name}, so let's start over. {}",
            prompt_text(BookingState::AwaitingDate)
        ),
        data,
        confirmation: None,
    }
}

fn parse_mode(text: &str) -> Option<ConsultationMode> {
    if ONLINE_WORDS.iter().any(|word| text.contains(word)) {
        return Some(ConsultationMode::Online);
    }
    if OFFLINE_WORDS.iter().any(|word| text.contains(word)) {
        return Some(ConsultationMode::Offline);
    }
    None
}

fn compile(pattern: &'static str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|error| panic!("invalid built-in pattern: {error}"))
}

#[cfg(test)]
mod tests {
    use crate::booking::states::{BookingData, BookingState, SlotInput};
    use crate::domain::analysis::ConsultationMode;
    use crate::domain::provider::ProviderId;

    use super::BookingDialog;

    fn dialog() -> BookingDialog {
        BookingDialog::new()
    }

    fn fresh_data() -> BookingData {
        BookingData::new(ProviderId("prov-1".to_string()))
    }

    #[test]
    fn happy_path_fills_all_slots_in_order() {
        let dialog = dialog();
        let step1 = dialog.apply(fresh_data(), "tomorrow", "Dana Reyes");
        assert_eq!(step1.to, BookingState::AwaitingTime);
        assert_eq!(step1.data.date.as_deref(), Some("tomorrow"));

        let step2 = dialog.apply(step1.data, "10am", "Dana Reyes");
        assert_eq!(step2.to, BookingState::AwaitingType);
        assert_eq!(step2.data.time.as_deref(), Some("10am"));

        let step3 = dialog.apply(step2.data, "online", "Dana Reyes");
        assert_eq!(step3.to, BookingState::Confirmed);
        assert_eq!(step3.data.mode, Some(ConsultationMode::Online));

        let confirmation = step3.confirmation.expect("confirmed booking emits a confirmation");
        assert_eq!(confirmation.date, "tomorrow");
        assert_eq!(confirmation.time, "10am");
        assert_eq!(confirmation.mode, ConsultationMode::Online);
        assert_eq!(confirmation.duration_minutes, 60);
    }

    #[test]
    fn invalid_input_does_not_advance_and_reprompts_with_examples() {
        let dialog = dialog();
        let outcome = dialog.apply(fresh_data(), "xyz", "Dana Reyes");
        assert_eq!(outcome.from, BookingState::AwaitingDate);
        assert_eq!(outcome.to, BookingState::AwaitingDate);
        assert!(outcome.data.date.is_none());
        assert!(outcome.reply.contains("tomorrow"));
    }

    #[test]
    fn time_like_input_is_rejected_while_awaiting_a_date() {
        let dialog = dialog();
        let input = dialog.classify_input(BookingState::AwaitingDate, "10am");
        assert_eq!(input, SlotInput::Unrecognized);
    }

    #[test]
    fn date_shapes_cover_weekdays_months_relative_and_explicit() {
        let dialog = dialog();
        for date in ["tomorrow", "Friday", "march 12", "12/18", "the 15th"] {
            assert_eq!(
                dialog.classify_input(BookingState::AwaitingDate, date),
                SlotInput::Date(date.to_string()),
                "{date}"
            );
        }
    }

    #[test]
    fn time_shapes_cover_clock_hour_and_coarse_terms() {
        let dialog = dialog();
        for time in ["10am", "2:30 pm", "14:30", "morning"] {
            assert_eq!(
                dialog.classify_input(BookingState::AwaitingTime, time),
                SlotInput::Time(time.to_string()),
                "{time}"
            );
        }
    }

    #[test]
    fn mode_keywords_map_to_online_and_offline() {
        let dialog = dialog();
        assert_eq!(
            dialog.classify_input(BookingState::AwaitingType, "video call please"),
            SlotInput::Mode(ConsultationMode::Online)
        );
        assert_eq!(
            dialog.classify_input(BookingState::AwaitingType, "at the office"),
            SlotInput::Mode(ConsultationMode::Offline)
        );
        assert_eq!(
            dialog.classify_input(BookingState::AwaitingType, "whatever"),
            SlotInput::Unrecognized
        );
    }

    #[test]
    fn corrupted_slots_restart_the_dialog() {
        let dialog = dialog();
        // A time-state record that somehow lost its date.
        let mut data = fresh_data();
        data.state = BookingState::AwaitingTime;

        let outcome = dialog.apply(data, "10am", "Dana Reyes");
        assert_eq!(outcome.to, BookingState::AwaitingDate);
        assert!(outcome.reply.contains("start over"));
        assert!(outcome.data.date.is_none() && outcome.data.time.is_none());
    }

    #[test]
    fn confirmed_dialog_stays_confirmed() {
        let dialog = dialog();
        let mut data = fresh_data();
        data.date = Some("tomorrow".to_string());
        data.time = Some("10am".to_string());
        data.mode = Some(ConsultationMode::Online);
        data.state = BookingState::Confirmed;

        let outcome = dialog.apply(data, "tuesday", "Dana Reyes");
        assert_eq!(outcome.to, BookingState::Confirmed);
        assert!(outcome.confirmation.is_none());
    }
}
