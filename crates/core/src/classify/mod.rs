//! Intent and entity extraction.
//!
//! Two interchangeable classifier implementations sit behind the
//! [`IntentClassifier`] strategy interface: the deterministic rule engine in
//! this module, and the oracle-backed classifier in the agent crate that
//! falls back to the rule engine whenever the oracle is unavailable, slow,
//! or returns malformed JSON. Both produce the same [`IntentAnalysis`]
//! shape, and neither is allowed to fail: every internal error degrades to
//! `IntentAnalysis::fallback()`.

pub mod lexicon;
pub mod rules;

use crate::domain::analysis::IntentAnalysis;
use crate::domain::turn::HistoryEntry;

/// One classification request. History is the caller's recent transcript,
/// already bounded to at most three entries.
#[derive(Clone, Debug)]
pub struct ClassifyInput<'a> {
    pub message: &'a str,
    pub history: &'a [HistoryEntry],
    /// Phrase referencing earlier categories, from the context tracker.
    pub context_reference: Option<&'a str>,
}

impl<'a> ClassifyInput<'a> {
    pub fn message_only(message: &'a str) -> Self {
        Self { message, history: &[], context_reference: None }
    }
}

pub trait IntentClassifier: Send + Sync {
    fn classify(&self, input: &ClassifyInput<'_>) -> IntentAnalysis;
}

pub use rules::RuleClassifier;
