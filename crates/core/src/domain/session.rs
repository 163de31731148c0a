use serde::{Deserialize, Serialize};

use crate::domain::analysis::{Entities, Intent, IntentAnalysis};
use crate::domain::category::Category;

/// Caller-supplied conversation thread identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Upper bound on retained intent history. The source system grew this
/// without limit; retention beyond the window belongs to the external
/// session store.
pub const INTENT_HISTORY_LIMIT: usize = 50;

/// Per-session accumulator consulted by everything downstream of the
/// classifier. Created lazily on a session's first turn, mutated every
/// turn, no explicit teardown.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Categories seen so far, insertion-ordered, deduplicated.
    pub categories: Vec<Category>,
    /// Merged entities, last write wins per field.
    pub entities: Entities,
    /// Most recent intents, oldest first, at most `INTENT_HISTORY_LIMIT`.
    pub intents: Vec<Intent>,
    pub last_message: Option<String>,
}

impl ConversationContext {
    pub fn absorb(&mut self, analysis: &IntentAnalysis, message: &str) {
        self.intents.push(analysis.intent);
        if self.intents.len() > INTENT_HISTORY_LIMIT {
            let excess = self.intents.len() - INTENT_HISTORY_LIMIT;
            self.intents.drain(..excess);
        }

        for category in &analysis.categories {
            if !self.categories.contains(category) {
                self.categories.push(*category);
            }
        }

        self.entities.merge_from(&analysis.entities);
        self.last_message = Some(message.to_string());
    }

    /// Short phrase referencing previously discussed categories, used to
    /// preface responses. Empty when the session has no category history.
    pub fn contextual_reference(&self) -> String {
        match self.categories.as_slice() {
            [] => String::new(),
            [only] => format!("Earlier we talked about {} services.", only.label()),
            [head @ .., tail] => {
                let listed =
                    head.iter().map(|category| category.label()).collect::<Vec<_>>().join(", ");
                format!("Earlier we talked about {listed} and {} services.", tail.label())
            }
        }
    }

    pub fn last_intent(&self) -> Option<Intent> {
        self.intents.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::analysis::{Intent, IntentAnalysis};
    use crate::domain::category::Category;

    use super::{ConversationContext, INTENT_HISTORY_LIMIT};

    fn analysis_with(intent: Intent, categories: Vec<Category>) -> IntentAnalysis {
        IntentAnalysis { intent, categories, ..IntentAnalysis::fallback() }
    }

    #[test]
    fn absorb_unions_categories_in_first_seen_order() {
        let mut context = ConversationContext::default();
        context.absorb(&analysis_with(Intent::Search, vec![Category::Legal]), "need a lawyer");
        context.absorb(
            &analysis_with(Intent::Search, vec![Category::Finance, Category::Legal]),
            "also taxes",
        );

        assert_eq!(context.categories, vec![Category::Legal, Category::Finance]);
        assert_eq!(context.intents, vec![Intent::Search, Intent::Search]);
        assert_eq!(context.last_message.as_deref(), Some("also taxes"));
    }

    #[test]
    fn intent_history_is_bounded() {
        let mut context = ConversationContext::default();
        for _ in 0..(INTENT_HISTORY_LIMIT + 7) {
            context.absorb(&analysis_with(Intent::Info, Vec::new()), "what do you do");
        }
        assert_eq!(context.intents.len(), INTENT_HISTORY_LIMIT);
    }

    #[test]
    fn contextual_reference_names_discussed_categories() {
        let mut context = ConversationContext::default();
        assert!(context.contextual_reference().is_empty());

        context.absorb(&analysis_with(Intent::Search, vec![Category::Legal]), "m1");
        assert_eq!(context.contextual_reference(), "Earlier we talked about legal services.");

        context.absorb(&analysis_with(Intent::Search, vec![Category::Career]), "m2");
        assert_eq!(
            context.contextual_reference(),
            "Earlier we talked about legal and career services."
        );
    }
}
