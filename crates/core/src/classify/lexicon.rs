//! The bounded vocabulary behind the rule-based classifier.
//!
//! Keyword weights: primary 10, secondary 5, contextual 3. Category entries
//! are listed in the declared tie-break order (`Category::ALL`).

use crate::domain::category::Category;

pub const PRIMARY_WEIGHT: u32 = 10;
pub const SECONDARY_WEIGHT: u32 = 5;
pub const CONTEXTUAL_WEIGHT: u32 = 3;

pub struct CategoryLexicon {
    pub category: Category,
    pub primary: &'static [&'static str],
    pub secondary: &'static [&'static str],
    pub contextual: &'static [&'static str],
}

pub const CATEGORY_LEXICONS: &[CategoryLexicon] = &[
    CategoryLexicon {
        category: Category::Legal,
        primary: &["lawyer", "attorney", "legal"],
        secondary: &["contract", "lawsuit", "court", "immigration", "visa"],
        contextual: &["agreement", "dispute", "compliance", "notary", "sued"],
    },
    CategoryLexicon {
        category: Category::Finance,
        primary: &["accountant", "tax", "financial advisor"],
        secondary: &["taxes", "bookkeeping", "investment", "audit", "payroll"],
        contextual: &["retirement", "loan", "debt", "savings", "invoice"],
    },
    CategoryLexicon {
        category: Category::Business,
        primary: &["business consultant", "consultant", "startup"],
        secondary: &["business plan", "strategy", "operations", "incorporation"],
        contextual: &["growth", "clients", "revenue", "market", "pitch"],
    },
    CategoryLexicon {
        category: Category::Career,
        primary: &["career coach", "resume", "interview"],
        secondary: &["job search", "cover letter", "promotion", "cv"],
        contextual: &["career", "hiring", "linkedin", "salary", "job"],
    },
    CategoryLexicon {
        category: Category::Technology,
        primary: &["developer", "software", "website"],
        secondary: &["app", "programming", "it support", "database"],
        contextual: &["bug", "integration", "automation", "cloud", "api"],
    },
    CategoryLexicon {
        category: Category::Health,
        primary: &["therapist", "doctor", "nutritionist"],
        secondary: &["therapy", "counseling", "fitness", "diet"],
        contextual: &["stress", "wellness", "sleep", "anxiety", "burnout"],
    },
    CategoryLexicon {
        category: Category::Marketing,
        primary: &["marketing", "seo", "advertising"],
        secondary: &["social media", "branding", "campaign", "content"],
        contextual: &["audience", "leads", "instagram", "ads", "followers"],
    },
    CategoryLexicon {
        category: Category::Education,
        primary: &["tutor", "tutoring", "teacher"],
        secondary: &["math", "exam", "course", "lessons"],
        contextual: &["homework", "study", "language", "student", "grades"],
    },
];

/// Urgency tiers, ranked. The first tier that matches wins.
pub const HIGH_URGENCY: &[&str] =
    &["urgent", "asap", "immediately", "emergency", "right away", "right now"];
pub const MEDIUM_URGENCY: &[&str] =
    &["soon", "this week", "quickly", "in a few days", "shortly"];

/// Booking vocabulary bumps default urgency from low to medium.
pub const BOOKING_WORDS: &[&str] = &["book", "booking", "appointment", "schedule"];

pub const POSITIVE_WORDS: &[&str] = &[
    "great", "good", "excellent", "thanks", "thank", "awesome", "helpful", "perfect", "love",
    "appreciate",
];
pub const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "useless", "disappointed", "frustrated", "angry",
    "hate", "worst",
];

/// Generic seniority vocabulary, consulted only when no explicit
/// "N years" figure is present.
pub const SENIORITY_WORDS: &[&str] = &["expert", "senior", "experienced", "seasoned", "veteran"];

/// Minimum years implied by a bare seniority word.
pub const SENIORITY_MIN_YEARS: u32 = 5;

/// Filler removed from captured specific-need phrases.
pub const NEED_STOPWORDS: &[&str] = &[
    "a", "an", "the", "some", "any", "my", "our", "your", "this", "that", "please", "really",
    "just", "good", "very", "something", "anything", "everything", "things", "stuff", "it",
    "help", "with", "to",
];

/// Words that can never start a captured location.
pub const LOCATION_STOPWORDS: &[&str] = &[
    "person", "general", "front", "order", "case", "fact", "the", "a", "an", "my", "touch",
    "time", "advance",
];

pub const CONSULTATION_ONLINE: &[&str] = &["online", "remote", "virtual", "video", "video call"];
pub const CONSULTATION_OFFLINE: &[&str] =
    &["in person", "in-person", "offline", "office", "face to face", "on site"];

/// Coarse timeframe phrases lifted into the timeframe entity verbatim.
pub const TIMEFRAME_PHRASES: &[&str] = &[
    "today",
    "tomorrow",
    "this week",
    "next week",
    "this month",
    "next month",
    "as soon as possible",
];

#[cfg(test)]
mod tests {
    use crate::domain::category::Category;

    use super::CATEGORY_LEXICONS;

    #[test]
    fn lexicon_covers_every_category_in_declared_order() {
        let listed: Vec<Category> =
            CATEGORY_LEXICONS.iter().map(|lexicon| lexicon.category).collect();
        assert_eq!(listed, Category::ALL.to_vec());
    }

    #[test]
    fn keyword_tiers_are_disjoint_per_category() {
        for lexicon in CATEGORY_LEXICONS {
            for keyword in lexicon.primary {
                assert!(!lexicon.secondary.contains(keyword), "{keyword} in two tiers");
                assert!(!lexicon.contextual.contains(keyword), "{keyword} in two tiers");
            }
            for keyword in lexicon.secondary {
                assert!(!lexicon.contextual.contains(keyword), "{keyword} in two tiers");
            }
        }
    }
}
