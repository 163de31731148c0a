use serde::{Deserialize, Serialize};

/// Service domain tags understood by the classifier and the catalog.
///
/// Variant order is the declared category order: equal keyword scores and
/// equal provider relevance both break ties in this order, so everything
/// downstream of the classifier stays deterministic.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Legal,
    Finance,
    Business,
    Career,
    Technology,
    Health,
    Marketing,
    Education,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Legal,
        Category::Finance,
        Category::Business,
        Category::Career,
        Category::Technology,
        Category::Health,
        Category::Marketing,
        Category::Education,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Legal => "legal",
            Category::Finance => "finance",
            Category::Business => "business",
            Category::Career => "career",
            Category::Technology => "technology",
            Category::Health => "health",
            Category::Marketing => "marketing",
            Category::Education => "education",
        }
    }

    /// Display name used for full-text fallback queries against the catalog.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Legal => "Legal Advisory",
            Category::Finance => "Financial Advisory",
            Category::Business => "Business Consulting",
            Category::Career => "Career Coaching",
            Category::Technology => "Technology Consulting",
            Category::Health => "Health & Wellness",
            Category::Marketing => "Digital Marketing",
            Category::Education => "Education & Tutoring",
        }
    }

    /// Synonym set matched case-insensitively against catalog category text.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Category::Legal => {
                &["legal", "legal advisory", "law", "attorney", "lawyer", "advocate", "counsel"]
            }
            Category::Finance => &[
                "finance",
                "financial advisory",
                "accounting",
                "accountant",
                "tax",
                "bookkeeping",
            ],
            Category::Business => {
                &["business", "business consulting", "consulting", "strategy", "management"]
            }
            Category::Career => {
                &["career", "career coaching", "career counseling", "coaching", "recruiting"]
            }
            Category::Technology => {
                &["technology", "tech", "software", "it services", "development", "engineering"]
            }
            Category::Health => {
                &["health", "healthcare", "wellness", "therapy", "nutrition", "medical"]
            }
            Category::Marketing => {
                &["marketing", "digital marketing", "advertising", "seo", "branding"]
            }
            Category::Education => {
                &["education", "tutoring", "teaching", "training", "education services"]
            }
        }
    }

    pub fn parse(value: &str) -> Option<Category> {
        let normalized = value.trim().to_ascii_lowercase();
        Category::ALL.into_iter().find(|category| {
            category.label() == normalized
                || category.display_name().eq_ignore_ascii_case(&normalized)
                || category.synonyms().contains(&normalized.as_str())
        })
    }

    /// True when the catalog category text belongs to this category's
    /// synonym set.
    pub fn matches_text(&self, text: &str) -> bool {
        let normalized = text.trim().to_ascii_lowercase();
        self.synonyms().iter().any(|synonym| normalized == *synonym)
            || normalized == self.display_name().to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::Category;

    #[test]
    fn parse_accepts_labels_and_synonyms() {
        assert_eq!(Category::parse("legal"), Some(Category::Legal));
        assert_eq!(Category::parse("Attorney"), Some(Category::Legal));
        assert_eq!(Category::parse("Financial Advisory"), Some(Category::Finance));
        assert_eq!(Category::parse("quantum plumbing"), None);
    }

    #[test]
    fn declared_order_is_the_tie_break_order() {
        let mut shuffled = vec![Category::Health, Category::Legal, Category::Career];
        shuffled.sort();
        assert_eq!(shuffled, vec![Category::Legal, Category::Career, Category::Health]);
    }

    #[test]
    fn synonym_matching_is_case_insensitive() {
        assert!(Category::Legal.matches_text("LAWYER"));
        assert!(Category::Legal.matches_text("Legal Advisory"));
        assert!(!Category::Legal.matches_text("accountant"));
    }
}
