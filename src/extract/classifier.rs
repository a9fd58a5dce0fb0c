//! Keyword classifier for extracted text

use std::fmt;

/// Content category assigned to a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Technology,
    News,
    Sports,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::News => "News",
            Self::Sports => "Sports",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword table, checked top to bottom; the first row with a matching
/// keyword wins.
const KEYWORD_TABLE: &[(&[&str], Category)] = &[
    (&["technology"], Category::Technology),
    (&["news"], Category::News),
    (&["sports", "sport"], Category::Sports),
];

/// Classifies text by case-insensitive keyword containment
///
/// Always returns a category; text matching no keyword is `Other`.
///
/// # Example
///
/// ```
/// use sumi_harvest::extract::{classify, Category};
///
/// assert_eq!(classify("Breaking Technology News today"), Category::Technology);
/// assert_eq!(classify("weather report"), Category::Other);
/// ```
pub fn classify(text: &str) -> Category {
    let lowered = text.to_lowercase();

    KEYWORD_TABLE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(*k)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}
