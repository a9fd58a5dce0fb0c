use crate::extract::Category;

/// Everything extracted from one fetched page
///
/// Built by a single worker, handed to the document sink, then dropped.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub url: String,

    /// Raw fetched bytes, bounded by the raw buffer capacity
    pub raw_content: Vec<u8>,

    /// Markup-free text, bounded by the text buffer capacity
    pub text: String,

    pub category: Category,
}
