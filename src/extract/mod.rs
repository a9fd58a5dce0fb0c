//! Text extraction for fetched pages
//!
//! - `strip`: linear markup stripper with script/style suppression
//! - `classify`: keyword-priority categorizer over the stripped text

mod classifier;
mod document;
mod stripper;

pub use classifier::{classify, Category};
pub use document::ExtractedDocument;
pub use stripper::{strip, Stripped};
