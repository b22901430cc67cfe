//! Readable question/answer rendering of review sections.

pub mod qa;
pub mod questions;

pub use qa::{QaPair, QuestionSet, extract_qa, strip_leading_question};
