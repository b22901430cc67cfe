//! Prompt text for the digest and synthesis calls.

use crate::retrieval::AnalysisRecord;

pub const SYSTEM_PROMPT: &str = "You are an expert in customer feedback analysis.";

const ROLE: &str =
    "You are an expert in customer feedback analysis specializing in IT services and solutions.";

/// Labeled plain-text rendering of one chunk of reviews, blank-line separated.
pub fn render_reviews(records: &[AnalysisRecord]) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "Industry: {}\n\
                 Background summary: {}\n\
                 Challenge/Pain summary: {}\n\
                 Solution summary: {}\n\
                 Feedback summary: {}",
                record.industry,
                record.background,
                record.challenge,
                record.solution,
                record.feedback
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prompt asking for a short per-review digest of one chunk.
pub fn digest_prompt(records: &[AnalysisRecord]) -> String {
    format!(
        "{ROLE}\n\
         Here are multiple customer reviews:\n\n\
         {reviews}\n\n\
         Summarize each review separately using the following format (it must be short, only the most important info):\n\
         Industry:\n\
         Background summary:\n\
         Challenge/Pain summary:\n\
         Solution summary:\n\
         Feedback summary:\n\n\
         Keep the summaries concise and extract only the most valuable insights.",
        reviews = render_reviews(records)
    )
}

/// Prompt combining every chunk digest with the user's query into the final analysis.
pub fn synthesis_prompt(query: &str, digests: &[String]) -> String {
    format!(
        "{ROLE}\n\
         The user has the following query: \"{query}\"\n\n\
         Use only the structured review summaries provided below to generate the final analysis:\n\n\
         {insights}\n\n\
         Provide a comprehensive and structured summary, ensuring insights remain objective and data-driven.",
        insights = digests.join("\n\n")
    )
}
