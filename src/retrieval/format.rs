//! Display formatting for contact listings.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const ACRONYMS: [&str; 11] = [
    "ceo", "cto", "cfo", "coo", "cmo", "cio", "chro", "cpo", "cso", "cdo", "vp",
];

const LINKEDIN_PROFILE_MARKER: &str = "linkedin.com/in";

/// Title-case a job title, upper-casing C-level acronyms. Parts joined by `&` are formatted
/// independently and rejoined with ` & `.
pub fn format_position(role: &str) -> String {
    role.trim()
        .split('&')
        .map(|part| {
            part.split_whitespace()
                .map(format_word)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(" & ")
}

fn format_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if ACRONYMS.contains(&lower.as_str()) {
        return word.to_uppercase();
    }
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Keep only personal profile URLs; company pages and junk become empty.
pub fn linkedin_profile_url(url: Option<&str>) -> String {
    url.filter(|url| url.contains(LINKEDIN_PROFILE_MARKER))
        .unwrap_or_default()
        .to_string()
}

/// `"2024-03-15T00:00:00Z"` becomes `"March, 2024"`. Returns `None` for unreadable input.
pub fn month_year(timestamp: &str) -> Option<String> {
    let parsed = PrimitiveDateTime::parse(
        timestamp,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .or_else(|_| OffsetDateTime::parse(timestamp, &Rfc3339))
    .ok()?;
    Some(format!("{}, {}", parsed.month(), parsed.year()))
}

pub fn lowercase_tags(tags: &[String]) -> Vec<String> {
    tags.iter().map(|tag| tag.to_lowercase()).collect()
}
