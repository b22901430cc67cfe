//! OData filter expressions for hybrid queries.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use super::types::{SearchError, SearchFilterArgs};

/// Compose the attribute filter from optional search arguments.
///
/// Each non-empty input contributes one clause and clauses are joined with `and`; list inputs
/// become a parenthesized `or` of equality tests. Returns `None` when nothing constrains the query.
pub fn build_search_filter(args: &SearchFilterArgs) -> Result<Option<String>, SearchError> {
    let mut clauses = Vec::new();

    if let Some(date_from) = args.date_from.as_deref().and_then(non_empty) {
        clauses.push(format!("date_published ge {}", normalize_timestamp(date_from)?));
    }

    for (field, values) in [
        ("reviewer_industry", &args.industries),
        ("reviewer_size_label", &args.company_sizes),
        ("project_budget_label", &args.project_budgets),
    ] {
        if let Some(clause) = any_of(field, values) {
            clauses.push(clause);
        }
    }

    Ok((!clauses.is_empty()).then(|| clauses.join(" and ")))
}

fn any_of(field: &str, values: &[String]) -> Option<String> {
    let tests: Vec<String> = values
        .iter()
        .filter_map(|value| non_empty(value))
        .map(|value| format!("{field} eq '{}'", escape_literal(value)))
        .collect();
    (!tests.is_empty()).then(|| format!("({})", tests.join(" or ")))
}

/// OData string literals double embedded single quotes.
fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Accept RFC 3339 timestamps or bare dates (midnight UTC) and emit an OData
/// `Edm.DateTimeOffset` literal.
fn normalize_timestamp(value: &str) -> Result<String, SearchError> {
    let parsed = OffsetDateTime::parse(value, &Rfc3339).or_else(|_| {
        Date::parse(value, format_description!("[year]-[month]-[day]"))
            .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
    });

    parsed
        .map_err(|_| SearchError::InvalidFilter(format!("unrecognized date '{value}'")))?
        .format(&Rfc3339)
        .map_err(|err| SearchError::InvalidFilter(err.to_string()))
}

fn non_empty(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
