//! Filter criteria accepted by the profile search and their compiled matchers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::types::{CompanyProfile, ContentLabel, Review};

const LINKEDIN_PROFILE_MARKER: &str = "linkedin.com/in/";

/// Optional constraints over profiles and their reviews. Every list is an OR of
/// case-insensitive substrings; distinct fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileCriteria {
    /// Matched against the profile's `focus` tags.
    #[serde(alias = "competitors_focus_names")]
    pub focus_names: Vec<String>,
    /// Inclusive lower bound on `summary.noOfReviews`.
    pub min_reviews: Option<u32>,
    /// Inclusive upper bound on `summary.noOfReviews`.
    pub max_reviews: Option<u32>,
    /// Exact profile identifiers.
    pub ids: Vec<String>,
    pub industry_names: Vec<String>,
    pub reviewer_titles: Vec<String>,
    pub reviewer_names: Vec<String>,
    /// Matched against `project.allCategories`.
    pub project_focus_names: Vec<String>,
    #[serde(alias = "include_only_profiles_with_linkedin_url")]
    pub include_only_with_linkedin: bool,
    #[serde(alias = "include_only_profiles_without_linkedin_url")]
    pub include_only_without_linkedin: bool,
    #[serde(alias = "background_client_keywords")]
    pub background_keywords: Vec<String>,
    #[serde(alias = "challenge_client_keywords")]
    pub challenge_keywords: Vec<String>,
    #[serde(alias = "solution_client_keywords")]
    pub solution_keywords: Vec<String>,
    #[serde(alias = "feedback_client_keywords")]
    pub feedback_keywords: Vec<String>,
}

impl ProfileCriteria {
    /// True when no constraint at all was supplied.
    pub fn is_unrestricted(&self) -> bool {
        self.focus_names.is_empty()
            && self.min_reviews.is_none()
            && self.max_reviews.is_none()
            && self.ids.is_empty()
            && self.industry_names.is_empty()
            && self.reviewer_titles.is_empty()
            && self.reviewer_names.is_empty()
            && self.project_focus_names.is_empty()
            && !self.include_only_with_linkedin
            && !self.include_only_without_linkedin
            && !self.has_keywords()
    }

    /// Keywords targeting content blocks with `label`.
    pub fn keywords(&self, label: ContentLabel) -> &[String] {
        match label {
            ContentLabel::Background => &self.background_keywords,
            ContentLabel::Challenge => &self.challenge_keywords,
            ContentLabel::Solution => &self.solution_keywords,
            ContentLabel::Feedback => &self.feedback_keywords,
        }
    }

    /// True when any of the four keyword categories is non-empty.
    pub fn has_keywords(&self) -> bool {
        ContentLabel::ALL
            .iter()
            .any(|label| !self.keywords(*label).is_empty())
    }

    /// Lower-case every term once so matching can run per review without reallocating.
    pub fn compile(&self) -> CompiledCriteria {
        CompiledCriteria {
            focus: TermSet::new(&self.focus_names),
            min_reviews: self.min_reviews,
            max_reviews: self.max_reviews,
            ids: self.ids.iter().cloned().collect(),
            industries: TermSet::new(&self.industry_names),
            titles: TermSet::new(&self.reviewer_titles),
            names: TermSet::new(&self.reviewer_names),
            project_focus: TermSet::new(&self.project_focus_names),
            with_linkedin: self.include_only_with_linkedin,
            without_linkedin: self.include_only_without_linkedin,
            keywords: ContentLabel::ALL
                .iter()
                .filter(|label| !self.keywords(**label).is_empty())
                .map(|label| (*label, TermSet::new(self.keywords(*label))))
                .collect(),
        }
    }
}

/// OR-set of lower-cased substrings.
#[derive(Debug, Clone, Default)]
pub struct TermSet {
    terms: Vec<String>,
}

impl TermSet {
    /// Build a set from raw user terms.
    pub fn new(terms: &[String]) -> Self {
        Self {
            terms: terms.iter().map(|term| term.to_lowercase()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Lower-cased terms in input order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// True when any term occurs in `haystack`, ignoring case.
    pub fn matches(&self, haystack: &str) -> bool {
        let haystack = haystack.to_lowercase();
        self.terms.iter().any(|term| haystack.contains(term.as_str()))
    }

    /// Empty sets impose no constraint; a missing value behaves like an empty string.
    pub fn admits(&self, value: Option<&str>) -> bool {
        self.is_empty() || self.matches(value.unwrap_or_default())
    }

    /// Like [`TermSet::admits`] for multi-valued fields: any value may match.
    pub fn admits_any<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> bool {
        self.is_empty() || values.into_iter().any(|value| self.matches(value))
    }
}

/// Criteria with terms normalized, ready to evaluate against profiles.
#[derive(Debug, Clone, Default)]
pub struct CompiledCriteria {
    focus: TermSet,
    min_reviews: Option<u32>,
    max_reviews: Option<u32>,
    ids: HashSet<String>,
    industries: TermSet,
    titles: TermSet,
    names: TermSet,
    project_focus: TermSet,
    with_linkedin: bool,
    without_linkedin: bool,
    keywords: Vec<(ContentLabel, TermSet)>,
}

impl CompiledCriteria {
    /// Profile-level constraints: focus tags, review-count bounds, and identifiers.
    pub fn matches_profile_fields(&self, profile: &CompanyProfile) -> bool {
        if !self.focus.admits_any(profile.focus.iter().map(String::as_str)) {
            return false;
        }

        if self.min_reviews.is_some() || self.max_reviews.is_some() {
            let Some(count) = profile.summary.as_ref().and_then(|s| s.review_count) else {
                return false;
            };
            if self.min_reviews.is_some_and(|min| count < min)
                || self.max_reviews.is_some_and(|max| count > max)
            {
                return false;
            }
        }

        self.ids.is_empty() || self.ids.contains(&profile.id)
    }

    /// Coarse existence test: the profile fields match and, when review constraints exist, at
    /// least one review passes [`CompiledCriteria::coarse_review_match`].
    pub fn admits_candidate(&self, profile: &CompanyProfile) -> bool {
        if !self.matches_profile_fields(profile) {
            return false;
        }
        !self.has_review_constraints()
            || profile
                .reviews
                .iter()
                .any(|review| self.coarse_review_match(review))
    }

    fn has_review_constraints(&self) -> bool {
        !self.industries.is_empty()
            || !self.titles.is_empty()
            || !self.names.is_empty()
            || !self.project_focus.is_empty()
            || self.with_linkedin
            || self.without_linkedin
            || !self.keywords.is_empty()
    }

    /// Index-friendly per-review test. LinkedIn presence and absence only check whether a
    /// non-empty value exists, so this never rejects a review `review_matches` would keep.
    pub fn coarse_review_match(&self, review: &Review) -> bool {
        let linkedin = review
            .reviewer
            .as_ref()
            .and_then(|reviewer| reviewer.linkedin_url.as_deref());
        if self.with_linkedin && linkedin.is_none_or(str::is_empty) {
            return false;
        }
        if self.without_linkedin && linkedin.is_some_and(|url| !url.is_empty()) {
            return false;
        }
        self.reviewer_fields_match(review) && self.keywords_match(review)
    }

    /// Full conjunction of every per-review constraint.
    ///
    /// Requesting both LinkedIn presence and absence is contradictory and rejects every review.
    pub fn review_matches(&self, review: &Review) -> bool {
        let linkedin = review
            .reviewer
            .as_ref()
            .and_then(|reviewer| reviewer.linkedin_url.as_deref());
        if self.with_linkedin && !linkedin.is_some_and(|url| url.contains(LINKEDIN_PROFILE_MARKER))
        {
            return false;
        }
        if self.without_linkedin && linkedin.is_some_and(|url| !url.is_empty()) {
            return false;
        }
        self.reviewer_fields_match(review) && self.keywords_match(review)
    }

    fn reviewer_fields_match(&self, review: &Review) -> bool {
        let reviewer = review.reviewer.as_ref();
        let categories = review
            .project
            .iter()
            .flat_map(|project| project.all_categories.iter().map(String::as_str));

        self.names
            .admits(reviewer.and_then(|r| r.name.as_deref()))
            && self
                .industries
                .admits(reviewer.and_then(|r| r.industry.as_deref()))
            && self.titles.admits(reviewer.and_then(|r| r.title.as_deref()))
            && self.project_focus.admits_any(categories)
    }

    /// Keyword categories combine with OR: one block matching its own label's terms suffices.
    fn keywords_match(&self, review: &Review) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        review.content.iter().any(|block| {
            self.keywords
                .iter()
                .any(|(label, terms)| block.label == *label && terms.matches(&block.text))
        })
    }

    /// Number of distinct focus or keyword terms found in the profile's focus tags or in the
    /// content of its reviews.
    pub fn relevance(&self, profile: &CompanyProfile) -> usize {
        let mut corpus: Vec<String> = profile.focus.iter().map(|tag| tag.to_lowercase()).collect();
        corpus.extend(
            profile
                .reviews
                .iter()
                .flat_map(|review| review.content.iter())
                .map(|block| block.text.to_lowercase()),
        );

        let terms: HashSet<&str> = self
            .focus
            .terms()
            .chain(self.keywords.iter().flat_map(|(_, terms)| terms.terms()))
            .filter(|term| !term.is_empty())
            .collect();

        terms
            .into_iter()
            .filter(|term| corpus.iter().any(|text| text.contains(term)))
            .count()
    }
}
