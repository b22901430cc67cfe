//! Two-stage profile filter.
//!
//! Stage one asks the store for candidates: profiles with at least one review that could match.
//! Stage two re-checks every review of every candidate against the full conjunction of review
//! criteria, keeps only passing reviews, and drops profiles left without any. The store query
//! alone is not enough because it may admit a profile on the strength of two different reviews.

use super::criteria::{CompiledCriteria, ProfileCriteria};
use super::store::{ProfileStore, StoreError};
use super::types::CompanyProfile;

/// Upper bound on profiles returned by the ranked variant.
pub const RANKED_PROFILE_LIMIT: usize = 100;

/// Profiles (with reviews narrowed) matching every supplied criterion.
///
/// With no criteria at all the whole collection is returned untouched.
pub async fn filter_profiles(
    store: &dyn ProfileStore,
    criteria: &ProfileCriteria,
) -> Result<Vec<CompanyProfile>, StoreError> {
    if criteria.is_unrestricted() {
        tracing::debug!("No profile criteria supplied; returning every profile");
        return store.all_profiles().await;
    }

    let candidates = store.find_candidates(criteria).await?;
    let candidate_count = candidates.len();
    let profiles = refine_candidates(candidates, &criteria.compile());
    tracing::debug!(
        candidates = candidate_count,
        retained = profiles.len(),
        "Profiles filtered"
    );
    Ok(profiles)
}

/// Stage two of [`filter_profiles`], usable on any candidate set.
pub fn refine_candidates(
    candidates: Vec<CompanyProfile>,
    criteria: &CompiledCriteria,
) -> Vec<CompanyProfile> {
    candidates
        .into_iter()
        .filter_map(|mut profile| {
            profile.reviews.retain(|review| criteria.review_matches(review));
            (!profile.reviews.is_empty()).then_some(profile)
        })
        .collect()
}

/// Same filter as [`filter_profiles`], ordered by term relevance then review count (both
/// descending) and capped at `limit`. Ties keep store order.
pub async fn filter_profiles_ranked(
    store: &dyn ProfileStore,
    criteria: &ProfileCriteria,
    limit: usize,
) -> Result<Vec<CompanyProfile>, StoreError> {
    let compiled = criteria.compile();
    let mut scored: Vec<(usize, CompanyProfile)> = filter_profiles(store, criteria)
        .await?
        .into_iter()
        .map(|profile| (compiled.relevance(&profile), profile))
        .collect();

    scored.sort_by(|(left_score, left), (right_score, right)| {
        right_score
            .cmp(left_score)
            .then_with(|| review_count(right).cmp(&review_count(left)))
    });
    scored.truncate(limit);

    Ok(scored.into_iter().map(|(_, profile)| profile).collect())
}

fn review_count(profile: &CompanyProfile) -> u32 {
    profile
        .summary
        .as_ref()
        .and_then(|summary| summary.review_count)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::store::MemoryProfileStore;
    use crate::profiles::types::{Content, ContentLabel, Review, Reviewer, Summary};

    fn review(name: &str, industry: &str, content: Vec<(ContentLabel, &str)>) -> Review {
        Review {
            name: format!("{name} project"),
            reviewer: Some(Reviewer {
                name: Some(name.into()),
                industry: Some(industry.into()),
                ..Default::default()
            }),
            content: content
                .into_iter()
                .map(|(label, text)| Content {
                    label,
                    text: text.into(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn profile(id: &str, count: u32, focus: &[&str], reviews: Vec<Review>) -> CompanyProfile {
        CompanyProfile {
            id: id.into(),
            url: Some(format!("https://reviews.example/{id}")),
            focus: focus.iter().map(|f| f.to_string()).collect(),
            summary: Some(Summary {
                name: id.into(),
                review_count: Some(count),
                ..Default::default()
            }),
            reviews,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn unrestricted_returns_every_profile() {
        let store = MemoryProfileStore::from_profiles(vec![
            profile("a", 1, &[], vec![]),
            profile("b", 2, &[], vec![review("Ann", "IT", vec![])]),
        ]);
        let profiles = filter_profiles(&store, &ProfileCriteria::default())
            .await
            .expect("filter");
        assert_eq!(profiles.len(), 2);
    }

    #[tokio::test]
    async fn industry_filter_keeps_only_matching_reviews() {
        let store = MemoryProfileStore::from_profiles(vec![profile(
            "acme",
            2,
            &[],
            vec![
                review("Ann", "IT", vec![(ContentLabel::Solution, "built an app")]),
                review("Bob", "Finance", vec![]),
            ],
        )]);
        let criteria = ProfileCriteria {
            industry_names: vec!["IT".into()],
            ..Default::default()
        };

        let profiles = filter_profiles(&store, &criteria).await.expect("filter");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].reviews.len(), 1);
        assert_eq!(
            profiles[0].reviews[0].reviewer.as_ref().and_then(|r| r.industry.as_deref()),
            Some("IT")
        );
    }

    #[test]
    fn refine_rejects_profiles_whose_criteria_split_across_reviews() {
        // Name matches review one, keyword matches review two: no single review satisfies both.
        let candidate = profile(
            "split",
            2,
            &[],
            vec![
                review("Ann", "IT", vec![(ContentLabel::Background, "startup")]),
                review("Bob", "IT", vec![(ContentLabel::Feedback, "delivered on time")]),
            ],
        );
        let criteria = ProfileCriteria {
            reviewer_names: vec!["ann".into()],
            feedback_keywords: vec!["on time".into()],
            ..Default::default()
        };

        assert!(refine_candidates(vec![candidate.clone()], &criteria.compile()).is_empty());

        let relaxed = ProfileCriteria {
            reviewer_names: vec!["bob".into()],
            ..criteria
        };
        let refined = refine_candidates(vec![candidate], &relaxed.compile());
        assert_eq!(refined.len(), 1);
        assert_eq!(refined[0].reviews[0].name, "Bob project");
    }

    #[tokio::test]
    async fn keyword_categories_are_ored_within_one_review() {
        let store = MemoryProfileStore::from_profiles(vec![profile(
            "acme",
            3,
            &[],
            vec![
                review("Ann", "IT", vec![(ContentLabel::Challenge, "legacy billing")]),
                review("Bob", "IT", vec![(ContentLabel::Solution, "Rust rewrite")]),
                review("Cid", "IT", vec![(ContentLabel::Background, "rust shop")]),
            ],
        )]);
        let criteria = ProfileCriteria {
            challenge_keywords: vec!["billing".into()],
            solution_keywords: vec!["rust".into()],
            ..Default::default()
        };

        let profiles = filter_profiles(&store, &criteria).await.expect("filter");
        let names: Vec<_> = profiles[0].reviews.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ann project", "Bob project"]);
    }

    #[tokio::test]
    async fn profile_level_criteria_drop_profiles_before_review_checks() {
        let store = MemoryProfileStore::from_profiles(vec![
            profile("a", 4, &["Mobile App Development"], vec![review("Ann", "IT", vec![])]),
            profile("b", 40, &["Mobile App Development"], vec![review("Bob", "IT", vec![])]),
            profile("c", 4, &["SEO"], vec![review("Cid", "IT", vec![])]),
        ]);
        let criteria = ProfileCriteria {
            focus_names: vec!["mobile".into()],
            max_reviews: Some(10),
            ..Default::default()
        };
        let profiles = filter_profiles(&store, &criteria).await.expect("filter");
        let ids: Vec<_> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);

        let by_id = ProfileCriteria {
            ids: vec!["c".into()],
            ..Default::default()
        };
        let profiles = filter_profiles(&store, &by_id).await.expect("filter");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].id, "c");
    }

    #[tokio::test]
    async fn contradictory_linkedin_flags_match_nothing() {
        let mut with_url = review("Ann", "IT", vec![]);
        if let Some(reviewer) = with_url.reviewer.as_mut() {
            reviewer.linkedin_url = Some("https://www.linkedin.com/in/ann".into());
        }
        let store = MemoryProfileStore::from_profiles(vec![profile(
            "acme",
            2,
            &[],
            vec![with_url, review("Bob", "IT", vec![])],
        )]);
        let criteria = ProfileCriteria {
            include_only_with_linkedin: true,
            include_only_without_linkedin: true,
            ..Default::default()
        };
        assert!(filter_profiles(&store, &criteria)
            .await
            .expect("filter")
            .is_empty());
    }

    #[tokio::test]
    async fn without_linkedin_keeps_reviews_with_empty_url() {
        let mut blank_url = review("Ann", "IT", vec![]);
        if let Some(reviewer) = blank_url.reviewer.as_mut() {
            reviewer.linkedin_url = Some(String::new());
        }
        let mut with_url = review("Bob", "IT", vec![]);
        if let Some(reviewer) = with_url.reviewer.as_mut() {
            reviewer.linkedin_url = Some("https://www.linkedin.com/in/bob".into());
        }
        let store = MemoryProfileStore::from_profiles(vec![
            profile("blank", 1, &[], vec![blank_url]),
            profile("linked", 1, &[], vec![with_url]),
        ]);
        let criteria = ProfileCriteria {
            include_only_without_linkedin: true,
            ..Default::default()
        };

        let profiles = filter_profiles(&store, &criteria).await.expect("filter");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].id, "blank");
        assert_eq!(profiles[0].reviews.len(), 1);
    }

    #[tokio::test]
    async fn ranked_variant_orders_by_relevance_then_review_count() {
        let store = MemoryProfileStore::from_profiles(vec![
            profile("few-terms", 50, &["Web Design"], vec![review("Ann", "IT", vec![])]),
            profile(
                "many-terms",
                5,
                &["Web Design", "Branding"],
                vec![review("Bob", "IT", vec![])],
            ),
            profile("tie-bigger", 80, &["Web Design"], vec![review("Cid", "IT", vec![])]),
        ]);
        let criteria = ProfileCriteria {
            focus_names: vec!["web".into(), "brand".into()],
            ..Default::default()
        };

        let ranked = filter_profiles_ranked(&store, &criteria, RANKED_PROFILE_LIMIT)
            .await
            .expect("ranked");
        let ids: Vec<_> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["many-terms", "tie-bigger", "few-terms"]);

        let capped = filter_profiles_ranked(&store, &criteria, 1)
            .await
            .expect("ranked");
        assert_eq!(capped.len(), 1);
    }
}
