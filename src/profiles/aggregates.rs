//! Review counts grouped by reviewer and project attributes.

use serde::{Deserialize, Serialize};

use super::types::CompanyProfile;

/// One bucket of a grouped count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: usize,
}

/// Summary statistics over a filtered profile set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAggregates {
    pub company_count: usize,
    pub reviews_count: usize,
    pub by_industries: Vec<KeyValue>,
    /// Keyed by country: the last comma-separated part of the reviewer location.
    pub by_locations: Vec<KeyValue>,
    pub by_project_sizes: Vec<KeyValue>,
    pub by_project_categories: Vec<KeyValue>,
}

/// Count reviews across `profiles`. Missing or empty attributes are not counted.
pub fn aggregate(profiles: &[CompanyProfile]) -> ProfileAggregates {
    let mut industries = Tally::default();
    let mut locations = Tally::default();
    let mut sizes = Tally::default();
    let mut categories = Tally::default();
    let mut reviews_count = 0;

    for review in profiles.iter().flat_map(|profile| profile.reviews.iter()) {
        reviews_count += 1;
        let reviewer = review.reviewer.as_ref();
        let project = review.project.as_ref();

        industries.add(reviewer.and_then(|r| r.industry.as_deref()));
        locations.add(
            reviewer
                .and_then(|r| r.location.as_deref())
                .filter(|location| !location.is_empty())
                .and_then(|location| location.rsplit(',').next())
                .map(str::trim),
        );
        sizes.add(project.and_then(|p| p.size.as_deref()));
        categories.add(project.and_then(|p| p.category.as_deref()));
    }

    ProfileAggregates {
        company_count: profiles.len(),
        reviews_count,
        by_industries: industries.into_sorted(),
        by_locations: locations.into_sorted(),
        by_project_sizes: sizes.into_sorted(),
        by_project_categories: categories.into_sorted(),
    }
}

/// Insertion-ordered counter so equal counts keep first-seen order after a stable sort.
#[derive(Default)]
struct Tally {
    buckets: Vec<KeyValue>,
}

impl Tally {
    fn add(&mut self, key: Option<&str>) {
        let Some(key) = key.filter(|key| !key.is_empty()) else {
            return;
        };
        match self.buckets.iter_mut().find(|bucket| bucket.key == key) {
            Some(bucket) => bucket.value += 1,
            None => self.buckets.push(KeyValue {
                key: key.to_string(),
                value: 1,
            }),
        }
    }

    fn into_sorted(mut self) -> Vec<KeyValue> {
        self.buckets.sort_by(|a, b| b.value.cmp(&a.value));
        self.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::types::{Project, Review, Reviewer};

    fn review(industry: &str, location: &str, size: Option<&str>) -> Review {
        Review {
            reviewer: Some(Reviewer {
                industry: Some(industry.into()),
                location: Some(location.into()),
                ..Default::default()
            }),
            project: Some(Project {
                size: size.map(Into::into),
                category: Some("Custom Software Development".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn groups_reviews_and_sorts_by_count() {
        let profiles = vec![
            CompanyProfile {
                reviews: vec![
                    review("Retail", "Austin, Texas", Some("$10,000 to $49,999")),
                    review("IT", "Oslo, Norway", None),
                ],
                ..Default::default()
            },
            CompanyProfile {
                reviews: vec![review("IT", "Bergen,Norway", Some("$10,000 to $49,999"))],
                ..Default::default()
            },
            CompanyProfile::default(),
        ];

        let aggregates = aggregate(&profiles);
        assert_eq!(aggregates.company_count, 3);
        assert_eq!(aggregates.reviews_count, 3);
        assert_eq!(
            aggregates.by_industries,
            vec![
                KeyValue { key: "IT".into(), value: 2 },
                KeyValue { key: "Retail".into(), value: 1 },
            ]
        );
        assert_eq!(aggregates.by_locations[0], KeyValue { key: "Norway".into(), value: 2 });
        assert_eq!(aggregates.by_locations[1].key, "Texas");
        assert_eq!(aggregates.by_project_sizes.len(), 1);
        assert_eq!(aggregates.by_project_sizes[0].value, 2);
        assert_eq!(aggregates.by_project_categories[0].value, 3);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let profiles = vec![CompanyProfile {
            reviews: vec![
                review("Health", "Lima, Peru", None),
                review("Energy", "Quito, Ecuador", None),
            ],
            ..Default::default()
        }];
        let keys: Vec<_> = aggregate(&profiles)
            .by_industries
            .into_iter()
            .map(|bucket| bucket.key)
            .collect();
        assert_eq!(keys, vec!["Health", "Energy"]);
    }
}
