//! Typed entity graph for company profiles and their nested reviews.
//!
//! Field names follow the persisted document layout (camelCase). Every field the scraper may
//! omit is an `Option`, so filters never probe for key presence by hand.

use serde::{Deserialize, Deserializer, Serialize};

/// Aggregated review page for one vendor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Opaque identifier assigned on insert.
    #[serde(default)]
    pub id: String,
    /// Canonical profile URL; de-duplication key on insert.
    #[serde(default)]
    pub url: Option<String>,
    /// Free-text focus tags describing what the vendor does.
    #[serde(default, deserialize_with = "null_as_default")]
    pub focus: Vec<String>,
    #[serde(default)]
    pub summary: Option<Summary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services_provided: Vec<ServiceShare>,
    /// Reviews in page order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews: Vec<Review>,
}

/// Profile header block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Review count reported by the aggregator.
    #[serde(default, rename = "noOfReviews")]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub min_project_size: Option<String>,
    #[serde(default)]
    pub average_hourly_rate: Option<String>,
    #[serde(default)]
    pub employees: Option<String>,
}

/// Share of a vendor's work attributed to one service line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceShare {
    pub name: String,
    #[serde(default)]
    pub percent: f64,
}

/// One reviewer's account of one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date_published: Option<String>,
    #[serde(default)]
    pub reviewer: Option<Reviewer>,
    #[serde(default)]
    pub project: Option<Project>,
    #[serde(default, rename = "review")]
    pub scores: Option<ReviewScores>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<Content>,
}

impl Review {
    /// Text of every content block carrying `label`, in document order.
    pub fn texts_for(&self, label: ContentLabel) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .filter(move |block| block.label == label)
            .map(|block| block.text.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reviewer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Company-size label, e.g. `"11-50 Employees"`.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub review_type: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub all_categories: Vec<String>,
    /// Budget label, e.g. `"$10,000 to $49,999"`.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewScores {
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub quality: Option<f64>,
    #[serde(default)]
    pub schedule: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub willing_to_refer: Option<f64>,
    #[serde(default)]
    pub comments: Option<String>,
}

/// One labeled section of review text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub label: ContentLabel,
    pub text: String,
}

/// Fixed section taxonomy used by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentLabel {
    #[serde(rename = "BACKGROUND")]
    Background,
    #[serde(rename = "OPPORTUNITY / CHALLENGE")]
    Challenge,
    #[serde(rename = "SOLUTION")]
    Solution,
    #[serde(rename = "RESULTS & FEEDBACK")]
    Feedback,
}

impl ContentLabel {
    /// All labels in page order.
    pub const ALL: [ContentLabel; 4] = [
        ContentLabel::Background,
        ContentLabel::Challenge,
        ContentLabel::Solution,
        ContentLabel::Feedback,
    ];

    /// Label as it appears in stored documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentLabel::Background => "BACKGROUND",
            ContentLabel::Challenge => "OPPORTUNITY / CHALLENGE",
            ContentLabel::Solution => "SOLUTION",
            ContentLabel::Feedback => "RESULTS & FEEDBACK",
        }
    }
}

impl std::fmt::Display for ContentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scraped documents carry `null` where a list is missing; treat it as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_deserializes_persisted_layout() {
        let raw = json!({
            "id": "64f0c2",
            "url": "https://reviews.example/profile/acme",
            "focus": ["Custom Software Development", "Mobile App Development"],
            "servicesProvided": null,
            "summary": { "name": "Acme", "rating": 4.9, "noOfReviews": 12 },
            "reviews": [{
                "name": "App rebuild",
                "datePublished": "2024-03-01T00:00:00Z",
                "reviewer": {
                    "name": "Jane D.",
                    "title": "CTO, Widgets Inc",
                    "industry": "Information technology",
                    "linkedinUrl": "https://www.linkedin.com/in/jane"
                },
                "project": { "name": "App rebuild", "allCategories": ["Mobile App Development"] },
                "review": { "rating": 5.0, "willingToRefer": 5.0 },
                "content": [
                    { "label": "OPPORTUNITY / CHALLENGE", "text": "Legacy app." },
                    { "label": "RESULTS & FEEDBACK", "text": "Great." }
                ]
            }]
        });

        let profile: CompanyProfile = serde_json::from_value(raw).expect("profile");
        assert_eq!(profile.id, "64f0c2");
        assert_eq!(profile.summary.as_ref().and_then(|s| s.review_count), Some(12));
        let review = &profile.reviews[0];
        assert_eq!(review.content[0].label, ContentLabel::Challenge);
        assert_eq!(
            review.texts_for(ContentLabel::Feedback).collect::<Vec<_>>(),
            vec!["Great."]
        );
        assert_eq!(
            review.reviewer.as_ref().and_then(|r| r.linkedin_url.as_deref()),
            Some("https://www.linkedin.com/in/jane")
        );
    }

    #[test]
    fn unknown_content_label_is_rejected() {
        let raw = json!({ "label": "BACKGRUOND", "text": "typo" });
        assert!(serde_json::from_value::<Content>(raw).is_err());
    }
}
