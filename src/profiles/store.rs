//! Profile persistence behind a trait so the filter engine can run against any document store.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::criteria::ProfileCriteria;
use super::types::CompanyProfile;

/// Errors raised by profile stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file could not be read.
    #[error("Failed to read profile dump {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Stored documents did not match the expected layout.
    #[error("Malformed profile document: {0}")]
    Decode(#[from] serde_json::Error),
    /// Backend rejected or failed the operation.
    #[error("Profile store unavailable: {0}")]
    Unavailable(String),
}

/// Document store holding company profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Every stored profile in store order.
    async fn all_profiles(&self) -> Result<Vec<CompanyProfile>, StoreError>;

    /// Coarse candidate query: profiles whose own fields match and that hold at least one review
    /// which could satisfy the per-review criteria. Reviews are returned unfiltered.
    async fn find_candidates(
        &self,
        criteria: &ProfileCriteria,
    ) -> Result<Vec<CompanyProfile>, StoreError>;

    /// Insert profiles whose URL is not stored yet; returns how many were inserted.
    async fn insert_profiles(&self, profiles: Vec<CompanyProfile>) -> Result<usize, StoreError>;

    /// Attach a LinkedIn URL to the first review of `profile_id` written by the named reviewer.
    async fn set_reviewer_linkedin_url(
        &self,
        profile_id: &str,
        reviewer_name: &str,
        reviewer_location: &str,
        linkedin_url: &str,
    ) -> Result<bool, StoreError>;
}

/// In-process store, optionally seeded from a JSON array of profiles.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<Vec<CompanyProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-loaded profiles without de-duplication.
    pub fn from_profiles(profiles: Vec<CompanyProfile>) -> Self {
        Self {
            profiles: RwLock::new(profiles),
        }
    }

    /// Load a JSON dump (an array of profile documents).
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await.map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let profiles: Vec<CompanyProfile> = serde_json::from_slice(&raw)?;
        tracing::info!(
            path = %path.display(),
            profiles = profiles.len(),
            "Loaded profile dump"
        );
        Ok(Self::from_profiles(profiles))
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn all_profiles(&self) -> Result<Vec<CompanyProfile>, StoreError> {
        Ok(self.profiles.read().await.clone())
    }

    async fn find_candidates(
        &self,
        criteria: &ProfileCriteria,
    ) -> Result<Vec<CompanyProfile>, StoreError> {
        let compiled = criteria.compile();
        let guard = self.profiles.read().await;
        Ok(guard
            .iter()
            .filter(|profile| compiled.admits_candidate(profile))
            .cloned()
            .collect())
    }

    async fn insert_profiles(&self, profiles: Vec<CompanyProfile>) -> Result<usize, StoreError> {
        let mut guard = self.profiles.write().await;
        let mut known: HashSet<String> = guard
            .iter()
            .filter_map(|profile| profile.url.clone())
            .collect();

        let mut inserted = 0;
        for mut profile in profiles {
            if let Some(url) = profile.url.as_ref()
                && !known.insert(url.clone())
            {
                tracing::debug!(url = %url, "Skipping profile with known URL");
                continue;
            }
            if profile.id.trim().is_empty() {
                profile.id = Uuid::new_v4().to_string();
            }
            guard.push(profile);
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn set_reviewer_linkedin_url(
        &self,
        profile_id: &str,
        reviewer_name: &str,
        reviewer_location: &str,
        linkedin_url: &str,
    ) -> Result<bool, StoreError> {
        let mut guard = self.profiles.write().await;
        let Some(profile) = guard.iter_mut().find(|profile| profile.id == profile_id) else {
            return Ok(false);
        };

        let reviewer = profile
            .reviews
            .iter_mut()
            .filter_map(|review| review.reviewer.as_mut())
            .find(|reviewer| {
                reviewer.name.as_deref() == Some(reviewer_name)
                    && reviewer.location.as_deref() == Some(reviewer_location)
            });

        match reviewer {
            Some(reviewer) => {
                reviewer.linkedin_url = Some(linkedin_url.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
