//! Company profiles, their reviews, and the document filter engine.

pub mod aggregates;
pub mod criteria;
pub mod filter;
pub mod store;
pub mod types;

pub use aggregates::{KeyValue, ProfileAggregates, aggregate};
pub use criteria::{CompiledCriteria, ProfileCriteria, TermSet};
pub use filter::{RANKED_PROFILE_LIMIT, filter_profiles, filter_profiles_ranked, refine_candidates};
pub use store::{MemoryProfileStore, ProfileStore, StoreError};
pub use types::{
    CompanyProfile, Content, ContentLabel, Project, Review, ReviewScores, Reviewer, ServiceShare,
    Summary,
};
