//! Karir Jobs - vacancy sources, response cache, compatibility ranking, and
//! educational content lookup

pub mod alumni;
pub mod apijobs;
pub mod cache;
pub mod catalog;
pub mod education;
pub mod error;
pub mod format;
pub mod html;
pub mod matcher;
pub mod prompts;
pub mod rating;
pub mod vacancy;
pub mod websearch;

pub use alumni::{AlumniClient, Province, VacancyQuery};
pub use apijobs::{ApiJobsClient, JobHit};
pub use cache::ResponseCache;
pub use catalog::{CatalogEntry, JobCatalog};
pub use education::{EducationPipeline, EducationReport};
pub use error::{JobsError, JobsResult};
pub use format::Detail;
pub use matcher::{render_ranked_for_model, JobMatcher, KeywordGenerator, MatchOutcome, RankedJob};
pub use rating::{CompatibilityRater, Rating};
pub use vacancy::Vacancy;
pub use websearch::{SearchHit, WebSearch};
