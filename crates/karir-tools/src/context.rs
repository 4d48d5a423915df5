//! Shared handles the career tools run against

use karir_core::{KarirConfig, SharedPreferences, TopThree, TypeScores};
use karir_jobs::{AlumniClient, ApiJobsClient, EducationPipeline, JobMatcher};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub struct CareerContext {
    pub alumni: AlumniClient,
    pub apijobs: ApiJobsClient,
    pub matcher: Arc<JobMatcher>,
    pub education: Arc<EducationPipeline>,
    pub preferences: SharedPreferences,
    /// Scores CSV written by the assessment.
    pub answers_path: PathBuf,
    /// Page size for `search_job_vacancy`.
    pub page_size: u32,
    /// Salary bounds used when the model gives none.
    pub salary_range: (u64, u64),
    /// Hits per educational search.
    pub search_results: usize,
}

impl CareerContext {
    pub fn new(
        config: &KarirConfig,
        alumni: AlumniClient,
        apijobs: ApiJobsClient,
        matcher: JobMatcher,
        education: EducationPipeline,
    ) -> Self {
        Self {
            alumni,
            apijobs,
            matcher: Arc::new(matcher),
            education: Arc::new(education),
            preferences: SharedPreferences::default(),
            answers_path: config.paths.answers.clone(),
            page_size: config.alumni.search_page_size,
            salary_range: (config.matcher.min_salary, config.matcher.max_salary),
            search_results: config.search.max_results,
        }
    }

    pub fn with_preferences(mut self, preferences: SharedPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Re-read on every call so a finished assessment shows up mid-session.
    pub fn top3(&self) -> Option<TopThree> {
        match TypeScores::read_csv(&self.answers_path).and_then(|s| s.top3()) {
            Ok(top3) => Some(top3),
            Err(e) => {
                warn!("No RIASEC result at {}: {}", self.answers_path.display(), e);
                None
            }
        }
    }
}

pub const NO_RESULT: &str =
    "The user has not completed the RIASEC assessment yet. Ask them to take it first.";
