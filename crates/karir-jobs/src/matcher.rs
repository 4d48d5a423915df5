//! Preference-aware job matching
//!
//! Keyword set = the user's top-3 RIASEC labels plus recorded preferences.
//! Candidates come from the vacancy API (one search per term) and the
//! optional catalog, deduplicated by slug. Each candidate is rated against
//! the joined keyword set, sorted, and the best are fetched in full. When no
//! candidate turns up at all, APIJobs is searched with the first term.

use crate::alumni::{AlumniClient, VacancyQuery};
use crate::apijobs::ApiJobsClient;
use crate::catalog::JobCatalog;
use crate::error::JobsResult;
use crate::format::{self, Detail};
use crate::prompts;
use crate::rating::{CompatibilityRater, Rating};
use crate::vacancy::Vacancy;
use karir_core::config::MatcherConfig;
use karir_core::{PreferenceSet, TopThree};
use karir_llm::{LlmProvider, LlmRequest};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RankedJob {
    pub vacancy: Vacancy,
    pub rating: Rating,
    pub link: String,
}

#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// Best vacancies, highest score first.
    Ranked { keywords: String, jobs: Vec<RankedJob>, text: String },
    /// No vacancy candidates; APIJobs results for `keyword`.
    Fallback { keyword: String, text: String },
}

impl MatchOutcome {
    pub fn text(&self) -> &str {
        match self {
            MatchOutcome::Ranked { text, .. } | MatchOutcome::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, MatchOutcome::Fallback { .. })
    }
}

/// Asks the model for job titles that suit a RIASEC profile.
pub struct KeywordGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    count: usize,
}

impl KeywordGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self { provider, model: model.into(), count: 3 }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub async fn generate(&self, top3: &TopThree) -> JobsResult<Vec<String>> {
        let request = LlmRequest::prompt(
            &self.model,
            prompts::KEYWORD_INSTRUCTIONS,
            prompts::keyword_prompt(&top3.labels(), self.count),
        );
        let reply = self.provider.complete(request).await?;
        let mut titles = parse_titles(&reply);
        titles.truncate(self.count);
        info!("Generated keywords: {:?}", titles);
        Ok(titles)
    }
}

/// Split a comma or line separated reply into clean titles.
pub fn parse_titles(reply: &str) -> Vec<String> {
    let cleaned: String = reply.chars().filter(|c| !matches!(c, '[' | ']' | '"' | '\'' | '*')).collect();
    let mut seen = HashSet::new();
    cleaned
        .split([',', '\n'])
        .map(|part| strip_numbering(part.trim().trim_start_matches(['-', '•']).trim()))
        .filter(|part| !part.is_empty())
        .filter(|part| seen.insert(part.to_lowercase()))
        .map(str::to_string)
        .collect()
}

fn strip_numbering(part: &str) -> &str {
    let digits = part.find(|c: char| !c.is_ascii_digit()).unwrap_or(part.len());
    match part[digits..].strip_prefix(['.', ')']) {
        Some(rest) if digits > 0 => rest.trim_start(),
        _ => part,
    }
}

pub struct JobMatcher {
    alumni: AlumniClient,
    apijobs: ApiJobsClient,
    rater: CompatibilityRater,
    keywords: Option<KeywordGenerator>,
    catalog: Option<JobCatalog>,
    config: MatcherConfig,
}

impl JobMatcher {
    pub fn new(
        alumni: AlumniClient,
        apijobs: ApiJobsClient,
        rater: CompatibilityRater,
        config: MatcherConfig,
    ) -> Self {
        Self { alumni, apijobs, rater, keywords: None, catalog: None, config }
    }

    pub fn with_keyword_generator(mut self, generator: KeywordGenerator) -> Self {
        self.keywords = Some(generator);
        self
    }

    pub fn with_catalog(mut self, catalog: JobCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Top-3 labels followed by preferences, without repeats.
    pub fn keyword_set(top3: &TopThree, preferences: &PreferenceSet) -> Vec<String> {
        let mut seen = HashSet::new();
        top3.types()
            .iter()
            .map(|t| t.label().to_string())
            .chain(preferences.keywords().iter().cloned())
            .filter(|k| seen.insert(k.to_lowercase()))
            .collect()
    }

    /// Preferences first, then generated titles, then the type labels.
    pub async fn search_terms(&self, top3: &TopThree, preferences: &PreferenceSet) -> Vec<String> {
        let mut terms: Vec<String> = preferences.keywords().to_vec();
        if let (true, Some(generator)) = (self.config.generate_keywords, &self.keywords) {
            match generator.generate(top3).await {
                Ok(titles) => terms.extend(titles),
                Err(e) => warn!("Keyword generation failed: {}", e),
            }
        }
        terms.extend(top3.types().iter().map(|t| t.label().to_string()));

        let mut seen = HashSet::new();
        terms.retain(|t| seen.insert(t.to_lowercase()));
        terms
    }

    /// Candidates for all terms, first occurrence of each slug wins.
    pub async fn gather(&self, terms: &[String]) -> Vec<Vacancy> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for term in terms {
            let query = VacancyQuery::keyword(term).per_page(self.config.per_keyword);
            match self.alumni.search(&query).await {
                Ok(found) => {
                    for vacancy in found {
                        if !vacancy.slug.is_empty() && seen.insert(vacancy.slug.clone()) {
                            candidates.push(vacancy);
                        }
                    }
                }
                Err(e) => warn!("Vacancy search for '{}' failed: {}", term, e),
            }
        }

        if let Some(catalog) = &self.catalog {
            for entry in catalog.entries() {
                if seen.insert(entry.slug().to_string()) {
                    candidates.push(entry.to_vacancy());
                }
            }
        }

        info!("{} unique candidates from {} terms", candidates.len(), terms.len());
        candidates
    }

    pub async fn run(&self, top3: &TopThree, preferences: &PreferenceSet) -> JobsResult<MatchOutcome> {
        let terms = self.search_terms(top3, preferences).await;
        let candidates = self.gather(&terms).await;

        if candidates.is_empty() {
            let keyword = terms.first().cloned().unwrap_or_else(|| top3.primary().label().to_string());
            info!("No vacancy candidates, falling back to APIJobs for '{}'", keyword);
            let text = self.apijobs.search_formatted(&keyword).await;
            return Ok(MatchOutcome::Fallback { keyword, text });
        }

        let keywords = Self::keyword_set(top3, preferences).join(", ");
        let ranked = self.rater.rank(&keywords, candidates, |v| v.position_name.as_str()).await?;

        let mut jobs = Vec::new();
        for (candidate, rating) in ranked {
            if jobs.len() >= self.config.max_results {
                break;
            }
            if let Some(vacancy) = self.full_record(candidate).await {
                let link = self.alumni.vacancy_link(&vacancy.slug);
                jobs.push(RankedJob { vacancy, rating, link });
            }
        }

        let text = render_ranked(&jobs);
        Ok(MatchOutcome::Ranked { keywords, jobs, text })
    }

    /// Detail record, or the listing itself if it already came from a search.
    async fn full_record(&self, candidate: Vacancy) -> Option<Vacancy> {
        let from_search = !candidate.company_name().is_empty();
        match self.alumni.detail(&candidate.slug).await {
            Ok(Some(mut detail)) => {
                if detail.slug.is_empty() {
                    detail.slug = candidate.slug;
                }
                Some(detail)
            }
            Ok(None) => from_search.then_some(candidate),
            Err(e) => {
                warn!("Detail for {} failed: {}", candidate.slug, e);
                from_search.then_some(candidate)
            }
        }
    }
}

pub fn render_ranked(jobs: &[RankedJob]) -> String {
    if jobs.is_empty() {
        return format::NO_VACANCIES.to_string();
    }
    jobs.iter()
        .enumerate()
        .map(|(i, job)| ranked_block(i + 1, job, Some(&job.link)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ranked listing for the chat model: every entry carries a reason slot
/// tied to `keywords` and a link the model must keep.
pub fn render_ranked_for_model(jobs: &[RankedJob], keywords: &str) -> String {
    if jobs.is_empty() {
        return format::NO_VACANCIES.to_string();
    }
    jobs.iter()
        .enumerate()
        .map(|(i, job)| {
            let mut block = ranked_block(i + 1, job, None);
            block.push_str(&format!(
                "<A reason why this job matches the user's RIASEC result (why {} matches {})>\n",
                job.vacancy.position_name, keywords
            ));
            block.push_str(&format!("Link: {} [ALWAYS SHOW THIS TO USER]\n", job.link));
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn ranked_block(idx: usize, job: &RankedJob, link: Option<&str>) -> String {
    let mut block = format::render_vacancy(idx, &job.vacancy, Detail::Full, link);
    if let Some(score) = job.rating.score {
        block.push_str(&format!("Compatibility: {}/100\n", score));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_cleaned_and_deduped() {
        assert_eq!(
            parse_titles("[\"Data Analyst\", 'Teacher', data analyst]"),
            vec!["Data Analyst", "Teacher"]
        );
        assert_eq!(parse_titles("1. Nurse\n2. Counselor\n"), vec!["Nurse", "Counselor"]);
        assert_eq!(parse_titles("3D Artist, - Welder"), vec!["3D Artist", "Welder"]);
        assert!(parse_titles("  ").is_empty());
    }
}
