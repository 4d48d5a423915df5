//! Keyword-to-job compatibility scoring with the model as judge

use crate::error::JobsResult;
use crate::prompts;
use karir_llm::{LlmProvider, LlmRequest};
use regex::Regex;
use std::cmp::Reverse;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Model verdict for one (keyword, job) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    /// 0..=100, `None` when the reply held no integer.
    pub score: Option<u8>,
    pub raw: String,
}

impl Rating {
    fn sort_key(&self) -> Reverse<i16> {
        Reverse(self.score.map(i16::from).unwrap_or(-1))
    }
}

pub struct CompatibilityRater {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
}

impl CompatibilityRater {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self { provider, model: model.into(), temperature: 0.0 }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub async fn rate(&self, keyword: &str, job: &str) -> JobsResult<Rating> {
        let request = LlmRequest::prompt(
            &self.model,
            prompts::RATING_INSTRUCTIONS,
            prompts::rating_prompt(keyword, job),
        )
        .with_temperature(self.temperature)
        .with_max_tokens(16);

        let raw = self.provider.complete(request).await?;
        let score = parse_score(&raw);
        if score.is_none() {
            warn!("Unscored reply for '{}': {:?}", job, raw);
        }
        debug!("Compatibility {} / {} = {:?}", keyword, job, score);
        Ok(Rating { score, raw: raw.trim().to_string() })
    }

    /// Rate every item one after another, highest first. Equal scores keep
    /// input order and unscored items go last.
    pub async fn rank<T, F>(&self, keyword: &str, items: Vec<T>, job_of: F) -> JobsResult<Vec<(T, Rating)>>
    where
        F: Fn(&T) -> &str,
    {
        let mut rated = Vec::with_capacity(items.len());
        for item in items {
            let rating = self.rate(keyword, job_of(&item)).await?;
            rated.push((item, rating));
        }
        rated.sort_by_key(|(_, rating)| rating.sort_key());
        Ok(rated)
    }
}

/// First integer in the reply, capped at 100.
pub fn parse_score(reply: &str) -> Option<u8> {
    static NUMBER: OnceLock<Option<Regex>> = OnceLock::new();
    let re = NUMBER.get_or_init(|| Regex::new(r"\d+").ok()).as_ref()?;
    let digits = re.find(reply)?.as_str();
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    Some(value.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_integer() {
        assert_eq!(parse_score("85"), Some(85));
        assert_eq!(parse_score(" Score: 72/100"), Some(72));
        assert_eq!(parse_score("250"), Some(100));
        assert_eq!(parse_score("99999999999999999999999"), Some(100));
        assert_eq!(parse_score("very compatible"), None);
    }
}
