//! Educational content: topic -> web search -> synthesis -> summary

use crate::error::JobsResult;
use crate::prompts;
use crate::websearch::{self, WebSearch};
use karir_core::TopThree;
use karir_llm::{LlmProvider, LlmRequest};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct EducationReport {
    pub topic: String,
    /// Formatted search hits handed to the synthesis step.
    pub raw: String,
    pub synthesis: String,
    pub summary: String,
}

pub struct EducationPipeline {
    provider: Arc<dyn LlmProvider>,
    search: WebSearch,
    model: String,
    max_results: usize,
}

impl EducationPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>, search: WebSearch, model: impl Into<String>) -> Self {
        Self { provider, search, model: model.into(), max_results: 3 }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    async fn ask(&self, instructions: &str, prompt: String) -> JobsResult<String> {
        let request = LlmRequest::prompt(&self.model, instructions, prompt);
        Ok(self.provider.complete(request).await?.trim().to_string())
    }

    /// One-sentence topic that would prepare the user for careers matching `top3`.
    pub async fn topic(&self, top3: &TopThree) -> JobsResult<String> {
        self.ask(prompts::TOPIC_INSTRUCTIONS, prompts::topic_prompt(&top3.labels())).await
    }

    /// Search hits for a topic, formatted for the model.
    pub async fn find_content(&self, topic: &str, max_results: usize) -> JobsResult<String> {
        let query = websearch::educational_query(topic, &chrono::Local::now());
        let hits = self.search.search(&query, max_results).await?;
        info!("{} educational hits for '{}'", hits.len(), topic);
        Ok(websearch::render_hits(topic, &hits))
    }

    pub async fn run(&self, top3: &TopThree) -> JobsResult<EducationReport> {
        let topic = self.topic(top3).await?;
        info!("Educational topic: {}", topic);
        let raw = self.find_content(&topic, self.max_results).await?;
        let synthesis = self.ask(prompts::SYNTHESIS_INSTRUCTIONS, prompts::synthesis_prompt(&raw)).await?;
        let summary = self.ask(prompts::SUMMARY_INSTRUCTIONS, prompts::summary_prompt(&synthesis)).await?;
        Ok(EducationReport { topic, raw, synthesis, summary })
    }
}
