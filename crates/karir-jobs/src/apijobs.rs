//! APIJobs client, with the local fetch service as first hop

use crate::error::{JobsError, JobsResult};
use karir_core::config::ApiJobsConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHit {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "hiringOrganizationName")]
    pub organization: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone)]
pub struct ApiJobsClient {
    client: Client,
    api_url: String,
    fetch_service_url: Option<String>,
    api_key: Option<String>,
    max_hits: usize,
}

impl ApiJobsClient {
    /// Talks to APIJobs directly.
    pub fn direct(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            fetch_service_url: None,
            api_key,
            max_hits: 5,
        }
    }

    pub fn from_config(config: &ApiJobsConfig) -> Self {
        let mut client = Self::direct(&config.api_url, config.api_key());
        client.max_hits = config.max_hits;
        if !config.fetch_service_url.trim().is_empty() {
            client.fetch_service_url = Some(config.fetch_service_url.clone());
        }
        client
    }

    pub fn with_fetch_service(mut self, url: impl Into<String>) -> Self {
        self.fetch_service_url = Some(url.into());
        self
    }

    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }

    /// Raw search response. The fetch service is tried first; if it is
    /// unreachable or answers with an error status the API is called directly.
    pub async fn search_raw(&self, query: &str) -> JobsResult<Value> {
        if let Some(url) = &self.fetch_service_url {
            match self.client.post(url).json(&json!({ "q": query })).send().await {
                Ok(response) if response.status().is_success() => return Ok(response.json().await?),
                Ok(response) => warn!("Fetch service returned {}, calling APIJobs directly", response.status()),
                Err(e) => warn!("Fetch service unavailable ({}), calling APIJobs directly", e),
            }
        }
        self.fetch_direct(query).await
    }

    /// `POST` to APIJobs with the `apikey` header.
    pub async fn fetch_direct(&self, query: &str) -> JobsResult<Value> {
        debug!("APIJobs search: q='{}'", query);
        let mut request = self.client.post(&self.api_url).json(&json!({ "q": query }));
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(JobsError::status(response.status(), &self.api_url));
        }
        Ok(response.json().await?)
    }

    pub async fn search(&self, query: &str) -> JobsResult<Vec<JobHit>> {
        let body = self.search_raw(query).await?;
        parse_hits(body)
    }

    /// Formatted hits, never failing: errors become a message for the user.
    pub async fn search_formatted(&self, query: &str) -> String {
        match self.search(query).await {
            Ok(hits) => render_hits(query, &hits, self.max_hits),
            Err(e) => format!("Error fetching job data: {}", e),
        }
    }
}

pub fn parse_hits(mut body: Value) -> JobsResult<Vec<JobHit>> {
    match body.get_mut("hits").map(Value::take) {
        Some(hits) => Ok(serde_json::from_value(hits)?),
        None => Ok(Vec::new()),
    }
}

pub fn render_hits(keyword: &str, hits: &[JobHit], max: usize) -> String {
    if hits.is_empty() {
        return format!("No jobs available for the keyword: {}", keyword);
    }
    let mut out = format!("# Job results for '{}'\n", keyword);
    for (idx, hit) in hits.iter().take(max).enumerate() {
        out.push_str(&format!(
            "\n{}. {} at {}\nLanguage: {}\nDescription: {}\nWebsite URL: {}\n",
            idx + 1,
            hit.title,
            hit.organization.as_deref().unwrap_or("N/A"),
            hit.language.as_deref().unwrap_or("N/A"),
            hit.description.as_deref().unwrap_or("N/A"),
            hit.url.as_deref().unwrap_or("N/A"),
        ));
    }
    out
}
