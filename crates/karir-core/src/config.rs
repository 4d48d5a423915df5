//! Karir configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file
//! exists. Secrets never live in the file; the APIJobs key is read from the
//! environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the APIJobs key.
pub const APIJOBS_KEY_ENV: &str = "APIJOB_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KarirConfig {
    /// Language model endpoint and model selection.
    pub llm: LlmConfig,
    /// Alumni vacancy API.
    pub alumni: AlumniConfig,
    /// Secondary job search API and the local fetch service in front of it.
    pub apijobs: ApiJobsConfig,
    /// Response cache of the fetch service.
    pub cache: CacheConfig,
    /// Job matching and ranking.
    pub matcher: MatcherConfig,
    /// Web search for educational content.
    pub search: SearchConfig,
    /// Data files.
    pub paths: PathsConfig,
    /// Fetch service listener.
    pub gateway: GatewayConfig,
    /// Chat sessions.
    pub chat: ChatConfig,
    /// Reference documents retrieved into chat prompts.
    pub docs: DocsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL.
    pub base_url: String,
    /// Model for chat pages and generation steps.
    pub model: String,
    /// Model for compatibility scoring.
    pub rating_model: String,
    pub temperature: f32,
    /// Max output tokens per call.
    pub max_tokens: u32,
    /// Max tool round trips per chat turn.
    pub max_tool_iterations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlumniConfig {
    /// REST base, e.g. `https://panel-alumni.petra.ac.id/api`.
    pub api_url: String,
    /// Public site used for vacancy links.
    pub site_url: String,
    /// Page size for free-text vacancy searches.
    pub search_page_size: u32,
    /// Page size when exporting every listing.
    pub export_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiJobsConfig {
    /// Direct APIJobs search endpoint.
    pub api_url: String,
    /// Local fetch service tried first. Empty disables it.
    pub fetch_service_url: String,
    /// Number of hits shown.
    pub max_hits: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: PathBuf,
    /// Whole-file validity window in seconds.
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Jobs kept after ranking.
    pub max_results: usize,
    /// Vacancies requested per search term.
    pub per_keyword: u32,
    /// Ask the model for job titles matching the top-3 before searching.
    pub generate_keywords: bool,
    pub min_salary: u64,
    pub max_salary: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// DuckDuckGo HTML endpoint.
    pub endpoint: String,
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Questionnaire CSV (`Question`, `Type`).
    pub questions: PathBuf,
    /// Scores CSV (`Type`, `Total Score`).
    pub answers: PathBuf,
    /// Optional job catalog CSV (`Position`, `Link`) rated alongside live results.
    pub catalog: Option<PathBuf>,
    /// Output of the slug export.
    pub slugs: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Token budget of a session's history.
    pub memory_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Document folder, read recursively.
    pub dir: PathBuf,
    /// Chunks injected per chat turn.
    pub top_k: usize,
    /// Chunk size in characters.
    pub chunk_chars: usize,
    /// Characters repeated between neighbouring chunks.
    pub chunk_overlap: usize,
    /// Files above this size are skipped.
    pub max_file_bytes: u64,
    /// Embed chunks with `embed_model` and fuse with keyword search.
    pub use_embeddings: bool,
    pub embed_model: String,
}

// ============================================================
// Defaults
// ============================================================

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".into(),
            model: "llama3.1:8b-instruct-q4_0".into(),
            rating_model: "llama3.2:latest".into(),
            temperature: 0.0,
            max_tokens: 2048,
            max_tool_iterations: 8,
        }
    }
}

impl Default for AlumniConfig {
    fn default() -> Self {
        Self {
            api_url: "https://panel-alumni.petra.ac.id/api".into(),
            site_url: "https://alumni.petra.ac.id".into(),
            search_page_size: 5,
            export_page_size: 1000,
        }
    }
}

impl Default for ApiJobsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.apijobs.dev/v1/job/search".into(),
            fetch_service_url: "http://127.0.0.1:5000/api/fetch".into(),
            max_hits: 5,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("./cache/cached_data.json"), ttl_secs: 1_382_400 }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            per_keyword: 3,
            generate_keywords: true,
            min_salary: 5_000,
            max_salary: 100_000_000_000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { endpoint: "https://html.duckduckgo.com/html/".into(), max_results: 3 }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            questions: PathBuf::from("questions/holland-questions.csv"),
            answers: PathBuf::from("answers/riasec_assessment_answer.csv"),
            catalog: None,
            slugs: PathBuf::from("alumni_job_slugs.csv"),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1".into(), port: 5000 }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { memory_tokens: 32_768 }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("docs"),
            top_k: 2,
            chunk_chars: 2048,
            chunk_overlap: 200,
            max_file_bytes: 2_000_000,
            use_embeddings: true,
            embed_model: "mxbai-embed-large:latest".into(),
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl KarirConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        let config = match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    /// Apply `KARIR_LLM_URL` and `KARIR_MODEL` if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env("KARIR_LLM_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = non_empty_env("KARIR_MODEL") {
            self.llm.model = model;
        }
        self
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Fetch service socket address string.
    pub fn gateway_addr(&self) -> String {
        format!("{}:{}", self.gateway.bind, self.gateway.port)
    }
}

impl ApiJobsConfig {
    /// Key from the environment, if present.
    pub fn api_key(&self) -> Option<String> {
        non_empty_env(APIJOBS_KEY_ENV)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
