//! Wiring: build clients, pipelines and chat runtimes from the config

use anyhow::Context;
use karir_agent::{AgentRuntime, Page};
use karir_core::{KarirConfig, TopThree, TypeScores};
use karir_docs::{DocStore, DocsError, Retriever};
use karir_jobs::{
    AlumniClient, ApiJobsClient, CatalogEntry, CompatibilityRater, EducationPipeline, JobCatalog,
    JobMatcher, KeywordGenerator, Rating, Vacancy, VacancyQuery, WebSearch,
};
use karir_llm::{Embedder, LlmProvider, OllamaEmbedder, OllamaProvider};
use karir_tools::{create_page_registry, CareerContext};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub struct App {
    pub config: KarirConfig,
    provider: Arc<dyn LlmProvider>,
}

impl App {
    pub fn new(config: KarirConfig) -> Self {
        let provider = OllamaProvider::new(&config.llm.base_url)
            .with_models([config.llm.model.clone(), config.llm.rating_model.clone()]);
        Self { config, provider: Arc::new(provider) }
    }

    pub fn with_provider(config: KarirConfig, provider: Arc<dyn LlmProvider>) -> Self {
        Self { config, provider }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn alumni(&self) -> AlumniClient {
        AlumniClient::from_config(&self.config.alumni)
    }

    pub fn apijobs(&self) -> ApiJobsClient {
        ApiJobsClient::from_config(&self.config.apijobs)
    }

    pub fn rater(&self) -> CompatibilityRater {
        CompatibilityRater::new(self.provider.clone(), &self.config.llm.rating_model)
            .with_temperature(self.config.llm.temperature)
    }

    /// The configured catalog, if any.
    pub fn catalog(&self) -> anyhow::Result<Option<JobCatalog>> {
        match &self.config.paths.catalog {
            Some(path) => {
                let catalog = JobCatalog::from_csv_path(path)
                    .with_context(|| format!("reading catalog {}", path.display()))?;
                info!("Loaded {} catalog entries from {}", catalog.len(), path.display());
                Ok(Some(catalog))
            }
            None => Ok(None),
        }
    }

    pub fn matcher(&self) -> anyhow::Result<JobMatcher> {
        let mut matcher = JobMatcher::new(
            self.alumni(),
            self.apijobs(),
            self.rater(),
            self.config.matcher.clone(),
        )
        .with_keyword_generator(KeywordGenerator::new(self.provider.clone(), &self.config.llm.model));
        if let Some(catalog) = self.catalog()? {
            matcher = matcher.with_catalog(catalog);
        }
        Ok(matcher)
    }

    pub fn education(&self) -> EducationPipeline {
        EducationPipeline::new(
            self.provider.clone(),
            WebSearch::from_config(&self.config.search),
            &self.config.llm.model,
        )
        .with_max_results(self.config.search.max_results)
    }

    pub fn top3(&self) -> anyhow::Result<TopThree> {
        let path = &self.config.paths.answers;
        let scores = TypeScores::read_csv(path)
            .with_context(|| format!("no assessment result at {} (run `karir assess` first)", path.display()))?;
        Ok(scores.top3()?)
    }

    pub fn career_context(&self) -> anyhow::Result<CareerContext> {
        Ok(CareerContext::new(
            &self.config,
            self.alumni(),
            self.apijobs(),
            self.matcher()?,
            self.education(),
        ))
    }

    pub fn page_runtime(&self, page: Page) -> anyhow::Result<AgentRuntime> {
        let top3 = self.top3().ok();
        if page.needs_result() && top3.is_none() {
            anyhow::bail!("the {} page needs an assessment result, run `karir assess` first", page);
        }
        let ctx = Arc::new(self.career_context()?);
        let tools = create_page_registry(ctx, page.tool_names());
        info!("Page {} with tools {:?}", page, tools.list());
        let config = page.agent_config(&self.config.llm, self.config.chat.memory_tokens, top3.as_ref());
        Ok(AgentRuntime::new(self.provider.clone(), tools, config))
    }

    /// Same as [`App::page_runtime`], plus document retrieval on pages that use it.
    pub async fn chat_runtime(&self, page: Page) -> anyhow::Result<AgentRuntime> {
        let runtime = self.page_runtime(page)?;
        if !page.uses_documents() {
            return Ok(runtime);
        }
        match self.retriever().await? {
            Some(retriever) => {
                info!("Page {} retrieves from {} chunks", page, retriever.len());
                Ok(runtime.with_retriever(Arc::new(retriever)))
            }
            None => Ok(runtime),
        }
    }

    pub fn doc_store(&self) -> anyhow::Result<DocStore> {
        let docs = &self.config.docs;
        let store = DocStore::open(&docs.dir).with_context(|| format!("opening {}", docs.dir.display()))?;
        Ok(store.with_max_file_bytes(docs.max_file_bytes))
    }

    /// Index the document folder. `None` if the folder is missing or holds no text.
    pub async fn retriever(&self) -> anyhow::Result<Option<Retriever>> {
        let docs = &self.config.docs;
        if !docs.dir.is_dir() {
            info!("No document folder at {}", docs.dir.display());
            return Ok(None);
        }
        let documents = self.doc_store()?.load()?;
        if documents.is_empty() {
            return Ok(None);
        }
        let embedder = docs.use_embeddings.then(|| {
            Arc::new(OllamaEmbedder::new(&self.config.llm.base_url, &docs.embed_model)) as Arc<dyn Embedder>
        });
        let retriever = Retriever::build(documents, docs, embedder).await;
        Ok((!retriever.is_empty()).then_some(retriever))
    }

    /// Copy files into the document folder. Names already present are
    /// skipped with a warning; any other failure stops the upload.
    pub fn add_documents(&self, files: &[PathBuf]) -> anyhow::Result<Vec<String>> {
        let store = self.doc_store()?;
        let mut added = Vec::new();
        for file in files {
            match store.add_file(file) {
                Ok(name) => added.push(name),
                Err(DocsError::AlreadyExists(name)) => warn!("{} already exists, skipped", name),
                Err(e) => return Err(e).with_context(|| format!("uploading {}", file.display())),
            }
        }
        Ok(added)
    }

    /// Every listing reachable through an empty-keyword search, page by page.
    /// Stops on an empty page, a page with no new slugs, or after `max_pages`.
    pub async fn collect_listings(&self, max_pages: u32) -> anyhow::Result<Vec<Vacancy>> {
        let alumni = self.alumni();
        let mut seen = HashSet::new();
        let mut listings = Vec::new();

        for page in 1..=max_pages {
            let query = VacancyQuery::keyword("").per_page(self.config.alumni.export_page_size).page(page);
            let found = alumni.search(&query).await.with_context(|| format!("fetching listing page {}", page))?;
            let before = listings.len();
            for vacancy in found {
                if !vacancy.slug.is_empty() && seen.insert(vacancy.slug.clone()) {
                    listings.push(vacancy);
                }
            }
            if listings.len() == before {
                break;
            }
            info!("Page {}: {} listings so far", page, listings.len());
        }
        if listings.is_empty() {
            warn!("No listings returned by {}", self.config.alumni.api_url);
        }
        Ok(listings)
    }

    /// Rate each catalog position against `keyword`, best first.
    pub async fn rate_catalog(&self, keyword: &str, catalog: &JobCatalog) -> anyhow::Result<Vec<(CatalogEntry, Rating)>> {
        let entries = catalog.entries().to_vec();
        Ok(self.rater().rank(keyword, entries, |e| e.position.as_str()).await?)
    }
}
