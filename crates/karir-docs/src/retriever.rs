//! Hybrid retriever: BM25 and embedding similarity fused by reciprocal rank
//!
//! Without an embedder, or when embedding fails, the retriever ranks by
//! keywords alone.

use crate::bm25::Bm25Index;
use crate::chunk;
use crate::store::Document;
use crate::vector::VectorIndex;
use karir_core::config::DocsConfig;
use karir_llm::Embedder;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reciprocal rank fusion constant.
const RRF_K: f32 = 60.0;
const EMBED_BATCH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub source: String,
    pub text: String,
    pub score: f32,
}

pub struct Retriever {
    chunks: Vec<Document>,
    keywords: Bm25Index,
    vectors: Option<VectorIndex>,
    embedder: Option<Arc<dyn Embedder>>,
    top_k: usize,
}

impl Retriever {
    /// Chunk `documents` and index them for keyword search only.
    pub fn keyword_only(documents: Vec<Document>, config: &DocsConfig) -> Self {
        let chunks = chunk_documents(documents, config);
        let keywords = Bm25Index::build(&chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>());
        Self { chunks, keywords, vectors: None, embedder: None, top_k: config.top_k.max(1) }
    }

    /// Chunk and index `documents`, embedding every chunk when an embedder is given.
    pub async fn build(documents: Vec<Document>, config: &DocsConfig, embedder: Option<Arc<dyn Embedder>>) -> Self {
        let mut retriever = Self::keyword_only(documents, config);
        let Some(embedder) = embedder else {
            return retriever;
        };
        match embed_all(embedder.as_ref(), &retriever.chunks).await {
            Ok(vectors) => {
                info!("Embedded {} chunks with {}", vectors.len(), embedder.model());
                retriever.vectors = Some(VectorIndex::new(vectors));
                retriever.embedder = Some(embedder);
            }
            Err(e) => warn!("Embedding failed, using keyword search only: {}", e),
        }
        retriever
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn is_hybrid(&self) -> bool {
        self.vectors.is_some()
    }

    /// Best `top_k` chunks for `query`.
    pub async fn retrieve(&self, query: &str) -> Vec<Hit> {
        if self.chunks.is_empty() || query.trim().is_empty() {
            return Vec::new();
        }
        let pool = self.top_k * 2;
        let keyword_ranks = self.keywords.search(query, pool);

        let semantic_ranks = match (&self.embedder, &self.vectors) {
            (Some(embedder), Some(vectors)) => match embedder.embed(&[query.to_string()]).await {
                Ok(mut v) if !v.is_empty() => vectors.search(&v.remove(0), pool),
                Ok(_) => Vec::new(),
                Err(e) => {
                    warn!("Query embedding failed: {}", e);
                    Vec::new()
                }
            },
            _ => Vec::new(),
        };

        let ranked = if semantic_ranks.is_empty() {
            keyword_ranks
        } else {
            fuse(&[keyword_ranks, semantic_ranks])
        };
        debug!("Retrieved {} candidate chunks for {:?}", ranked.len(), query);

        ranked
            .into_iter()
            .take(self.top_k)
            .map(|(i, score)| Hit { source: self.chunks[i].source.clone(), text: self.chunks[i].text.clone(), score })
            .collect()
    }

    /// Retrieved chunks rendered for a prompt, or `None` when nothing matched.
    pub async fn context(&self, query: &str) -> Option<String> {
        let hits = self.retrieve(query).await;
        if hits.is_empty() {
            return None;
        }
        Some(render_hits(&hits))
    }
}

pub fn render_hits(hits: &[Hit]) -> String {
    hits.iter()
        .map(|h| format!("[{}]\n{}", h.source, h.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn chunk_documents(documents: Vec<Document>, config: &DocsConfig) -> Vec<Document> {
    documents
        .into_iter()
        .flat_map(|doc| {
            chunk::split(&doc.text, config.chunk_chars, config.chunk_overlap)
                .into_iter()
                .map(move |text| Document { source: doc.source.clone(), text })
                .collect::<Vec<_>>()
        })
        .collect()
}

async fn embed_all(embedder: &dyn Embedder, chunks: &[Document]) -> karir_llm::LlmResult<Vec<Vec<f32>>> {
    let mut vectors = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(EMBED_BATCH) {
        let inputs: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        vectors.extend(embedder.embed(&inputs).await?);
    }
    Ok(vectors)
}

/// Sum of `1 / (RRF_K + rank)` across rankings, best first; ties keep
/// the earlier index.
fn fuse(rankings: &[Vec<(usize, f32)>]) -> Vec<(usize, f32)> {
    let mut scores: HashMap<usize, f32> = HashMap::new();
    for ranking in rankings {
        for (rank, (index, _)) in ranking.iter().enumerate() {
            *scores.entry(*index).or_default() += 1.0 / (RRF_K + rank as f32 + 1.0);
        }
    }
    let mut fused: Vec<(usize, f32)> = scores.into_iter().collect();
    fused.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fusion_rewards_agreement() {
        let keyword = vec![(0, 9.0), (1, 5.0), (2, 1.0)];
        let semantic = vec![(1, 0.9), (2, 0.8)];
        let fused = fuse(&[keyword, semantic]);
        assert_eq!(fused.iter().map(|f| f.0).collect::<Vec<_>>(), vec![1, 2, 0]);
    }
}
