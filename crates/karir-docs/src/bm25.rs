//! Okapi BM25 keyword ranking over an in-memory corpus

use std::collections::HashMap;

const K1: f32 = 1.2;
const B: f32 = 0.75;

#[derive(Debug, Default)]
pub struct Bm25Index {
    terms: Vec<HashMap<String, u32>>,
    lengths: Vec<usize>,
    avg_len: f32,
    doc_freq: HashMap<String, usize>,
}

impl Bm25Index {
    pub fn build<S: AsRef<str>>(texts: &[S]) -> Self {
        let mut index = Self::default();
        for text in texts {
            let mut counts: HashMap<String, u32> = HashMap::new();
            let tokens = tokenize(text.as_ref());
            index.lengths.push(tokens.len());
            for token in tokens {
                *counts.entry(token).or_default() += 1;
            }
            for term in counts.keys() {
                *index.doc_freq.entry(term.clone()).or_default() += 1;
            }
            index.terms.push(counts);
        }
        let total: usize = index.lengths.iter().sum();
        index.avg_len = if index.lengths.is_empty() { 0.0 } else { total as f32 / index.lengths.len() as f32 };
        index
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Up to `k` (document index, score) pairs with a positive score, best
    /// first; equal scores keep corpus order.
    pub fn search(&self, query: &str, k: usize) -> Vec<(usize, f32)> {
        let mut query_terms = tokenize(query);
        query_terms.sort();
        query_terms.dedup();

        let n = self.terms.len() as f32;
        let mut scored: Vec<(usize, f32)> = self
            .terms
            .iter()
            .enumerate()
            .map(|(i, counts)| {
                let norm = if self.avg_len > 0.0 { self.lengths[i] as f32 / self.avg_len } else { 0.0 };
                let score = query_terms
                    .iter()
                    .filter_map(|term| {
                        let tf = *counts.get(term)? as f32;
                        let df = *self.doc_freq.get(term)? as f32;
                        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                        Some(idf * tf * (K1 + 1.0) / (tf + K1 * (1.0 - B + B * norm)))
                    })
                    .sum::<f32>();
                (i, score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        scored
    }
}

/// Lowercased alphanumeric runs of two or more characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rare_terms_outrank_common_ones() {
        let index = Bm25Index::build(&[
            "Social types enjoy helping and teaching people",
            "Realistic types enjoy tools and machines",
            "Conventional types enjoy records and data",
        ]);
        let hits = index.search("who enjoys teaching?", 3);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 0);

        let hits = index.search("tools data", 3);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![1, 2]);
        assert!(index.search("astronomy", 3).is_empty());
    }

    #[test]
    fn tokens_are_lowercased_words() {
        assert_eq!(tokenize("Holland's R-I-A-S-E-C, Karir 2026!"), vec!["holland", "karir", "2026"]);
    }
}
