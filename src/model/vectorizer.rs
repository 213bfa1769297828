//! TF-IDF vectorizer
//!
//! Fitted on the training split of each retraining cycle and persisted next
//! to the ensemble so a stored version can score text exactly as it did when
//! evaluated. Vocabulary selection and index assignment are deterministic:
//! highest corpus frequency first, ties broken alphabetically, indices in
//! alphabetical order of the surviving terms.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::model::text;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Term -> feature index, indices dense in `0..idf.len()`.
    vocabulary: BTreeMap<String, usize>,
    /// Smoothed inverse document frequency per feature index.
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit vocabulary and IDF weights on a corpus. At most `max_vocabulary`
    /// terms are kept, preferring the highest total corpus frequency.
    pub fn fit(corpus: &[String], max_vocabulary: usize) -> Self {
        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_frequency: HashMap<String, usize> = HashMap::new();

        for doc in corpus {
            let mut local: HashMap<String, usize> = HashMap::new();
            for token in text::tokenize(doc) {
                *local.entry(token).or_default() += 1;
            }
            for (term, count) in local {
                *doc_frequency.entry(term.clone()).or_default() += 1;
                *term_counts.entry(term).or_default() += count;
            }
        }

        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_vocabulary);

        let mut selected: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        selected.sort();

        let vocabulary: BTreeMap<String, usize> = selected
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        let n_docs = corpus.len() as f64;
        let mut idf = vec![0.0; vocabulary.len()];
        for (term, &index) in &vocabulary {
            let df = doc_frequency.get(term).copied().unwrap_or(0) as f64;
            idf[index] = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
        }

        Self { vocabulary, idf }
    }

    /// Map text to an L2-normalized TF-IDF vector. Out-of-vocabulary terms
    /// are ignored; a document with no known terms maps to the zero vector.
    pub fn transform(&self, doc: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.idf.len()];
        for token in text::tokenize(doc) {
            if let Some(&index) = self.vocabulary.get(&token) {
                vector[index] += 1.0;
            }
        }
        for (index, value) in vector.iter_mut().enumerate() {
            *value *= self.idf[index];
        }
        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }

    pub fn transform_batch(&self, docs: &[String]) -> Vec<Vec<f64>> {
        docs.iter().map(|doc| self.transform(doc)).collect()
    }

    /// Number of features produced by `transform`.
    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }
}
