//! Vectorizer boundary and the default local embedder.
//!
//! The orchestrator treats embeddings as opaque: text in, vector out. The
//! shipped [`TrigramVectorizer`] hashes word and character-trigram features
//! into a fixed-dimension unit vector. It is deterministic and content-aware,
//! which makes it suitable both as a local default and as a test double;
//! semantically accurate models plug in behind the same trait.

use askdocs_core::AppResult;
use std::collections::{HashMap, HashSet};

/// Opaque text-to-vector boundary.
#[async_trait::async_trait]
pub trait Vectorizer: Send + Sync {
    /// Embedding dimension produced by this vectorizer.
    fn dimensions(&self) -> usize;

    /// Embed a single text into a vector.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// English stop words filtered before hashing.
const STOP_WORDS: [&str; 31] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they",
];

/// Deterministic hashing embedder over word and trigram features.
#[derive(Debug)]
pub struct TrigramVectorizer {
    dimensions: usize,
}

impl TrigramVectorizer {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split_whitespace()
            .filter(|w| !stop_words.contains(w) && w.len() > 2)
            .collect();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in &words {
            *word_freq.entry(*word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            // Character trigrams spread each word over several dimensions
            let chars: Vec<char> = word.chars().collect();
            for i in 0..chars.len().saturating_sub(2) {
                let trigram = format!("{}{}{}", chars[i], chars[i + 1], chars[i + 2]);
                let dim_idx = (hash_feature(&trigram, 37) as usize) % self.dimensions;
                embedding[dim_idx] += (*freq as f32).sqrt();
            }

            // Whole-word feature
            let dim_idx = (hash_feature(word, 31) as usize) % self.dimensions;
            embedding[dim_idx] += *freq as f32;
        }

        normalize(&mut embedding);
        embedding
    }
}

#[async_trait::async_trait]
impl Vectorizer for TrigramVectorizer {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }
}

fn hash_feature(feature: &str, seed: u64) -> u64 {
    feature
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(seed).wrapping_add(b as u64))
}

fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in embedding.iter_mut() {
            *v /= norm;
        }
    }
}
