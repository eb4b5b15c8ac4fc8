use crate::config::ExpansionConfig;
use crate::persist::load_word_vectors;
use anyhow::{bail, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

/// Nearest-neighbour lookups over a word embedding vocabulary.
pub trait SimilarityModel: Send + Sync {
    fn contains(&self, term: &str) -> bool;
    /// Up to `top_n` neighbours of `term` by descending cosine similarity, excluding `term`.
    fn most_similar(&self, term: &str, top_n: usize) -> Vec<(String, f32)>;
}

/// Dense word vectors, L2-normalised on construction so cosine is a dot product.
pub struct WordVectors {
    words: Vec<String>,
    lookup: HashMap<String, usize>,
    dim: usize,
    data: Vec<f32>,
}

impl WordVectors {
    pub fn from_entries(entries: Vec<(String, Vec<f32>)>) -> Result<Self> {
        let dim = entries.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut words = Vec::with_capacity(entries.len());
        let mut lookup = HashMap::with_capacity(entries.len());
        let mut data = Vec::with_capacity(entries.len() * dim);
        for (word, mut vector) in entries {
            if vector.len() != dim {
                bail!("vector for {word:?} has {} dims, expected {dim}", vector.len());
            }
            normalize(&mut vector);
            lookup.insert(word.clone(), words.len());
            words.push(word);
            data.extend_from_slice(&vector);
        }
        Ok(Self { words, lookup, dim, data })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let model = Self::from_entries(load_word_vectors(path)?)?;
        tracing::info!(vocabulary = model.len(), dim = model.dim, path = %path.display(), "loaded word vectors");
        Ok(model)
    }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    fn row(&self, i: usize) -> &[f32] { &self.data[i * self.dim..(i + 1) * self.dim] }
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

impl SimilarityModel for WordVectors {
    fn contains(&self, term: &str) -> bool { self.lookup.contains_key(term) }

    fn most_similar(&self, term: &str, top_n: usize) -> Vec<(String, f32)> {
        let Some(&target) = self.lookup.get(term) else { return Vec::new() };
        if top_n == 0 {
            return Vec::new();
        }
        let query = self.row(target);
        let mut sims: Vec<(usize, f32)> = (0..self.words.len())
            .filter(|&i| i != target)
            .map(|i| (i, self.row(i).iter().zip(query).map(|(a, b)| a * b).sum()))
            .collect();
        let by_similarity = |a: &(usize, f32), b: &(usize, f32)| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal);
        if top_n < sims.len() {
            sims.select_nth_unstable_by(top_n - 1, by_similarity);
            sims.truncate(top_n);
        }
        sims.sort_by(by_similarity);
        sims.into_iter().map(|(i, s)| (self.words[i].clone(), s)).collect()
    }
}

/// Broadens a query with close embedding neighbours of each token.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExpander {
    config: ExpansionConfig,
}

impl QueryExpander {
    pub fn new(config: ExpansionConfig) -> Self { Self { config } }

    /// For each token: its neighbours above the similarity threshold, then the token itself.
    pub fn expand(&self, tokens: &[String], model: &dyn SimilarityModel) -> Vec<String> {
        let mut expanded = Vec::with_capacity(tokens.len());
        for token in tokens {
            if model.contains(token) {
                expanded.extend(
                    model
                        .most_similar(token, self.config.top_n)
                        .into_iter()
                        .filter(|(_, sim)| *sim > self.config.min_similarity)
                        .map(|(word, _)| word),
                );
            }
            expanded.push(token.clone());
        }
        expanded
    }
}
