use crate::tokenizer::CORPUS_STOPWORDS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const DEFAULT_NUM_BUCKETS: u32 = 124;

/// Linear weights applied to popularity signals in the long-query policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub page_views: f64,
    pub page_rank: f64,
}

impl Default for FusionWeights {
    fn default() -> Self { Self { page_views: 0.97, page_rank: 0.03 } }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Neighbours requested from the embedding model per token.
    pub top_n: usize,
    /// Neighbours must score strictly above this cosine similarity.
    pub min_similarity: f32,
}

impl Default for ExpansionConfig {
    fn default() -> Self { Self { top_n: 8, min_similarity: 0.5 } }
}

/// Where the offline-built artifacts live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub text_index: PathBuf,
    pub title_index: PathBuf,
    pub anchor_index: PathBuf,
    pub stats: PathBuf,
    pub vectors: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            text_index: PathBuf::from("./index/text"),
            title_index: PathBuf::from("./index/title"),
            anchor_index: PathBuf::from("./index/anchor"),
            stats: PathBuf::from("./index/stats"),
            vectors: PathBuf::from("./index/vectors.bin"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Queries with at most this many terms take the short-query policy.
    pub short_query_max_terms: usize,
    pub weights: FusionWeights,
    pub expansion: ExpansionConfig,
    pub num_buckets: u32,
    pub corpus_stopwords: Vec<String>,
    pub paths: ArtifactPaths,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            short_query_max_terms: 2,
            weights: FusionWeights::default(),
            expansion: ExpansionConfig::default(),
            num_buckets: DEFAULT_NUM_BUCKETS,
            corpus_stopwords: CORPUS_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            paths: ArtifactPaths::default(),
        }
    }
}

impl SearchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
