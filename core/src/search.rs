//! Query orchestration: tokenize, optionally expand, score per field and fuse.
//!
//! Short queries (up to `short_query_max_terms` terms before expansion) favour recall:
//! title coverage counts are merged with text TF-IDF, the TF-IDF value winning for
//! documents found in both. The two scales are never normalised against each other.
//!
//! Longer queries favour precision: only documents matched in text, title and anchor
//! survive, and they are ranked purely by weighted page views and page rank. An empty
//! intersection is an empty result, not a fallback to the short policy.

use crate::config::{ArtifactPaths, FusionWeights, SearchConfig};
use crate::expand::{QueryExpander, SimilarityModel, WordVectors};
use crate::index::{DiskIndex, Field, FieldIndex};
use crate::persist::{IndexPaths, StatsPaths};
use crate::scoring::{binary_scores, into_ranking, tfidf_scores, ScoredDoc};
use crate::stats::{StatKind, StatsTables};
use crate::tokenizer::Tokenizer;
use crate::DocId;
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Everything loaded once at startup and shared read-only between queries.
pub struct Corpus {
    pub text: Box<dyn FieldIndex>,
    pub title: Box<dyn FieldIndex>,
    pub anchor: Box<dyn FieldIndex>,
    pub stats: StatsTables,
    pub model: Box<dyn SimilarityModel>,
}

impl Corpus {
    /// Open every artifact; any missing or corrupt file is a startup failure.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        Ok(Self {
            text: Box::new(open_field(&paths.text_index, Field::Text)?),
            title: Box::new(open_field(&paths.title_index, Field::Title)?),
            anchor: Box::new(open_field(&paths.anchor_index, Field::Anchor)?),
            stats: StatsTables::load(&StatsPaths::new(&paths.stats))?,
            model: Box::new(WordVectors::load(&paths.vectors)?),
        })
    }

    pub fn field(&self, field: Field) -> &dyn FieldIndex {
        match field {
            Field::Text => &*self.text,
            Field::Title => &*self.title,
            Field::Anchor => &*self.anchor,
        }
    }
}

fn open_field(root: &Path, expected: Field) -> Result<DiskIndex> {
    let index = DiskIndex::open(IndexPaths::new(root))?;
    if index.field() != expected {
        bail!("{} holds the {} index, configured as {}", root.display(), index.field(), expected);
    }
    Ok(index)
}

#[derive(Clone)]
pub struct Searcher {
    corpus: Arc<Corpus>,
    tokenizer: Tokenizer,
    expander: QueryExpander,
    short_query_max_terms: usize,
    weights: FusionWeights,
}

impl Searcher {
    pub fn new(corpus: Arc<Corpus>, config: &SearchConfig) -> Self {
        Self {
            corpus,
            tokenizer: Tokenizer::from_config(config),
            expander: QueryExpander::new(config.expansion),
            short_query_max_terms: config.short_query_max_terms,
            weights: config.weights,
        }
    }

    pub fn corpus(&self) -> &Corpus { &self.corpus }

    pub fn tokenizer(&self) -> &Tokenizer { &self.tokenizer }

    fn query_terms(&self, query: &str, expand: bool) -> Vec<String> {
        let tokens = self.tokenizer.tokenize(query);
        if expand {
            self.expander.expand(&tokens, &*self.corpus.model)
        } else {
            tokens
        }
    }

    fn tfidf_map(&self, terms: &[String], field: Field) -> Result<HashMap<DocId, f64>> {
        tfidf_scores(terms, self.corpus.field(field), self.corpus.stats.total_documents())
    }

    fn binary_map(&self, terms: &[String], field: Field) -> Result<HashMap<DocId, f64>> {
        binary_scores(terms, self.corpus.field(field))
    }

    /// TF-IDF ranking of `query` against one field.
    pub fn score_tfidf(&self, query: &str, field: Field, expand: bool) -> Result<Vec<ScoredDoc>> {
        let terms = self.query_terms(query, expand);
        Ok(into_ranking(self.tfidf_map(&terms, field)?))
    }

    /// Distinct-term coverage ranking of `query` against one field.
    pub fn score_binary(&self, query: &str, field: Field, expand: bool) -> Result<Vec<ScoredDoc>> {
        let terms = self.query_terms(query, expand);
        Ok(into_ranking(self.binary_map(&terms, field)?))
    }

    /// Fused ranking using the configured popularity weights.
    pub fn combined_search(&self, query: &str) -> Result<Vec<ScoredDoc>> {
        self.combined_search_weighted(query, self.weights.page_views, self.weights.page_rank)
    }

    /// Fused ranking with explicit weights: `w1` for page views, `w2` for page rank.
    pub fn combined_search_weighted(&self, query: &str, w1: f64, w2: f64) -> Result<Vec<ScoredDoc>> {
        let tokens = self.tokenizer.tokenize(query);
        let num_terms = tokens.len();
        // The policy is chosen on the unexpanded count; scoring uses the expanded terms.
        let terms = self.expander.expand(&tokens, &*self.corpus.model);
        if num_terms <= self.short_query_max_terms {
            tracing::debug!(num_terms, expanded = terms.len(), "short query policy");
            let mut results = self.binary_map(&terms, Field::Title)?;
            results.extend(self.tfidf_map(&terms, Field::Text)?);
            return Ok(into_ranking(results));
        }

        tracing::debug!(num_terms, expanded = terms.len(), "long query policy");
        let text = self.tfidf_map(&terms, Field::Text)?;
        let title = self.binary_map(&terms, Field::Title)?;
        let anchor = self.binary_map(&terms, Field::Anchor)?;
        let stats = &self.corpus.stats;
        let combined: HashMap<DocId, f64> = text
            .keys()
            .filter(|id| title.contains_key(id) && anchor.contains_key(id))
            .map(|&id| (id, w1 * stats.page_views_of(id) + w2 * stats.page_rank_of(id)))
            .collect();
        Ok(into_ranking(combined))
    }

    /// Popularity values for a batch of ids, zero where unknown.
    pub fn page_stats(&self, doc_ids: &[DocId], kind: StatKind) -> Vec<f64> {
        self.corpus.stats.lookup(doc_ids, kind)
    }
}
