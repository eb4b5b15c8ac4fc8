use anyhow::Result;
use ranker_core::{Corpus, DocId, SearchConfig, Searcher};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub title: Option<String>,
}

/// Load every artifact named in `config` and wrap them in a shareable searcher.
pub fn build_searcher(config: &SearchConfig) -> Result<Searcher> {
    let start = Instant::now();
    let corpus = Corpus::load(&config.paths)?;
    tracing::info!(documents = corpus.stats.total_documents(), took_s = start.elapsed().as_secs_f64(), "corpus loaded");
    Ok(Searcher::new(Arc::new(corpus), config))
}

/// Run the fused ranking and keep the `top_k` best hits, with titles attached.
pub fn run_search(searcher: &Searcher, query: &str, top_k: usize, weights: Option<(f64, f64)>) -> Result<SearchResponse> {
    let start = Instant::now();
    let ranked = match weights {
        Some((w1, w2)) => searcher.combined_search_weighted(query, w1, w2)?,
        None => searcher.combined_search(query)?,
    };
    let total_hits = ranked.len();
    let stats = &searcher.corpus().stats;
    let results = ranked
        .into_iter()
        .take(top_k)
        .map(|s| SearchHit { doc_id: s.doc_id, score: s.score, title: stats.title(s.doc_id).map(str::to_string) })
        .collect();
    let took_s = start.elapsed().as_secs_f64();
    tracing::debug!(query, total_hits, took_s, "search complete");
    Ok(SearchResponse { query: query.to_string(), took_s, total_hits, results })
}
