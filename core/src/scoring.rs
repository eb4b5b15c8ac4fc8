//! Per-field scoring over posting lists.
//!
//! Both scorers walk the distinct query terms that have a document frequency in the
//! field, and skip every other term without touching the postings. They differ only in
//! what a matching posting adds to the document's total:
//!
//! - TF-IDF: `tf * log10(N / df)`, summed over terms.
//! - Binary coverage: `1` per distinct matching term, whatever the frequency.

use crate::index::FieldIndex;
use crate::DocId;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Materialise a score map as a descending ranking; equal scores fall back to ascending id.
pub fn into_ranking(scores: HashMap<DocId, f64>) -> Vec<ScoredDoc> {
    let mut ranked: Vec<ScoredDoc> = scores.into_iter().map(|(doc_id, score)| ScoredDoc { doc_id, score }).collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.doc_id.cmp(&b.doc_id))
    });
    ranked
}

/// Distinct terms in first-occurrence order.
fn distinct<'a>(terms: &'a [String]) -> impl Iterator<Item = &'a str> {
    let mut seen = HashSet::new();
    terms.iter().map(String::as_str).filter(move |t| seen.insert(*t))
}

pub fn idf(total_documents: usize, document_frequency: u32) -> f64 {
    (total_documents as f64 / f64::from(document_frequency)).log10()
}

/// Sum of `tf * idf` over the distinct terms present in `index`.
pub fn tfidf_scores(terms: &[String], index: &dyn FieldIndex, total_documents: usize) -> Result<HashMap<DocId, f64>> {
    let mut scores: HashMap<DocId, f64> = HashMap::new();
    if total_documents == 0 {
        return Ok(scores);
    }
    for term in distinct(terms) {
        let df = match index.document_frequency(term) {
            Some(df) if df > 0 => df,
            _ => continue,
        };
        let w = idf(total_documents, df);
        for p in index.read_postings(term)? {
            *scores.entry(p.doc_id).or_insert(0.0) += f64::from(p.tf) * w;
        }
    }
    tracing::debug!(field = %index.field(), matched = scores.len(), "tf-idf pass");
    Ok(scores)
}

/// Number of distinct terms from `terms` whose postings include each document.
pub fn binary_scores(terms: &[String], index: &dyn FieldIndex) -> Result<HashMap<DocId, f64>> {
    let mut scores: HashMap<DocId, f64> = HashMap::new();
    for term in distinct(terms) {
        if !matches!(index.document_frequency(term), Some(df) if df > 0) {
            continue;
        }
        let docs: HashSet<DocId> = index.read_postings(term)?.into_iter().map(|p| p.doc_id).collect();
        for doc_id in docs {
            *scores.entry(doc_id).or_insert(0.0) += 1.0;
        }
    }
    tracing::debug!(field = %index.field(), matched = scores.len(), "binary pass");
    Ok(scores)
}
