#![allow(dead_code)]

use ranker_core::{Corpus, DocId, Field, InvertedIndex, Posting, SimilarityModel, StatsTables};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Similarity model with hand-written neighbour lists.
#[derive(Default)]
pub struct StubModel {
    pub neighbours: HashMap<String, Vec<(String, f32)>>,
    pub lookups: AtomicUsize,
}

impl StubModel {
    pub fn with(mut self, term: &str, neighbours: &[(&str, f32)]) -> Self {
        let list = neighbours.iter().map(|(w, s)| (w.to_string(), *s)).collect();
        self.neighbours.insert(term.to_string(), list);
        self
    }

    pub fn lookup_count(&self) -> usize { self.lookups.load(Ordering::SeqCst) }
}

impl SimilarityModel for StubModel {
    fn contains(&self, term: &str) -> bool { self.neighbours.contains_key(term) }

    fn most_similar(&self, term: &str, top_n: usize) -> Vec<(String, f32)> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let mut list = self.neighbours.get(term).cloned().unwrap_or_default();
        list.truncate(top_n);
        list
    }
}

/// Builds a field index from `(term, [(doc, tf)])` rows.
pub fn field_index(field: Field, rows: &[(&str, &[(DocId, u32)])]) -> InvertedIndex {
    let mut idx = InvertedIndex::new(field);
    for (term, postings) in rows {
        idx.insert(*term, postings.iter().map(|&(d, tf)| Posting::new(d, tf)).collect());
    }
    idx
}

pub fn stats_for(doc_ids: &[DocId]) -> StatsTables {
    let mut stats = StatsTables::default();
    for id in doc_ids {
        stats.titles.insert(*id, format!("Doc {id}"));
    }
    stats
}

pub fn corpus(text: InvertedIndex, title: InvertedIndex, anchor: InvertedIndex, stats: StatsTables, model: StubModel) -> Corpus {
    Corpus { text: Box::new(text), title: Box::new(title), anchor: Box::new(anchor), stats, model: Box::new(model) }
}

pub fn ids(ranked: &[ranker_core::ScoredDoc]) -> Vec<DocId> {
    ranked.iter().map(|s| s.doc_id).collect()
}
