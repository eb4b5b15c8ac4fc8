//! Per-document statistics loaded once at startup: lengths, page views, page rank and titles.

use crate::persist::{load_table, StatsPaths};
use crate::DocId;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which popularity table a lookup reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatKind {
    PageViews,
    PageRank,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsTables {
    pub doc_length: HashMap<DocId, u32>,
    pub page_views: HashMap<DocId, u64>,
    pub page_rank: HashMap<DocId, f64>,
    pub titles: HashMap<DocId, String>,
}

impl StatsTables {
    pub fn load(paths: &StatsPaths) -> Result<Self> {
        let tables = Self {
            doc_length: load_table(&paths.doc_length())?,
            page_views: load_table(&paths.page_views())?,
            page_rank: load_table(&paths.page_rank())?,
            titles: load_table(&paths.titles())?,
        };
        tracing::info!(
            documents = tables.titles.len(),
            page_views = tables.page_views.len(),
            page_rank = tables.page_rank.len(),
            "loaded statistics tables"
        );
        Ok(tables)
    }

    /// Corpus size used as the IDF numerator.
    pub fn total_documents(&self) -> usize { self.titles.len() }

    pub fn page_views_of(&self, doc_id: DocId) -> f64 {
        self.page_views.get(&doc_id).copied().unwrap_or(0) as f64
    }

    pub fn page_rank_of(&self, doc_id: DocId) -> f64 {
        self.page_rank.get(&doc_id).copied().unwrap_or(0.0)
    }

    pub fn title(&self, doc_id: DocId) -> Option<&str> { self.titles.get(&doc_id).map(String::as_str) }

    /// Popularity values for `doc_ids` as f64, zero where unknown.
    pub fn lookup(&self, doc_ids: &[DocId], kind: StatKind) -> Vec<f64> {
        match kind {
            StatKind::PageViews => lookup_stats(doc_ids, &self.page_views).into_iter().map(|v| v as f64).collect(),
            StatKind::PageRank => lookup_stats(doc_ids, &self.page_rank),
        }
    }
}

/// One value per id, in input order; ids missing from `table` yield the zero value.
pub fn lookup_stats<V: Copy + Default>(doc_ids: &[DocId], table: &HashMap<DocId, V>) -> Vec<V> {
    doc_ids.iter().map(|id| table.get(id).copied().unwrap_or_default()).collect()
}
