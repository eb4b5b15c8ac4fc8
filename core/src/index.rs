use crate::persist::{load_df, load_field_meta, load_posting_locs, read_posting_slice, IndexPaths, PostingLoc};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type DocId = u32;

/// The indexed document fields, each backed by its own artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Text,
    Title,
    Anchor,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Text => "text",
            Field::Title => "title",
            Field::Anchor => "anchor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32, // occurrences of the term in this field of the document
}

impl Posting {
    pub fn new(doc_id: DocId, tf: u32) -> Self { Self { doc_id, tf } }
}

/// Read access to one field's inverted index.
///
/// Posting lists carry no ordering guarantee. A term unknown to
/// `document_frequency` is treated as "no match" and never looked up.
pub trait FieldIndex: Send + Sync {
    fn field(&self) -> Field;
    fn document_frequency(&self, term: &str) -> Option<u32>;
    fn read_postings(&self, term: &str) -> Result<Vec<Posting>>;
}

/// Fully in-memory field index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub field: Field,
    pub df: HashMap<String, u32>,
    pub postings: HashMap<String, Vec<Posting>>,
}

impl InvertedIndex {
    pub fn new(field: Field) -> Self {
        Self { field, df: HashMap::new(), postings: HashMap::new() }
    }

    /// Registers a term's posting list; df is the number of distinct documents in it.
    pub fn insert(&mut self, term: impl Into<String>, postings: Vec<Posting>) {
        let term = term.into();
        let mut ids: Vec<DocId> = postings.iter().map(|p| p.doc_id).collect();
        ids.sort_unstable();
        ids.dedup();
        self.df.insert(term.clone(), ids.len() as u32);
        self.postings.insert(term, postings);
    }

    pub fn num_terms(&self) -> usize { self.df.len() }
}

impl FieldIndex for InvertedIndex {
    fn field(&self) -> Field { self.field }

    fn document_frequency(&self, term: &str) -> Option<u32> { self.df.get(term).copied() }

    fn read_postings(&self, term: &str) -> Result<Vec<Posting>> {
        Ok(self.postings.get(term).cloned().unwrap_or_default())
    }
}

/// Field index with the df and location tables resident; each posting list is read on demand.
pub struct DiskIndex {
    field: Field,
    paths: IndexPaths,
    df: HashMap<String, u32>,
    locs: HashMap<String, PostingLoc>,
}

impl DiskIndex {
    pub fn open(paths: IndexPaths) -> Result<Self> {
        let meta = load_field_meta(&paths)?;
        let df = load_df(&paths)?;
        let locs = load_posting_locs(&paths)?;
        tracing::info!(field = %meta.field, num_terms = df.len(), num_buckets = meta.num_buckets, root = %paths.root.display(), "opened field index");
        Ok(Self { field: meta.field, paths, df, locs })
    }

    pub fn num_terms(&self) -> usize { self.df.len() }
}

impl FieldIndex for DiskIndex {
    fn field(&self) -> Field { self.field }

    fn document_frequency(&self, term: &str) -> Option<u32> { self.df.get(term).copied() }

    fn read_postings(&self, term: &str) -> Result<Vec<Posting>> {
        match self.locs.get(term) {
            Some(loc) => read_posting_slice(&self.paths, loc),
            None => Ok(Vec::new()),
        }
    }
}
