pub mod config;
pub mod expand;
pub mod index;
pub mod persist;
pub mod scoring;
pub mod search;
pub mod stats;
pub mod tokenizer;

pub use config::{ArtifactPaths, ExpansionConfig, FusionWeights, SearchConfig};
pub use expand::{QueryExpander, SimilarityModel, WordVectors};
pub use index::{DiskIndex, DocId, Field, FieldIndex, InvertedIndex, Posting};
pub use scoring::ScoredDoc;
pub use search::{Corpus, Searcher};
pub use stats::{lookup_stats, StatKind, StatsTables};
