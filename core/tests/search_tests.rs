mod common;

use common::{corpus, field_index, ids, stats_for, StubModel};
use ranker_core::persist::{save_index, save_table, save_word_vectors, IndexPaths, StatsPaths};
use ranker_core::{ArtifactPaths, Corpus, DiskIndex, Field, FieldIndex, SearchConfig, Searcher, StatKind};
use ranker_core::SimilarityModel;
use std::path::Path;
use std::sync::Arc;

/// Lets a test keep a handle on the model it hands to the corpus.
struct SharedModel(Arc<StubModel>);

impl SimilarityModel for SharedModel {
    fn contains(&self, term: &str) -> bool { self.0.contains(term) }
    fn most_similar(&self, term: &str, top_n: usize) -> Vec<(String, f32)> { self.0.most_similar(term, top_n) }
}

const A: u32 = 1;
const B: u32 = 2;
const C: u32 = 3;

/// Doc A matches "rust", "compiler" and "borrow" in every field; B has "rust" only in its anchor text.
fn three_doc_corpus() -> Corpus {
    let text = field_index(Field::Text, &[("rust", &[(A, 3)]), ("compiler", &[(A, 1)]), ("borrow", &[(A, 2)])]);
    let title = field_index(Field::Title, &[("rust", &[(A, 1)]), ("compiler", &[(A, 1)]), ("borrow", &[(A, 1)])]);
    let anchor = field_index(Field::Anchor, &[("rust", &[(A, 1), (B, 4)]), ("compiler", &[(A, 1)]), ("borrow", &[(A, 1)])]);
    let mut stats = stats_for(&[A, B, C]);
    stats.page_views.insert(A, 100);
    stats.page_views.insert(B, 10);
    stats.page_rank.insert(A, 0.5);
    stats.page_rank.insert(B, 0.9);
    corpus(text, title, anchor, stats, StubModel::default())
}

#[test]
fn long_query_ranks_intersection_by_popularity() {
    let searcher = Searcher::new(Arc::new(three_doc_corpus()), &SearchConfig::default());
    let ranked = searcher.combined_search("rust compiler borrow").unwrap();
    assert_eq!(ids(&ranked), vec![A]);
    assert!((ranked[0].score - 97.015).abs() < 1e-9);
}

#[test]
fn long_query_honours_explicit_weights() {
    let searcher = Searcher::new(Arc::new(three_doc_corpus()), &SearchConfig::default());
    let ranked = searcher.combined_search_weighted("rust compiler borrow", 0.0, 1.0).unwrap();
    assert_eq!(ranked.len(), 1);
    assert!((ranked[0].score - 0.5).abs() < 1e-12);
}

#[test]
fn long_query_with_empty_intersection_returns_nothing() {
    // Every term hits the text field, but no document is in all three result sets.
    let text = field_index(Field::Text, &[("rust", &[(A, 1)]), ("python", &[(A, 1)]), ("java", &[(A, 1)])]);
    let title = field_index(Field::Title, &[("rust", &[(B, 1)])]);
    let anchor = field_index(Field::Anchor, &[("rust", &[(A, 1)])]);
    let c = corpus(text, title, anchor, stats_for(&[A, B, C]), StubModel::default());
    let searcher = Searcher::new(Arc::new(c), &SearchConfig::default());
    assert!(searcher.combined_search("rust python java").unwrap().is_empty());
}

fn branch_corpus() -> Corpus {
    let text = field_index(Field::Text, &[("rust", &[(1, 2)])]);
    let title = field_index(Field::Title, &[("rust", &[(1, 1), (4, 1)]), ("compiler", &[(4, 1)])]);
    let anchor = field_index(Field::Anchor, &[("borrow", &[(1, 1)])]);
    let mut stats = stats_for(&[1, 2, 3, 4]);
    stats.page_views.insert(1, 20);
    stats.page_rank.insert(1, 1.0);
    corpus(text, title, anchor, stats, StubModel::default())
}

#[test]
fn two_terms_take_the_short_query_policy() {
    let searcher = Searcher::new(Arc::new(branch_corpus()), &SearchConfig::default());
    let ranked = searcher.combined_search("rust compiler").unwrap();
    assert_eq!(ids(&ranked), vec![4, 1]);
    // Title-only match keeps its coverage count.
    assert_eq!(ranked[0].score, 2.0);
    // Text TF-IDF overwrites the title count for doc 1.
    assert!((ranked[1].score - 2.0 * 4f64.log10()).abs() < 1e-12);
}

#[test]
fn three_terms_take_the_long_query_policy() {
    let searcher = Searcher::new(Arc::new(branch_corpus()), &SearchConfig::default());
    let ranked = searcher.combined_search("rust compiler borrow").unwrap();
    assert_eq!(ids(&ranked), vec![1]);
    assert!((ranked[0].score - (0.97 * 20.0 + 0.03 * 1.0)).abs() < 1e-12);
}

#[test]
fn branch_uses_unexpanded_term_count() {
    let mut c = branch_corpus();
    c.model = Box::new(StubModel::default().with("rust", &[("ferris", 0.9), ("cargo", 0.8)]));
    let searcher = Searcher::new(Arc::new(c), &SearchConfig::default());
    // Expansion grows the query to four terms, the policy still sees two.
    let ranked = searcher.combined_search("rust compiler").unwrap();
    assert_eq!(ids(&ranked), vec![4, 1]);
}

#[test]
fn combined_search_expands_each_token_once() {
    let model = Arc::new(
        StubModel::default()
            .with("rust", &[("ferris", 0.9)])
            .with("compiler", &[("rustc", 0.8)])
            .with("borrow", &[("lend", 0.7)]),
    );
    let mut c = branch_corpus();
    c.model = Box::new(SharedModel(Arc::clone(&model)));
    let searcher = Searcher::new(Arc::new(c), &SearchConfig::default());

    searcher.combined_search("rust compiler borrow").unwrap();
    assert_eq!(model.lookup_count(), 3);
    searcher.combined_search("rust compiler").unwrap();
    assert_eq!(model.lookup_count(), 5);
}

#[test]
fn short_query_boundary_is_configurable() {
    let config = SearchConfig { short_query_max_terms: 3, ..SearchConfig::default() };
    let searcher = Searcher::new(Arc::new(branch_corpus()), &config);
    let ranked = searcher.combined_search("rust compiler borrow").unwrap();
    assert_eq!(ids(&ranked), vec![4, 1]);
}

#[test]
fn queries_without_terms_return_nothing() {
    let searcher = Searcher::new(Arc::new(branch_corpus()), &SearchConfig::default());
    assert!(searcher.combined_search("").unwrap().is_empty());
    assert!(searcher.combined_search("the of and").unwrap().is_empty());
}

#[test]
fn page_stats_default_missing_ids_to_zero() {
    let searcher = Searcher::new(Arc::new(three_doc_corpus()), &SearchConfig::default());
    assert_eq!(searcher.page_stats(&[999], StatKind::PageViews), vec![0.0]);
    assert_eq!(searcher.page_stats(&[B, 999, A], StatKind::PageRank), vec![0.9, 0.0, 0.5]);
}

fn write_artifacts(root: &Path, config: &SearchConfig) -> ArtifactPaths {
    let paths = ArtifactPaths {
        text_index: root.join("text"),
        title_index: root.join("title"),
        anchor_index: root.join("anchor"),
        stats: root.join("stats"),
        vectors: root.join("vectors.bin"),
    };
    let Corpus { stats, .. } = three_doc_corpus();
    let text = field_index(Field::Text, &[("rust", &[(A, 3)]), ("compiler", &[(A, 1)]), ("borrow", &[(A, 2)]), ("cargo", &[(B, 1)])]);
    let title = field_index(Field::Title, &[("rust", &[(A, 1)]), ("compiler", &[(A, 1)]), ("borrow", &[(A, 1)])]);
    let anchor = field_index(Field::Anchor, &[("rust", &[(A, 1), (B, 4)]), ("compiler", &[(A, 1)]), ("borrow", &[(A, 1)])]);
    save_index(&IndexPaths::new(&paths.text_index), &text, config.num_buckets).unwrap();
    save_index(&IndexPaths::new(&paths.title_index), &title, config.num_buckets).unwrap();
    save_index(&IndexPaths::new(&paths.anchor_index), &anchor, config.num_buckets).unwrap();

    let stats_paths = StatsPaths::new(&paths.stats);
    save_table(&stats_paths.doc_length(), &stats.doc_length).unwrap();
    save_table(&stats_paths.page_views(), &stats.page_views).unwrap();
    save_table(&stats_paths.page_rank(), &stats.page_rank).unwrap();
    save_table(&stats_paths.titles(), &stats.titles).unwrap();

    let vectors = vec![
        ("rust".to_string(), vec![1.0, 0.0, 0.0]),
        ("cargo".to_string(), vec![0.9, 0.2, 0.0]),
        ("python".to_string(), vec![0.0, 0.0, 1.0]),
    ];
    save_word_vectors(&paths.vectors, &vectors).unwrap();
    paths
}

#[test]
fn disk_artifacts_reproduce_in_memory_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let config = SearchConfig::default();
    let paths = write_artifacts(dir.path(), &config);

    let corpus = Corpus::load(&paths).unwrap();
    assert_eq!(corpus.stats.total_documents(), 3);
    assert_eq!(corpus.field(Field::Anchor).document_frequency("rust"), Some(2));
    assert!(corpus.field(Field::Title).read_postings("cargo").unwrap().is_empty());

    let searcher = Searcher::new(Arc::new(corpus), &config);
    let ranked = searcher.combined_search("rust compiler borrow").unwrap();
    assert_eq!(ids(&ranked), vec![A]);
    assert!((ranked[0].score - 97.015).abs() < 1e-9);

    // "rust" expands to "cargo" through the vector file, pulling in B's text.
    let short = searcher.combined_search("rust").unwrap();
    let mut found = ids(&short);
    found.sort();
    assert_eq!(found, vec![A, B]);
}

#[test]
fn disk_index_reads_postings_through_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let idx = field_index(Field::Text, &[("alpha", &[(1, 2), (5, 1)]), ("beta", &[(2, 7)])]);
    let paths = IndexPaths::new(dir.path());
    save_index(&paths, &idx, 4).unwrap();

    let disk = DiskIndex::open(IndexPaths::new(dir.path())).unwrap();
    assert_eq!(disk.field(), Field::Text);
    assert_eq!(disk.num_terms(), 2);
    assert_eq!(disk.document_frequency("alpha"), Some(2));
    assert_eq!(disk.read_postings("beta").unwrap(), idx.postings["beta"]);
    assert!(disk.read_postings("gamma").unwrap().is_empty());
}

#[test]
fn index_in_the_wrong_slot_fails_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_artifacts(dir.path(), &SearchConfig::default());
    std::mem::swap(&mut paths.text_index, &mut paths.title_index);
    let err = Corpus::load(&paths).err().unwrap();
    assert!(err.to_string().contains("holds the title index"));
}

#[test]
fn missing_artifacts_fail_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths {
        text_index: dir.path().join("nope"),
        ..ArtifactPaths::default()
    };
    assert!(Corpus::load(&paths).is_err());
}
