use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use ranker::{build_searcher, run_search};
use ranker_core::{SearchConfig, StatKind};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ranker")]
#[command(about = "Rank documents against precomputed field indexes and popularity signals", long_about = None)]
struct Cli {
    /// JSON configuration file; defaults apply to anything it omits
    #[arg(long)]
    config: Option<PathBuf>,
    /// Text field index directory
    #[arg(long)]
    text_index: Option<PathBuf>,
    /// Title field index directory
    #[arg(long)]
    title_index: Option<PathBuf>,
    /// Anchor field index directory
    #[arg(long)]
    anchor_index: Option<PathBuf>,
    /// Statistics tables directory
    #[arg(long)]
    stats: Option<PathBuf>,
    /// word2vec binary vector file
    #[arg(long)]
    vectors: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fused ranking for a free-text query
    Search {
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 10)]
        top_k: usize,
        /// Page view weight (overrides the config)
        #[arg(long, requires = "w2")]
        w1: Option<f64>,
        /// Page rank weight (overrides the config)
        #[arg(long, requires = "w1")]
        w2: Option<f64>,
        /// Print the response as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print one popularity value per document id
    Stats {
        #[arg(long, value_enum)]
        table: Table,
        ids: Vec<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    PageViews,
    PageRank,
}

impl From<Table> for StatKind {
    fn from(t: Table) -> Self {
        match t {
            Table::PageViews => StatKind::PageViews,
            Table::PageRank => StatKind::PageRank,
        }
    }
}

fn load_config(cli: &Cli) -> Result<SearchConfig> {
    let mut config = match &cli.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };
    let paths = &mut config.paths;
    if let Some(p) = &cli.text_index { paths.text_index = p.clone(); }
    if let Some(p) = &cli.title_index { paths.title_index = p.clone(); }
    if let Some(p) = &cli.anchor_index { paths.anchor_index = p.clone(); }
    if let Some(p) = &cli.stats { paths.stats = p.clone(); }
    if let Some(p) = &cli.vectors { paths.vectors = p.clone(); }
    Ok(config)
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let searcher = build_searcher(&config)?;

    match cli.command {
        Commands::Search { query, top_k, w1, w2, json } => {
            let weights = w1.zip(w2);
            let response = run_search(&searcher, &query, top_k, weights)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else if response.results.is_empty() {
                println!("no results");
            } else {
                for (rank, hit) in response.results.iter().enumerate() {
                    println!("{:>3}. {:<10} {:>12.4}  {}", rank + 1, hit.doc_id, hit.score, hit.title.as_deref().unwrap_or("-"));
                }
                println!("{} hits in {:.3}s", response.total_hits, response.took_s);
            }
        }
        Commands::Stats { table, ids } => {
            for (id, value) in ids.iter().zip(searcher.page_stats(&ids, table.into())) {
                println!("{id}\t{value}");
            }
        }
    }
    Ok(())
}
