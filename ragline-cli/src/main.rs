use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ragline_core::config::{Config, LlmProviderKind, VectorStoreKind};
use ragline_core::rag::{build_chunks_from_docs, SourceDocument, EMBEDDING_DIM};
use ragline_core::{EngineStats, RagEngine};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ragline")]
#[command(about = "Ask grounded questions against a document set", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Ingest documents and print engine stats")]
    Ingest {
        #[arg(short, long, help = "YAML or JSON list of {title, section, text} documents")]
        docs: PathBuf,

        #[arg(long, help = "Print stats as JSON")]
        json: bool,
    },

    #[command(about = "Ingest documents, then answer a question from them")]
    Ask {
        #[arg(short, long, help = "YAML or JSON list of {title, section, text} documents")]
        docs: PathBuf,

        #[arg(short, long, help = "Number of sources to retrieve (defaults to storage.top_k)")]
        k: Option<usize>,

        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ragline_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Show => {
            show_config(&config);
            Ok(())
        }
        Commands::Ingest { docs, json } => ingest(&config, &docs, json).await,
        Commands::Ask { docs, k, query } => ask(&config, &docs, k, &query).await,
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        Config::load(path).context("Failed to load config")?
    } else {
        Config::default()
    };
    Ok(config.apply_env())
}

fn show_config(config: &Config) {
    let store = match config.storage.vector_store {
        VectorStoreKind::Memory => "memory",
        VectorStoreKind::Qdrant => "qdrant",
    };
    let provider = match config.llm.provider {
        LlmProviderKind::Stub => "stub",
        LlmProviderKind::OpenAi => "openai",
    };

    println!("{}", "Current Configuration:".bold().green());
    println!();
    println!("{}", "LLM:".bold());
    println!("  Provider:       {}", provider.cyan());
    println!("  Model:          {}", config.llm.model);
    println!("  Base URL:       {}", config.llm.base_url);
    println!("  Temperature:    {}", config.llm.temperature);
    println!(
        "  API Key:        {}",
        if config.llm.api_key.is_some() { "set" } else { "not set" }
    );
    println!();
    println!("{}", "RAG:".bold());
    println!("  Embedding Model: {}", config.rag.embedding_model.cyan());
    println!("  Dimension:       {}", EMBEDDING_DIM);
    println!("  Chunk Size:      {}", config.rag.chunk_size);
    println!("  Chunk Overlap:   {}", config.rag.chunk_overlap);
    println!();
    println!("{}", "Storage:".bold());
    println!("  Vector Store:    {}", store.cyan());
    println!("  URL:             {}", config.storage.url);
    println!("  Collection:      {}", config.storage.collection_name);
    println!("  Top K:           {}", config.storage.top_k);
}

fn read_documents(path: &Path) -> Result<Vec<SourceDocument>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    // YAML is a superset of the JSON we accept
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse documents in {}", path.display()))
}

async fn load_engine(config: &Config, docs: &Path) -> Result<(RagEngine, usize, usize)> {
    let documents = read_documents(docs)?;
    let chunks = build_chunks_from_docs(&documents, config.rag.chunk_size, config.rag.chunk_overlap);

    let mut engine = RagEngine::new(config).await;
    let (new_docs, new_chunks) = engine
        .ingest_chunks(&chunks)
        .await
        .context("Ingestion failed")?;
    Ok((engine, new_docs, new_chunks))
}

async fn ingest(config: &Config, docs: &Path, json: bool) -> Result<()> {
    let (engine, new_docs, new_chunks) = load_engine(config, docs).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.stats())?);
        return Ok(());
    }

    println!(
        "{} Indexed {} documents ({} chunks) into {}",
        "✓".green().bold(),
        new_docs,
        new_chunks,
        engine.store_name().cyan()
    );
    print_stats(&engine.stats());
    Ok(())
}

async fn ask(config: &Config, docs: &Path, k: Option<usize>, query: &str) -> Result<()> {
    let (mut engine, _, _) = load_engine(config, docs).await?;
    let k = k.unwrap_or(config.storage.top_k);

    let citations = engine.retrieve(query, k).await.context("Retrieval failed")?;
    let answer = engine
        .generate(query, &citations)
        .await
        .context("Generation failed")?;

    println!("{}", "Answer:".bold().green());
    println!("{}", answer);
    println!();

    if citations.is_empty() {
        println!("{}", "No sources found.".yellow());
    } else {
        println!("{}", "Citations:".bold());
        for (i, citation) in citations.iter().enumerate() {
            let section = citation.section.as_deref().unwrap_or("-");
            println!("  [{}] {} {} {}", i + 1, citation.title.bold(), "•".cyan(), section);
        }
    }
    println!();
    print_stats(&engine.stats());
    Ok(())
}

fn print_stats(stats: &EngineStats) {
    println!("{}", "Stats:".bold());
    println!("  Documents:            {}", stats.total_docs);
    println!("  Chunks:               {}", stats.total_chunks);
    println!("  Embedding Model:      {}", stats.embedding_model);
    println!("  LLM:                  {}", stats.llm_model);
    println!("  Avg Retrieval (ms):   {:.2}", stats.avg_retrieval_latency_ms);
    println!("  Avg Generation (ms):  {:.2}", stats.avg_generation_latency_ms);
}
