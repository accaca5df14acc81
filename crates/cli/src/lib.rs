use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use docvec_service::{DocumentService, Payload, SearchOutcome, UploadedFile};
use docvec_text_chunker::TextChunker;
use docvec_vector_store::{embedder_from_config, EmbeddingMode, VectorStore};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod http_api;
mod server_security;

pub use config::{AppConfig, ServerConfig, DEFAULT_BIND, DEFAULT_CONFIG_FILE};
pub use http_api::{build_router, UPLOAD_FIELD};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "docvec")]
#[command(about = "JSON document ingestion and exact vector search", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (default: ./docvec.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the index and metadata files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override embedding backend in this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Embedding dimension used when a new index is created
    #[arg(long, global = true)]
    dimension: Option<usize>,

    /// Maximum chunk length in characters
    #[arg(long, global = true)]
    chunk_size: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EmbedMode {
    Hashing,
    Stub,
}

impl From<EmbedMode> for EmbeddingMode {
    fn from(mode: EmbedMode) -> Self {
        match mode {
            EmbedMode::Hashing => Self::Hashing,
            EmbedMode::Stub => Self::Stub,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the upload/search HTTP API
    ServeHttp(ServeArgs),

    /// Ingest JSON (or plain text) files into the store
    Ingest(IngestArgs),

    /// Search stored chunks by text
    Search(SearchArgs),

    /// Print store statistics as JSON
    Stats,

    /// Print the resolved configuration as TOML
    Config,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address (default from [server].bind, 127.0.0.1:8000)
    #[arg(long)]
    bind: Option<String>,

    /// Allow binding to non-loopback addresses
    #[arg(long)]
    public: bool,
}

#[derive(Args)]
struct IngestArgs {
    /// Files to ingest; each file gets its own file id
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Args)]
struct SearchArgs {
    /// Query text
    query: String,

    /// Number of results (default from [search].top_k, else all)
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Output JSON instead of the human-readable listing
    #[arg(long)]
    json: bool,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.store.data_dir = dir;
    }
    if let Some(mode) = cli.embed_mode {
        config.embedding.mode = mode.into();
    }
    if let Some(dimension) = cli.dimension {
        config.embedding.dimension = dimension;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.chunker.chunk_size = chunk_size;
    }

    match cli.command {
        Commands::ServeHttp(args) => serve_http(args, config).await?,
        Commands::Ingest(args) => run_ingest(args, config).await?,
        Commands::Search(args) => run_search(args, config).await?,
        Commands::Stats => run_stats(config).await?,
        Commands::Config => {
            config.validate()?;
            print_stdout(config.to_toml()?.trim_end())?;
        }
    }

    Ok(())
}

/// Open the store and wire the chunker and embedder around it
async fn open_service(config: &AppConfig) -> Result<DocumentService> {
    config.validate()?;
    let embedder = embedder_from_config(&config.embedding)?;
    let store = VectorStore::open(config.store.clone(), embedder.dimension())
        .await
        .with_context(|| {
            format!(
                "Failed to open store in {}",
                config.store.data_dir.display()
            )
        })?;
    let chunker = TextChunker::new(config.chunker.clone())?;
    let service =
        DocumentService::new(Arc::new(store), chunker, embedder, config.search.clone()).await?;
    Ok(service)
}

async fn serve_http(args: ServeArgs, mut config: AppConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    let bind = config.server.bind.clone();
    server_security::check_bind_address(&bind, args.public).await?;

    let service = open_service(&config).await?;
    let store = service.store().clone();
    let app = build_router(service);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");

    print_stdout(&format!("Serving docvec API: {base_url}/api/v1"))?;
    print_stdout(&format!("Health endpoint: {base_url}/"))?;
    print_stdout(&format!(
        "Try: curl -X POST {base_url}/api/v1/upload -F '{UPLOAD_FIELD}=@doc.json'"
    ))?;
    print_stdout(&format!(
        "Try: curl -X POST '{base_url}/api/v1/search?query=hello'"
    ))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped, flushing store");
    store.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}

async fn run_ingest(args: IngestArgs, config: AppConfig) -> Result<()> {
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path.display().to_string();
        let payload = Payload::from_upload(&name, None, bytes);
        files.push(UploadedFile { name, payload });
    }

    let service = open_service(&config).await?;
    let report = service.ingest_batch(files).await?;
    service.store().shutdown().await?;

    log::info!("{}", report.message);
    print_stdout(&serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

async fn run_search(args: SearchArgs, mut config: AppConfig) -> Result<()> {
    if args.top_k.is_some() {
        config.search.top_k = args.top_k;
    }
    let service = open_service(&config).await?;
    let outcome = service.search(&args.query).await?;

    let hits = match outcome {
        SearchOutcome::NotReady => {
            anyhow::bail!("Index not initialized. Ingest some documents first.")
        }
        SearchOutcome::Hits(hits) => hits,
    };

    if args.json {
        print_stdout(&serde_json::to_string_pretty(&hits)?)?;
        return Ok(());
    }
    if hits.is_empty() {
        print_stdout("No matching records found")?;
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        print_stdout(&format!(
            "{}. {} (file {}, distance {:.4})",
            rank + 1,
            hit.metadata.source,
            hit.metadata.file_id,
            hit.score
        ))?;
        print_stdout(&format!("   {}", hit.metadata.chunk))?;
    }
    Ok(())
}

async fn run_stats(config: AppConfig) -> Result<()> {
    let service = open_service(&config).await?;
    let stats = service.stats().await;
    print_stdout(&serde_json::to_string_pretty(&stats)?)?;
    Ok(())
}
