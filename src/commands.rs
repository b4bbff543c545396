use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::database::{PdfPipeline, VectorIndex};
use crate::documents::{PdfIndexer, pdftotext_available};
use crate::embeddings::OllamaClient;
use crate::generation::GeminiClient;
use crate::memory::SessionId;
use crate::rag::{AnswerGenerator, Assistant, KeywordClassifier, SourceAttribution};
use crate::web::{self, AppState};

/// Connect to Ollama and open the configured vector index
#[inline]
pub async fn open_index(config: &Config) -> Result<VectorIndex> {
    let embedder =
        OllamaClient::new(config).context("Failed to create Ollama client from config")?;

    VectorIndex::open(config, Arc::new(embedder))
        .await
        .context("Failed to open vector index")
}

/// Wire retrieval, generation and attribution into an `Assistant`
#[inline]
pub fn build_assistant(config: &Config, index: VectorIndex) -> Result<Assistant> {
    let model = GeminiClient::new(&config.generation).context("Failed to create Gemini client")?;
    if !model.has_api_key() {
        warn!("GOOGLE_API_KEY is not set; chat requests will fail until it is");
    }

    let generator = AnswerGenerator::new(Arc::new(index), Arc::new(model))
        .with_top_k(config.vector_store.top_k);
    let attribution =
        SourceAttribution::new(KeywordClassifier::new(&config.attribution.keywords));

    Ok(Assistant::new(generator, attribution).with_history_window(config.memory.history_window))
}

/// Start the web server
#[inline]
pub async fn serve(config: &Config) -> Result<()> {
    let health = OllamaClient::new(config).context("Failed to create Ollama client from config")?;
    match tokio::task::spawn_blocking(move || health.health_check()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Ollama health check failed: {:#}", e),
        Err(e) => warn!("Ollama health check did not complete: {}", e),
    }
    if !pdftotext_available().await {
        warn!("pdftotext was not found; PDF uploads will fail until poppler-utils is installed");
    }

    let index = open_index(config).await?;
    let indexer = PdfPipeline::new(index.clone(), config.chunking.clone());
    let assistant = build_assistant(config, index)?;

    let state = Arc::new(AppState {
        assistant,
        indexer: Arc::new(indexer),
        upload_dir: config.upload_dir_path(),
    });

    let app = web::router(state, config.server.max_upload_bytes);
    web::serve(&config.bind_address(), app).await
}

/// Ingest and index PDFs from arbitrary paths
#[inline]
pub async fn ingest(config: &Config, paths: &[PathBuf]) -> Result<()> {
    let index = open_index(config).await?;
    let pipeline = PdfPipeline::new(index, config.chunking.clone());

    let mut failures = 0;
    for path in paths {
        match pipeline.index_pdf(path).await {
            Ok(chunks) => println!(
                "{} {} ({} chunks)",
                style("Indexed").green(),
                path.display(),
                chunks
            ),
            Err(e) => {
                error!("Failed to index {}: {}", path.display(), e);
                println!("{} {}: {}", style("Failed").red(), path.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files could not be indexed", failures, paths.len());
    }

    Ok(())
}

/// Index every PDF in the upload directory
#[inline]
pub async fn reindex(config: &Config) -> Result<()> {
    let upload_dir = config.upload_dir_path();
    let pdfs = find_pdfs(&upload_dir)?;

    if pdfs.is_empty() {
        println!("No PDF files found in {}", upload_dir.display());
        return Ok(());
    }

    info!("Re-indexing {} PDFs from {}", pdfs.len(), upload_dir.display());

    let index = open_index(config).await?;
    let pipeline = PdfPipeline::new(index, config.chunking.clone());

    let bar = if console::user_attended_stderr() {
        ProgressBar::new(pdfs.len() as u64).with_style(
            ProgressStyle::with_template("{bar:30} [{pos}/{len}] Indexing {msg}")
                .context("Invalid progress bar template")?,
        )
    } else {
        ProgressBar::hidden()
    };

    let mut total_chunks = 0;
    let mut failures = 0;
    for path in &pdfs {
        bar.set_message(
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        match pipeline.index_pdf(path).await {
            Ok(chunks) => total_chunks += chunks,
            Err(e) => {
                bar.suspend(|| error!("Failed to index {}: {}", path.display(), e));
                failures += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!(
        "Indexed {} chunks from {} PDFs ({} failed)",
        total_chunks,
        pdfs.len() - failures,
        failures
    );

    Ok(())
}

/// Answer a single message from the terminal
#[inline]
pub async fn ask(config: &Config, message: &str) -> Result<()> {
    let index = open_index(config).await?;
    let assistant = build_assistant(config, index)?;

    let answer = assistant
        .chat(&SessionId::generate(), message)
        .await
        .context("Failed to answer message")?;

    println!("{}", answer);
    Ok(())
}

/// PDF files directly inside `dir`, sorted by name. A missing directory has none.
#[inline]
pub fn find_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }

    pdfs.sort();
    Ok(pdfs)
}
