//! `ingest` command: load documents into the chunk store

use std::path::PathBuf;

use crate::cli::Output;
use crate::config::Config;
use crate::ingest::Ingestor;
use crate::retrieval::OpenAiEmbedder;
use crate::types::Result;

use std::sync::Arc;

pub async fn run(config: &Config, data_dir: Option<PathBuf>) -> Result<()> {
    let output = Output::new();

    let data_dir = data_dir.unwrap_or_else(|| PathBuf::from(&config.ingest.data_dir));
    if !data_dir.exists() {
        output.error(&format!("Data directory not found: {}", data_dir.display()));
        return Ok(());
    }

    let store = super::open_store()?;
    let embedder = Arc::new(OpenAiEmbedder::new(&config.embedding, &config.llm)?);
    let ingestor = Ingestor::new(store.clone(), embedder, &config.ingest);

    output.info(&format!("Ingesting documents from {}", data_dir.display()));
    let stats = ingestor.run(&data_dir).await?;

    output.success(&format!(
        "Ingested {} documents ({} chunks), {} unchanged",
        stats.documents, stats.chunks, stats.skipped
    ));
    output.info(&format!(
        "Store now holds {} documents / {} chunks",
        store.document_count()?,
        store.chunk_count()?
    ));

    Ok(())
}
