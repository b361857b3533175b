//! `ask` command: answer one question through the reflective pipeline

use crate::ai::provider::create_model;
use crate::cli::Output;
use crate::config::Config;
use crate::rag::QueryPipeline;
use crate::types::Result;

pub async fn run(config: &Config, question: &str, subqueries: Option<usize>) -> Result<()> {
    let output = Output::new();

    let model = create_model(&config.llm)?;
    let store = super::open_store()?;
    let retriever = super::build_retriever(config, store)?;
    let search = super::build_search(config)?;

    let pipeline = QueryPipeline::new(model, retriever, search);
    let count = subqueries.unwrap_or(config.pipeline.subqueries);

    let answer = pipeline.run(question, count).await?;

    output.header("Answer");
    println!("{}", answer);
    Ok(())
}
