//! `eval` command: score a strategy against a test set

use std::path::{Path, PathBuf};

use console::style;

use crate::ai::provider::create_model;
use crate::chains::{RagChain, Strategy};
use crate::cli::Output;
use crate::config::Config;
use crate::evals::{CaseResult, Evaluator};
use crate::rag::QueryPipeline;
use crate::types::Result;

pub async fn run(
    config: &Config,
    cases_path: &Path,
    strategy: Option<Strategy>,
    output_path: Option<PathBuf>,
) -> Result<()> {
    let output = Output::new();

    let model = create_model(&config.llm)?;
    let store = super::open_store()?;
    let retriever = super::build_retriever(config, store)?;

    let cases = Evaluator::load_cases(cases_path)?;
    let evaluator = Evaluator::new(model.clone());

    let strategy_name = strategy.map(|s| s.as_str()).unwrap_or("reflective");
    output.info(&format!(
        "Evaluating {} strategy on {} cases",
        strategy_name,
        cases.len()
    ));

    let chain = strategy.map(|s| RagChain::new(model.clone(), retriever.clone(), s));
    let pipeline = match strategy {
        None => Some(QueryPipeline::new(
            model.clone(),
            retriever.clone(),
            super::build_search(config)?,
        )),
        Some(_) => None,
    };

    let mut results: Vec<CaseResult> = Vec::with_capacity(cases.len());
    for (i, case) in cases.iter().enumerate() {
        let answer = match (&chain, &pipeline) {
            (Some(chain), _) => chain.answer(&case.question, "").await?.answer,
            (None, Some(pipeline)) => {
                pipeline.run(&case.question, config.pipeline.subqueries).await?
            }
            (None, None) => unreachable!("either a chain or the pipeline is built"),
        };

        let result = evaluator.score_case(case, &answer).await?;
        println!(
            "  [{}/{}] critique {:.2}  correctness {:.2}  {}",
            i + 1,
            cases.len(),
            result.critique_score,
            result.correctness,
            style(&case.question).dim()
        );
        results.push(result);
    }

    let report = evaluator.build_report(strategy_name, results);

    output.section("Results");
    println!("  strategy:         {}", report.strategy);
    println!("  cases:            {}", report.cases.len());
    println!("  mean critique:    {:.3}", report.mean_critique);
    println!("  mean correctness: {:.3}", report.mean_correctness);

    if let Some(path) = output_path {
        Evaluator::write_report(&report, &path)?;
        output.success(&format!("Report written to {}", path.display()));
    }

    Ok(())
}
