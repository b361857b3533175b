//! `chat` command: interactive loop
//!
//! The default strategy is the reflective pipeline. Any pipeline error is
//! displayed and the loop keeps accepting questions; only I/O failure on
//! stdin ends the session. The conversational strategies stream their final
//! answer token by token and carry summary-buffer memory across turns.

use std::io::Write;

use futures::StreamExt;

use crate::ai::provider::create_model;
use crate::chains::{RagChain, Strategy};
use crate::cli::Output;
use crate::config::Config;
use crate::memory::ConversationMemory;
use crate::rag::QueryPipeline;
use crate::types::Result;

pub async fn run(config: &Config, strategy: Option<Strategy>) -> Result<()> {
    let output = Output::new();

    let model = create_model(&config.llm)?;
    let store = super::open_store()?;
    let retriever = super::build_retriever(config, store)?;

    match strategy {
        None => {
            let search = super::build_search(config)?;
            let pipeline = QueryPipeline::new(model, retriever, search);
            output.info("Reflective chat. Type 'exit' to quit.");

            while let Some(question) = read_question()? {
                match pipeline.run(&question, config.pipeline.subqueries).await {
                    Ok(answer) => println!("Buddy: {}", answer),
                    Err(e) => output.error(&format!("{}", e)),
                }
            }
        }
        Some(strategy) => {
            let chain = RagChain::new(model.clone(), retriever, strategy);
            let mut memory = ConversationMemory::new(model, config.memory.max_tokens);
            output.info(&format!(
                "Chat with the {} strategy. Type 'exit' to quit.",
                strategy.as_str()
            ));

            while let Some(question) = read_question()? {
                match chain.answer_stream(&question, &memory.context()).await {
                    Ok((mut stream, _sources)) => {
                        print!("Buddy: ");
                        std::io::stdout().flush()?;

                        let mut answer = String::new();
                        let mut failed = false;
                        while let Some(fragment) = stream.next().await {
                            match fragment {
                                Ok(text) => {
                                    print!("{}", text);
                                    std::io::stdout().flush()?;
                                    answer.push_str(&text);
                                }
                                Err(e) => {
                                    println!();
                                    output.error(&format!("{}", e));
                                    failed = true;
                                    break;
                                }
                            }
                        }
                        if !failed {
                            println!();
                            memory.save_turn(&question, &answer).await?;
                        }
                    }
                    Err(e) => output.error(&format!("{}", e)),
                }
            }
        }
    }

    Ok(())
}

/// Prompt for the next question; `None` means the session is over
fn read_question() -> Result<Option<String>> {
    print!("\nYou: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        return Ok(None); // EOF
    }

    let question = line.trim().to_string();
    if question == "exit" {
        return Ok(None);
    }
    if question.is_empty() {
        return read_question();
    }
    Ok(Some(question))
}
