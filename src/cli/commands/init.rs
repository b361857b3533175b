//! `init` command: scaffold project configuration

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

pub fn run(force: bool) -> Result<()> {
    let output = Output::new();

    let project_dir = ConfigLoader::init_project(force)?;
    output.success(&format!("Initialized project in {}", project_dir.display()));
    output.info("Next steps:");
    println!("  1. Put your program documents under ./data (txt, md, json, pdf)");
    println!("  2. Set OPENAI_API_KEY in your environment");
    println!("  3. Run `bullbuddy ingest`, then `bullbuddy chat`");

    Ok(())
}
