use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bullbuddy::chains::Strategy;
use bullbuddy::config::ConfigLoader;

#[derive(Parser)]
#[command(name = "bullbuddy")]
#[command(
    version,
    about = "Self-reflective retrieval-augmented chat assistant for university program Q&A"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Load configuration from a specific file")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Bull Buddy in the current directory
    Init {
        #[arg(long, short, help = "Overwrite existing configuration")]
        force: bool,
    },

    /// Load documents into the chunk store
    Ingest {
        #[arg(long, help = "Data directory override")]
        data_dir: Option<PathBuf>,
    },

    /// Answer one question through the reflective pipeline
    Ask {
        #[arg(help = "The question to answer")]
        question: String,
        #[arg(long, help = "Number of sub-queries to generate")]
        subqueries: Option<usize>,
    },

    /// Interactive chat loop
    Chat {
        #[arg(
            long,
            short,
            value_enum,
            default_value = "reflective",
            help = "Answering strategy"
        )]
        strategy: StrategyArg,
    },

    /// Evaluate a strategy against a test set
    Eval {
        #[arg(help = "JSON test set of {question, ground_truth} entries")]
        cases: PathBuf,
        #[arg(
            long,
            short,
            value_enum,
            default_value = "reflective",
            help = "Answering strategy"
        )]
        strategy: StrategyArg,
        #[arg(long, short, help = "Write the JSON report here")]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, help = "Print as JSON")]
        json: bool,
    },
    /// Show configuration file paths
    Path,
}

/// Answering strategy as exposed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Self-reflective pipeline with critique and search escalation
    Reflective,
    /// Condense the question, retrieve, answer
    Base,
    /// Hypothetical-document retrieval
    Hyde,
    /// Query expansion with merged retrieval
    QueryAug,
}

impl StrategyArg {
    /// `None` selects the reflective pipeline
    fn to_chain_strategy(self) -> Option<Strategy> {
        match self {
            Self::Reflective => None,
            Self::Base => Some(Strategy::Base),
            Self::Hyde => Some(Strategy::Hyde),
            Self::QueryAug => Some(Strategy::QueryAug),
        }
    }
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let load_config = || -> bullbuddy::types::Result<bullbuddy::config::Config> {
        match &cli.config {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
    };

    match cli.command {
        Commands::Init { force } => {
            bullbuddy::cli::commands::init::run(force)?;
        }
        Commands::Ingest { data_dir } => {
            let config = load_config()?;
            let runtime = Runtime::new()?;
            runtime.block_on(bullbuddy::cli::commands::ingest::run(&config, data_dir))?;
        }
        Commands::Ask {
            question,
            subqueries,
        } => {
            let config = load_config()?;
            let runtime = Runtime::new()?;
            runtime.block_on(bullbuddy::cli::commands::ask::run(
                &config, &question, subqueries,
            ))?;
        }
        Commands::Chat { strategy } => {
            let config = load_config()?;
            let runtime = Runtime::new()?;
            runtime.block_on(bullbuddy::cli::commands::chat::run(
                &config,
                strategy.to_chain_strategy(),
            ))?;
        }
        Commands::Eval {
            cases,
            strategy,
            output,
        } => {
            let config = load_config()?;
            let runtime = Runtime::new()?;
            runtime.block_on(bullbuddy::cli::commands::eval::run(
                &config,
                &cases,
                strategy.to_chain_strategy(),
                output,
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => bullbuddy::cli::commands::config::run_show(json)?,
            ConfigAction::Path => bullbuddy::cli::commands::config::run_path()?,
        },
    }

    Ok(())
}
