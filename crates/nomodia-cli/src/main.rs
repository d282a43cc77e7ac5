//! The nomodia command-line interface: take, resume, and review the assessment.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "nomodia",
    version,
    about = "Resumable yes/no self-assessment on the spiral and emotional scales"
)]
struct Cli {
    #[command(flatten)]
    global: commands::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer questions interactively (y/n, q to stop and save)
    Take,

    /// Record a single answer for the current question
    Answer {
        /// The answer to record
        #[arg(value_enum)]
        answer: AnswerArg,
    },

    /// Show progress and the current question
    Status,

    /// Show the results of the current session
    Results {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: commands::results::ReportFormat,

        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Discard progress and start over with a fresh shuffle
    Reset {
        /// Ask a provider for new general questions first
        #[arg(long)]
        refresh: bool,

        /// Provider name from the config (defaults to `default_provider`)
        #[arg(long)]
        provider: Option<String>,

        /// Model to request questions from (defaults to `default_model`)
        #[arg(long)]
        model: Option<String>,
    },

    /// Validate a question pool file
    Validate {
        /// Path to the pool TOML file
        #[arg(long)]
        pools: PathBuf,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Create a starter config and pool file
    Init,
}

#[derive(Clone, Copy, ValueEnum)]
enum AnswerArg {
    #[value(alias = "y")]
    Yes,
    #[value(alias = "n")]
    No,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,nomodia=info")),
        )
        .init();

    let cli = Cli::parse();
    let global = cli.global;

    let result = match cli.command {
        Commands::Take => commands::take::execute(&global),
        Commands::Answer { answer } => {
            commands::answer::execute(&global, matches!(answer, AnswerArg::Yes))
        }
        Commands::Status => commands::status::execute(&global),
        Commands::Results { format, output } => commands::results::execute(&global, format, output),
        Commands::Reset {
            refresh,
            provider,
            model,
        } => commands::reset::execute(&global, refresh, provider, model).await,
        Commands::Validate { pools } => commands::validate::execute(pools),
        Commands::ListModels { provider } => commands::list_models::execute(&global, provider),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
