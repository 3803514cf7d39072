//! quizdrill CLI — take quizzes and review attempts from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizdrill", version, about = "Dental-education quiz runner")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the platform base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Override the API token
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz
    Take {
        /// Quiz id to attempt
        #[arg(long)]
        quiz: String,

        /// Comma-separated answers, positional; an empty segment skips the
        /// question. Omit for interactive mode.
        #[arg(long)]
        answers: Option<String>,

        /// Save the scored attempt as JSON
        #[arg(long)]
        out: Option<PathBuf>,

        /// Pass threshold for the summary; defaults to the quiz's own
        #[arg(long)]
        pass_threshold: Option<f64>,

        /// Learner id submitted with the attempt
        #[arg(long, default_value = "local")]
        user: String,
    },

    /// Show a scored attempt
    Results {
        /// Quiz id
        #[arg(long, requires = "attempt")]
        quiz: Option<String>,

        /// Attempt id to fetch from the platform
        #[arg(long, requires = "quiz")]
        attempt: Option<String>,

        /// Read the attempt from a JSON file instead
        #[arg(long, conflicts_with_all = ["quiz", "attempt"])]
        file: Option<PathBuf>,

        /// Pass threshold for the summary
        #[arg(long)]
        pass_threshold: Option<f64>,
    },

    /// Load and echo the effective configuration
    ValidateConfig,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizdrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = match commands::effective_config(
        cli.config.as_deref(),
        cli.base_url.clone(),
        cli.token.clone(),
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Take {
            quiz,
            answers,
            out,
            pass_threshold,
            user,
        } => commands::take::execute(config, quiz, answers, out, pass_threshold, user).await,
        Commands::Results {
            quiz,
            attempt,
            file,
            pass_threshold,
        } => commands::results::execute(config, quiz, attempt, file, pass_threshold).await,
        Commands::ValidateConfig => commands::validate_config::execute(config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
