//! qadrill CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "qadrill", version, about = "QA training drill and support chat")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a drill run and persist the report
    Grade {
        /// Path to a .toml question set
        #[arg(long)]
        questions: PathBuf,

        /// Path to a .toml answer file (one [[answers]] entry per question)
        #[arg(long)]
        answers: PathBuf,

        /// Respondent email; the password is read from QADRILL_PASSWORD
        #[arg(long)]
        email: String,

        /// Backend/model override (e.g. "openai/gpt-4o-mini")
        #[arg(long)]
        model: Option<String>,

        /// Skip semantic judging; grade by exact match only
        #[arg(long)]
        exact_only: bool,

        /// Output directory override for the saved report
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Chat with the category-scoped support assistant
    Chat {
        /// Chat category (run without it to list available categories)
        #[arg(long)]
        category: Option<String>,

        /// Your email; the password is read from QADRILL_PASSWORD
        #[arg(long)]
        email: String,

        /// Backend/model override (e.g. "ollama/llama3.1:8b")
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question set TOML files
    Validate {
        /// Path to a question set file or directory
        #[arg(long)]
        questions: PathBuf,
    },

    /// List saved reports, or print the newest one
    Reports {
        /// Print the newest report instead of listing
        #[arg(long)]
        latest: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and an example question set
    Init,

    /// Manage portal users
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qadrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            questions,
            answers,
            email,
            model,
            exact_only,
            output,
            config,
        } => commands::grade::execute(questions, answers, email, model, exact_only, output, config)
            .await,
        Commands::Chat {
            category,
            email,
            model,
            config,
        } => commands::chat::execute(category, email, model, config).await,
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::Reports { latest, config } => commands::reports::execute(latest, config),
        Commands::Init => commands::init::execute(),
        Commands::User { action } => commands::user::execute(action),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
