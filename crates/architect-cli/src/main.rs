//! Architect - AI coding assistant for the terminal
//!
//! Chat with Hugging Face, OpenAI, Anthropic or Google models:
//! - Interactive chat with automatic provider failover
//! - One-shot messages and file analysis
//! - JSON-lines bridge for editor webviews

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use architect_core::paths;

mod app;
mod configure;
mod repl;
mod terminal;

use app::App;

/// Architect - AI Coding Assistant
#[derive(Parser)]
#[command(name = "architect", version)]
#[command(about = "Chat with AI coding models from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Provider to try first (overrides the configured default)
    #[arg(short, long, global = true)]
    provider: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Store or remove a provider API key
    Configure {
        /// Provider to configure (prompts when omitted)
        name: Option<String>,

        /// Remove the stored key instead of setting one
        #[arg(long)]
        remove: bool,
    },

    /// Serve the webview protocol as JSON lines over stdin/stdout
    ///
    /// Used when Architect is spawned by an editor extension. Each input line
    /// is one webview message; each reply is written as one line.
    Serve,

    /// Send a single message and print the reply
    Send {
        /// Message text
        message: Vec<String>,
    },

    /// Ask for an analysis of a source file
    Analyze { file: std::path::PathBuf },

    /// Show provider configuration and rate-limit status
    Providers,
}

/// Log to a file so stdout stays clean for chat output and the bridge
fn init_logging() {
    let log_dir = paths::logs_dir();
    std::fs::create_dir_all(&log_dir).ok();

    let writer = match std::fs::File::create(log_dir.join("architect.log")) {
        Ok(file) => BoxMakeWriter::new(std::sync::Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(std::io::sink),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let app = App::load(cli.provider.as_deref())?;
    tracing::info!(
        "Starting Architect v{} (default provider: {})",
        env!("CARGO_PKG_VERSION"),
        app.manager.default_provider_name()
    );

    match cli.command {
        Some(Commands::Configure { name, remove }) => {
            configure::run(&app.manager, name.as_deref(), remove)?;
        }
        Some(Commands::Serve) => {
            tracing::info!("Starting webview bridge on stdio");
            let handler = app.message_handler();
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            handler.serve(stdin, tokio::io::stdout()).await?;
        }
        Some(Commands::Send { message }) => {
            let reply = app.session.send_message(&message.join(" ")).await?;
            println!("{}", reply);
        }
        Some(Commands::Analyze { file }) => {
            let analysis = app.message_handler().analyze_file(&file).await?;
            println!("{}", analysis);
        }
        Some(Commands::Providers) => {
            app::print_status(&app.manager);
        }
        Some(Commands::Chat) | None => {
            repl::run(&app).await?;
        }
    }

    Ok(())
}
