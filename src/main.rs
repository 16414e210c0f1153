//! perplx - ask a question, watch the answer stream in.
//!
//! Prompts for a single question, streams the answer from an LLM API and
//! re-renders it as Markdown on every fragment, with a spinner underneath
//! until the answer is complete. Press `q`, `Esc` or `Ctrl+C` to stop early.

mod config;
mod llm;
mod logging;
mod render;
mod runner;
mod session;
mod spinner;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use crossterm::event::EventStream;
use render::TermimadRenderer;
use session::{FinishCause, SessionState, StreamingSession};
use spinner::Spinner;
use std::io;
use theme::Theme;
use tracing::{debug, error, info};
use ui::{InlineViewport, PromptResult, RawModeGuard};

const PROMPT_TITLE: &str = "ʕ·ᴥ·ʔ Ask anything...";

#[derive(Parser)]
#[command(name = "perplx")]
#[command(author, version, about = "Ask anything, read the answer as it streams in")]
struct Cli {
    /// Pre-fill the question prompt
    #[arg(value_name = "QUERY")]
    query: Option<String>,

    /// Override the configured model
    #[arg(short = 'm', long, value_name = "MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file if there is none and print its path
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Ok(path) = Config::log_path() {
        logging::init(&path);
    }

    let result = match cli.command {
        Some(Commands::Config) => handle_config(),
        None => handle_ask(cli.query, cli.model).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle the config command.
fn handle_config() -> Result<()> {
    let config_path = Config::config_path()?;

    if !config_path.exists() {
        Config::default().save()?;
        println!("Created default config at {}", config_path.display());
    } else {
        println!("{}", config_path.display());
    }

    let config = Config::load()?;
    println!("Backend: {} ({})", config.backend_type(), config.model_name());

    Ok(())
}

/// Ask one question and stream the answer.
async fn handle_ask(query: Option<String>, model: Option<String>) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let theme = Theme::from_kind(config.display.theme);

    let backend = llm::create_backend(&config.backend, model)
        .context("Failed to set up the LLM backend")?;
    info!("Using backend: {} ({})", backend.name(), backend.model());

    let mut stdout = io::stdout();
    ui::banner::print_banner(&mut stdout, &theme)?;

    let question = match ui::prompt_line(PROMPT_TITLE, query, &theme)? {
        PromptResult::Question(q) => q,
        PromptResult::Cancelled => {
            info!("No question asked");
            return Ok(());
        }
    };
    ui::banner::echo_question(&mut stdout, &theme, &question)?;

    let (width, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let renderer = TermimadRenderer::new(&theme, usize::from(width));
    let spinner = Spinner::new(config.display.spinner);
    let mut session = StreamingSession::new(question.clone(), renderer, spinner);
    let mut viewport = InlineViewport::new(usize::from(rows))
        .with_footer_style(theme.muted_style());
    debug!("Streaming answer to: {}", session.prompt());

    {
        let _raw = RawModeGuard::enable().context("Failed to prepare the terminal")?;
        runner::run(
            &mut session,
            backend.open_stream(&question),
            EventStream::new(),
            config.display.tick_interval(),
            &mut viewport,
            &mut stdout,
        )
        .await?;
    }

    match (session.state(), session.cause()) {
        (SessionState::Done, Some(FinishCause::StreamError(message))) => {
            eprintln!(
                "{}",
                theme
                    .error_style()
                    .apply(format!("(answer interrupted: {})", message))
            );
        }
        (SessionState::Cancelled, _) => {
            eprintln!("{}", theme.muted_style().apply("(cancelled)"));
        }
        _ => {}
    }

    Ok(())
}
