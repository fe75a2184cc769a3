//! Third Places command-line shell

mod app;
mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use thirdplaces_adaptor_terminal::TerminalConfig;
use thirdplaces_core::utils::logger::LOG_LEVEL_ENV;
use thirdplaces_core::{init_logging, load_env, load_env_from_path, Category, PlaceId, Result};
use tracing::info;

use crate::app::App;
use crate::config::{AppConfig, SearchOverrides};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find third places near campus", long_about = None)]
struct Cli {
    /// Log filter, e.g. `info` or `thirdplaces_core=debug`
    #[arg(long, env = "THIRDPLACES_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Environment file to load instead of searching for `.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Maximum number of search results
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Minimum query length before searching
    #[arg(long, global = true)]
    min_query_chars: Option<usize>,

    /// Typing pause before an interactive search runs
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Print place descriptions
    #[arg(long, global = true)]
    descriptions: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Rank places by similarity to a description
    Search {
        /// What you are looking for
        query: String,
    },
    /// Search as you type, one line per edit
    Interactive,
    /// Show places, newest first
    List {
        /// Only show one category (food, nightlife, outdoors, workspace, discover)
        #[arg(long)]
        category: Option<Category>,
        /// Refresh every 30 seconds until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Like a place
    Like {
        /// Place id
        id: PlaceId,
    },
    /// Show saved places
    Saved,
    /// Save a place, or unsave it if already saved
    Bookmark {
        /// Place id
        id: PlaceId,
    },
    /// Set the note on a saved place (empty text clears it)
    Note {
        /// Place id
        id: PlaceId,
        /// Note text
        text: String,
    },
    /// Look up real places by name
    Lookup {
        /// Name or address
        query: String,
    },
    /// Add a place found through lookup
    Submit {
        /// Name or address to look up
        #[arg(long)]
        query: String,
        /// Which lookup hit to add, counting from 1
        #[arg(long, default_value_t = 1)]
        pick: usize,
        /// Category of the new place
        #[arg(long)]
        category: Category,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },
}

impl Cli {
    fn search_overrides(&self) -> SearchOverrides {
        SearchOverrides {
            top_k: self.top_k,
            min_query_chars: self.min_query_chars,
            debounce_ms: self.debounce_ms,
        }
    }
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Search { query } => commands::search(app, &query).await.map(drop),
        Command::Interactive => commands::interactive(app).await,
        Command::List { category, watch } => commands::list(app, category, watch).await,
        Command::Like { id } => commands::like(app, id).await.map(drop),
        Command::Saved => commands::saved(app).await.map(drop),
        Command::Bookmark { id } => commands::bookmark(app, id).await.map(drop),
        Command::Note { id, text } => commands::note(app, id, &text).await.map(drop),
        Command::Lookup { query } => commands::lookup(app, &query).await.map(drop),
        Command::Submit {
            query,
            pick,
            category,
            description,
        } => commands::submit(app, &query, pick, category, description)
            .await
            .map(drop),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => load_env_from_path(path)?,
        None => load_env()?,
    }
    if let Some(level) = &cli.log_level {
        std::env::set_var(LOG_LEVEL_ENV, level);
    }
    init_logging();

    let config = AppConfig::from_env()
        .and_then(|c| c.with_overrides(&cli.search_overrides()))
        .context("Invalid configuration")?;
    info!(
        "Search: top {} results, {} char minimum, {:?} debounce",
        config.search.top_k, config.search.min_query_chars, config.search.debounce
    );

    let app = App::connect(
        config,
        TerminalConfig {
            show_descriptions: cli.descriptions,
        },
    )
    .context("Failed to connect services")?;

    if let Err(e) = run(&app, cli.command).await {
        app.terminal.show_alert(&commands::failure_alert(&e));
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
