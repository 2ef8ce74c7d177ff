//! # chat-rag-client CLI (`ragc`)
//!
//! Talks to a retrieval-augmented question-answering service over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! ragc --config ./config/ragc.toml <command>
//! ragc --base-url http://127.0.0.1:8000 <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragc state` | Show the model catalog and the selected model |
//! | `ragc models` | Reload the model catalog |
//! | `ragc select <id>` | Select the model the server answers with |
//! | `ragc ingest <url>...` | Ingest sites (also `--file`, or stdin) |
//! | `ragc ask "<question>"` | Ask a question in the stored session |
//! | `ragc sites` | List ingested sites |
//! | `ragc clear` | Remove all ingested sites |
//! | `ragc health` | Check that the service is up |
//! | `ragc chat` | Interactive session |

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

use chat_rag_client::api::HttpBackend;
use chat_rag_client::chat;
use chat_rag_client::config::{self, Config};
use chat_rag_client::controller::{ClientController, Outcome, RequestOptions};
use chat_rag_client::logging;
use chat_rag_client::storage::FileStore;
use chat_rag_client::view::TerminalView;

/// ragc: command-line client for a retrieval-augmented
/// question-answering service.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file, or `--base-url` to run without one.
#[derive(Parser)]
#[command(
    name = "ragc",
    about = "ragc: client for a retrieval-augmented question-answering service",
    version,
    long_about = "ragc ingests web sites into a question-answering service, asks questions \
    against them in a persistent session, selects the answering model, and lists or clears \
    the ingested sites."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/ragc.toml`. May be missing when `--base-url` is given.
    #[arg(long, global = true, default_value = "./config/ragc.toml")]
    config: PathBuf,

    /// Service URL, overriding `[server].base_url`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log debug diagnostics to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the model catalog and the current selection.
    State,

    /// Reload the model catalog from the service.
    Models,

    /// Select the model used for answers.
    ///
    /// The choice is reported to the service and becomes its default.
    Select {
        /// Model id as listed by `ragc state`.
        id: String,
    },

    /// Ingest sites into the service.
    ///
    /// URLs come from the arguments, from `--file` (one per line), or from
    /// stdin when neither is given. Blank lines are skipped.
    Ingest {
        /// URLs to ingest.
        urls: Vec<String>,

        /// Read URLs from a file, one per line.
        #[arg(long, conflicts_with = "urls")]
        file: Option<PathBuf>,

        /// Maximum pages to crawl (overrides `[ingest].max_pages`).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_pages: Option<u32>,

        /// Maximum link depth to crawl (overrides `[ingest].max_depth`).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_depth: Option<u32>,
    },

    /// Ask a question.
    ///
    /// The session id returned by the service is stored and reused, so
    /// follow-up questions keep their context.
    Ask {
        /// The question, sent verbatim.
        question: String,

        /// Answer with this model for this question only.
        #[arg(long)]
        model: Option<String>,

        /// Number of retrieved passages (overrides `[answer].top_k`).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        top_k: Option<u32>,
    },

    /// List ingested sites.
    Sites,

    /// Remove all ingested sites.
    Clear,

    /// Check that the service is up.
    Health,

    /// Start an interactive session.
    Chat,
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut cfg = if cli.base_url.is_some() && !cli.config.exists() {
        Config::minimal()
    } else {
        config::load_config(&cli.config)?
    };
    if let Some(url) = &cli.base_url {
        cfg.server.base_url = url.clone();
        cfg.validate()?;
    }
    Ok(cfg)
}

async fn read_urls(urls: Vec<String>, file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read URL file: {}", path.display()));
    }
    if !urls.is_empty() {
        return Ok(urls.join("\n"));
    }
    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("Failed to read URLs from stdin")?;
    Ok(raw)
}

fn exit_code(outcome: Outcome) -> ExitCode {
    if outcome.is_applied() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;
    logging::init(logging::resolve_level(&cfg.log.level, cli.verbose))?;

    let backend = HttpBackend::new(&cfg.server)?;
    let store = FileStore::new(cfg.session.state_path.clone());
    let mut options = RequestOptions::from_config(&cfg);

    let view = match cli.command {
        Commands::Chat => TerminalView::new(),
        Commands::State | Commands::Models => TerminalView::one_shot(),
        _ => TerminalView::one_shot().without_models(),
    };

    let code = match cli.command {
        Commands::State => {
            let ctl = ClientController::new(backend, view, store);
            exit_code(ctl.init_state().await)
        }
        Commands::Models => {
            let ctl = ClientController::new(backend, view, store);
            exit_code(ctl.refresh_models().await)
        }
        Commands::Select { id } => {
            let ctl = ClientController::new(backend, view, store);
            ctl.init_state().await;
            let outcome = ctl.select_model(&id).await?;
            if outcome.is_applied() {
                println!("Selected model: {}", id);
            }
            exit_code(outcome)
        }
        Commands::Ingest {
            urls,
            file,
            max_pages,
            max_depth,
        } => {
            options.max_pages = max_pages.or(options.max_pages);
            options.max_depth = max_depth.or(options.max_depth);
            let raw = read_urls(urls, file.as_deref()).await?;
            let ctl = ClientController::new(backend, view, store).with_options(options);
            exit_code(ctl.ingest_sites(&raw).await)
        }
        Commands::Ask {
            question,
            model,
            top_k,
        } => {
            options.top_k = top_k.or(options.top_k);
            let ctl = ClientController::new(backend, view, store).with_options(options);
            if let Some(model) = model {
                ctl.init_state().await;
                ctl.use_model(&model)?;
            }
            exit_code(ctl.handle_ask(&question).await)
        }
        Commands::Sites => {
            let ctl = ClientController::new(backend, view, store);
            exit_code(ctl.get_ingested_sites().await)
        }
        Commands::Clear => {
            let ctl = ClientController::new(backend, view, store);
            exit_code(ctl.clear_sites().await)
        }
        Commands::Health => {
            let ctl = ClientController::new(backend, view, store);
            match ctl.health().await {
                Ok(true) => {
                    println!("ok");
                    ExitCode::SUCCESS
                }
                Ok(false) => {
                    println!("unhealthy");
                    ExitCode::FAILURE
                }
                Err(e) => {
                    println!("unreachable: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Chat => {
            let ctl = ClientController::new(backend, view, store).with_options(options);
            let interactive = atty::is(atty::Stream::Stdin);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            chat::run_chat(&ctl, stdin, interactive).await?;
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
