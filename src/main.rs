//! Binary entry point for phishwise.
//!
//! This binary provides the CLI interface for the phishwise assistant.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use phishwise::config::AssistantConfig;
use phishwise::observability::{self, LoggingConfig};
use phishwise::pipeline::{Notice, NoticeSink};
use phishwise::{Session, cli};
use secrecy::ExposeSecret;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Phishwise - cybersecurity Q&A and phishing email detection.
#[derive(Parser)]
#[command(name = "phishwise")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "PHISHWISE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Route one query and print the reply.
    Ask {
        /// The question or email to analyze.
        query: String,
    },

    /// Start an interactive session.
    ///
    /// `/reset` clears the conversation, `/exit` ends the session.
    Chat,

    /// Classify an email without intent routing.
    Classify {
        /// The email text.
        text: String,
    },

    /// Show the resolved configuration.
    Config,
}

/// Prints progress notices to stderr.
struct StderrNotices;

impl NoticeSink for StderrNotices {
    fn notify(&self, notice: Notice) {
        eprintln!("{notice}");
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(Some(&config.logging), cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Loads the config file (explicit path or default location) and applies env overrides.
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AssistantConfig> {
    let config = match path {
        Some(path) => AssistantConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AssistantConfig::load_default(),
    };
    Ok(config.with_env_overrides())
}

/// Runs the selected command.
fn run_command(command: Commands, config: &AssistantConfig) -> anyhow::Result<()> {
    match command {
        Commands::Ask { query } => cmd_ask(config, &query),
        Commands::Chat => cmd_chat(config),
        Commands::Classify { text } => cmd_classify(config, &text),
        Commands::Config => {
            cmd_config(config);
            Ok(())
        },
    }
}

fn cmd_ask(config: &AssistantConfig, query: &str) -> anyhow::Result<()> {
    anyhow::ensure!(!query.trim().is_empty(), "query must not be empty");
    let router = cli::build_router(config, Arc::new(StderrNotices))?;
    let mut session = Session::new();
    println!("{}", router.route(&mut session, query));
    Ok(())
}

fn cmd_chat(config: &AssistantConfig) -> anyhow::Result<()> {
    let router = cli::build_router(config, Arc::new(StderrNotices))?;
    let mut session = Session::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("Ask a cybersecurity question or paste an email. /reset clears history, /exit quits.");
    loop {
        print!("> ");
        stdout.flush().context("flushing stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("reading stdin")? == 0 {
            break;
        }
        let query = line.trim();
        match query {
            "" => continue,
            "/exit" | "/quit" => break,
            "/reset" => {
                session.reset();
                println!("Conversation cleared.");
                continue;
            },
            _ => {},
        }

        println!("{}", router.route(&mut session, query));
        println!();
    }
    Ok(())
}

fn cmd_classify(config: &AssistantConfig, text: &str) -> anyhow::Result<()> {
    anyhow::ensure!(!text.trim().is_empty(), "email text must not be empty");
    let handler = cli::build_phishing_handler(config)?;
    println!("{}", handler.respond(text, &StderrNotices));
    Ok(())
}

fn cmd_config(config: &AssistantConfig) {
    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map_or("(not set)", |k| if k.expose_secret().is_empty() { "(empty)" } else { "(set)" });
    let index = config
        .retrieval
        .index_path
        .as_ref()
        .map_or_else(|| "(none)".to_string(), |p| p.display().to_string());

    println!("Phishwise Configuration");
    println!("=======================");
    println!();
    println!("[llm]");
    println!("  provider: {}", config.llm.provider.as_str());
    println!("  base_url: {}", config.llm.base_url.as_deref().unwrap_or("(provider default)"));
    println!("  api_key: {api_key}");
    println!();
    println!("[models]");
    println!("  classifier: {}", config.models.classifier);
    println!("  qa: {}", config.models.qa);
    println!("  phishing: {}", config.models.phishing);
    println!();
    println!("[retrieval]");
    println!("  index_path: {index}");
    println!("  top_k: {}", config.retrieval.top_k);
    println!();
    println!("[search]");
    println!("  enabled: {}", config.search.enabled);
    println!("  endpoint: {}", config.search.endpoint);
    println!("  results: {}", config.search.results);
    println!("  candidates: {}", config.search.candidates);
    println!();
    println!("Config files searched:");
    for path in AssistantConfig::default_paths() {
        let marker = if path.exists() { "found" } else { "missing" };
        println!("  {} ({marker})", path.display());
    }
}
