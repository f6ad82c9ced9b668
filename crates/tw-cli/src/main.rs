//! CLI frontend for Taleweaver interactive stories.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::Source;

#[derive(Parser)]
#[command(
    name = "tw",
    about = "Taleweaver: choose-your-own-adventure stories told by a story generator",
    version,
    propagate_version = true
)]
struct Cli {
    /// Story backend URL (default: $TW_API_URL or http://localhost:8000)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds (default: $TW_TIMEOUT_SECS or 120)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Replay a recorded story from a JSON script instead of calling a backend
    #[arg(long, global = true)]
    script: Option<PathBuf>,

    /// Log session activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the languages stories can be told in
    Languages,

    /// List the characters available in a language
    Characters {
        /// Language code (e.g. en, fr)
        #[arg(default_value = "en")]
        language: String,
    },

    /// Play a story
    Play {
        /// Language code; asked interactively when omitted
        #[arg(short, long)]
        language: Option<String>,

        /// Character name; asked interactively when omitted
        #[arg(short, long)]
        character: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "tw_session=debug,tw_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = Source::from_args(cli.script, cli.url, cli.timeout);

    let result = match cli.command {
        Commands::Languages => commands::languages::run(&source),
        Commands::Characters { language } => commands::characters::run(&source, &language),
        Commands::Play {
            language,
            character,
        } => commands::play::run(&source, language.as_deref(), character.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
