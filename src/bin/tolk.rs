//! tolk: translation cache CLI
//!
//! Translate strings through the persisted cache and inspect or reset its
//! state.

use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tolk::config::Config;
use tolk::storage::{self, KeyValueStore};
use tolk::{Language, Tolk};

/// Tolk translation cache client
#[derive(Parser)]
#[command(name = "tolk")]
#[command(version)]
#[command(about = "Persisted translation cache with rate-limit cooldown")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "TOLK_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Target language (overrides the saved and configured language).
    #[arg(short, long, env = "TOLK_LANG")]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate one or more strings (or read lines from stdin)
    Translate {
        /// Texts to translate
        texts: Vec<String>,
    },

    /// Look up a cached translation without contacting the provider
    Lookup {
        /// Text to look up
        text: String,
    },

    /// Show cooldown status and cache size
    Status,

    /// Remove every cached translation
    Clear,

    /// End an active rate-limit cooldown
    Reset,

    /// Show or save the default language
    Lang {
        /// Language code to save
        code: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let store = config.open_store();

    let language = resolve_language(&args, &config, store.as_ref());
    let cache = config
        .apply(Tolk::builder())
        .language(language)
        .store(Arc::clone(&store))
        .build()?;

    match args.command {
        Command::Translate { texts } => {
            let texts = resolve_texts(texts)?;
            for line in cache.translate_batch(&texts, None).await {
                println!("{line}");
            }
        }

        Command::Lookup { text } => {
            println!("{}", cache.translate_sync(&text, None));
        }

        Command::Status => {
            let status = cache.rate_limit_status();
            println!("language: {}", cache.language());
            println!("cached entries: {}", cache.cached_entries());
            if status.is_limited {
                println!(
                    "rate limited: yes ({} minutes remaining)",
                    status.minutes_remaining
                );
            } else {
                println!("rate limited: no");
            }
        }

        Command::Clear => {
            let count = cache.cached_entries();
            cache.clear_cache();
            println!("cleared {count} cached entries");
        }

        Command::Reset => {
            cache.reset_rate_limit();
            println!("cooldown cleared");
        }

        Command::Lang { code: Some(code) } => {
            let language = Language::new(code);
            storage::save_language(store.as_ref(), &language)?;
            println!("saved language: {language}");
        }

        Command::Lang { code: None } => {
            println!("{}", cache.language());
        }
    }

    Ok(())
}

/// `--lang`, then the saved language, then the configured default, then `en`.
fn resolve_language(args: &Args, config: &Config, store: &dyn KeyValueStore) -> Language {
    args.lang
        .as_deref()
        .map(Language::new)
        .or_else(|| storage::load_language(store))
        .or_else(|| {
            config
                .translation
                .default_language
                .as_deref()
                .map(Language::new)
        })
        .filter(|l| !l.is_empty())
        .unwrap_or_default()
}

/// Use the given texts, or read one text per line from piped stdin.
fn resolve_texts(texts: Vec<String>) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if !texts.is_empty() {
        return Ok(texts);
    }
    if io::stdin().is_terminal() {
        return Err("translate: no text given (pass arguments or pipe via stdin)".into());
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf.lines().map(str::to_string).collect())
}
