//! `metalinks` CLI - convert URLs in a selection to metadata links and back
//!
//! The selection is read from `--input` or stdin, the rewritten text goes to
//! `--output` or stdout, and notices go to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use metalinks::{
    fetch_metadata, extract_urls, ConvertReport, FileSettingsStore, HttpFetcher, MetadataLinks,
    RenderMode, Settings, SettingsStore, StderrNotifier, TextBuffer, UndoReport,
};

#[derive(Parser)]
#[command(name = "metalinks")]
#[command(about = "Turn URLs into metadata link cards, and back")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Settings file (default: <config dir>/metalinks/settings.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the URLs in a selection into metadata links
    Convert {
        /// Read the selection from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render mode for this run (html or markdown)
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<RenderMode>,

        /// Replace the selection with the rendered links
        #[arg(long, conflicts_with = "append")]
        replace: bool,

        /// Append the rendered links below the selection
        #[arg(long)]
        append: bool,
    },

    /// Turn rendered metadata links back into bare URLs
    Undo {
        /// Read the selection from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the URLs found in a selection, one per line
    Extract {
        /// Read the selection from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Fetch one URL and show its metadata
    Inspect {
        /// URL to inspect
        url: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Change one setting and save it
    Set {
        /// Setting name (render, replace_on_render, escape_html, ...)
        key: String,
        /// New value
        value: String,
    },
    /// Print the settings file location
    Path,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let store = cli
        .config
        .map_or_else(FileSettingsStore::default_location, FileSettingsStore::new);

    match cli.command {
        Commands::Convert {
            input,
            output,
            mode,
            replace,
            append,
        } => {
            let mut settings = store.load()?;
            if let Some(mode) = mode {
                settings.render = mode;
            }
            if replace {
                settings.replace_on_render = true;
            } else if append {
                settings.replace_on_render = false;
            }
            cmd_convert(input.as_deref(), output.as_deref(), &settings).await
        }
        Commands::Undo { input, output } => {
            let settings = store.load()?;
            cmd_undo(input.as_deref(), output.as_deref(), &settings).await
        }
        Commands::Extract { input } => cmd_extract(input.as_deref()),
        Commands::Inspect { url, json } => {
            let settings = store.load()?;
            cmd_inspect(&url, json, &settings).await
        }
        Commands::Config { action } => cmd_config(&store, action),
    }
}

async fn cmd_convert(input: Option<&Path>, output: Option<&Path>, settings: &Settings) -> Result<ExitCode> {
    let buffer = TextBuffer::new(read_selection(input)?);
    let links = MetadataLinks::new(Arc::new(HttpFetcher::with_settings(settings)?));

    match links.convert_selection(&buffer, &StderrNotifier, settings).await {
        ConvertReport::Converted { .. } => {
            write_result(&buffer.text().await, output)?;
            Ok(ExitCode::SUCCESS)
        }
        ConvertReport::NoSelection | ConvertReport::Superseded | ConvertReport::Failed => {
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn cmd_undo(input: Option<&Path>, output: Option<&Path>, settings: &Settings) -> Result<ExitCode> {
    let buffer = TextBuffer::new(read_selection(input)?);
    // Undo never fetches; the fetcher only satisfies the constructor
    let links = MetadataLinks::new(Arc::new(HttpFetcher::with_settings(settings)?));

    match links.undo_selection(&buffer, &StderrNotifier, settings).await {
        UndoReport::Restored { .. } => {
            write_result(&buffer.text().await, output)?;
            Ok(ExitCode::SUCCESS)
        }
        UndoReport::NoSelection | UndoReport::NothingToUndo => Ok(ExitCode::FAILURE),
    }
}

fn cmd_extract(input: Option<&Path>) -> Result<ExitCode> {
    let text = read_selection(input)?;
    let urls = extract_urls(&text);
    for url in &urls {
        println!("{url}");
    }
    eprintln!("({} URLs)", urls.len());
    Ok(ExitCode::SUCCESS)
}

async fn cmd_inspect(url: &str, json: bool, settings: &Settings) -> Result<ExitCode> {
    let fetcher = HttpFetcher::with_settings(settings)?;
    let record = fetch_metadata(&fetcher, url)
        .await
        .with_context(|| format!("failed to inspect {url}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(ExitCode::SUCCESS);
    }

    if record.is_degraded() {
        eprintln!("⚠️  No metadata found on {url}");
    }

    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    println!("🔗 URL:         {}", record.url);
    println!("📰 Title:       {}", show(&record.title));
    println!("📝 Description: {}", show(&record.description));
    println!("⭐ Icon:        {}", show(&record.icon));
    println!("🖼️  Image:       {}", show(&record.image));
    Ok(ExitCode::SUCCESS)
}

fn cmd_config(store: &FileSettingsStore, action: ConfigAction) -> Result<ExitCode> {
    match action {
        ConfigAction::Show => {
            let settings = store.load()?;
            print!("{}", toml::to_string_pretty(&settings)?);
        }
        ConfigAction::Set { key, value } => {
            let mut settings = store.load()?;
            settings.set(&key, &value)?;
            store.save(&settings)?;
            println!("✅ {key} = {value}");
        }
        ConfigAction::Path => {
            println!("{}", store.path().display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Strict mode names; settings files alone get the lenient reading.
fn parse_mode(value: &str) -> Result<RenderMode, String> {
    value.parse()
}

/// Selection text from a file or stdin, without its final line break.
fn read_selection(input: Option<&Path>) -> Result<String> {
    let mut text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let trimmed = text.trim_end_matches(['\n', '\r']).len();
    text.truncate(trimmed);
    Ok(text)
}

fn write_result(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("💾 Saved {} bytes to {}", text.len(), path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
