mod activity;
mod clipboard;
mod config;
mod error;
mod logging;
mod lookup;
mod size;
mod surface;
mod tmdb;
mod tui;

use crate::clipboard::{Clipboard, SystemClipboard};
use crate::config::Config;
use crate::logging::LogSink;
use crate::lookup::LookupController;
use crate::size::ImageSize;
use crate::tmdb::TmdbClient;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "poster-lookup")]
#[command(about = "Look up a movie poster on TMDb and copy a direct image link", long_about = None)]
struct Args {
    #[arg(help = "Movie title to look up (pre-fills the TUI search box)")]
    query: Option<String>,

    #[arg(long, help = "TMDb API key (overrides TMDB_API_KEY and the config file)")]
    api_key: Option<String>,

    #[arg(long, help = "Path to config.toml")]
    config: Option<PathBuf>,

    #[arg(long, help = "Disable TUI and print a single lookup instead")]
    no_tui: bool,

    #[arg(long, help = "Image size to link in plain mode (w92, w154, w185, w342, w500, w780, original)")]
    size: Option<String>,

    #[arg(long, help = "Copy the resulting link to the clipboard in plain mode")]
    copy: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    if args.no_tui {
        logging::init_sink(LogSink::Stderr, "info");
    } else if let Err(e) = logging::init_file() {
        logging::init_sink(LogSink::fallback(true), "warn");
        eprintln!("File logging unavailable, logs are discarded: {:#}", e);
    }

    let config = Config::load(args.config.as_deref(), args.api_key.as_deref())
        .context("Failed to load configuration")?;
    let client = TmdbClient::new(config.api_key.clone(), config.api_base_url.clone())
        .context("Failed to create TMDb client")?;
    let clipboard = if args.no_tui && args.copy {
        SystemClipboard::holding()
    } else {
        SystemClipboard::new()
    };
    let holds_clipboard = clipboard.holds_until_replaced();
    let controller = LookupController::new(config.image_base_url.clone(), clipboard);

    if args.no_tui {
        return run_plain(&client, controller, &args, holds_clipboard).await;
    }

    info!("Starting TUI");
    if let Err(e) = tui::run_tui(client, controller, args.query.clone()).await {
        error!("TUI error: {}", e);
        return Err(e);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_plain<C: Clipboard>(
    client: &TmdbClient,
    mut controller: LookupController<C>,
    args: &Args,
    holds_clipboard: bool,
) -> Result<ExitCode> {
    let Some(query) = args.query.as_deref().filter(|q| !q.trim().is_empty()) else {
        eprintln!("No movie title given. Usage: poster-lookup --no-tui <TITLE>");
        return Ok(ExitCode::from(2));
    };

    controller.submit(client, query).await;

    if let Some(ref token) = args.size {
        match token.parse::<ImageSize>() {
            Ok(size) => controller.select(size),
            Err(e) => warn!("{}, keeping {}", e, controller.surface().active_size),
        }
    }

    if let Some(message) = controller.surface().error() {
        eprintln!("{}", message);
        return Ok(ExitCode::FAILURE);
    }
    let Some(card) = controller.surface().result() else {
        return Ok(ExitCode::FAILURE);
    };

    println!("{}", card.title);
    if !card.description.is_empty() {
        println!();
        println!("{}", card.description);
        println!();
    }
    println!("Poster: {}", card.poster_src);
    println!("Link ({}): {}", controller.surface().active_size, controller.surface().thumbnail_link);

    if args.copy {
        if holds_clipboard {
            eprintln!("Keeping the link on the clipboard until something else is copied (Ctrl-C to stop).");
        }
        controller.copy_link(Instant::now());
        println!("{}", controller.surface().copy_label());
    }

    Ok(ExitCode::SUCCESS)
}
