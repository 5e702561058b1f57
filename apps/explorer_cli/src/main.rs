use std::{collections::BTreeMap, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings, preferences::PreferenceStore, Collaborators, EffectDispatcher,
    ExplorerCore, ExplorerRuntime, FilePreferenceStore, HistoryRouter, HttpTransport,
    MemoryPreferenceStore, Renderer,
};
use shared::protocol::query_string;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

use render::{JsonRenderer, StderrAdvisory, TextRenderer};

#[derive(Parser, Debug)]
struct Cli {
    /// Esplora-compatible API base, overrides API_URL.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    lang: Option<String>,
    /// TOML file that keeps the language and theme between runs.
    #[arg(long)]
    preferences: Option<std::path::PathBuf>,
    /// Print snapshots as JSON instead of text.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one explorer page, e.g. `/tx/<txid>` or `/block-height/1`.
    Show { path: String },
    /// Resolve a free-text query (height, hash or address) and render it.
    Search { query: String },
    /// Keep rendering a page as the tip advances, until interrupted.
    Watch { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let (href, follow) = match &cli.command {
        Command::Show { path } => (path.clone(), false),
        Command::Search { query } => (search_href(query), false),
        Command::Watch { path } => (path.clone(), true),
    };
    if cli.json {
        explore(&cli, JsonRenderer, &href, follow).await
    } else {
        explore(&cli, TextRenderer, &href, follow).await
    }
}

/// `/search` href with the query percent-encoded.
fn search_href(query: &str) -> String {
    let query = BTreeMap::from([("q".to_string(), query.trim().to_string())]);
    format!("/search{}", query_string(&query))
}

async fn explore<R>(cli: &Cli, renderer: R, href: &str, follow: bool) -> Result<()>
where
    R: Renderer<Tree = String> + 'static,
{
    let mut settings = load_settings();
    if let Some(api_url) = &cli.api_url {
        settings.api_url = api_url.clone();
    }
    if let Some(lang) = &cli.lang {
        settings.default_lang = lang.clone();
    }
    if let Some(path) = &cli.preferences {
        settings.preferences_path = Some(path.clone());
    }

    let transport = HttpTransport::new(&settings.api_url)
        .with_context(|| format!("invalid api url '{}'", settings.api_url))?;
    info!(api = transport.base(), %href, "starting explorer");

    let preferences: Arc<dyn PreferenceStore> = match &settings.preferences_path {
        Some(path) => Arc::new(FilePreferenceStore::new(path)),
        None => Arc::new(MemoryPreferenceStore::new()),
    };
    let collaborators = Collaborators::new(Arc::new(transport), Arc::new(HistoryRouter::new(href)))
        .with_preferences(preferences);
    let core = ExplorerCore::new(settings.core_options())?;
    let dispatcher = EffectDispatcher::new(renderer).with_advisory(Arc::new(StderrAdvisory));

    let runtime = ExplorerRuntime::new(core, collaborators, dispatcher);
    let handle = runtime.handle();
    let mut pages = handle.subscribe();
    let task = tokio::spawn(runtime.run());

    loop {
        tokio::select! {
            page = pages.recv() => {
                let page = page.context("explorer runtime stopped")?;
                println!("{page}");
                if !follow {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.shutdown()?;
    task.await.context("explorer runtime panicked")??;
    Ok(())
}
