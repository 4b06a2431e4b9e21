pub mod beacon;
pub mod board;
pub mod catalog;
pub mod cinemas;
pub mod config;
pub mod format;
pub mod listing;
pub mod models;
mod utils;

use std::io::{BufRead, Write};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use beacon::{ClickBeacon, PageContext};
use board::{Command, SystemOpener, ViewState};
use config::AppConfig;
use models::SourceRecord;

const USER_AGENT: &str = concat!("movie-finder/", env!("CARGO_PKG_VERSION"));

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a second init (tests, embedding apps) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Loads the catalog and runs the listing prompt for the configured city.
pub fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    if config.analytics_url.is_none() {
        tracing::warn!("analytics endpoint not configured, card clicks will not be tracked");
    }

    let path = config.catalog_path();
    let records = catalog::load(&path).context("failed to load showtimes")?;

    // beacons are spawned on this runtime while the prompt waits for input
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(browse(&config, &records))
}

async fn browse(config: &AppConfig, records: &[SourceRecord]) -> anyhow::Result<()> {
    let beacon = ClickBeacon::from_config(config);
    let page = PageContext::from_config(config, USER_AGENT);
    let mut state = ViewState::from_config(config);

    loop {
        let listing = board::now_showing(records, &state);
        tracing::info!(
            city = %listing.city(),
            movies = listing.cards().len(),
            "listing ready"
        );
        print!("{}", board::render_listing(&listing));
        if let Some(summary) = board::search_summary(&state, &listing) {
            println!("{summary}");
        }
        print!("\nOpen [number], city name, `zip <code>`, or Enter to quit: ");
        std::io::stdout().flush().context("failed to write prompt")?;

        let Some(line) = read_line().await? else {
            return Ok(());
        };
        match board::parse_command(&line, &listing) {
            Command::Quit => return Ok(()),
            Command::Open(idx) => {
                let card = &listing.cards()[idx];
                if let Err(err) = board::open_movie(&beacon, &SystemOpener, card, &page) {
                    println!("{err}");
                }
            }
            Command::SelectCity(city) => state.select_city(city.name()),
            Command::SearchZip(input) => {
                if let Err(err) = state.search_zip(&input) {
                    println!("{err}");
                }
            }
            Command::Unknown(input) => println!("Unrecognised choice: {input}"),
        }
    }
}

/// Reads stdin off the runtime thread so spawned beacons keep running.
async fn read_line() -> anyhow::Result<Option<String>> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        Ok::<_, std::io::Error>((read > 0).then_some(line))
    })
    .await
    .context("input reader stopped")?
    .context("failed to read input")
}
