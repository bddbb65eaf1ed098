mod borders;
mod colors;
mod config;
mod error;
mod fetch;
mod merge;
mod render;
mod settings;
mod sources;
mod state;
mod style;

use anyhow::{Context, Result};
use clap::Parser;
use colors::ColorScale;
use config::{Overrides, RunConfig};
use render::MapView;
use settings::Settings;
use std::path::PathBuf;
use style::StyleIndex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG: &str = "vaxmap=info";

#[derive(Parser)]
#[command(name = "vaxmap")]
#[command(version)]
#[command(about = "Render a time-slider map of full COVID-19 vaccination across Malaysian states", long_about = None)]
struct Cli {
    /// Output HTML file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// City coordinates CSV (needs admin_name, lat, lng, capital)
    #[arg(long, value_name = "PATH")]
    locations: Option<PathBuf>,

    /// State border shapefile with a NAME_1 attribute
    #[arg(long, value_name = "PATH")]
    borders: Option<PathBuf>,

    /// Vaccination time series CSV
    #[arg(long, value_name = "URL")]
    vaccination_url: Option<String>,

    /// Population by state CSV
    #[arg(long, value_name = "URL")]
    population_url: Option<String>,

    /// Settings file (default: <config dir>/vaxmap/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(std::env::var("RUST_LOG").ok()))
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    let config = RunConfig::resolve(
        &settings,
        Overrides {
            vaccination_url: cli.vaccination_url,
            population_url: cli.population_url,
            locations: cli.locations,
            borders: cli.borders,
            output: cli.output,
        },
    );

    run(&config)
}

/// `RUST_LOG` wins when it parses; otherwise our own info-level output.
fn env_filter(rust_log: Option<String>) -> EnvFilter {
    rust_log
        .filter(|spec| !spec.trim().is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG))
}

fn run(config: &RunConfig) -> Result<()> {
    let vaccinations = fetch::fetch_vaccinations(&config.vaccination_url)
        .context("Failed to fetch vaccination data")?;
    let population = fetch::fetch_population(&config.population_url)
        .context("Failed to fetch population data")?;
    let locations = sources::read_locations(&config.locations)
        .context("Failed to load state locations")?;
    let borders = borders::read_borders(&config.borders).context("Failed to load state borders")?;

    let rows = merge::merge(&vaccinations, &population, &locations, &borders)?;
    info!(rows = rows.len(), "sources joined");

    let unmatched = merge::unmatched_states(&rows);
    if unmatched.is_empty() {
        info!("every state matched population, location and border");
    }
    for state in &unmatched.population {
        warn!(%state, "no population; percentage left empty");
    }
    for state in &unmatched.location {
        warn!(%state, "no capital coordinates; markers skipped");
    }
    for state in &unmatched.geometry {
        warn!(%state, "no border geometry; state not drawn");
    }

    let scale = ColorScale::from_rows(&rows).context("No vaccination rows to map")?;
    let index = StyleIndex::build(&rows, &scale);
    if index.is_empty() {
        warn!("no state could be styled; the map will be blank");
    }
    info!(
        states = index.len(),
        dates = index.timestamps().len(),
        min = scale.min,
        max = scale.max,
        "styles derived"
    );

    let markers = render::markers(&rows);
    let html = render::render_page(&index, &scale, &markers, &MapView::default());
    render::write_page(&config.output, &html)?;

    Ok(())
}
