//! # Surf Tides Entry Point
//!
//! Fetches the tide events for a surf spot, resolves them against the current
//! time and prints the next few high and low tides.
//!
//! ```text
//! surf-tides [--spot ID] [--file PATH] [--config PATH] [--limit N] [--json] [--chart]
//! ```
//!
//! `--file` reads a saved API payload instead of calling the API, which is
//! handy for checking a feed offline.


use anyhow::{bail, Context};
use chrono::Local;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use surf_tides::{config::Config, fallback, renderer, tide_data, upcoming, TideReport};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Args {
    spot: Option<String>,
    file: Option<PathBuf>,
    config: Option<PathBuf>,
    limit: Option<usize>,
    json: bool,
    chart: bool,
}

impl Args {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .with_context(|| format!("{} expects a value", name))
            };
            match arg.as_str() {
                "--spot" => parsed.spot = Some(value("--spot")?),
                "--file" => parsed.file = Some(value("--file")?.into()),
                "--config" => parsed.config = Some(value("--config")?.into()),
                "--limit" => {
                    let raw = value("--limit")?;
                    parsed.limit = Some(
                        raw.parse()
                            .with_context(|| format!("invalid --limit {:?}", raw))?,
                    );
                }
                "--json" => parsed.json = true,
                "--chart" => parsed.chart = true,
                other => bail!("unknown argument {:?}", other),
            }
        }

        Ok(parsed)
    }
}

fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        // Fallback to the `default_level` log filter if RUST_LOG is unset or invalid
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load a payload saved to disk.
fn report_from_file(path: &Path) -> anyhow::Result<TideReport> {
    let body = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let payload = tide_data::decode_payload(&body)
        .with_context(|| format!("decoding {}", path.display()))?;
    Ok(TideReport::from_payload(&payload, false))
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse(env::args().skip(1))?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    if let Some(spot) = &args.spot {
        config.api.spot_id = spot.clone();
    }
    let limit = args.limit.unwrap_or(config.display.max_events);

    let report = match &args.file {
        Some(path) => report_from_file(path)?,
        None => {
            // Create Tokio runtime for the HTTP fetch
            let rt = tokio::runtime::Runtime::new()?;

            // Network errors are expected and handled gracefully
            rt.block_on(async {
                tide_data::fetch(&config).await.unwrap_or_else(|error| {
                    warn!(%error, "tide data fetch failed, falling back to cache");
                    fallback::offline_report(&config)
                })
            })
        }
    };

    // One clock read for the whole pass
    let now = Local::now();
    let next = upcoming(&report.events, &now, limit);
    info!(
        received = report.events.len(),
        shown = next.len(),
        "selected upcoming tides"
    );

    let rows = renderer::rows(&next, config.display.locale);
    if args.json {
        renderer::draw_json(&rows)?;
    } else {
        renderer::draw_table(&rows, report.offline, config.display.locale);
    }

    if args.chart {
        renderer::draw_ascii(&report.hourly, &now);
    }

    Ok(())
}
