//! rigmap - Offshore rig / wellbore correlation map pipeline
//!
//! Command-line driver for the data pipeline behind the rig map: fetch the
//! upstream datasets, maintain position snapshots, run the rig/well
//! analysis, and render the map GeoJSON plus summary statistics.
//!
//! # Usage
//!
//! ```bash
//! # One full cycle: fetch both sources, analyze, render
//! rigmap refresh
//!
//! # Individual stages
//! rigmap fetch-wells
//! rigmap fetch-ais
//! rigmap snapshots
//! rigmap analyze
//! rigmap stats
//! rigmap render
//! ```
//!
//! # Environment Variables
//!
//! - `BWAPI_CLIENTID_URLENCODED` / `BWAPI_PWSECRET`: BarentsWatch credentials
//! - `RIGMAP_CONFIG`: path to an explicit rigmap.toml
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use rigmap::analysis::analyze;
use rigmap::config::MapConfig;
use rigmap::fetch::{latest_by_rig, merge_last_known, BwClient, BwCredentials, SodirClient};
use rigmap::pipeline::{load_json_file, load_map, TracingSink};
use rigmap::registry::RigRegistry;
use rigmap::render::GeoJsonSurface;
use rigmap::snapshots::update_snapshots;
use rigmap::stats::compute_key_stats;
use rigmap::types::{AisDocument, AnalysisDocument, SnapshotDocument, WellRecord};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "rigmap")]
#[command(about = "Offshore rig / wellbore correlation map pipeline")]
#[command(version)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Fetch and filter wellbore data from the SODIR FactMaps API
    FetchWells {
        /// Output path (default: configured wells path)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Fetch latest AIS positions for the fleet from BarentsWatch
    FetchAis {
        /// Output path (default: configured ais path)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Fold the latest AIS document into the rolling snapshot store
    Snapshots,

    /// Merge the latest AIS document into the last-known-position store
    LastKnown,

    /// Run the rig/well analysis over the current snapshots
    Analyze,

    /// Compute key statistics from wells and the analysis document
    Stats,

    /// Render the map GeoJSON from wells and the analysis document
    Render {
        /// Output path (default: configured geojson path)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Full cycle: fetch both sources concurrently, then snapshot, analyze,
    /// and render in order
    Refresh,
}

// ============================================================================
// File Helpers
// ============================================================================

/// Write a JSON document atomically: temp file in place, then rename.
fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let tmp = path.with_extension("tmp");
    let body = serde_json::to_vec_pretty(value).context("serializing document")?;
    std::fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    info!(path = %path.display(), "saved");
    Ok(())
}

/// Read a JSON document, falling back to the default when the file is
/// missing or unreadable. Pipeline stages tolerate absent inputs.
fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    match load_json_file(path) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable document, using default");
            T::default()
        }
    }
}

// ============================================================================
// Stage Handlers
// ============================================================================

async fn fetch_wells(config: &MapConfig, out: Option<PathBuf>) -> Result<()> {
    let client = SodirClient::new(&config.sodir).context("building SODIR client")?;
    let wells = client
        .fetch_wells(Utc::now())
        .await
        .context("fetching SODIR wellbores")?;
    write_json(&wells, &out.unwrap_or_else(|| config.paths.wells.clone()))
}

async fn fetch_ais(config: &MapConfig, out: Option<PathBuf>) -> Result<()> {
    let credentials = BwCredentials::from_env().context("reading BarentsWatch credentials")?;
    let client = BwClient::new(&config.barentswatch).context("building BarentsWatch client")?;

    let token = client
        .fetch_token(&credentials)
        .await
        .context("fetching BarentsWatch access token")?;
    let now = Utc::now();
    let messages = client
        .fetch_latest_ais(&token, now)
        .await
        .context("fetching AIS messages")?;

    let doc = AisDocument {
        fetched_at: Some(now.to_rfc3339()),
        source: Some("barentswatch".to_string()),
        rigs: latest_by_rig(messages, &RigRegistry::builtin()),
    };
    write_json(&doc, &out.unwrap_or_else(|| config.paths.ais.clone()))
}

fn update_snapshot_store(config: &MapConfig) -> Result<()> {
    let ais: AisDocument = read_json_or_default(&config.paths.ais);
    let mut snapshots: SnapshotDocument = read_json_or_default(&config.paths.snapshots);

    update_snapshots(
        &mut snapshots,
        &ais.rigs,
        &RigRegistry::builtin(),
        Utc::now(),
        config.snapshots.clone().into(),
    );
    write_json(&snapshots, &config.paths.snapshots)
}

fn update_last_known(config: &MapConfig) -> Result<()> {
    let ais: AisDocument = read_json_or_default(&config.paths.ais);
    let previous = config
        .paths
        .last_known
        .exists()
        .then(|| read_json_or_default(&config.paths.last_known));

    let doc = merge_last_known(
        previous.as_ref(),
        &ais.rigs,
        &RigRegistry::builtin(),
        Utc::now(),
    );
    write_json(&doc, &config.paths.last_known)
}

fn run_analysis(config: &MapConfig) -> Result<()> {
    let wells: Vec<WellRecord> = read_json_or_default(&config.paths.wells);
    let snapshots: SnapshotDocument = read_json_or_default(&config.paths.snapshots);

    let doc = analyze(
        &wells,
        &snapshots,
        &RigRegistry::builtin(),
        config.thresholds.clone().into(),
        Utc::now(),
    );
    write_json(&doc, &config.paths.analysis)
}

fn run_stats(config: &MapConfig) -> Result<()> {
    let wells: Vec<WellRecord> = read_json_or_default(&config.paths.wells);
    let analysis: AnalysisDocument = read_json_or_default(&config.paths.analysis);
    let rigs = analysis.rigs.unwrap_or_default();

    let stats = compute_key_stats(&wells, &rigs, &RigRegistry::builtin(), Utc::now());
    write_json(&stats, &config.paths.stats)
}

fn render_map(config: &MapConfig, out: Option<PathBuf>) -> Result<()> {
    let wells = load_json_file::<Vec<WellRecord>>(&config.paths.wells);
    let analysis = load_json_file::<AnalysisDocument>(&config.paths.analysis);

    let mut surface = GeoJsonSurface::new();
    let outcome = load_map(wells, analysis, &mut surface, &TracingSink);

    info!(
        indexed_wells = outcome.index.len(),
        rig_markers = outcome.correlation.rigs_rendered,
        paths = outcome.correlation.paths_drawn,
        features = surface.len(),
        "map rendered"
    );

    write_json(
        &surface.into_document(),
        &out.unwrap_or_else(|| config.paths.geojson.clone()),
    )
}

/// Full cycle. The two fetches are issued concurrently; a failure in either
/// degrades that pipeline to its previously stored dataset instead of
/// aborting the cycle.
async fn refresh(config: &MapConfig) -> Result<()> {
    let (wells_result, ais_result) = tokio::join!(fetch_wells(config, None), fetch_ais(config, None));

    if let Err(e) = wells_result {
        warn!(error = %e, "wells fetch failed, reusing stored dataset");
    }
    if let Err(e) = ais_result {
        warn!(error = %e, "AIS fetch failed, reusing stored dataset");
    }

    update_snapshot_store(config)?;
    update_last_known(config)?;
    run_analysis(config)?;
    run_stats(config)?;
    render_map(config, None)
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = MapConfig::load();

    match args.command {
        Command::FetchWells { out } => fetch_wells(&config, out).await,
        Command::FetchAis { out } => fetch_ais(&config, out).await,
        Command::Snapshots => update_snapshot_store(&config),
        Command::LastKnown => update_last_known(&config),
        Command::Analyze => run_analysis(&config),
        Command::Stats => run_stats(&config),
        Command::Render { out } => render_map(&config, out),
        Command::Refresh => refresh(&config).await,
    }
}
