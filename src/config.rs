//! Map configuration — data endpoints, file paths, and thresholds as
//! operator-tunable TOML values.
//!
//! Every constant the pipeline relies on is a field here, with defaults
//! matching the original values, so behaviour is unchanged when no config
//! file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::analysis::AnalysisThresholds;
use crate::snapshots::SnapshotPolicy;

/// Environment variable pointing at an explicit config file.
const CONFIG_ENV: &str = "RIGMAP_CONFIG";
/// Default config file name in the working directory.
const CONFIG_FILE: &str = "rigmap.toml";

/// Root configuration for one deployment of the map pipeline.
///
/// Load with [`MapConfig::load`], which searches:
/// 1. `$RIGMAP_CONFIG` env var
/// 2. `./rigmap.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// SODIR FactMaps endpoint settings.
    #[serde(default)]
    pub sodir: SodirConfig,

    /// BarentsWatch AIS endpoint settings.
    #[serde(default)]
    pub barentswatch: BwConfig,

    /// Movement / on-site thresholds.
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Snapshot retention.
    #[serde(default)]
    pub snapshots: SnapshotConfig,

    /// Data file locations.
    #[serde(default)]
    pub paths: PathConfig,
}

impl MapConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "loaded config from RIGMAP_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "failed to load config from RIGMAP_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "RIGMAP_CONFIG points to non-existent file, falling back");
            }
        }

        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(local) {
                Ok(config) => {
                    info!(path = %local.display(), "loaded config from working directory");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "failed to load ./rigmap.toml, using defaults");
                }
            }
        }

        info!("no config file found, using built-in defaults");
        Self::default()
    }

    /// Load and parse a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// Config load failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Sections
// ============================================================================

/// SODIR FactMaps FeatureServer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SodirConfig {
    /// FeatureServer base URL.
    pub base_url: String,
    /// Layer holding all wellbores.
    pub layer_id: u32,
    /// OBJECTID page size per query.
    pub page_size: usize,
    /// Keep wells entered within this many days, plus all unentered wells.
    pub lookback_days: i64,
}

impl Default for SodirConfig {
    fn default() -> Self {
        Self {
            base_url:
                "https://factmaps.sodir.no/api/rest/services/Factmaps/FactMapsWGS84/FeatureServer"
                    .to_string(),
            layer_id: 201,
            page_size: 1000,
            lookback_days: 100,
        }
    }
}

/// BarentsWatch live AIS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BwConfig {
    /// OAuth2 token endpoint.
    pub token_url: String,
    /// Latest-AIS endpoint.
    pub ais_url: String,
    /// How far back to ask for messages, in minutes.
    pub window_minutes: i64,
}

impl Default for BwConfig {
    fn default() -> Self {
        Self {
            token_url: "https://id.barentswatch.no/connect/token".to_string(),
            ais_url: "https://live.ais.barentswatch.no/live/v1/latest/ais".to_string(),
            window_minutes: 10,
        }
    }
}

/// Analysis thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Displacement above which a rig counts as moving, in metres.
    pub stationary_threshold_m: f64,
    /// On-site detection radius, in metres.
    pub on_site_distance_m: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            stationary_threshold_m: 50.0,
            on_site_distance_m: 200.0,
        }
    }
}

impl From<ThresholdConfig> for AnalysisThresholds {
    fn from(config: ThresholdConfig) -> Self {
        Self {
            stationary_threshold_m: config.stationary_threshold_m,
            on_site_distance_m: config.on_site_distance_m,
        }
    }
}

/// Snapshot retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Maximum messages kept per rig.
    pub max_running_msgs: usize,
    /// Running-history age limit, in hours.
    pub retention_hours: i64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_running_msgs: 12,
            retention_hours: 12,
        }
    }
}

impl From<SnapshotConfig> for SnapshotPolicy {
    fn from(config: SnapshotConfig) -> Self {
        Self {
            max_running_msgs: config.max_running_msgs,
            retention_hours: config.retention_hours,
        }
    }
}

/// Data file locations, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub wells: PathBuf,
    pub ais: PathBuf,
    pub snapshots: PathBuf,
    pub last_known: PathBuf,
    pub analysis: PathBuf,
    pub stats: PathBuf,
    pub geojson: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            wells: PathBuf::from("data/sodirdata.json"),
            ais: PathBuf::from("data/bw_ais.json"),
            snapshots: PathBuf::from("data/bw_snapshots.json"),
            last_known: PathBuf::from("data/lastknowndata.json"),
            analysis: PathBuf::from("data/rig_well_analysis.json"),
            stats: PathBuf::from("data/rw_keystats.json"),
            geojson: PathBuf::from("data/rigmap.geojson"),
        }
    }
}
