//! Wire documents and domain records
//!
//! Serde mirrors of the JSON documents the pipeline exchanges:
//!
//! - **Wells document** (`sodirdata.json`): a flat array of wellbore records
//!   from the SODIR FactMaps FeatureServer, pre-filtered at fetch time.
//! - **Analysis document** (`rig_well_analysis.json`): rigs keyed by name
//!   with positions, movement state, and the inferred target well.
//! - **AIS / snapshot / last-known documents**: BarentsWatch position data
//!   at various stages of the pipeline.
//!
//! All coordinate fields go through [`lenient_coord`]: upstream sources have
//! emitted coordinates as numbers in some snapshots and as numeric strings in
//! others. A value that is neither is treated as missing, never as a
//! document-level parse failure. A record without coordinates is a normal,
//! silently-skipped branch downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::geo::Position;

// ============================================================================
// Lenient Coordinate Parsing
// ============================================================================

/// Deserialize a coordinate that may arrive as a JSON number, a numeric
/// string, null, or garbage. Only finite numeric values survive.
pub fn lenient_coord<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coord_from_value(&value))
}

/// Extract a finite coordinate from a loosely-typed JSON value.
fn coord_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

// ============================================================================
// Wells Document
// ============================================================================

/// One wellbore from the wells document.
///
/// `wellbore_name` is the join key rigs resolve their target against.
/// Everything except the name, coordinates, and entry date is opaque
/// passthrough used only for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WellRecord {
    #[serde(default)]
    pub wellbore_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub well: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// ISO date of first entry into the wellbore. Blank or absent means the
    /// well has not been entered yet.
    #[serde(rename = "entryDate", default, skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<String>,

    /// Drilling facility assigned to this wellbore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub well_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_page_url: Option<String>,

    #[serde(default, alias = "latitude", deserialize_with = "lenient_coord")]
    pub lat: Option<f64>,

    #[serde(default, alias = "longitude", deserialize_with = "lenient_coord")]
    pub lon: Option<f64>,
}

impl WellRecord {
    /// The well's position, if both coordinates parsed to finite values.
    pub fn position(&self) -> Option<Position> {
        Position::from_parts(self.lat, self.lon)
    }
}

// ============================================================================
// Analysis Document
// ============================================================================

/// Rig movement status from the analysis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RigStatus {
    OnSite,
    Stationary,
    Moving,
}

/// Confidence attached to a rig status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// One rig from the analysis document.
///
/// The correlator only needs the name, coordinates, `rig_moving`, and
/// `likely_target_well`; the remaining fields are analysis detail carried
/// through to popups and statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigRecord {
    #[serde(default)]
    pub rig_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mmsi: Option<u64>,

    #[serde(default, deserialize_with = "lenient_coord")]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient_coord")]
    pub longitude: Option<f64>,

    /// Tri-state movement flag: `Some(true)` moving, `Some(false)`
    /// stationary, `None` unknown.
    #[serde(default)]
    pub rig_moving: Option<bool>,

    /// Name of the well this rig is inferred to be targeting. Empty or
    /// absent means no inference is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likely_target_well: Option<String>,

    /// Timestamp of the most recent AIS position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RigStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,

    /// Metres moved between the two most recent positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_m: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest_well: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest_distance_m: Option<f64>,

    /// Assigned wells not yet entered, candidates for the next move.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub future_wells: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_site_well: Option<String>,
}

impl RigRecord {
    /// The rig's position, if both coordinates parsed to finite values.
    pub fn position(&self) -> Option<Position> {
        Position::from_parts(self.latitude, self.longitude)
    }

    /// The target well name, with blank strings treated as no inference.
    /// The name itself is passed through untouched; resolution against the
    /// well index is strict equality, so `"A-1 "` stays `"A-1 "`.
    pub fn target_well(&self) -> Option<&str> {
        self.likely_target_well
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

/// Per-well proximity detail emitted alongside the rig results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellProximity {
    pub rig_name: String,
    pub distance_to_rig_m: f64,
}

/// The rig/well analysis document.
///
/// `rigs` is deliberately an `Option`: a document without the collection at
/// all is a shape failure, while a present-but-empty collection is the valid
/// "no rigs" condition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,

    #[serde(default)]
    pub rigs: Option<BTreeMap<String, RigRecord>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub wells: BTreeMap<String, WellProximity>,
}

// ============================================================================
// AIS Documents
// ============================================================================

/// A single AIS position message, either raw from BarentsWatch or filtered
/// down to the fleet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AisMessage {
    #[serde(default)]
    pub mmsi: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_coord")]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient_coord")]
    pub longitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msgtime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl AisMessage {
    /// The reported position, if both coordinates parsed to finite values.
    pub fn position(&self) -> Option<Position> {
        Position::from_parts(self.latitude, self.longitude)
    }

    /// Parsed message timestamp, if present and RFC 3339.
    pub fn msgtime_utc(&self) -> Option<DateTime<Utc>> {
        self.msgtime.as_deref().and_then(parse_utc_timestamp)
    }
}

/// The filtered latest-AIS document written by the AIS fetch step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AisDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default)]
    pub rigs: Vec<AisMessage>,
}

// ============================================================================
// Snapshot Document
// ============================================================================

/// Rolling position history for one rig.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigSnapshot {
    /// Most recent message seen for this rig.
    #[serde(default)]
    pub msg_recent: Option<AisMessage>,

    /// Bounded recent history, oldest first.
    #[serde(default)]
    pub running_msgs: Vec<AisMessage>,

    /// Reference positions rolled forward at UTC midnight.
    #[serde(default)]
    pub msg_12h: Option<AisMessage>,
    #[serde(default)]
    pub msg_1d: Option<AisMessage>,
    #[serde(default)]
    pub msg_2d: Option<AisMessage>,
}

/// Snapshot document: one entry per registry rig, keyed by rig name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Date of the last midnight roll, `YYYY-MM-DD` UTC.
    #[serde(rename = "_last_roll_date", default, skip_serializing_if = "Option::is_none")]
    pub last_roll_date: Option<String>,

    #[serde(flatten)]
    pub rigs: BTreeMap<String, RigSnapshot>,
}

// ============================================================================
// Last-Known-Position Document
// ============================================================================

/// Best-known position for one rig, possibly stale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LastKnownPosition {
    #[serde(default)]
    pub rig_name: String,

    #[serde(default)]
    pub mmsi: Option<u64>,

    #[serde(default, deserialize_with = "lenient_coord")]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient_coord")]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub msgtime: Option<String>,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub fetched_at: Option<String>,
}

/// Last-known-position document covering the whole fleet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LastKnownDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,

    #[serde(default)]
    pub rigs: Vec<LastKnownPosition>,
}

// ============================================================================
// Timestamp Parsing
// ============================================================================

/// Parse an upstream timestamp into UTC. Accepts RFC 3339 with either a
/// `Z` suffix or a numeric offset, which covers every observed source.
pub fn parse_utc_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_coord_accepts_numbers_and_numeric_strings() {
        let well: WellRecord =
            serde_json::from_str(r#"{"wellbore_name":"W1","lat":60.5,"lon":"3.25"}"#)
                .expect("valid document");
        assert_eq!(well.lat, Some(60.5));
        assert_eq!(well.lon, Some(3.25));
        assert!(well.position().is_some());
    }

    #[test]
    fn test_lenient_coord_rejects_garbage_without_failing() {
        // A bogus latitude must not make the whole document unparseable.
        let well: WellRecord =
            serde_json::from_str(r#"{"wellbore_name":"W1","lat":"north","lon":3.0}"#)
                .expect("valid document");
        assert_eq!(well.lat, None);
        assert!(well.position().is_none());
    }

    #[test]
    fn test_lenient_coord_null_and_missing() {
        let well: WellRecord =
            serde_json::from_str(r#"{"wellbore_name":"W1","lat":null}"#).expect("valid document");
        assert_eq!(well.lat, None);
        assert_eq!(well.lon, None);
    }

    #[test]
    fn test_target_well_blank_is_none() {
        let rig = RigRecord {
            likely_target_well: Some("   ".to_string()),
            ..RigRecord::default()
        };
        assert_eq!(rig.target_well(), None);

        let rig = RigRecord {
            likely_target_well: Some("15/9-F-1".to_string()),
            ..RigRecord::default()
        };
        assert_eq!(rig.target_well(), Some("15/9-F-1"));
    }

    #[test]
    fn test_analysis_document_missing_rigs_key() {
        let doc: AnalysisDocument =
            serde_json::from_str(r#"{"generated_at":"2025-06-01T00:00:00Z"}"#)
                .expect("valid document");
        assert!(doc.rigs.is_none());

        let doc: AnalysisDocument =
            serde_json::from_str(r#"{"rigs":{}}"#).expect("valid document");
        assert_eq!(doc.rigs.map(|r| r.len()), Some(0));
    }

    #[test]
    fn test_snapshot_document_round_trips_roll_date() {
        let json = r#"{"_last_roll_date":"2025-06-01","WEST LINUS":{"msg_recent":null,"running_msgs":[]}}"#;
        let doc: SnapshotDocument = serde_json::from_str(json).expect("valid document");
        assert_eq!(doc.last_roll_date.as_deref(), Some("2025-06-01"));
        assert!(doc.rigs.contains_key("WEST LINUS"));
    }

    #[test]
    fn test_parse_utc_timestamp_variants() {
        assert!(parse_utc_timestamp("2025-06-01T12:00:00Z").is_some());
        assert!(parse_utc_timestamp("2025-06-01T12:00:00+02:00").is_some());
        assert!(parse_utc_timestamp("yesterday").is_none());
    }
}
