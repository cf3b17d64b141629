//! Rig/well analysis
//!
//! Produces the analysis document the map load consumes: for every rig with
//! a current position, movement state from the two most recent snapshot
//! positions, proximity to its assigned wells, on-site detection, and the
//! likely-target-well inference that the correlator later joins on.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::classify::{well_state, WellState};
use crate::geo::haversine_m;
use crate::registry::{normalize_rig_name, RigRegistry};
use crate::types::{
    AnalysisDocument, Confidence, RigRecord, RigStatus, SnapshotDocument, WellProximity,
    WellRecord,
};

/// Distance thresholds for movement and on-site detection.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisThresholds {
    /// Displacement between the two latest positions above which a rig
    /// counts as moving, in metres.
    pub stationary_threshold_m: f64,
    /// Maximum distance to an entered well for on-site detection, in metres.
    pub on_site_distance_m: f64,
}

impl Default for AnalysisThresholds {
    fn default() -> Self {
        Self {
            stationary_threshold_m: 50.0,
            on_site_distance_m: 200.0,
        }
    }
}

/// Round to one decimal, matching the published document precision.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Run the full rig/well analysis over the current snapshots.
///
/// Rigs without a recent, coordinate-valid position are left out of the
/// result entirely; wells without coordinates simply contribute nothing to
/// the proximity calculations. Neither is an error.
pub fn analyze(
    wells: &[WellRecord],
    snapshots: &SnapshotDocument,
    registry: &RigRegistry,
    thresholds: AnalysisThresholds,
    generated_at: DateTime<Utc>,
) -> AnalysisDocument {
    // Wells grouped by their assigned rig, normalized the same way the
    // snapshot keys are.
    let mut wells_by_rig: HashMap<String, Vec<&WellRecord>> = HashMap::new();
    for well in wells {
        let Some(rig) = well.rig_name.as_deref().map(normalize_rig_name) else {
            continue;
        };
        if rig.is_empty() {
            continue;
        }
        wells_by_rig.entry(rig).or_default().push(well);
    }

    let mut rig_results: BTreeMap<String, RigRecord> = BTreeMap::new();
    let mut well_results: BTreeMap<String, WellProximity> = BTreeMap::new();

    for (rig_name, snapshot) in &snapshots.rigs {
        let Some(msg) = snapshot.msg_recent.as_ref() else {
            continue;
        };
        let Some(rig_position) = msg.position() else {
            debug!(rig = %rig_name, "recent message has no usable position, skipped");
            continue;
        };

        // Movement: displacement between the two latest running positions.
        let mut movement_m = None;
        let mut is_moving = None;
        if snapshot.running_msgs.len() >= 2 {
            let prev = &snapshot.running_msgs[snapshot.running_msgs.len() - 2];
            if let Some(prev_position) = prev.position() {
                let displacement = haversine_m(prev_position, rig_position);
                movement_m = Some(round1(displacement));
                is_moving = Some(displacement > thresholds.stationary_threshold_m);
            }
        }

        let assigned = wells_by_rig
            .get(&normalize_rig_name(rig_name))
            .map_or(&[] as &[&WellRecord], Vec::as_slice);

        let future_wells: Vec<String> = assigned
            .iter()
            .filter(|well| well_state(well) == WellState::NotEntered)
            .map(|well| well.wellbore_name.clone())
            .collect();

        // Proximity sweep over the assigned wells.
        let mut closest: Option<(&WellRecord, f64)> = None;
        let mut closest_future: Option<(&WellRecord, f64)> = None;
        let mut on_site: Option<&WellRecord> = None;

        for &well in assigned {
            let Some(well_position) = well.position() else {
                continue;
            };
            let distance_m = haversine_m(rig_position, well_position);

            well_results.insert(
                well.wellbore_name.clone(),
                WellProximity {
                    rig_name: rig_name.clone(),
                    distance_to_rig_m: round1(distance_m),
                },
            );

            if closest.is_none_or(|(_, best)| distance_m < best) {
                closest = Some((well, distance_m));
            }

            let entered = well_state(well) == WellState::Entered;
            if entered
                && is_moving != Some(true)
                && distance_m <= thresholds.on_site_distance_m
            {
                on_site = Some(well);
            }

            if !entered && closest_future.is_none_or(|(_, best)| distance_m < best) {
                closest_future = Some((well, distance_m));
            }
        }

        let (status, confidence) = if on_site.is_some() {
            (RigStatus::OnSite, Confidence::High)
        } else if is_moving != Some(true) {
            (RigStatus::Stationary, Confidence::Medium)
        } else {
            (RigStatus::Moving, Confidence::Medium)
        };

        // Target inference: the well the rig is sitting on, else the nearest
        // well it has yet to enter.
        let likely_target = on_site
            .map(|well| well.wellbore_name.clone())
            .or_else(|| closest_future.map(|(well, _)| well.wellbore_name.clone()));

        rig_results.insert(
            rig_name.clone(),
            RigRecord {
                rig_name: rig_name.clone(),
                mmsi: msg.mmsi.or_else(|| registry.mmsi_for(rig_name)),
                latitude: Some(rig_position.lat),
                longitude: Some(rig_position.lon),
                rig_moving: is_moving,
                likely_target_well: likely_target,
                last_seen: msg.msgtime.clone(),
                rig_type: registry.class_for(rig_name).map(|class| class.to_string()),
                status: Some(status),
                confidence: Some(confidence),
                movement_m,
                closest_well: closest.map(|(well, _)| well.wellbore_name.clone()),
                closest_distance_m: closest.map(|(_, distance)| round1(distance)),
                future_wells,
                on_site_well: on_site.map(|well| well.wellbore_name.clone()),
            },
        );
    }

    info!(rigs = rig_results.len(), wells = well_results.len(), "analysis complete");

    AnalysisDocument {
        generated_at: Some(generated_at.to_rfc3339()),
        rigs: Some(rig_results),
        wells: well_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AisMessage, RigSnapshot};
    use chrono::TimeZone;

    const RIG: &str = "WEST LINUS";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid time")
    }

    fn make_msg(lat: f64, lon: f64, minute: u32) -> AisMessage {
        AisMessage {
            mmsi: Some(257_095_000),
            rig_name: Some(RIG.to_string()),
            latitude: Some(lat),
            longitude: Some(lon),
            msgtime: Some(format!("2025-06-01T11:{minute:02}:00Z")),
            source: Some("barentswatch".to_string()),
        }
    }

    fn snapshots_with(running: Vec<AisMessage>) -> SnapshotDocument {
        let mut doc = SnapshotDocument::default();
        doc.rigs.insert(
            RIG.to_string(),
            RigSnapshot {
                msg_recent: running.last().cloned(),
                running_msgs: running,
                ..RigSnapshot::default()
            },
        );
        doc
    }

    fn make_well(name: &str, lat: f64, lon: f64, entry: Option<&str>) -> WellRecord {
        WellRecord {
            wellbore_name: name.to_string(),
            rig_name: Some(RIG.to_string()),
            entry_date: entry.map(str::to_string),
            lat: Some(lat),
            lon: Some(lon),
            ..WellRecord::default()
        }
    }

    fn rig_result(doc: &AnalysisDocument) -> &RigRecord {
        doc.rigs
            .as_ref()
            .and_then(|rigs| rigs.get(RIG))
            .expect("rig analyzed")
    }

    #[test]
    fn test_movement_unknown_with_single_position() {
        let doc = analyze(
            &[],
            &snapshots_with(vec![make_msg(58.0, 2.0, 30)]),
            &RigRegistry::builtin(),
            AnalysisThresholds::default(),
            now(),
        );
        let rig = rig_result(&doc);
        assert_eq!(rig.rig_moving, None);
        assert_eq!(rig.movement_m, None);
        assert_eq!(rig.status, Some(RigStatus::Stationary));
    }

    #[test]
    fn test_movement_above_threshold_is_moving() {
        // ~111 m of latitude displacement, well over the 50 m threshold.
        let doc = analyze(
            &[],
            &snapshots_with(vec![make_msg(58.000, 2.0, 0), make_msg(58.001, 2.0, 30)]),
            &RigRegistry::builtin(),
            AnalysisThresholds::default(),
            now(),
        );
        let rig = rig_result(&doc);
        assert_eq!(rig.rig_moving, Some(true));
        assert_eq!(rig.status, Some(RigStatus::Moving));
        assert!(rig.movement_m.expect("displacement") > 100.0);
    }

    #[test]
    fn test_movement_below_threshold_is_stationary() {
        // ~44 m of latitude displacement.
        let doc = analyze(
            &[],
            &snapshots_with(vec![make_msg(58.0000, 2.0, 0), make_msg(58.0004, 2.0, 30)]),
            &RigRegistry::builtin(),
            AnalysisThresholds::default(),
            now(),
        );
        let rig = rig_result(&doc);
        assert_eq!(rig.rig_moving, Some(false));
        assert_eq!(rig.status, Some(RigStatus::Stationary));
    }

    #[test]
    fn test_on_site_requires_entered_well_within_range() {
        let wells = vec![
            // Entered, ~44 m away: on site.
            make_well("15/9-F-1", 58.0004, 2.0, Some("2025-05-20")),
            // Future well further out.
            make_well("15/9-F-2", 58.01, 2.0, None),
        ];
        let doc = analyze(
            &wells,
            &snapshots_with(vec![make_msg(58.0, 2.0, 30)]),
            &RigRegistry::builtin(),
            AnalysisThresholds::default(),
            now(),
        );
        let rig = rig_result(&doc);
        assert_eq!(rig.status, Some(RigStatus::OnSite));
        assert_eq!(rig.confidence, Some(Confidence::High));
        assert_eq!(rig.on_site_well.as_deref(), Some("15/9-F-1"));
        assert_eq!(rig.likely_target_well.as_deref(), Some("15/9-F-1"));
    }

    #[test]
    fn test_not_entered_well_nearby_is_not_on_site() {
        let wells = vec![make_well("15/9-F-1", 58.0004, 2.0, None)];
        let doc = analyze(
            &wells,
            &snapshots_with(vec![make_msg(58.0, 2.0, 30)]),
            &RigRegistry::builtin(),
            AnalysisThresholds::default(),
            now(),
        );
        let rig = rig_result(&doc);
        assert_eq!(rig.status, Some(RigStatus::Stationary));
        assert_eq!(rig.on_site_well, None);
        // Still the likely target: nearest future well.
        assert_eq!(rig.likely_target_well.as_deref(), Some("15/9-F-1"));
    }

    #[test]
    fn test_moving_rig_is_never_on_site() {
        let wells = vec![make_well("15/9-F-1", 58.001, 2.0, Some("2025-05-20"))];
        let doc = analyze(
            &wells,
            &snapshots_with(vec![make_msg(58.000, 2.0, 0), make_msg(58.001, 2.0, 30)]),
            &RigRegistry::builtin(),
            AnalysisThresholds::default(),
            now(),
        );
        let rig = rig_result(&doc);
        assert_eq!(rig.status, Some(RigStatus::Moving));
        assert_eq!(rig.on_site_well, None);
    }

    #[test]
    fn test_likely_target_prefers_nearest_future_well() {
        let wells = vec![
            make_well("FAR-FUTURE", 58.05, 2.0, None),
            make_well("NEAR-FUTURE", 58.01, 2.0, None),
            make_well("NEAR-ENTERED", 58.005, 2.0, Some("2024-01-01")),
        ];
        let doc = analyze(
            &wells,
            &snapshots_with(vec![make_msg(58.0, 2.0, 30)]),
            &RigRegistry::builtin(),
            AnalysisThresholds::default(),
            now(),
        );
        let rig = rig_result(&doc);
        // Entered well is closest overall but not a future target.
        assert_eq!(rig.closest_well.as_deref(), Some("NEAR-ENTERED"));
        assert_eq!(rig.likely_target_well.as_deref(), Some("NEAR-FUTURE"));
        assert_eq!(rig.future_wells.len(), 2);
    }

    #[test]
    fn test_rig_without_position_is_excluded() {
        let mut doc = SnapshotDocument::default();
        doc.rigs.insert(
            RIG.to_string(),
            RigSnapshot {
                msg_recent: Some(AisMessage {
                    mmsi: Some(257_095_000),
                    ..AisMessage::default()
                }),
                ..RigSnapshot::default()
            },
        );
        let result = analyze(
            &[],
            &doc,
            &RigRegistry::builtin(),
            AnalysisThresholds::default(),
            now(),
        );
        assert_eq!(result.rigs.as_ref().map(BTreeMap::len), Some(0));
    }

    #[test]
    fn test_proximity_detail_emitted_per_well() {
        let wells = vec![make_well("15/9-F-1", 58.0004, 2.0, None)];
        let doc = analyze(
            &wells,
            &snapshots_with(vec![make_msg(58.0, 2.0, 30)]),
            &RigRegistry::builtin(),
            AnalysisThresholds::default(),
            now(),
        );
        let proximity = doc.wells.get("15/9-F-1").expect("proximity entry");
        assert_eq!(proximity.rig_name, RIG);
        assert!(proximity.distance_to_rig_m > 40.0 && proximity.distance_to_rig_m < 50.0);
    }
}
