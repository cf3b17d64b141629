//! Rig correlator
//!
//! Second phase of the map load: walk the rig collection from the analysis
//! document, render a marker per positioned rig, and draw an association
//! path to the rig's likely target well where the join succeeds.
//!
//! A path is drawn iff all three hold:
//! 1. the rig has valid coordinates,
//! 2. `likely_target_well` resolves in the well index by exact name match,
//! 3. the resolved well itself has valid coordinates.
//!
//! Any failed condition silently suppresses the path; the rig marker is
//! unaffected. Requires the completed [`WellIndex`]; correlation must not
//! start until the well phase has committed.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::classify::rig_activity;
use crate::index::WellIndex;
use crate::render::{PathStyle, RenderSurface};
use crate::types::RigRecord;

/// Counters from one correlation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationSummary {
    /// Rigs rendered as markers.
    pub rigs_rendered: usize,
    /// Association paths drawn.
    pub paths_drawn: usize,
    /// Rigs skipped for missing coordinates.
    pub rigs_skipped: usize,
    /// Rigs with a target name that did not resolve to a mappable well.
    pub unresolved_targets: usize,
}

/// Correlate every rig against the completed well index, issuing markers and
/// association paths.
pub fn correlate_rigs(
    rigs: &BTreeMap<String, RigRecord>,
    index: &WellIndex,
    surface: &mut dyn RenderSurface,
) -> CorrelationSummary {
    let mut summary = CorrelationSummary::default();

    for (key, rig) in rigs {
        let Some(rig_position) = rig.position() else {
            debug!(rig = %key, "rig has no usable coordinates, skipped");
            summary.rigs_skipped += 1;
            continue;
        };

        let activity = rig_activity(rig);
        surface.add_point_marker(rig_position, activity.color(), rig_popup(rig));
        summary.rigs_rendered += 1;

        let Some(target) = rig.target_well() else {
            continue;
        };

        match index.get(target).and_then(|well| well.position()) {
            Some(well_position) => {
                surface.add_path(rig_position, well_position, PathStyle::association());
                summary.paths_drawn += 1;
            }
            None => {
                debug!(rig = %key, target = %target, "target well unresolved or unmappable");
                summary.unresolved_targets += 1;
            }
        }
    }

    info!(
        rigs = summary.rigs_rendered,
        paths = summary.paths_drawn,
        skipped = summary.rigs_skipped,
        unresolved = summary.unresolved_targets,
        "rig correlation complete"
    );

    summary
}

/// Popup payload for a rig marker.
fn rig_popup(rig: &RigRecord) -> String {
    let name = if rig.rig_name.is_empty() {
        "Unknown rig"
    } else {
        &rig.rig_name
    };
    let moving = match rig.rig_moving {
        Some(true) => "Moving",
        Some(false) => "Stationary",
        None => "Unknown",
    };
    let last_seen = rig.last_seen.as_deref().unwrap_or("No recent position");
    let target = rig.target_well().unwrap_or("No inferred target");

    let mut popup = format!(
        "<b>{name}</b><br>Movement: {moving}<br>Last seen: {last_seen}<br>Likely target: {target}"
    );
    if let Some(rig_type) = rig.rig_type.as_deref() {
        popup.push_str(&format!("<br>Type: {rig_type}"));
    }
    if let Some(mmsi) = rig.mmsi {
        popup.push_str(&format!("<br>MMSI: {mmsi}"));
    }
    popup
}
