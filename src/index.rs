//! Well index builder
//!
//! First phase of the map load: walk the wells document once, render a
//! marker for every well with usable coordinates, and build the name-keyed
//! index the rig correlator resolves targets against.
//!
//! Indexing is permissive: a well with a name but bad coordinates is still
//! indexed, so a rig targeting it still joins; coordinate validity is only
//! re-checked when a path is about to be drawn. The index is built once per
//! load and never mutated afterwards.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::classify::well_state;
use crate::render::RenderSurface;
use crate::types::WellRecord;

/// Name-keyed well lookup, immutable once built.
#[derive(Debug, Default)]
pub struct WellIndex {
    wells: HashMap<String, WellRecord>,
}

impl WellIndex {
    /// Exact-match lookup. No case folding, no trimming: `"A-1"` does not
    /// resolve `"a-1"` or `"A-1 "`.
    pub fn get(&self, wellbore_name: &str) -> Option<&WellRecord> {
        self.wells.get(wellbore_name)
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WellRecord)> + '_ {
        self.wells.iter().map(|(name, well)| (name.as_str(), well))
    }
}

/// Build the well index from the parsed wells document, emitting one marker
/// per coordinate-valid record along the way.
///
/// Records without coordinates are skipped for rendering but still indexed
/// when named; records without a name are rendered when mappable but never
/// indexed. Duplicate names keep the last record seen.
pub fn build_well_index(records: Vec<WellRecord>, surface: &mut dyn RenderSurface) -> WellIndex {
    let total = records.len();
    let mut index = WellIndex::default();
    let mut markers = 0usize;

    for well in records {
        if let Some(position) = well.position() {
            let state = well_state(&well);
            surface.add_point_marker(position, state.color(), well_popup(&well));
            markers += 1;
        } else {
            debug!(wellbore = %well.wellbore_name, "well has no usable coordinates, not rendered");
        }

        if well.wellbore_name.is_empty() {
            debug!("unnamed well skipped from index");
            continue;
        }
        index.wells.insert(well.wellbore_name.clone(), well);
    }

    info!(
        wells = total,
        indexed = index.len(),
        markers = markers,
        "well index built"
    );

    index
}

/// Popup payload for a well marker.
fn well_popup(well: &WellRecord) -> String {
    let name = if well.wellbore_name.is_empty() {
        "Unnamed wellbore"
    } else {
        &well.wellbore_name
    };
    let entry = well
        .entry_date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("Not entered");

    let mut popup = format!("<b>{name}</b><br>Entry date: {entry}");
    if let Some(field) = well.field.as_deref() {
        popup.push_str(&format!("<br>Field: {field}"));
    }
    if let Some(operator) = well.operator.as_deref() {
        popup.push_str(&format!("<br>Operator: {operator}"));
    }
    if let Some(status) = well.status.as_deref() {
        popup.push_str(&format!("<br>Status: {status}"));
    }
    if let Some(rig) = well.rig_name.as_deref() {
        popup.push_str(&format!("<br>Rig: {rig}"));
    }
    if let Some(url) = well.fact_page_url.as_deref() {
        popup.push_str(&format!("<br><a href=\"{url}\">Fact page</a>"));
    }
    popup
}
