//! Key statistics
//!
//! Aggregates the wells document and the rig analysis into the summary
//! figures the map page shows next to the legend: fleet counts, entry and
//! movement splits, hull-class split, and the most recently entered wells.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::classify::{well_state, WellState};
use crate::registry::{RigClass, RigRegistry};
use crate::types::{RigRecord, WellRecord};

/// Number of entries in the hottest-wells list.
const HOTTEST_WELLS_LIMIT: usize = 10;

/// A recently entered well, ranked by entry date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotWell {
    pub wellbore_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig_name: Option<String>,
    pub entry_date: String,
    /// Whole days since entry; None when the date does not parse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_entry: Option<i64>,
}

/// Summary statistics for one data cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyStats {
    pub num_rigs: usize,
    pub num_wells: usize,
    pub entered_wells: usize,
    pub not_entered_wells: usize,
    pub stationary_rigs: usize,
    pub moving_rigs: usize,
    pub jackups: usize,
    pub semisubs: usize,
    pub hottest_wells: Vec<HotWell>,
}

/// Compute the summary statistics from the wells document and the analyzed
/// rig collection.
///
/// Rigs with unknown movement count as stationary here; the summary is a
/// two-way split even though markers render a third, unknown state.
pub fn compute_key_stats(
    wells: &[WellRecord],
    rigs: &BTreeMap<String, RigRecord>,
    registry: &RigRegistry,
    now: DateTime<Utc>,
) -> KeyStats {
    let mut stats = KeyStats {
        num_rigs: rigs.len(),
        num_wells: wells.len(),
        ..KeyStats::default()
    };

    let mut entered: Vec<HotWell> = Vec::new();
    for well in wells {
        match well_state(well) {
            WellState::Entered => {
                stats.entered_wells += 1;
                let entry_date = well
                    .entry_date
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string();
                let days_since_entry = NaiveDate::parse_from_str(&entry_date, "%Y-%m-%d")
                    .ok()
                    .map(|date| (now.date_naive() - date).num_days());
                entered.push(HotWell {
                    wellbore_name: well.wellbore_name.clone(),
                    rig_name: well.rig_name.clone(),
                    entry_date,
                    days_since_entry,
                });
            }
            WellState::NotEntered => stats.not_entered_wells += 1,
        }
    }

    // Most recent entries first; ISO dates sort lexicographically.
    entered.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
    entered.truncate(HOTTEST_WELLS_LIMIT);
    stats.hottest_wells = entered;

    for (rig_name, rig) in rigs {
        if rig.rig_moving == Some(true) {
            stats.moving_rigs += 1;
        } else {
            stats.stationary_rigs += 1;
        }

        match registry.class_for(rig_name) {
            Some(RigClass::JackUp) => stats.jackups += 1,
            Some(RigClass::SemiSub) => stats.semisubs += 1,
            None => {}
        }
    }

    info!(
        wells = stats.num_wells,
        rigs = stats.num_rigs,
        entered = stats.entered_wells,
        moving = stats.moving_rigs,
        "key statistics computed"
    );

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid time")
    }

    fn make_well(name: &str, entry: Option<&str>) -> WellRecord {
        WellRecord {
            wellbore_name: name.to_string(),
            rig_name: Some("WEST LINUS".to_string()),
            entry_date: entry.map(str::to_string),
            ..WellRecord::default()
        }
    }

    fn make_rig(name: &str, moving: Option<bool>) -> (String, RigRecord) {
        (
            name.to_string(),
            RigRecord {
                rig_name: name.to_string(),
                rig_moving: moving,
                ..RigRecord::default()
            },
        )
    }

    #[test]
    fn test_well_split_partitions_exactly() {
        let wells = vec![
            make_well("W1", Some("2025-05-20")),
            make_well("W2", None),
            make_well("W3", Some("")),
        ];
        let stats = compute_key_stats(&wells, &BTreeMap::new(), &RigRegistry::builtin(), now());
        assert_eq!(stats.num_wells, 3);
        assert_eq!(stats.entered_wells, 1);
        assert_eq!(stats.not_entered_wells, 2);
        assert_eq!(stats.entered_wells + stats.not_entered_wells, stats.num_wells);
    }

    #[test]
    fn test_rig_split_counts_unknown_as_stationary() {
        let rigs: BTreeMap<String, RigRecord> = [
            make_rig("WEST LINUS", Some(true)),
            make_rig("SCARABEO 8", Some(false)),
            make_rig("ASKEPOTT", None),
        ]
        .into_iter()
        .collect();

        let stats = compute_key_stats(&[], &rigs, &RigRegistry::builtin(), now());
        assert_eq!(stats.moving_rigs, 1);
        assert_eq!(stats.stationary_rigs, 2);
        assert_eq!(stats.moving_rigs + stats.stationary_rigs, stats.num_rigs);
    }

    #[test]
    fn test_hull_class_split_uses_registry() {
        let rigs: BTreeMap<String, RigRecord> = [
            make_rig("WEST LINUS", None),
            make_rig("SCARABEO 8", None),
            make_rig("UNREGISTERED RIG", None),
        ]
        .into_iter()
        .collect();

        let stats = compute_key_stats(&[], &rigs, &RigRegistry::builtin(), now());
        assert_eq!(stats.jackups, 1);
        assert_eq!(stats.semisubs, 1);
    }

    #[test]
    fn test_hottest_wells_most_recent_first_with_age() {
        let wells = vec![
            make_well("OLD", Some("2025-03-01")),
            make_well("NEW", Some("2025-05-30")),
            make_well("UNPARSEABLE", Some("spring")),
        ];
        let stats = compute_key_stats(&wells, &BTreeMap::new(), &RigRegistry::builtin(), now());

        assert_eq!(stats.hottest_wells.len(), 3);
        assert_eq!(stats.hottest_wells[0].wellbore_name, "UNPARSEABLE");
        assert_eq!(stats.hottest_wells[0].days_since_entry, None);
        assert_eq!(stats.hottest_wells[1].wellbore_name, "NEW");
        assert_eq!(stats.hottest_wells[1].days_since_entry, Some(2));
        assert_eq!(stats.hottest_wells[2].wellbore_name, "OLD");
    }

    #[test]
    fn test_hottest_wells_capped_at_ten() {
        let wells: Vec<WellRecord> = (0..15)
            .map(|i| make_well(&format!("W{i}"), Some(&format!("2025-05-{:02}", i + 1))))
            .collect();
        let stats = compute_key_stats(&wells, &BTreeMap::new(), &RigRegistry::builtin(), now());
        assert_eq!(stats.hottest_wells.len(), 10);
        assert_eq!(stats.hottest_wells[0].entry_date, "2025-05-15");
    }
}
