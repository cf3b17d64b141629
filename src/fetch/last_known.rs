//! Last-known-position merge
//!
//! Rigs drop off the AIS feed for hours at a time (shadowing, transponder
//! maintenance, range). The map still wants to show them somewhere, so each
//! cycle merges fresh positions over the previously stored last-known set:
//! new data replaces, stale data survives, and registry rigs that have never
//! reported get an empty placeholder entry.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::registry::RigRegistry;
use crate::types::{AisMessage, LastKnownDocument, LastKnownPosition};

/// Merge fresh AIS messages over the previous last-known document.
pub fn merge_last_known(
    previous: Option<&LastKnownDocument>,
    fresh: &[AisMessage],
    registry: &RigRegistry,
    fetched_at: DateTime<Utc>,
) -> LastKnownDocument {
    let stamp = fetched_at.to_rfc3339();
    let mut by_rig: BTreeMap<String, LastKnownPosition> = BTreeMap::new();

    if let Some(doc) = previous {
        for entry in &doc.rigs {
            if entry.rig_name.is_empty() {
                continue;
            }
            by_rig.insert(entry.rig_name.clone(), entry.clone());
        }
    }

    for msg in fresh {
        let Some(rig_name) = msg.rig_name.as_deref().filter(|name| !name.is_empty()) else {
            continue;
        };
        if msg.latitude.is_none() || msg.longitude.is_none() {
            continue;
        }
        by_rig.insert(
            rig_name.to_string(),
            LastKnownPosition {
                rig_name: rig_name.to_string(),
                mmsi: msg.mmsi,
                latitude: msg.latitude,
                longitude: msg.longitude,
                msgtime: msg.msgtime.clone(),
                source: msg.source.clone().or_else(|| Some("barentswatch".to_string())),
                fetched_at: Some(stamp.clone()),
            },
        );
    }

    // Seed rigs that have never reported so the document always covers the
    // whole fleet.
    for (name, entry) in registry.iter() {
        if registry.name_for_mmsi(entry.mmsi) != Some(name) {
            continue;
        }
        by_rig.entry(name.to_string()).or_insert_with(|| LastKnownPosition {
            rig_name: name.to_string(),
            mmsi: Some(entry.mmsi),
            fetched_at: Some(stamp.clone()),
            ..LastKnownPosition::default()
        });
    }

    LastKnownDocument {
        fetched_at: Some(stamp),
        rigs: by_rig.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid time")
    }

    fn make_msg(rig_name: &str, mmsi: u64, lat: f64) -> AisMessage {
        AisMessage {
            mmsi: Some(mmsi),
            rig_name: Some(rig_name.to_string()),
            latitude: Some(lat),
            longitude: Some(2.0),
            msgtime: Some("2025-06-01T11:55:00Z".to_string()),
            source: Some("barentswatch".to_string()),
        }
    }

    fn position_of<'a>(doc: &'a LastKnownDocument, rig: &str) -> &'a LastKnownPosition {
        doc.rigs
            .iter()
            .find(|entry| entry.rig_name == rig)
            .expect("rig present")
    }

    #[test]
    fn test_fresh_data_replaces_previous_position() {
        let previous = LastKnownDocument {
            fetched_at: Some("2025-06-01T06:00:00Z".to_string()),
            rigs: vec![LastKnownPosition {
                rig_name: "WEST LINUS".to_string(),
                latitude: Some(57.0),
                longitude: Some(1.0),
                ..LastKnownPosition::default()
            }],
        };

        let fresh = vec![make_msg("WEST LINUS", 257_095_000, 58.5)];
        let doc = merge_last_known(Some(&previous), &fresh, &RigRegistry::builtin(), now());

        assert_eq!(position_of(&doc, "WEST LINUS").latitude, Some(58.5));
    }

    #[test]
    fn test_stale_positions_survive_without_fresh_data() {
        let previous = LastKnownDocument {
            fetched_at: None,
            rigs: vec![LastKnownPosition {
                rig_name: "SCARABEO 8".to_string(),
                latitude: Some(61.2),
                longitude: Some(2.2),
                msgtime: Some("2025-05-28T03:00:00Z".to_string()),
                ..LastKnownPosition::default()
            }],
        };

        let doc = merge_last_known(Some(&previous), &[], &RigRegistry::builtin(), now());
        let kept = position_of(&doc, "SCARABEO 8");
        assert_eq!(kept.latitude, Some(61.2));
        assert_eq!(kept.msgtime.as_deref(), Some("2025-05-28T03:00:00Z"));
    }

    #[test]
    fn test_every_registry_rig_is_covered() {
        let registry = RigRegistry::builtin();
        let doc = merge_last_known(None, &[], &registry, now());

        let silent = position_of(&doc, "DEEPSEA YANTAI");
        assert_eq!(silent.latitude, None);
        assert_eq!(silent.mmsi, Some(311_000_483));
        // One entry per canonical rig; the WEST LINUS alias adds no row.
        let linus_rows = doc.rigs.iter().filter(|e| e.mmsi == Some(257_095_000)).count();
        assert_eq!(linus_rows, 1);
    }

    #[test]
    fn test_messages_without_coordinates_do_not_overwrite() {
        let previous = LastKnownDocument {
            fetched_at: None,
            rigs: vec![LastKnownPosition {
                rig_name: "WEST LINUS".to_string(),
                latitude: Some(57.0),
                longitude: Some(1.0),
                ..LastKnownPosition::default()
            }],
        };
        let fresh = vec![AisMessage {
            mmsi: Some(257_095_000),
            rig_name: Some("WEST LINUS".to_string()),
            ..AisMessage::default()
        }];

        let doc = merge_last_known(Some(&previous), &fresh, &RigRegistry::builtin(), now());
        assert_eq!(position_of(&doc, "WEST LINUS").latitude, Some(57.0));
    }
}
