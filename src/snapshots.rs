//! Rolling AIS position snapshots
//!
//! Maintains, per registry rig, the most recent AIS message, a bounded
//! running history used for movement detection, and longer-horizon reference
//! positions (12 h / 1 d / 2 d) rolled forward at UTC midnight.
//!
//! This is pure state-transition logic over an owned [`SnapshotDocument`];
//! the caller reads and writes the file.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::registry::RigRegistry;
use crate::types::{AisMessage, RigSnapshot, SnapshotDocument};

/// Retention limits for the running history.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotPolicy {
    /// Maximum messages kept in the running history.
    pub max_running_msgs: usize,
    /// Age limit for running messages, in hours.
    pub retention_hours: i64,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            max_running_msgs: 12,
            retention_hours: 12,
        }
    }
}

/// Fold a batch of fresh AIS messages into the snapshot document.
///
/// Every canonical registry rig gets an entry (created empty if the rig has
/// never reported). For each rig, the newest message in the batch updates
/// `msg_recent` and extends the running history; stale batches (older than
/// the stored recent message) are ignored.
pub fn update_snapshots(
    doc: &mut SnapshotDocument,
    messages: &[AisMessage],
    registry: &RigRegistry,
    now: DateTime<Utc>,
    policy: SnapshotPolicy,
) {
    for (name, entry) in registry.iter() {
        // Aliases share an MMSI with their canonical name; track only the
        // canonical entry so one rig never has two snapshot rows.
        if registry.name_for_mmsi(entry.mmsi) != Some(name) {
            continue;
        }

        let snapshot = doc.rigs.entry(name.to_string()).or_default();

        let newest = messages
            .iter()
            .filter(|msg| msg.mmsi == Some(entry.mmsi))
            .filter(|msg| msg.msgtime_utc().is_some())
            .max_by_key(|msg| msg.msgtime_utc());

        if let Some(latest) = newest {
            let latest_ts = latest.msgtime_utc();
            let recent_ts = snapshot.msg_recent.as_ref().and_then(AisMessage::msgtime_utc);

            if recent_ts.is_none() || latest_ts > recent_ts {
                snapshot.msg_recent = Some(latest.clone());
                snapshot.running_msgs.push(latest.clone());
                debug!(rig = name, msgtime = ?latest.msgtime, "snapshot updated");
            }
        }

        mark_half_day_reference(snapshot, now);
        prune_running(snapshot, now, policy);
    }

    roll_daily_references(doc, now);
}

/// Capture the 12 h reference before pruning can discard it.
fn mark_half_day_reference(snapshot: &mut RigSnapshot, now: DateTime<Utc>) {
    if snapshot.msg_12h.is_some() {
        return;
    }
    let half_day = Duration::hours(12);
    snapshot.msg_12h = snapshot
        .running_msgs
        .iter()
        .find(|msg| {
            msg.msgtime_utc()
                .is_some_and(|ts| now.signed_duration_since(ts) >= half_day)
        })
        .cloned();
}

/// Drop running messages past the retention window and cap the history.
fn prune_running(snapshot: &mut RigSnapshot, now: DateTime<Utc>, policy: SnapshotPolicy) {
    let retention = Duration::hours(policy.retention_hours);
    snapshot.running_msgs.retain(|msg| {
        msg.msgtime_utc()
            .is_some_and(|ts| now.signed_duration_since(ts) < retention)
    });

    let len = snapshot.running_msgs.len();
    if len > policy.max_running_msgs {
        snapshot.running_msgs.drain(..len - policy.max_running_msgs);
    }
}

/// Shift 12h → 1d → 2d once per UTC day.
fn roll_daily_references(doc: &mut SnapshotDocument, now: DateTime<Utc>) {
    let today = now.format("%Y-%m-%d").to_string();
    if doc.last_roll_date.as_deref() == Some(today.as_str()) {
        return;
    }

    for snapshot in doc.rigs.values_mut() {
        snapshot.msg_2d = snapshot.msg_1d.take();
        snapshot.msg_1d = snapshot.msg_12h.take();
    }
    doc.last_roll_date = Some(today);
}
