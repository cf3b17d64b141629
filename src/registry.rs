//! Rig registry
//!
//! Single source of truth for the monitored fleet: rig name → MMSI and hull
//! class. Names are normalized (trimmed, uppercased) before lookup; SODIR
//! facility names and AIS ship names disagree on casing and padding.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hull class of a mobile drilling unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RigClass {
    #[serde(rename = "JACK-UP")]
    JackUp,
    #[serde(rename = "SEMISUB")]
    SemiSub,
}

impl std::fmt::Display for RigClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JackUp => write!(f, "JACK-UP"),
            Self::SemiSub => write!(f, "SEMISUB"),
        }
    }
}

/// Registry metadata for one rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RigEntry {
    pub mmsi: u64,
    pub class: RigClass,
}

/// The built-in fleet. "LINUS" is an alias for WEST LINUS; SODIR has used
/// both spellings for the same facility.
const BUILTIN_RIGS: &[(&str, u64, RigClass)] = &[
    ("MÆRSK GUARDIAN", 577_494_000, RigClass::JackUp),
    ("WEST LINUS", 257_095_000, RigClass::JackUp),
    ("LINUS", 257_095_000, RigClass::JackUp),
    ("WEST ELARA", 259_783_000, RigClass::JackUp),
    ("WEST EPSILON", 351_635_000, RigClass::JackUp),
    ("VALARIS VIKING", 538_004_075, RigClass::JackUp),
    ("SCARABEO 8", 308_928_000, RigClass::SemiSub),
    ("DEEPSEA ABERDEEN", 310_713_000, RigClass::SemiSub),
    ("ASKEPOTT", 257_459_000, RigClass::JackUp),
    ("TRANSOCEAN ENDURANCE", 538_010_768, RigClass::SemiSub),
    ("COSLPROMOTER", 565_798_000, RigClass::SemiSub),
    ("TRANSOCEAN EQUINOX", 538_010_767, RigClass::SemiSub),
    ("COSLINNOVATOR", 566_391_000, RigClass::SemiSub),
    ("NOBLE INTEGRATOR", 538_010_630, RigClass::JackUp),
    ("DEEPSEA NORDKAPP", 310_776_000, RigClass::SemiSub),
    ("NOBLE INVINCIBLE", 538_010_632, RigClass::JackUp),
    ("TRANSOCEAN ENABLER", 258_615_000, RigClass::SemiSub),
    ("DEEPSEA YANTAI", 311_000_483, RigClass::SemiSub),
    ("SHELF DRILLING BARSK", 636_016_111, RigClass::JackUp),
    ("ASKELADDEN", 257_452_000, RigClass::JackUp),
    ("COSLPIONEER", 563_050_900, RigClass::SemiSub),
    ("TRANSOCEAN SPITSBERGEN", 538_004_905, RigClass::SemiSub),
    ("COSLPROSPECTOR", 565_369_000, RigClass::SemiSub),
    ("DEEPSEA STAVANGER", 310_767_000, RigClass::SemiSub),
    ("TRANSOCEAN ENCOURAGE", 258_627_000, RigClass::SemiSub),
    ("DEEPSEA ATLANTIC", 310_766_000, RigClass::SemiSub),
    ("DEEPSEA BOLLSTA", 257_440_000, RigClass::SemiSub),
];

/// Normalize a rig name for registry lookup: trimmed, uppercased.
pub fn normalize_rig_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Lookup table over the monitored fleet.
#[derive(Debug, Clone)]
pub struct RigRegistry {
    rigs: HashMap<String, RigEntry>,
    by_mmsi: HashMap<u64, String>,
}

impl RigRegistry {
    /// The built-in registry for the Norwegian shelf fleet.
    pub fn builtin() -> Self {
        let mut rigs = HashMap::with_capacity(BUILTIN_RIGS.len());
        let mut by_mmsi = HashMap::with_capacity(BUILTIN_RIGS.len());

        for &(name, mmsi, class) in BUILTIN_RIGS {
            rigs.insert(name.to_string(), RigEntry { mmsi, class });
            // First name wins for the reverse lookup, so aliases (which are
            // listed after their canonical name) never shadow it.
            by_mmsi.entry(mmsi).or_insert_with(|| name.to_string());
        }

        Self { rigs, by_mmsi }
    }

    /// Registry entry for a rig name (normalized before lookup).
    pub fn get(&self, rig_name: &str) -> Option<RigEntry> {
        self.rigs.get(&normalize_rig_name(rig_name)).copied()
    }

    /// MMSI for a rig name, or None if unknown.
    pub fn mmsi_for(&self, rig_name: &str) -> Option<u64> {
        self.get(rig_name).map(|entry| entry.mmsi)
    }

    /// Hull class for a rig name, or None if unknown.
    pub fn class_for(&self, rig_name: &str) -> Option<RigClass> {
        self.get(rig_name).map(|entry| entry.class)
    }

    /// Canonical rig name for an MMSI, or None if unknown.
    pub fn name_for_mmsi(&self, mmsi: u64) -> Option<&str> {
        self.by_mmsi.get(&mmsi).map(String::as_str)
    }

    /// Whether an MMSI belongs to a monitored rig.
    pub fn contains_mmsi(&self, mmsi: u64) -> bool {
        self.by_mmsi.contains_key(&mmsi)
    }

    /// All registry names, sorted.
    pub fn known_rigs(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rigs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All rigs of a given hull class, sorted by name.
    pub fn rigs_by_class(&self, class: RigClass) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .rigs
            .iter()
            .filter(|(_, entry)| entry.class == class)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Iterate over (name, entry) pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RigEntry)> + '_ {
        self.rigs.iter().map(|(name, entry)| (name.as_str(), *entry))
    }
}

impl Default for RigRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
