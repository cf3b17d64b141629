//! Classification rules
//!
//! The two pure functions that turn raw record fields into marker semantics:
//! wells are entered or not entered, rigs are moving, stationary, or unknown.
//! Both are total (every input maps to exactly one variant) and free of
//! side effects, so they can be tested exhaustively without a rendering
//! surface.

use serde::{Deserialize, Serialize};

use crate::types::{RigRecord, WellRecord};

/// Marker color for entered wells.
pub const ENTERED_COLOR: &str = "#2e7d32";
/// Marker color for wells not yet entered.
pub const NOT_ENTERED_COLOR: &str = "#f9a825";
/// Marker color for rigs under way.
pub const MOVING_COLOR: &str = "#d32f2f";
/// Marker color for stationary rigs.
pub const STATIONARY_COLOR: &str = "#1565c0";
/// Marker color for rigs with unknown movement state.
pub const UNKNOWN_COLOR: &str = "#757575";

/// Entry state of a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellState {
    Entered,
    NotEntered,
}

impl WellState {
    /// The marker color for this state.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Entered => ENTERED_COLOR,
            Self::NotEntered => NOT_ENTERED_COLOR,
        }
    }
}

/// Movement state of a rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RigActivity {
    Moving,
    Stationary,
    Unknown,
}

impl RigActivity {
    /// The marker color for this state.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Moving => MOVING_COLOR,
            Self::Stationary => STATIONARY_COLOR,
            Self::Unknown => UNKNOWN_COLOR,
        }
    }
}

/// Classify a well from its entry date: entered iff the date is present and
/// not blank.
pub fn well_state(well: &WellRecord) -> WellState {
    match well.entry_date.as_deref() {
        Some(date) if !date.trim().is_empty() => WellState::Entered,
        _ => WellState::NotEntered,
    }
}

/// Classify a rig from its tri-state movement flag. Anything other than an
/// explicit true/false is unknown.
pub fn rig_activity(rig: &RigRecord) -> RigActivity {
    match rig.rig_moving {
        Some(true) => RigActivity::Moving,
        Some(false) => RigActivity::Stationary,
        None => RigActivity::Unknown,
    }
}
