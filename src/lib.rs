//! RIGMAP: Offshore Rig / Wellbore Correlation
//!
//! Correlates mobile drilling rigs with the wellbores they are likely
//! targeting on the Norwegian continental shelf, and turns the result into
//! map rendering requests and summary statistics.
//!
//! ## Architecture
//!
//! - **Fetch**: SODIR FactMaps wellbores and BarentsWatch live AIS positions
//! - **Snapshots**: rolling per-rig position history for movement detection
//! - **Analysis**: movement, proximity, and likely-target inference
//! - **Map load**: well index first, then rig correlation against it, both
//!   emitting requests to an injected rendering surface

pub mod analysis;
pub mod classify;
pub mod config;
pub mod correlate;
pub mod fetch;
pub mod geo;
pub mod index;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod snapshots;
pub mod stats;
pub mod types;

// Re-export the map-load surface
pub use pipeline::{load_map, DiagnosticSink, LoadError, LoadOutcome, TracingSink};
pub use render::{GeoJsonSurface, RecordingSurface, RenderSurface};

// Re-export the two-phase building blocks
pub use correlate::{correlate_rigs, CorrelationSummary};
pub use index::{build_well_index, WellIndex};

// Re-export classification rules
pub use classify::{rig_activity, well_state, RigActivity, WellState};

// Re-export commonly used types
pub use types::{
    AisDocument, AisMessage, AnalysisDocument, LastKnownDocument, RigRecord, SnapshotDocument,
    WellRecord,
};

// Re-export configuration
pub use config::MapConfig;
