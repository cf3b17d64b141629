//! Two-phase map load
//!
//! Orchestrates one load cycle: well phase first, rig phase second. The two
//! input documents may be fetched concurrently, but consumption is strictly
//! ordered: the well index is fully built and committed before any rig
//! lookup happens, as an explicit data dependency rather than an accident of
//! await ordering.
//!
//! Wells and rigs are independent failure domains. A dataset-level failure
//! (transport, malformed JSON, missing collection) is reported to the
//! [`DiagnosticSink`] and that pipeline degrades (empty index, or no rig
//! rendering) without ever propagating to the caller. Per-record anomalies
//! are not failures at all; they are skipped inside the phase functions.

use std::path::Path;
use thiserror::Error;
use tracing::error;

use crate::correlate::{correlate_rigs, CorrelationSummary};
use crate::fetch::FetchError;
use crate::index::{build_well_index, WellIndex};
use crate::render::RenderSurface;
use crate::types::{AnalysisDocument, WellRecord};

/// Dataset-level load failure. One of these per failed pipeline, reported
/// and swallowed at the load boundary.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Network or transport failure fetching a document.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Local I/O failure reading a document.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid JSON or does not deserialize.
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Valid JSON missing the expected structure.
    #[error("unexpected document shape: {0}")]
    Shape(String),
}

/// Fire-and-forget failure reporting. Implementations must not panic and
/// have nothing to return; the pipeline continues regardless.
pub trait DiagnosticSink {
    fn report_failure(&self, context: &str, error: &LoadError);
}

/// Default sink: structured error logging via `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report_failure(&self, context: &str, error: &LoadError) {
        error!(context = context, error = %error, "dataset load failed");
    }
}

/// Outcome of one load cycle.
pub struct LoadOutcome {
    /// The completed well index, exposed for reuse by the stats collaborator.
    pub index: WellIndex,
    /// Rig-phase counters; all zero when the rig dataset failed.
    pub correlation: CorrelationSummary,
}

/// Run one full load cycle over already-fetched (or failed) documents.
///
/// Phase one builds the well index and commits its markers; phase two
/// correlates rigs against it. Either phase degrades independently. Returns
/// the index so a caller can derive summary statistics from it.
pub fn load_map(
    wells: Result<Vec<WellRecord>, LoadError>,
    analysis: Result<AnalysisDocument, LoadError>,
    surface: &mut dyn RenderSurface,
    sink: &dyn DiagnosticSink,
) -> LoadOutcome {
    // Phase 1: wells. A failure here still leaves rigs renderable (pathless).
    let index = match wells {
        Ok(records) => build_well_index(records, surface),
        Err(err) => {
            sink.report_failure("wells", &err);
            WellIndex::default()
        }
    };

    // Phase 2: rigs, against the committed index.
    let correlation = match analysis {
        Ok(doc) => match doc.rigs {
            Some(rigs) => correlate_rigs(&rigs, &index, surface),
            None => {
                sink.report_failure(
                    "rigs",
                    &LoadError::Shape("analysis document has no `rigs` collection".to_string()),
                );
                CorrelationSummary::default()
            }
        },
        Err(err) => {
            sink.report_failure("rigs", &err);
            CorrelationSummary::default()
        }
    };

    LoadOutcome { index, correlation }
}

/// Read and deserialize a JSON document from disk.
pub fn load_json_file<T>(path: &Path) -> Result<T, LoadError>
where
    T: serde::de::DeserializeOwned,
{
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
